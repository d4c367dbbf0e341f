use crate::models::{CategoryId, Direction};

#[derive(Debug)]
pub struct Category {
    pub id: CategoryId,
    pub name: &'static str,
    pub color: &'static str,
}

/// Keyboard layout of one counter page. All identifiers are lowercase.
#[derive(Debug)]
pub struct KeyBindings {
    pub incoming: &'static str,
    pub outgoing: &'static str,
    pub reset: &'static str,
    pub categories: &'static [(&'static str, CategoryId)],
    /// Pressing a modifier on its own counts for the first category.
    pub direct_modifiers: bool,
}

impl KeyBindings {
    pub fn category_for(&self, key: &str) -> Option<CategoryId> {
        self.categories
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, id)| *id)
    }

    pub fn modifier_for(&self, key: &str) -> Option<Direction> {
        if key == self.incoming {
            Some(Direction::Incoming)
        } else if key == self.outgoing {
            Some(Direction::Outgoing)
        } else {
            None
        }
    }

    pub fn key_for(&self, category: CategoryId) -> Option<&'static str> {
        self.categories
            .iter()
            .find(|(_, id)| *id == category)
            .map(|(key, _)| *key)
    }

    /// A key bound to two roles in the same variant would make a keystroke
    /// ambiguous; every table shipped here must pass this check.
    pub fn roles_are_disjoint(&self) -> bool {
        let mut keys: Vec<&str> = vec![self.incoming, self.outgoing, self.reset];
        keys.extend(self.categories.iter().map(|(key, _)| *key));
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        keys.len() == total
    }
}

#[derive(Debug)]
pub struct Variant {
    pub slug: &'static str,
    pub title: &'static str,
    pub cookie_name: &'static str,
    pub categories: &'static [Category],
    pub bindings: KeyBindings,
}

impl Variant {
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn first_category(&self) -> CategoryId {
        self.categories.first().map(|category| category.id).unwrap_or(CategoryId(1))
    }
}

pub const RESET_LABEL: &str = "Alle Zähler zurückgesetzt";

pub static EASY: Variant = Variant {
    slug: "easyCounter",
    title: "Easy Counter",
    cookie_name: "easyCounts",
    categories: &[Category {
        id: CategoryId(1),
        name: "Gesamt",
        color: "#374151",
    }],
    bindings: KeyBindings {
        incoming: "e",
        outgoing: "a",
        reset: "r",
        categories: &[],
        direct_modifiers: true,
    },
};

pub static STREET: Variant = Variant {
    slug: "streetCounter",
    title: "Verkehrszähler",
    cookie_name: "trafficCounts",
    categories: &[
        Category { id: CategoryId(1), name: "Fahrräder", color: "#14532d" },
        Category { id: CategoryId(2), name: "Motor. Zweiräder", color: "#713f12" },
        Category { id: CategoryId(3), name: "PKW / Lieferwägen", color: "#111827" },
        Category { id: CategoryId(4), name: "Kraftomnibusse", color: "#1e3a8a" },
        Category { id: CategoryId(5), name: "LKW ohne Anhänger", color: "#7f1d1d" },
        Category { id: CategoryId(6), name: "LKW mit Anhänger", color: "#581c87" },
    ],
    bindings: KeyBindings {
        incoming: "e",
        outgoing: "a",
        reset: "r",
        categories: &[
            ("1", CategoryId(1)),
            ("2", CategoryId(2)),
            ("3", CategoryId(3)),
            ("4", CategoryId(4)),
            ("5", CategoryId(5)),
            ("6", CategoryId(6)),
        ],
        direct_modifiers: false,
    },
};

pub static TRAIN: Variant = Variant {
    slug: "trainCounter",
    title: "Zugzähler",
    cookie_name: "trainCounts",
    categories: &[
        Category { id: CategoryId(1), name: "P (Personen)", color: "#30807D" },
        Category { id: CategoryId(2), name: "G (Gepäck)", color: "#C2A579" },
        Category { id: CategoryId(3), name: "F (Fahrrad)", color: "#E7333E" },
        Category { id: CategoryId(4), name: "R (Roller)", color: "#A4814B" },
        Category { id: CategoryId(5), name: "KW (Kinderwagen)", color: "#C03844" },
        Category { id: CategoryId(6), name: "K (Kinder)", color: "#142E97" },
        Category { id: CategoryId(7), name: "TS (Türsteher)", color: "#60462B" },
        Category { id: CategoryId(8), name: "KA (getragenes Kind)", color: "#6D1626" },
        Category { id: CategoryId(9), name: "EA (Wiedereinsteiger)", color: "#5F715B" },
        Category { id: CategoryId(10), name: "RF (Rollstuhlfahrer)", color: "#57291A" },
        Category { id: CategoryId(11), name: "RO (Rollator)", color: "#981233" },
        Category { id: CategoryId(12), name: "KG(+Anzahl K) Kindergruppe", color: "#00CED1" },
        Category { id: CategoryId(13), name: "SG (Schülergruppe)", color: "#AE7B0E" },
        Category { id: CategoryId(14), name: "PE (Personengruppe)", color: "#3D602A" },
        Category { id: CategoryId(15), name: "GE (Gedränge)", color: "#96766B" },
        Category { id: CategoryId(16), name: "H (Hund)", color: "#D65124" },
    ],
    bindings: KeyBindings {
        incoming: "e",
        outgoing: "a",
        reset: "r",
        categories: &[
            ("1", CategoryId(1)),
            ("2", CategoryId(2)),
            ("3", CategoryId(3)),
            ("4", CategoryId(4)),
            ("5", CategoryId(5)),
            ("6", CategoryId(6)),
            ("7", CategoryId(7)),
            ("8", CategoryId(8)),
            ("9", CategoryId(9)),
            ("0", CategoryId(10)),
            ("q", CategoryId(11)),
            ("w", CategoryId(12)),
            ("s", CategoryId(13)),
            ("d", CategoryId(14)),
            ("t", CategoryId(15)),
            ("z", CategoryId(16)),
        ],
        direct_modifiers: false,
    },
};

pub static ALL: [&Variant; 3] = [&STREET, &EASY, &TRAIN];

pub fn by_slug(slug: &str) -> Option<&'static Variant> {
    ALL.iter().copied().find(|variant| variant.slug == slug)
}

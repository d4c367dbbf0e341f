use crate::models::{CategoryId, Direction};
use crate::variants::KeyBindings;
use std::collections::BTreeSet;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatPolicy {
    /// Auto-repeated key-downs count like fresh presses.
    Count,
    Ignore,
}

impl FromStr for RepeatPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "count" => Ok(RepeatPolicy::Count),
            "ignore" => Ok(RepeatPolicy::Ignore),
            other => Err(format!("key repeat policy must be 'count' or 'ignore', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyEvent {
    Down(String),
    Up(String),
    /// The page lost focus; key-ups may never arrive.
    Blur,
}

impl KeyEvent {
    pub fn parse(event: &str, key: &str) -> Option<Self> {
        let key = key.to_lowercase();
        match event.trim() {
            "down" => Some(KeyEvent::Down(key)),
            "up" => Some(KeyEvent::Up(key)),
            "blur" => Some(KeyEvent::Blur),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModifierState {
    #[default]
    Released,
    Held,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChordAction {
    Increment {
        category: CategoryId,
        direction: Direction,
    },
    Reset,
}

/// Turns raw key transitions into counter actions for one page.
///
/// Resolution order for a fresh key-down: reset key, chord with the incoming
/// modifier, chord with the outgoing modifier, then (only where the layout
/// enables it) a lone modifier press counting for the first category.
#[derive(Debug, Clone)]
pub struct ChordMapper {
    bindings: &'static KeyBindings,
    first_category: CategoryId,
    repeat: RepeatPolicy,
    active: BTreeSet<String>,
    incoming: ModifierState,
    outgoing: ModifierState,
}

impl ChordMapper {
    pub fn new(bindings: &'static KeyBindings, first_category: CategoryId, repeat: RepeatPolicy) -> Self {
        Self {
            bindings,
            first_category,
            repeat,
            active: BTreeSet::new(),
            incoming: ModifierState::Released,
            outgoing: ModifierState::Released,
        }
    }

    pub fn handle(&mut self, event: KeyEvent) -> Option<ChordAction> {
        match event {
            KeyEvent::Down(key) => self.key_down(&key),
            KeyEvent::Up(key) => {
                self.key_up(&key);
                None
            }
            KeyEvent::Blur => {
                self.release_all();
                None
            }
        }
    }

    pub fn key_down(&mut self, key: &str) -> Option<ChordAction> {
        let key = key.to_lowercase();
        let repeated = !self.active.insert(key.clone());
        if repeated && self.repeat == RepeatPolicy::Ignore {
            return None;
        }

        let modifier = self.bindings.modifier_for(&key);
        if let Some(direction) = modifier {
            *self.modifier_mut(direction) = ModifierState::Held;
        }

        if key == self.bindings.reset {
            return Some(ChordAction::Reset);
        }

        if let Some(category) = self.bindings.category_for(&key) {
            if self.incoming == ModifierState::Held {
                return Some(ChordAction::Increment {
                    category,
                    direction: Direction::Incoming,
                });
            }
            if self.outgoing == ModifierState::Held {
                return Some(ChordAction::Increment {
                    category,
                    direction: Direction::Outgoing,
                });
            }
        }

        match modifier {
            Some(direction) if self.bindings.direct_modifiers => Some(ChordAction::Increment {
                category: self.first_category,
                direction,
            }),
            _ => None,
        }
    }

    pub fn key_up(&mut self, key: &str) {
        let key = key.to_lowercase();
        self.active.remove(&key);
        if let Some(direction) = self.bindings.modifier_for(&key) {
            *self.modifier_mut(direction) = ModifierState::Released;
        }
    }

    pub fn release_all(&mut self) {
        self.active.clear();
        self.incoming = ModifierState::Released;
        self.outgoing = ModifierState::Released;
    }

    pub fn modifier(&self, direction: Direction) -> ModifierState {
        match direction {
            Direction::Incoming => self.incoming,
            Direction::Outgoing => self.outgoing,
        }
    }

    pub fn held_keys(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }

    fn modifier_mut(&mut self, direction: Direction) -> &mut ModifierState {
        match direction {
            Direction::Incoming => &mut self.incoming,
            Direction::Outgoing => &mut self.outgoing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::{increment, reset, totals, zeroed};
    use crate::models::{CounterState, DirectionCount};
    use crate::variants::{EASY, STREET, TRAIN, Variant};

    fn mapper(variant: &'static Variant, repeat: RepeatPolicy) -> ChordMapper {
        ChordMapper::new(&variant.bindings, variant.first_category(), repeat)
    }

    fn apply(variant: &Variant, state: &CounterState, action: Option<ChordAction>) -> CounterState {
        match action {
            Some(ChordAction::Increment { category, direction }) => increment(state, category, direction),
            Some(ChordAction::Reset) => reset(variant),
            None => state.clone(),
        }
    }

    #[test]
    fn incoming_chord_increments_one_category() {
        let mut keys = mapper(&STREET, RepeatPolicy::Ignore);
        let before = zeroed(&STREET);

        assert_eq!(keys.key_down("e"), None);
        assert_eq!(keys.modifier(Direction::Incoming), ModifierState::Held);
        let action = keys.key_down("3");
        let after = apply(&STREET, &before, action);

        assert_eq!(
            action,
            Some(ChordAction::Increment {
                category: CategoryId(3),
                direction: Direction::Incoming,
            })
        );
        assert_eq!(after.get(CategoryId(3)), Some(&DirectionCount { incoming: 1, outgoing: 0 }));
        assert_eq!(totals(&after), DirectionCount { incoming: 1, outgoing: 0 });
    }

    #[test]
    fn outgoing_chord_and_uppercase_keys() {
        let mut keys = mapper(&TRAIN, RepeatPolicy::Ignore);
        keys.key_down("A");
        assert_eq!(
            keys.key_down("Z"),
            Some(ChordAction::Increment {
                category: CategoryId(16),
                direction: Direction::Outgoing,
            })
        );
    }

    #[test]
    fn category_key_without_modifier_does_nothing() {
        let mut keys = mapper(&STREET, RepeatPolicy::Count);
        assert_eq!(keys.key_down("4"), None);
        keys.key_up("4");
        assert_eq!(keys.key_down("e"), None);
    }

    #[test]
    fn released_modifier_stops_chording() {
        let mut keys = mapper(&STREET, RepeatPolicy::Ignore);
        keys.key_down("e");
        keys.key_up("e");
        assert_eq!(keys.modifier(Direction::Incoming), ModifierState::Released);
        assert_eq!(keys.key_down("1"), None);
    }

    #[test]
    fn incoming_wins_when_both_modifiers_are_held() {
        let mut keys = mapper(&STREET, RepeatPolicy::Ignore);
        keys.key_down("a");
        keys.key_down("e");
        assert_eq!(
            keys.key_down("2"),
            Some(ChordAction::Increment {
                category: CategoryId(2),
                direction: Direction::Incoming,
            })
        );
    }

    #[test]
    fn repressing_category_fires_once_per_press() {
        let mut keys = mapper(&STREET, RepeatPolicy::Ignore);
        let mut state = zeroed(&STREET);
        keys.key_down("a");
        for _ in 0..3 {
            state = apply(&STREET, &state, keys.key_down("5"));
            keys.key_up("5");
        }
        assert_eq!(state.get(CategoryId(5)), Some(&DirectionCount { incoming: 0, outgoing: 3 }));
    }

    #[test]
    fn auto_repeat_follows_policy() {
        let mut ignoring = mapper(&STREET, RepeatPolicy::Ignore);
        ignoring.key_down("e");
        assert!(ignoring.key_down("1").is_some());
        assert_eq!(ignoring.key_down("1"), None);
        assert_eq!(ignoring.key_down("1"), None);

        let mut counting = mapper(&STREET, RepeatPolicy::Count);
        counting.key_down("e");
        assert!(counting.key_down("1").is_some());
        assert!(counting.key_down("1").is_some());
    }

    #[test]
    fn reset_after_releasing_everything_clears_counts() {
        let mut keys = mapper(&TRAIN, RepeatPolicy::Ignore);
        let mut state = zeroed(&TRAIN);
        keys.key_down("e");
        state = apply(&TRAIN, &state, keys.key_down("q"));
        state = apply(&TRAIN, &state, keys.key_down("0"));
        keys.handle(KeyEvent::Blur);
        assert_eq!(keys.held_keys().count(), 0);

        state = apply(&TRAIN, &state, keys.key_down("r"));
        assert_eq!(state, zeroed(&TRAIN));
    }

    #[test]
    fn reset_fires_even_while_a_modifier_is_held() {
        let mut keys = mapper(&STREET, RepeatPolicy::Ignore);
        keys.key_down("e");
        assert_eq!(keys.key_down("r"), Some(ChordAction::Reset));
    }

    #[test]
    fn lone_modifiers_count_only_where_enabled() {
        let mut easy = mapper(&EASY, RepeatPolicy::Ignore);
        assert_eq!(
            easy.key_down("e"),
            Some(ChordAction::Increment {
                category: CategoryId(1),
                direction: Direction::Incoming,
            })
        );
        assert_eq!(
            easy.key_down("a"),
            Some(ChordAction::Increment {
                category: CategoryId(1),
                direction: Direction::Outgoing,
            })
        );

        let mut street = mapper(&STREET, RepeatPolicy::Ignore);
        assert_eq!(street.key_down("e"), None);
    }

    #[test]
    fn parses_wire_events() {
        assert_eq!(KeyEvent::parse("down", "E"), Some(KeyEvent::Down("e".into())));
        assert_eq!(KeyEvent::parse("up", "1"), Some(KeyEvent::Up("1".into())));
        assert_eq!(KeyEvent::parse("blur", ""), Some(KeyEvent::Blur));
        assert_eq!(KeyEvent::parse("press", "e"), None);
        assert_eq!("Count".parse::<RepeatPolicy>(), Ok(RepeatPolicy::Count));
        assert!("sometimes".parse::<RepeatPolicy>().is_err());
    }
}

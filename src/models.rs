use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u8);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    pub fn label(self) -> &'static str {
        match self {
            Direction::Incoming => "Einfahrend",
            Direction::Outgoing => "Ausfahrend",
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "incoming" => Ok(Direction::Incoming),
            "outgoing" => Ok(Direction::Outgoing),
            other => Err(format!("direction must be 'incoming' or 'outgoing', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DirectionCount {
    pub incoming: u64,
    pub outgoing: u64,
}

/// Counts for every configured category of one counter variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(transparent)]
pub struct CounterState {
    pub(crate) counts: BTreeMap<CategoryId, DirectionCount>,
}

impl CounterState {
    pub fn get(&self, category: CategoryId) -> Option<&DirectionCount> {
        self.counts.get(&category)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoryId, &DirectionCount)> {
        self.counts.iter().map(|(id, counts)| (*id, counts))
    }

    pub fn categories(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.counts.keys().copied()
    }
}

impl FromIterator<(CategoryId, DirectionCount)> for CounterState {
    fn from_iter<I: IntoIterator<Item = (CategoryId, DirectionCount)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

/// Body of every counting action. `counts` is the page's current state in
/// snapshot layout; without it the snapshot cookie is used instead.
#[derive(Debug, Deserialize)]
pub struct IncrementRequest {
    #[serde(default)]
    pub category: Value,
    #[serde(default)]
    pub direction: Value,
    #[serde(default)]
    pub counts: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub counts: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct KeyRequest {
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub counts: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub id: CategoryId,
    pub name: String,
    pub incoming: u64,
    pub outgoing: u64,
}

#[derive(Debug, Serialize)]
pub struct CountsResponse {
    pub variant: String,
    pub title: String,
    pub categories: Vec<CategoryCounts>,
    pub totals: DirectionCount,
    pub last_action: Option<String>,
    /// Snapshot layout, sent back unchanged with the next action.
    pub counts: CounterState,
}

use crate::counter::zeroed;
use crate::models::{CategoryId, CounterState, DirectionCount};
use crate::variants::Variant;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Months, Utc};
use serde_json::{Map, Value};
use std::fmt;
use time::OffsetDateTime;
use tracing::{debug, warn};

const INCOMING_FIELDS: [&str; 2] = ["incoming", "einfahrend"];
const OUTGOING_FIELDS: [&str; 2] = ["outgoing", "ausfahrend"];

#[derive(Debug)]
pub enum SnapshotError {
    Malformed(serde_json::Error),
    NotAnObject,
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Malformed(err) => write!(f, "snapshot is not valid JSON: {err}"),
            SnapshotError::NotAnObject => f.write_str("snapshot is not a JSON object"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Malformed(err) => Some(err),
            SnapshotError::NotAnObject => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryProblem {
    Missing,
    NotAnObject,
    BadField(&'static str),
}

/// A decoded snapshot plus the configured categories that had to be zeroed.
#[derive(Debug)]
pub struct Restored {
    pub state: CounterState,
    pub repaired: Vec<(CategoryId, EntryProblem)>,
}

pub fn encode_snapshot(state: &CounterState) -> Result<String, serde_json::Error> {
    serde_json::to_string(state)
}

/// Decodes a snapshot for `variant`, keeping every well-formed entry of a
/// configured category and zeroing the rest. Entries for categories the
/// variant no longer has are dropped.
pub fn decode_snapshot(raw: &str, variant: &Variant) -> Result<Restored, SnapshotError> {
    let parsed: Value = serde_json::from_str(raw).map_err(SnapshotError::Malformed)?;
    restore(&parsed, variant)
}

/// Same checks as [`decode_snapshot`] for a snapshot that is already parsed,
/// such as the counts a page sends back with each action.
pub fn restore(parsed: &Value, variant: &Variant) -> Result<Restored, SnapshotError> {
    let Value::Object(entries) = parsed else {
        return Err(SnapshotError::NotAnObject);
    };

    let mut repaired = Vec::new();
    let state = variant
        .categories
        .iter()
        .map(|category| {
            let counts = match check_entry(entries, category.id) {
                Ok(counts) => counts,
                Err(problem) => {
                    repaired.push((category.id, problem));
                    DirectionCount::default()
                }
            };
            (category.id, counts)
        })
        .collect();

    Ok(Restored { state, repaired })
}

fn check_entry(entries: &Map<String, Value>, id: CategoryId) -> Result<DirectionCount, EntryProblem> {
    let entry = entries.get(&id.to_string()).ok_or(EntryProblem::Missing)?;
    let fields = entry.as_object().ok_or(EntryProblem::NotAnObject)?;

    Ok(DirectionCount {
        incoming: count_field(fields, &INCOMING_FIELDS)?,
        outgoing: count_field(fields, &OUTGOING_FIELDS)?,
    })
}

fn count_field(fields: &Map<String, Value>, names: &[&'static str; 2]) -> Result<u64, EntryProblem> {
    names
        .iter()
        .find_map(|name| fields.get(*name))
        .and_then(Value::as_u64)
        .ok_or(EntryProblem::BadField(names[0]))
}

/// One calendar year ahead; Feb 29 clamps to Feb 28.
pub fn cookie_expiry(now: DateTime<Utc>) -> Option<OffsetDateTime> {
    let expires = now.checked_add_months(Months::new(12))?;
    OffsetDateTime::from_unix_timestamp(expires.timestamp()).ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    /// The page is being rendered before the browser took over.
    PreRender,
    Interactive,
}

/// Reads and writes one variant's snapshot cookie.
#[derive(Debug, Clone, Copy)]
pub struct CookiePersistence {
    variant: &'static Variant,
    phase: RenderPhase,
}

impl CookiePersistence {
    pub fn pre_render(variant: &'static Variant) -> Self {
        Self {
            variant,
            phase: RenderPhase::PreRender,
        }
    }

    pub fn interactive(variant: &'static Variant) -> Self {
        Self {
            variant,
            phase: RenderPhase::Interactive,
        }
    }

    pub fn load(&self, jar: &CookieJar) -> CounterState {
        let Some(cookie) = jar.get(self.variant.cookie_name) else {
            return zeroed(self.variant);
        };

        match decode_snapshot(cookie.value(), self.variant) {
            Ok(restored) => {
                if !restored.repaired.is_empty() {
                    debug!(
                        variant = self.variant.slug,
                        repaired = ?restored.repaired,
                        "zeroed invalid snapshot entries"
                    );
                }
                restored.state
            }
            Err(err) => {
                warn!(variant = self.variant.slug, "failed to load saved counts: {err}");
                zeroed(self.variant)
            }
        }
    }

    pub fn save(&self, jar: CookieJar, state: &CounterState) -> CookieJar {
        if self.phase == RenderPhase::PreRender {
            return jar;
        }

        let payload = match encode_snapshot(state) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(variant = self.variant.slug, "failed to save counts: {err}");
                return jar;
            }
        };

        let mut cookie = Cookie::build((self.variant.cookie_name, payload))
            .path("/")
            .same_site(SameSite::Lax);
        if let Some(expires) = cookie_expiry(Utc::now()) {
            cookie = cookie.expires(expires);
        }
        jar.add(cookie)
    }
}

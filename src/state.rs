use crate::config::Config;
use crate::input::ChordMapper;
use crate::variants::Variant;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<Mutex<KeySessions>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let sessions = KeySessions::new(config.max_sessions);
        Self {
            config: Arc::new(config),
            sessions: Arc::new(Mutex::new(sessions)),
        }
    }
}

struct SessionEntry {
    mapper: ChordMapper,
    last_seen: u64,
}

/// Held-key state per rendered page (keyed by the id embedded in it and the
/// counter slug), bounded by evicting the entry that was used least recently.
pub struct KeySessions {
    capacity: usize,
    clock: u64,
    entries: HashMap<(String, &'static str), SessionEntry>,
}

impl KeySessions {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            clock: 0,
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn mapper(
        &mut self,
        page: &str,
        variant: &'static Variant,
        create: impl FnOnce() -> ChordMapper,
    ) -> &mut ChordMapper {
        self.clock += 1;
        let key = (page.to_string(), variant.slug);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity {
            self.evict_oldest();
        }

        let clock = self.clock;
        let entry = self.entries.entry(key).or_insert_with(|| SessionEntry {
            mapper: create(),
            last_seen: clock,
        });
        entry.last_seen = clock;
        &mut entry.mapper
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_seen)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            debug!(page = %key.0, variant = key.1, "evicting idle key session");
            self.entries.remove(&key);
        }
    }
}

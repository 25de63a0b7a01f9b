//! Process-wide TTL cache for acquired paper sets.
//!
//! Reads and writes take a short `parking_lot` lock and never hold it across
//! an await point. Concurrent misses for the same key may both go to the
//! remote tier; the last write wins.

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;

use examprep_core::model::{normalize_term, subject_key, PaperSet};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// A string-keyed cache whose entries expire after a per-entry TTL.
#[derive(Debug)]
pub struct TtlCache<V> {
    store: RwLock<HashMap<String, Entry<V>>>,
}

/// The cache type shared by the acquisition pipeline.
pub type PaperCache = TtlCache<PaperSet>;

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a live entry. Expired entries are removed on the way.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        {
            let store = self.store.read();
            match store.get(key) {
                None => return None,
                Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }
        let mut store = self.store.write();
        if store.get(key).is_some_and(|e| e.expires_at <= now) {
            store.remove(key);
        }
        None
    }

    pub fn insert(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let entry = Entry {
            value,
            expires_at: Instant::now() + ttl,
        };
        self.store.write().insert(key.into(), entry);
    }

    /// Remove every entry, or only those whose key starts with `prefix`.
    pub fn clear(&self, prefix: Option<&str>) -> usize {
        let mut store = self.store.write();
        let before = store.len();
        match prefix {
            None => store.clear(),
            Some(p) => store.retain(|k, _| !k.starts_with(p)),
        }
        before - store.len()
    }

    /// Number of stored entries, including ones that expired but were not read since.
    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache key for a subject/term pair, e.g. `papers:maths:first_term`.
pub fn cache_key(subject: &str, term: &str) -> String {
    let s = subject_key(subject).replace(' ', "_");
    let t = normalize_term(term).trim().to_lowercase().replace(' ', "_");
    format!("papers:{s}:{t}")
}

//! Cache tags and the tag-based invalidation contract.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

/// A cache tag, e.g. `node:42`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheTag(String);

impl CacheTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Tag for a single entity instance: `<entity_type>:<entity_id>`.
    pub fn for_entity(entity_type: &str, entity_id: &str) -> Self {
        Self(format!("{entity_type}:{entity_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Tag-based cache invalidation.
///
/// Invalidating a tag that was never cached, or was already invalidated, is a
/// no-op. Implementations must not fail.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, tags: &BTreeSet<CacheTag>);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    tags: BTreeSet<CacheTag>,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    invalidations: HashMap<CacheTag, u64>,
}

/// In-memory tagged cache.
///
/// Entries are stored with a set of tags; invalidating a tag drops every entry
/// carrying it.
///
/// Reference backend for tests and local runs. Invalidation counters are kept
/// for every tag ever invalidated and are never evicted, so memory grows with
/// the number of distinct entities.
#[derive(Debug, Default)]
pub struct MemoryTagCache {
    state: Mutex<CacheState>,
}

impl MemoryTagCache {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking writer cannot leave an entry half-written, so a poisoned
    // lock is still usable.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store a value under `key`, replacing any previous entry.
    pub fn set(
        &self,
        key: impl Into<String>,
        value: serde_json::Value,
        tags: impl IntoIterator<Item = CacheTag>,
    ) {
        let entry = CacheEntry {
            value,
            tags: tags.into_iter().collect(),
        };
        self.lock().entries.insert(key.into(), entry);
    }

    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.lock().entries.get(key).map(|e| e.value.clone())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of times `tag` has been invalidated.
    pub fn invalidation_count(&self, tag: &CacheTag) -> u64 {
        self.lock().invalidations.get(tag).copied().unwrap_or(0)
    }
}

impl CacheInvalidator for MemoryTagCache {
    fn invalidate(&self, tags: &BTreeSet<CacheTag>) {
        if tags.is_empty() {
            return;
        }

        let mut state = self.lock();
        let before = state.entries.len();
        state
            .entries
            .retain(|_, entry| entry.tags.is_disjoint(tags));
        let dropped = before - state.entries.len();

        for tag in tags {
            *state.invalidations.entry(tag.clone()).or_insert(0) += 1;
        }

        tracing::debug!(tags = tags.len(), dropped, "Invalidated cache tags");
    }
}

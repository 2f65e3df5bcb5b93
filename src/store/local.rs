//! Local Store Module
//!
//! Bounded in-process store combining HashMap storage with LRU eviction and
//! an optional maximum age.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::{LruTracker, Store};
use crate::cache::current_timestamp_ms;
use crate::error::Result;

// == Local Store ==
/// In-process store with LRU eviction.
#[derive(Debug)]
pub struct LocalStore {
    inner: RwLock<LocalInner>,
    /// Maximum number of entries allowed
    max_entries: usize,
    /// Age in milliseconds after which an entry reads as absent
    max_age_ms: Option<i64>,
}

#[derive(Debug, Default)]
struct LocalInner {
    entries: HashMap<String, Slot>,
    lru: LruTracker,
}

#[derive(Debug)]
struct Slot {
    value: Value,
    inserted_at: i64,
}

impl LocalStore {
    // == Constructor ==
    /// Creates a new LocalStore.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries the store can hold
    /// * `max_age` - Optional age in seconds after which entries are dropped
    pub fn new(max_entries: usize, max_age: Option<u64>) -> Self {
        Self {
            inner: RwLock::new(LocalInner::default()),
            max_entries,
            max_age_ms: max_age
                .map(|secs| i64::try_from(secs.saturating_mul(1000)).unwrap_or(i64::MAX)),
        }
    }

    // == Length ==
    /// Returns the current number of entries.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Returns true if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    fn is_too_old(&self, slot: &Slot, now: i64) -> bool {
        match self.max_age_ms {
            Some(max_age) => now - slot.inserted_at > max_age,
            None => false,
        }
    }
}

#[async_trait]
impl Store for LocalStore {
    fn backend(&self) -> &'static str {
        "local"
    }

    // == Get ==
    /// Reads a value and marks it recently used. Entries past `max_age` are
    /// removed and read as absent.
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        // Write lock: the LRU order changes on every read
        let mut inner = self.inner.write().await;

        let too_old = match inner.entries.get(key) {
            Some(slot) => self.is_too_old(slot, current_timestamp_ms()),
            None => return Ok(None),
        };

        if too_old {
            inner.entries.remove(key);
            inner.lru.remove(key);
            debug!("local store dropped aged entry {}", key);
            return Ok(None);
        }

        inner.lru.touch(key);
        Ok(inner.entries.get(key).map(|slot| slot.value.clone()))
    }

    // == Set ==
    /// Stores a value. At capacity, the least recently used entry is evicted
    /// first unless the key is being overwritten.
    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut inner = self.inner.write().await;

        let is_overwrite = inner.entries.contains_key(key);
        if !is_overwrite && inner.entries.len() >= self.max_entries {
            if let Some(evicted) = inner.lru.evict_oldest() {
                inner.entries.remove(&evicted);
                debug!("local store evicted {}", evicted);
            }
        }

        inner.entries.insert(
            key.to_string(),
            Slot {
                value,
                inserted_at: current_timestamp_ms(),
            },
        );
        inner.lru.touch(key);
        Ok(())
    }

    // == Clear ==
    async fn clear(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.lru.clear();
        Ok(())
    }
}

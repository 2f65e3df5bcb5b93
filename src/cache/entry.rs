//! Cache Entry Module
//!
//! Defines the stored form of a memoized result: the value plus its write
//! timestamp and an optional per-entry freshness window.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

// == Cache Entry ==
/// A memoized result as persisted in a store.
///
/// Callers only ever receive `value`; the timestamp stays inside the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The memoized value
    pub value: Value,
    /// Write timestamp (Unix milliseconds). May lie in the future after a
    /// failover promotion.
    #[serde(rename = "ts")]
    pub written_at: i64,
    /// Freshness window override in seconds, None = manager base expiry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry stamped with the current time.
    pub fn new(value: Value) -> Self {
        Self::stamped(value, current_timestamp_ms())
    }

    /// Creates an entry with an explicit write timestamp.
    pub fn stamped(value: Value, written_at: i64) -> Self {
        Self {
            value,
            written_at,
            expiry: None,
        }
    }

    // == Failover ==
    /// Turns a stale entry into a failover entry.
    ///
    /// The write timestamp moves `failover_expiry` seconds past `now` and the
    /// entry carries `failover_expiry` as its own window, so it stays fresh
    /// without touching the window of any other key.
    pub fn promote(self, now: i64, failover_expiry: u64) -> Self {
        Self {
            value: self.value,
            written_at: now.saturating_add(secs_to_ms(failover_expiry)),
            expiry: Some(failover_expiry),
        }
    }

    // == Freshness ==
    /// Age of the entry in milliseconds at `now` (negative when promoted).
    /// Saturates on out-of-range timestamps.
    pub fn age_ms(&self, now: i64) -> i64 {
        now.saturating_sub(self.written_at)
    }

    /// Checks whether the entry may be served as a hit at `now`.
    ///
    /// Boundary condition: an entry exactly `window * 1000` ms old is still
    /// fresh; one millisecond older is a miss.
    pub fn is_fresh_at(&self, now: i64, base_expiry: u64) -> bool {
        let window = self.expiry.unwrap_or(base_expiry);
        self.age_ms(now) <= secs_to_ms(window)
    }

    // == Encoding ==
    /// Encodes the entry for a store.
    pub fn to_stored(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Decodes an entry read from a store.
    pub fn from_stored(raw: Value) -> Result<Self> {
        Ok(serde_json::from_value(raw)?)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn secs_to_ms(secs: u64) -> i64 {
    i64::try_from(secs.saturating_mul(1000)).unwrap_or(i64::MAX)
}

//! Cache Module
//!
//! Memoization of async functions: key derivation, the hit/miss/expiry
//! decision, stale-data failover and call statistics.

mod entry;
mod key;
mod manager;
mod stats;
mod wrapped;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use key::{derive_key, fingerprint, KeyGenerator, EXPLICIT_KEY_FIELD, MAX_KEY_DEPTH};
pub use manager::CacheManager;
pub use stats::{CacheStats, StatsSnapshot};
pub use wrapped::{CallArg, Callback, ComputeResult, WrappedFunction};

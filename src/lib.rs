//! scache - Memoizing cache layer for async lookups
//!
//! Wraps async functions so calls are answered from a store while fresh,
//! recomputed when stale, and served from stale data when recomputation
//! fails and failover is enabled.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{
    CacheManager, CallArg, ComputeResult, KeyGenerator, StatsSnapshot, WrappedFunction,
};
pub use config::{CacheConfig, Config, RedisConfig, ResetConfig, StoreConfig};
pub use error::{CacheError, ComputeError};
pub use store::{LocalStore, Store};
pub use tasks::spawn_reset_task;

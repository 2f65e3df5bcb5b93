//! Store Module
//!
//! The key-value backends a cache manager reads from and writes to.
//!
//! # Backends
//! - `LocalStore` - bounded in-process store with LRU eviction
//! - `RedisStore` - remote store (cargo feature `redis`)

mod local;
mod lru;
#[cfg(feature = "redis")]
mod remote;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::config::StoreConfig;
use crate::error::{CacheError, Result};

pub use local::LocalStore;
use lru::LruTracker;
#[cfg(feature = "redis")]
pub use remote::RedisStore;

// == Store Trait ==
/// Minimal async key-value interface consumed by the cache manager.
#[async_trait]
pub trait Store: Send + Sync + fmt::Debug {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Looks up a key. Absent keys are `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores a value, replacing any previous one.
    async fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Drops every entry this store owns.
    async fn clear(&self) -> Result<()>;
}

// == Build Store ==
/// Constructs the store selected by `config`.
///
/// Fails with [`CacheError::Configuration`] when the selection cannot yield
/// a usable store.
pub async fn build_store(config: &StoreConfig) -> Result<Arc<dyn Store>> {
    match config {
        StoreConfig::Local {
            max_entries,
            max_age,
        } => {
            if *max_entries == 0 {
                return Err(CacheError::Configuration(
                    "local store needs a capacity of at least one entry".to_string(),
                ));
            }
            info!(
                "creating a local cache store: max_entries={}, max_age={:?}",
                max_entries, max_age
            );
            Ok(Arc::new(LocalStore::new(*max_entries, *max_age)))
        }
        #[cfg(feature = "redis")]
        StoreConfig::Redis(redis) => {
            info!("creating a redis cache store at {}", redis.url);
            Ok(Arc::new(RedisStore::connect(redis).await?))
        }
        #[cfg(not(feature = "redis"))]
        StoreConfig::Redis(_) => Err(CacheError::Configuration(
            "redis store requested but the `redis` feature is disabled".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_build_local_store() {
        let store = build_store(&StoreConfig::default()).await.unwrap();
        assert_eq!(store.backend(), "local");

        store.set("k", json!(1)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn test_zero_capacity_is_configuration_error() {
        let config = StoreConfig::Local {
            max_entries: 0,
            max_age: None,
        };
        let result = build_store(&config).await;
        assert!(matches!(result, Err(CacheError::Configuration(_))));
    }

    #[cfg(not(feature = "redis"))]
    #[tokio::test]
    async fn test_redis_without_feature_is_configuration_error() {
        let config = StoreConfig::Redis(crate::config::RedisConfig {
            url: "redis://127.0.0.1:6379".to_string(),
            namespace: "scache".to_string(),
            ttl: None,
        });
        let result = build_store(&config).await;
        assert!(matches!(result, Err(CacheError::Configuration(_))));
    }
}

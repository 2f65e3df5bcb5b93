//! Redis Store Module
//!
//! Remote store keeping JSON-encoded entries in Redis under a namespace.

use std::fmt;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde_json::Value;
use tracing::debug;

use super::Store;
use crate::config::RedisConfig;
use crate::error::{CacheError, Result};

// == Redis Store ==
/// Store backed by a Redis server.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    namespace: String,
    ttl: Option<u64>,
}

impl RedisStore {
    // == Connect ==
    /// Opens a managed connection to the configured server.
    ///
    /// An unparsable URL or an unreachable server is a configuration error.
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| CacheError::Configuration(format!("invalid redis url: {}", e)))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Configuration(format!("redis unreachable: {}", e)))?;

        Ok(Self {
            conn,
            namespace: config.namespace.clone(),
            ttl: config.ttl,
        })
    }

    fn namespaced(&self, key: &str) -> String {
        namespaced_key(&self.namespace, key)
    }
}

/// Redis key for `key` under `namespace`.
fn namespaced_key(namespace: &str, key: &str) -> String {
    format!("{}:{}", namespace, key)
}

/// Pattern matching every key under `namespace`.
fn namespace_pattern(namespace: &str) -> String {
    format!("{}:*", namespace)
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("namespace", &self.namespace)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Store for RedisStore {
    fn backend(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(self.namespaced(key)).await?;

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(&value)?;
        let key = self.namespaced(key);

        match self.ttl {
            Some(ttl) => conn.set_ex::<_, _, ()>(key, payload, ttl).await?,
            None => conn.set::<_, _, ()>(key, payload).await?,
        }
        Ok(())
    }

    /// Deletes every key under the namespace.
    async fn clear(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.keys(namespace_pattern(&self.namespace)).await?;

        debug!("redis store clearing {} keys", keys.len());
        if !keys.is_empty() {
            conn.del::<_, ()>(keys).await?;
        }
        Ok(())
    }
}

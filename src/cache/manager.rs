//! Cache Manager Module
//!
//! Owns the store, the expiry settings and the statistics, and decides how a
//! wrapped function's outcome is persisted: fresh results are saved, failures
//! fall back to stale data when failover is enabled.

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::wrapped::{ComputeFn, ComputeResult, WrappedFunction};
use super::{current_timestamp_ms, CacheEntry, CacheStats, KeyGenerator, StatsSnapshot};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::store::{build_store, Store};

// == Cache Manager ==
/// Produces cache-aware versions of async functions.
///
/// Cloning is cheap; clones share the store and the statistics.
#[derive(Debug, Clone)]
pub struct CacheManager {
    inner: Arc<ManagerInner>,
}

#[derive(Debug)]
struct ManagerInner {
    store: Arc<dyn Store>,
    /// Base freshness window in seconds
    expiry: u64,
    /// Window granted to stale data on failure, 0 = disabled
    failover_expiry: u64,
    keys: KeyGenerator,
    stats: CacheStats,
}

impl CacheManager {
    // == Constructor ==
    /// Creates a manager with the store selected by `config`.
    ///
    /// Fails with a configuration error when no usable store can be built.
    pub async fn create(config: &CacheConfig) -> Result<Self> {
        let store = build_store(&config.store).await?;
        Ok(Self::with_store(store, config))
    }

    /// Creates a manager around an already constructed store. The store
    /// selection in `config` is ignored.
    pub fn with_store(store: Arc<dyn Store>, config: &CacheConfig) -> Self {
        let expiry = config.effective_expiry();
        info!(
            "cache manager ready: store={}, expiry={}s, failover_expiry={}s",
            store.backend(),
            expiry,
            config.failover_expiry
        );

        Self {
            inner: Arc::new(ManagerInner {
                store,
                expiry,
                failover_expiry: config.failover_expiry,
                keys: KeyGenerator::new(config.hash),
                stats: CacheStats::new(),
            }),
        }
    }

    // == Wrap ==
    /// Wraps `f` so calls consult the cache first.
    ///
    /// `name` is part of every derived key. It must be unique per logical
    /// operation: two wrappers sharing a name and a store share entries.
    pub fn wrap<F, Fut>(&self, name: impl Into<String>, f: F) -> WrappedFunction
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ComputeResult> + Send + 'static,
    {
        let name: Arc<str> = Arc::from(name.into());
        debug!("wrapping function {}", name);

        let compute: Arc<ComputeFn> = Arc::new(move |args: Vec<Value>| f(args).boxed());
        WrappedFunction::new(name, self.clone(), compute)
    }

    /// Wraps a function that needs a receiver. Every call gets the same
    /// `receiver`.
    pub fn wrap_bound<S, F, Fut>(
        &self,
        name: impl Into<String>,
        receiver: Arc<S>,
        f: F,
    ) -> WrappedFunction
    where
        S: Send + Sync + 'static,
        F: Fn(Arc<S>, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ComputeResult> + Send + 'static,
    {
        self.wrap(name, move |args| f(receiver.clone(), args))
    }

    // == Reset ==
    /// Clears the store and counts a reset.
    pub async fn reset(&self) -> Result<()> {
        self.inner.store.clear().await?;
        self.inner.stats.record_reset();
        info!("cache reset ({} store)", self.inner.store.backend());
        Ok(())
    }

    // == Accessors ==
    /// Snapshot of the hit/miss/reset counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    /// Base freshness window in seconds.
    pub fn expiry(&self) -> u64 {
        self.inner.expiry
    }

    /// Failover window in seconds, 0 when disabled.
    pub fn failover_expiry(&self) -> u64 {
        self.inner.failover_expiry
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.inner.store
    }

    pub fn key_generator(&self) -> KeyGenerator {
        self.inner.keys
    }

    pub(crate) fn record_hit(&self) {
        self.inner.stats.record_hit();
    }

    pub(crate) fn record_miss(&self) {
        self.inner.stats.record_miss();
    }

    // == Read Path ==
    /// Reads and decodes the entry under `key`.
    ///
    /// Read errors and undecodable values count as absent.
    pub(crate) async fn lookup(&self, key: &str) -> Option<CacheEntry> {
        match self.inner.store.get(key).await {
            Ok(Some(raw)) => match CacheEntry::from_stored(raw) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("ignoring undecodable cache entry {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!("cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    // == Write / Failover Path ==
    /// Persists or substitutes the outcome of a wrapped function.
    ///
    /// `stale` is whatever entry the read path found, fresh or not.
    pub(crate) async fn settle(
        &self,
        key: &str,
        stale: Option<CacheEntry>,
        outcome: ComputeResult,
    ) -> ComputeResult {
        let failure = match outcome {
            Ok(Some(value)) if !value.is_null() => {
                debug!("saving key {}", key);
                self.persist(key, &CacheEntry::new(value.clone())).await;
                return Ok(Some(value));
            }
            Ok(_) => None,
            Err(err) if err.is_cache_domain() => {
                debug!("skipping from cache, overwriting error: {}", err);
                None
            }
            Err(err) => Some(err),
        };

        if let Some(value) = self.failover(key, stale).await {
            return Ok(Some(value));
        }

        match failure {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }

    async fn failover(&self, key: &str, stale: Option<CacheEntry>) -> Option<Value> {
        let failover_expiry = self.inner.failover_expiry;
        if failover_expiry == 0 {
            return None;
        }

        let entry = stale?.promote(current_timestamp_ms(), failover_expiry);
        warn!(
            "serving stale entry for {} with failover expiry {}s",
            key, failover_expiry
        );
        self.persist(key, &entry).await;
        Some(entry.value)
    }

    /// Best-effort write; failures are logged and dropped.
    async fn persist(&self, key: &str, entry: &CacheEntry) {
        let stored = match entry.to_stored() {
            Ok(stored) => stored,
            Err(e) => {
                warn!("failed to encode cache entry {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.inner.store.set(key, stored).await {
            warn!("failed to save key {}: {}", key, e);
        }
    }
}

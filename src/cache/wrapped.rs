//! Wrapped Function Module
//!
//! The cache-aware handle returned by [`CacheManager::wrap`]. A call derives
//! its key, reads the store once, and either answers from the cache or runs
//! the original function and hands its outcome to the manager.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{current_timestamp_ms, CacheManager};
use crate::error::{CacheError, ComputeError, Result};

/// Outcome of a wrapped function, as delivered to callers.
pub type ComputeResult = std::result::Result<Option<Value>, ComputeError>;

/// Completion callback for the callback-style surface.
pub type Callback = Box<dyn FnOnce(ComputeResult) + Send + 'static>;

pub(crate) type ComputeFn = dyn Fn(Vec<Value>) -> BoxFuture<'static, ComputeResult> + Send + Sync;

// == Call Argument ==
/// One positional argument of a dynamic call through [`WrappedFunction::apply`].
pub enum CallArg {
    Value(Value),
    Callback(Callback),
}

impl CallArg {
    /// Boxes a completion callback.
    pub fn callback<C>(callback: C) -> Self
    where
        C: FnOnce(ComputeResult) + Send + 'static,
    {
        CallArg::Callback(Box::new(callback))
    }
}

impl From<Value> for CallArg {
    fn from(value: Value) -> Self {
        CallArg::Value(value)
    }
}

impl fmt::Debug for CallArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallArg::Value(value) => f.debug_tuple("Value").field(value).finish(),
            CallArg::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

// == Wrapped Function ==
/// Cache-aware version of an async function.
///
/// Bound for its whole lifetime to one manager, one original function and
/// one set of skipped argument positions.
#[derive(Clone)]
pub struct WrappedFunction {
    name: Arc<str>,
    manager: CacheManager,
    compute: Arc<ComputeFn>,
    skip_args: Arc<[usize]>,
}

impl WrappedFunction {
    pub(crate) fn new(name: Arc<str>, manager: CacheManager, compute: Arc<ComputeFn>) -> Self {
        Self {
            name,
            manager,
            compute,
            skip_args: Arc::from(Vec::new()),
        }
    }

    /// Excludes the given argument positions from key derivation. The
    /// original function still receives every argument.
    pub fn skip_args(mut self, indices: impl IntoIterator<Item = usize>) -> Self {
        self.skip_args = indices.into_iter().collect();
        self
    }

    /// Label used in every derived key.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manager(&self) -> &CacheManager {
        &self.manager
    }

    /// Key a call with `args` reads and writes.
    pub fn cache_key(&self, args: &[Value]) -> String {
        self.manager
            .key_generator()
            .key_for(&self.name, args, &self.skip_args)
    }

    // == Call ==
    /// Answers from the cache when a fresh entry exists, otherwise runs the
    /// original function and settles its outcome.
    ///
    /// Performs at most one store read and one store write, in that order.
    pub async fn call(&self, args: Vec<Value>) -> ComputeResult {
        let key = self.cache_key(&args);
        debug!("fetching from cache {} ({})", key, self.name);

        let cached = self.manager.lookup(&key).await;
        match cached {
            Some(entry) if entry.is_fresh_at(current_timestamp_ms(), self.manager.expiry()) => {
                debug!("cache hit {}", key);
                self.manager.record_hit();
                Ok(Some(entry.value))
            }
            stale => {
                debug!("cache miss {}", key);
                self.manager.record_miss();
                let outcome = (self.compute)(args).await;
                self.manager.settle(&key, stale, outcome).await
            }
        }
    }

    // == Call With Callback ==
    /// Runs [`call`](Self::call) on a spawned task and hands the outcome to
    /// `callback` exactly once.
    ///
    /// The callback never runs before this method returns, on hits and
    /// misses alike.
    pub fn call_with<C>(&self, args: Vec<Value>, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(ComputeResult) + Send + 'static,
    {
        let wrapped = self.clone();
        tokio::spawn(async move {
            let outcome = wrapped.call(args).await;
            callback(outcome);
        })
    }

    // == Apply ==
    /// Dynamic callback-style call: the last argument must be a callback.
    ///
    /// A missing trailing callback, or a callback anywhere else, fails with
    /// [`CacheError::Usage`] before the store is touched.
    pub fn apply(&self, mut args: Vec<CallArg>) -> Result<JoinHandle<()>> {
        let callback = match args.pop() {
            Some(CallArg::Callback(callback)) => callback,
            _ => {
                return Err(CacheError::Usage(format!(
                    "last argument to {} should be a callback",
                    self.name
                )))
            }
        };

        let values = args
            .into_iter()
            .map(|arg| match arg {
                CallArg::Value(value) => Ok(value),
                CallArg::Callback(_) => Err(CacheError::Usage(format!(
                    "only the last argument to {} may be a callback",
                    self.name
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(self.call_with(values, callback))
    }
}

impl fmt::Debug for WrappedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrappedFunction")
            .field("name", &self.name)
            .field("skip_args", &self.skip_args)
            .finish_non_exhaustive()
    }
}

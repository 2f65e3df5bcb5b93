//! Cache Reset Task
//!
//! Background task that periodically clears a manager's store.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::CacheManager;
use crate::config::ResetConfig;

/// Spawns a background task that resets the cache on a schedule.
///
/// The first reset happens after `first_reset_ms` (or one interval when
/// unset), then every `interval_ms`. A failed reset is logged and the task
/// keeps its schedule.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let manager = CacheManager::create(&config).await?;
/// let schedule = ResetConfig { interval_ms: 10_000, first_reset_ms: Some(1_000) };
/// let handle = spawn_reset_task(manager.clone(), schedule);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_reset_task(manager: CacheManager, schedule: ResetConfig) -> JoinHandle<()> {
    let interval = Duration::from_millis(schedule.interval_ms.max(1));
    let first = schedule
        .first_reset_ms
        .map(Duration::from_millis)
        .unwrap_or(interval);

    tokio::spawn(async move {
        info!(
            "Starting cache reset task: first reset in {:?}, then every {:?}",
            first, interval
        );

        tokio::time::sleep(first).await;
        loop {
            if let Err(e) = manager.reset().await {
                warn!("Cache reset failed: {}", e);
            }

            tokio::time::sleep(interval).await;
        }
    })
}

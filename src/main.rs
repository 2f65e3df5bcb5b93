//! scache demo service
//!
//! Serves a slow upstream quote lookup through a memoizing cache manager.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use serde_json::{json, Value};
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scache::api::create_router;
use scache::{spawn_reset_task, AppState, CacheManager, ComputeError, ComputeResult, Config};

/// Simulated latency of the upstream service.
const UPSTREAM_LATENCY: Duration = Duration::from_millis(250);

/// Main entry point for the demo service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache manager and its store
/// 4. Start the periodic reset task when configured
/// 5. Wrap the upstream lookup and build the router
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting scache demo service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: expiry={}s, failover_expiry={}s, port={}",
        config.cache.effective_expiry(),
        config.cache.failover_expiry,
        config.server_port
    );

    let manager = CacheManager::create(&config.cache)
        .await
        .context("failed to create cache manager")?;

    let reset_handle = config
        .cache
        .reset
        .map(|schedule| spawn_reset_task(manager.clone(), schedule));

    // Argument 1 is the caller's request id; it must not split the cache
    let lookup = manager.wrap("quote_lookup", quote_lookup).skip_args([1]);
    let app = create_router(AppState::new(manager, lookup));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(reset_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Stand-in for an expensive upstream call: `(symbol, request_id)` to a quote.
///
/// The symbol `DOWN` simulates an upstream outage.
async fn quote_lookup(args: Vec<Value>) -> ComputeResult {
    let symbol = match args.first().and_then(Value::as_str) {
        Some(symbol) if !symbol.is_empty() => symbol.to_uppercase(),
        _ => return Ok(None),
    };
    debug!("upstream lookup for {} (request {:?})", symbol, args.get(1));

    tokio::time::sleep(UPSTREAM_LATENCY).await;

    if symbol == "DOWN" {
        return Err(ComputeError::failed("upstream quote service unavailable"));
    }

    let cents = symbol
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)))
        % 100_000;

    Ok(Some(json!({
        "symbol": symbol,
        "price": cents as f64 / 100.0,
        "fetched_at": chrono::Utc::now().to_rfc3339(),
    })))
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the reset task and allows graceful shutdown.
async fn shutdown_signal(reset_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = reset_handle {
        handle.abort();
        warn!("Reset task aborted");
    }
}

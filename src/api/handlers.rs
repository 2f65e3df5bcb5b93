//! API Handlers
//!
//! HTTP request handlers for each demo service endpoint.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::cache::{CacheManager, WrappedFunction};
use crate::error::{CacheError, Result};
use crate::models::{HealthResponse, LookupQuery, LookupResponse, ResetResponse, StatsResponse};

/// Application state shared across all handlers.
///
/// Holds the manager and the memoized upstream lookup. The lookup takes
/// `(id, request_id)` and is expected to skip argument 1 when deriving keys.
#[derive(Clone)]
pub struct AppState {
    /// Cache manager owning the store and statistics
    pub manager: CacheManager,
    /// Memoized upstream lookup
    pub lookup: WrappedFunction,
}

impl AppState {
    /// Creates a new AppState.
    pub fn new(manager: CacheManager, lookup: WrappedFunction) -> Self {
        Self { manager, lookup }
    }
}

/// Handler for GET /lookup/:id
///
/// Runs the memoized lookup. Empty results map to 404, failed lookups
/// without stale data to 502.
pub async fn lookup_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<LookupResponse>> {
    let request_id = query.request_id.map(Value::String).unwrap_or(Value::Null);

    match state
        .lookup
        .call(vec![Value::String(id.clone()), request_id])
        .await?
    {
        Some(value) => Ok(Json(LookupResponse::new(id, value))),
        None => Err(CacheError::NotFound(id)),
    }
}

/// Handler for GET /stats
///
/// Returns the manager's hit/miss/reset counters.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.manager.stats()))
}

/// Handler for POST /reset
///
/// Clears the cache immediately.
pub async fn reset_handler(State(state): State<AppState>) -> Result<Json<ResetResponse>> {
    state.manager.reset().await?;
    Ok(Json(ResetResponse::new(state.manager.stats().reset)))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the cache layer and the demo service.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Malformed call of a wrapped function
    #[error("Usage error: {0}")]
    Usage(String),

    /// No usable store could be constructed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Store backend failure
    #[error("Store error: {0}")]
    Store(String),

    /// Entry could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Redis backend failure
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Lookup produced no value
    #[error("Not found: {0}")]
    NotFound(String),

    /// Wrapped function failed and no stale data was available
    #[error("Compute error: {0}")]
    Compute(#[from] ComputeError),
}

// == Compute Error Enum ==
/// Error returned by a wrapped function.
#[derive(Error, Debug)]
pub enum ComputeError {
    /// Failure the cache should treat as irrelevant. Never forwarded to the
    /// caller; stale data is served when failover allows it.
    #[error("cache-irrelevant failure: {0}")]
    CacheDomain(String),

    /// Any other failure. Forwarded verbatim unless failover serves stale data.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl ComputeError {
    /// Creates a cache-domain error.
    pub fn cache_domain(reason: impl Into<String>) -> Self {
        ComputeError::CacheDomain(reason.into())
    }

    /// Creates an ordinary compute failure from a message.
    pub fn failed(message: impl Into<String>) -> Self {
        ComputeError::Failed(anyhow::anyhow!(message.into()))
    }

    /// Returns true for errors the cache swallows.
    pub fn is_cache_domain(&self) -> bool {
        matches!(self, ComputeError::CacheDomain(_))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Usage(_) => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Compute(_) => StatusCode::BAD_GATEWAY,
            CacheError::Store(_) | CacheError::Serialization(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            #[cfg(feature = "redis")]
            CacheError::Redis(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache layer.
pub type Result<T> = std::result::Result<T, CacheError>;

//! Response DTOs for the demo service
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::StatsSnapshot;

/// Response body for GET /lookup/:id
#[derive(Debug, Clone, Serialize)]
pub struct LookupResponse {
    /// The requested id
    pub key: String,
    /// The (possibly cached) lookup result
    pub value: Value,
}

impl LookupResponse {
    /// Creates a new LookupResponse
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Calls answered from the cache
    pub hit: u64,
    /// Calls that ran the upstream lookup
    pub miss: u64,
    /// Cache resets
    pub reset: u64,
    /// Hit rate (hit / (hit + miss))
    pub hit_rate: f64,
}

impl From<StatsSnapshot> for StatsResponse {
    fn from(stats: StatsSnapshot) -> Self {
        Self {
            hit: stats.hit,
            miss: stats.miss,
            reset: stats.reset,
            hit_rate: stats.hit_rate(),
        }
    }
}

/// Response body for POST /reset
#[derive(Debug, Clone, Serialize)]
pub struct ResetResponse {
    /// Success message
    pub message: String,
    /// Total resets so far
    pub reset: u64,
}

impl ResetResponse {
    /// Creates a new ResetResponse
    pub fn new(reset: u64) -> Self {
        Self {
            message: "Cache reset successfully".to_string(),
            reset,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

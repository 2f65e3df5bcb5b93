//! Request DTOs for the demo service
//!
//! Defines the structure of incoming query parameters.

use serde::Deserialize;

/// Query parameters for GET /lookup/:id
///
/// # Fields
/// - `request_id`: Caller-supplied correlation id. Passed to the upstream
///   lookup but excluded from the cache key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupQuery {
    #[serde(default)]
    pub request_id: Option<String>,
}

//! API Module
//!
//! HTTP handlers and routing for the demo service.
//!
//! # Endpoints
//! - `GET /lookup/:id` - Memoized upstream lookup
//! - `GET /stats` - Cache statistics
//! - `POST /reset` - Clear the cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;

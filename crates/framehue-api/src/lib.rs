//! Axum HTTP API server.
//!
//! This crate provides:
//! - Synchronous color extraction over HTTP
//! - Cache statistics, clearing and targeted invalidation
//! - Security headers, request IDs and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;

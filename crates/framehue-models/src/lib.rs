//! Shared data models for the framehue color extraction service.
//!
//! This crate provides Serde-serializable types for:
//! - Extraction requests and their validation
//! - Colors and per-timestamp results
//! - Batch messages and partial-failure reports
//! - Cache and health status payloads

pub mod batch;
pub mod color;
pub mod request;
pub mod response;
pub mod status;

// Re-export common types
pub use batch::{BatchEvent, BatchItemFailure, BatchMessage, BatchReport, SqsBatchResponse};
pub use color::{ColorParseError, Rgb};
pub use request::{
    ensure_within_duration, percentage_to_timestamp, ExtractionRequest, RequestError,
    RequestResult, SamplePlan, MAX_LOCATOR_LENGTH, MAX_SAMPLES,
};
pub use response::{ColorResult, ExtractionResponse};
pub use status::{CacheStats, HealthStatus};

//! Color extraction core.
//!
//! This crate provides:
//! - Request orchestration with all-or-nothing results
//! - A bounded, FIFO work queue with per-task timeouts
//! - A TTL result cache for durations and frame colors
//! - Sequential batch processing with per-message failure reporting

pub mod batch;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod service;
pub mod task;
pub mod work_queue;

pub use batch::BatchProcessor;
pub use cache::{CacheConfig, CacheKey, CacheValue, ResultCache};
pub use config::WorkerConfig;
pub use error::{ExtractionError, ExtractionResult};
pub use logging::ExtractionLogger;
pub use service::ColorExtractionService;
pub use task::FrameColorTask;
pub use work_queue::{TaskError, TaskHandle, WorkQueue};

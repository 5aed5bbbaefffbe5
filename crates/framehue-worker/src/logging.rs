//! Structured extraction logging utilities.
//!
//! Provides consistent, structured logging for extraction requests and batch
//! messages with tracing spans and contextual information.

use tracing::{error, info, warn, Span};
use uuid::Uuid;

/// Request logger for structured logging with consistent formatting.
///
/// Every line carries the request ID and operation type.
#[derive(Debug, Clone)]
pub struct ExtractionLogger {
    request_id: String,
    operation: String,
}

impl ExtractionLogger {
    /// Create a logger with a freshly generated request ID.
    ///
    /// # Arguments
    /// * `operation` - The type of operation (e.g., "extract_colors", "batch_message")
    pub fn new(operation: &str) -> Self {
        Self::with_id(&Uuid::new_v4().to_string(), operation)
    }

    /// Create a logger for an existing request or message ID.
    pub fn with_id(request_id: &str, operation: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Extraction started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Extraction progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Extraction warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Extraction error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Extraction completed: {}", message
        );
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this request.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "extraction",
            request_id = %self.request_id,
            operation = %self.operation
        )
    }
}

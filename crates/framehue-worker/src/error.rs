//! Extraction error types.

use std::time::Duration;

use framehue_media::{MediaError, SourceErrorKind};
use framehue_models::RequestError;
use thiserror::Error;

use crate::work_queue::TaskError;

pub type ExtractionResult<T> = Result<T, ExtractionError>;

#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Malformed or contradictory request, including timestamps past the end.
    #[error(transparent)]
    Validation(#[from] RequestError),

    #[error("Failed to resolve video duration: {source}")]
    DurationResolution {
        locator: String,
        kind: SourceErrorKind,
        source: MediaError,
    },

    #[error("Failed to process timestamp {timestamp}ms: {source}")]
    FrameExtraction {
        locator: String,
        timestamp: u64,
        source: MediaError,
    },

    #[error("Failed to process timestamp {timestamp}ms: timed out after {}ms", .after.as_millis())]
    Timeout {
        locator: String,
        timestamp: u64,
        after: Duration,
    },

    #[error("Failed to process timestamp {timestamp}ms: task aborted before completion")]
    TaskAborted { locator: String, timestamp: u64 },

    #[error("Failed to parse message body: {0}")]
    TransportParse(#[from] serde_json::Error),
}

impl ExtractionError {
    pub fn duration_resolution(locator: impl Into<String>, source: MediaError) -> Self {
        Self::DurationResolution {
            locator: locator.into(),
            kind: source.kind(),
            source,
        }
    }

    /// Map a settled task outcome to the error for its timestamp.
    pub fn from_task(locator: &str, timestamp: u64, err: TaskError<MediaError>) -> Self {
        let locator = locator.to_string();
        match err {
            TaskError::Failed(source) => Self::FrameExtraction {
                locator,
                timestamp,
                source,
            },
            TaskError::Timeout(after) => Self::Timeout {
                locator,
                timestamp,
                after,
            },
            TaskError::Aborted => Self::TaskAborted { locator, timestamp },
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::DurationResolution { .. } => "DURATION_RESOLUTION_ERROR",
            Self::FrameExtraction { .. } | Self::TaskAborted { .. } => "FRAME_EXTRACTION_ERROR",
            Self::Timeout { .. } => "TIMEOUT_ERROR",
            Self::TransportParse(_) => "TRANSPORT_PARSE_ERROR",
        }
    }

    /// Source classification, when the failure came from the frame source.
    pub fn source_kind(&self) -> Option<SourceErrorKind> {
        match self {
            Self::DurationResolution { kind, .. } => Some(*kind),
            Self::FrameExtraction { source, .. } => Some(source.kind()),
            _ => None,
        }
    }

    /// Timestamp of the failed task, for per-timestamp errors.
    pub fn timestamp(&self) -> Option<u64> {
        match self {
            Self::FrameExtraction { timestamp, .. }
            | Self::Timeout { timestamp, .. }
            | Self::TaskAborted { timestamp, .. } => Some(*timestamp),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

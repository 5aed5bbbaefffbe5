//! Error types for media operations.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Classification of a failure to read from a video source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceErrorKind {
    NotFound,
    AccessDenied,
    Unreachable,
    Malformed,
    Unknown,
}

impl SourceErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AccessDenied => "access_denied",
            Self::Unreachable => "unreachable",
            Self::Malformed => "malformed",
            Self::Unknown => "unknown",
        }
    }

    /// Caller-facing hint for this kind of failure.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::NotFound => {
                "Video file not found (404). The URL does not point to an existing file. \
                 Please verify the URL is correct."
            }
            Self::AccessDenied => {
                "Access denied (403). The video exists but is not publicly accessible. \
                 For object storage URLs, ensure the object is publicly readable or use a pre-signed URL."
            }
            Self::Unreachable => {
                "Connection failed or timed out. Please verify the URL is accessible and check your network."
            }
            Self::Malformed => {
                "Invalid video format or corrupted file. Ensure the URL points to a valid video."
            }
            Self::Unknown => "Failed to process video.",
        }
    }
}

impl fmt::Display for SourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("{}", .kind.hint())]
    Source {
        kind: SourceErrorKind,
        detail: String,
    },

    #[error("Invalid video URL: {0}")]
    InvalidLocator(String),

    #[error("Invalid video file: {0}")]
    InvalidVideo(String),

    #[error("Failed to decode frame: {0}")]
    ImageDecode(#[from] image::ImageError),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a classified source error.
    pub fn classified(kind: SourceErrorKind, detail: impl Into<String>) -> Self {
        Self::Source {
            kind,
            detail: detail.into(),
        }
    }

    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an FFprobe failure error.
    pub fn ffprobe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::FfprobeFailed {
            message: message.into(),
            stderr,
        }
    }

    /// Create an invalid locator error.
    pub fn invalid_locator(message: impl Into<String>) -> Self {
        Self::InvalidLocator(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Structured classification of this error.
    pub fn kind(&self) -> SourceErrorKind {
        match self {
            Self::Source { kind, .. } => *kind,
            Self::InvalidLocator(_)
            | Self::InvalidVideo(_)
            | Self::FfprobeFailed { .. }
            | Self::ImageDecode(_)
            | Self::JsonParse(_) => SourceErrorKind::Malformed,
            Self::Timeout(_) => SourceErrorKind::Unreachable,
            _ => SourceErrorKind::Unknown,
        }
    }
}

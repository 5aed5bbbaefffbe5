//! Collaborator seams used by the extraction core.

use async_trait::async_trait;
use framehue_models::{HealthStatus, Rgb};
use image::DynamicImage;

use crate::error::MediaResult;

/// Produces decoded frames and metadata for a video locator.
///
/// Failures carry a [`SourceErrorKind`](crate::SourceErrorKind) through
/// [`MediaError::kind`](crate::MediaError::kind).
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Video duration in whole milliseconds.
    async fn duration_ms(&self, locator: &str) -> MediaResult<u64>;

    /// Decode the frame shown at `timestamp_ms`.
    async fn capture_frame(&self, locator: &str, timestamp_ms: u64) -> MediaResult<DynamicImage>;

    /// Whether the source can currently serve requests.
    async fn health(&self) -> HealthStatus;
}

/// Reduces a frame to one representative color.
#[async_trait]
pub trait ColorEstimator: Send + Sync {
    async fn estimate(&self, frame: &DynamicImage) -> MediaResult<Rgb>;
}

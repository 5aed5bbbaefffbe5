//! Per-timestamp extraction unit.

use std::sync::Arc;

use framehue_media::{ColorEstimator, FrameSource, MediaResult};
use framehue_models::Rgb;
use tracing::debug;

use crate::cache::ResultCache;

/// Extracts the color of one frame, consulting the cache first.
///
/// Collaborator failures are returned as-is; there is no internal retry.
pub struct FrameColorTask {
    pub source: Arc<dyn FrameSource>,
    pub estimator: Arc<dyn ColorEstimator>,
    pub cache: Arc<ResultCache>,
    pub locator: String,
    pub timestamp: u64,
}

impl FrameColorTask {
    pub async fn run(self) -> MediaResult<Rgb> {
        if let Some(color) = self.cache.get_color(&self.locator, self.timestamp) {
            debug!(locator = %self.locator, timestamp_ms = self.timestamp, "Color cache hit");
            return Ok(color);
        }

        let frame = self
            .source
            .capture_frame(&self.locator, self.timestamp)
            .await?;
        let color = self.estimator.estimate(&frame).await?;

        self.cache.set_color(&self.locator, self.timestamp, color);
        debug!(
            locator = %self.locator,
            timestamp_ms = self.timestamp,
            color = %color,
            "Extracted frame color"
        );

        Ok(color)
    }
}

//! Application state.

use std::sync::Arc;

use framehue_media::{FfmpegFrameSource, FfmpegSourceConfig, MediaResult};
use framehue_worker::{ColorExtractionService, WorkerConfig};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub service: ColorExtractionService,
}

impl AppState {
    pub fn new(config: ApiConfig, service: ColorExtractionService) -> Self {
        Self { config, service }
    }

    /// Build state backed by FFmpeg, reading worker settings from the environment.
    pub fn from_env(config: ApiConfig) -> MediaResult<Self> {
        let worker_config = WorkerConfig::from_env();
        let source = FfmpegFrameSource::new(FfmpegSourceConfig::from_env())?;
        let service = ColorExtractionService::from_config(&worker_config, Arc::new(source));

        Ok(Self::new(config, service))
    }
}

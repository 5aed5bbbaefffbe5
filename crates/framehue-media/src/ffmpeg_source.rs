//! FFmpeg-backed frame source.

use std::time::Duration;

use async_trait::async_trait;
use framehue_models::HealthStatus;
use image::DynamicImage;
use tracing::{debug, info};

use crate::command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::locator::screen_locator;
use crate::preflight::SourcePreflight;
use crate::probe::probe_duration_ms;
use crate::source::FrameSource;

/// Frame source configuration.
#[derive(Debug, Clone)]
pub struct FfmpegSourceConfig {
    /// Width frames are scaled to before color estimation
    pub scale_width: u32,
    /// JPEG quality scale for captured frames
    pub jpeg_quality: u8,
    /// Hard limit on a single FFmpeg/FFprobe invocation
    pub process_timeout: Option<Duration>,
    /// Issue a HEAD request before probing
    pub preflight: bool,
    pub preflight_timeout: Duration,
    /// Refuse locators that do not look like video files or storage URLs
    pub screen_locators: bool,
}

impl Default for FfmpegSourceConfig {
    fn default() -> Self {
        Self {
            scale_width: 200,
            jpeg_quality: 3,
            process_timeout: None,
            preflight: true,
            preflight_timeout: Duration::from_secs(10),
            screen_locators: true,
        }
    }
}

impl FfmpegSourceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            scale_width: std::env::var("FRAME_SCALE_WIDTH")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|w| *w > 0)
                .unwrap_or(defaults.scale_width),
            jpeg_quality: defaults.jpeg_quality,
            process_timeout: std::env::var("FFMPEG_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs),
            preflight: std::env::var("SOURCE_PREFLIGHT")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.preflight),
            preflight_timeout: std::env::var("SOURCE_PREFLIGHT_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.preflight_timeout),
            screen_locators: std::env::var("SCREEN_LOCATORS")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.screen_locators),
        }
    }
}

/// Captures frames with the `ffmpeg` CLI and probes with `ffprobe`.
///
/// Each capture writes into its own temporary directory, removed when the
/// capture finishes, fails, or is dropped by a timeout.
pub struct FfmpegFrameSource {
    config: FfmpegSourceConfig,
    preflight: Option<SourcePreflight>,
}

impl FfmpegFrameSource {
    pub fn new(config: FfmpegSourceConfig) -> MediaResult<Self> {
        let preflight = if config.preflight {
            Some(SourcePreflight::new(config.preflight_timeout)?)
        } else {
            None
        };
        Ok(Self { config, preflight })
    }

    fn screen(&self, locator: &str) -> MediaResult<()> {
        if self.config.screen_locators {
            screen_locator(locator)?;
        }
        Ok(())
    }

    fn runner(&self) -> FfmpegRunner {
        match self.config.process_timeout {
            Some(limit) => FfmpegRunner::new().with_timeout(limit.as_secs().max(1)),
            None => FfmpegRunner::new(),
        }
    }

    /// Build the single-frame capture command.
    pub fn capture_command(
        &self,
        locator: &str,
        timestamp_ms: u64,
        output: &std::path::Path,
    ) -> FfmpegCommand {
        FfmpegCommand::new(locator, output)
            .seek(timestamp_ms as f64 / 1000.0)
            .auto_threads()
            .single_frame()
            .video_filter(format!("scale={}:-1", self.config.scale_width))
            .jpeg_quality(self.config.jpeg_quality)
            .format("image2")
            .log_level("error")
    }
}

#[async_trait]
impl FrameSource for FfmpegFrameSource {
    async fn duration_ms(&self, locator: &str) -> MediaResult<u64> {
        self.screen(locator)?;

        if let Some(preflight) = &self.preflight {
            preflight.check(locator).await?;
        }

        let duration = probe_duration_ms(locator, self.config.process_timeout).await?;
        debug!(locator = %locator, duration_ms = duration, "Resolved video duration");
        Ok(duration)
    }

    async fn capture_frame(&self, locator: &str, timestamp_ms: u64) -> MediaResult<DynamicImage> {
        self.screen(locator)?;

        let scratch = tempfile::Builder::new().prefix("framehue-").tempdir()?;
        let output = scratch.path().join("frame.jpg");

        let cmd = self.capture_command(locator, timestamp_ms, &output);
        self.runner().run(&cmd).await?;

        let bytes = tokio::fs::read(&output).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MediaError::InvalidVideo(format!("No frame decoded at {}ms", timestamp_ms))
            } else {
                MediaError::Io(e)
            }
        })?;

        let frame = image::load_from_memory(&bytes)?;
        debug!(
            locator = %locator,
            timestamp_ms,
            width = frame.width(),
            height = frame.height(),
            "Captured frame"
        );
        Ok(frame)
    }

    async fn health(&self) -> HealthStatus {
        match (check_ffmpeg(), check_ffprobe()) {
            (Ok(ffmpeg), Ok(_)) => {
                info!(path = %ffmpeg.display(), "FFmpeg available");
                HealthStatus::available("FFmpeg is available and working")
            }
            (Err(e), _) | (_, Err(e)) => HealthStatus::unavailable(format!("FFmpeg is not available: {}", e)),
        }
    }
}

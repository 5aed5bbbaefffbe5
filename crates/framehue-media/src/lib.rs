//! Frame capture and color estimation for framehue.
//!
//! This crate provides:
//! - The [`FrameSource`] and [`ColorEstimator`] seams used by the extraction core
//! - Type-safe FFmpeg command building and an FFprobe duration probe
//! - Locator screening and HTTP preflight classification
//! - Dominant and root-mean-square color estimators

pub mod color;
pub mod command;
pub mod error;
pub mod ffmpeg_source;
pub mod locator;
pub mod preflight;
pub mod probe;
pub mod source;

pub use color::{
    dominant_color, sqrt_average_color, AverageColorEstimator, ColorAlgorithm,
    DominantColorEstimator,
};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult, SourceErrorKind};
pub use ffmpeg_source::{FfmpegFrameSource, FfmpegSourceConfig};
pub use locator::screen_locator;
pub use preflight::SourcePreflight;
pub use probe::{parse_duration_ms, probe_duration_ms};
pub use source::{ColorEstimator, FrameSource};

// Re-exported so downstream crates and stubs share one `image` version.
pub use image;

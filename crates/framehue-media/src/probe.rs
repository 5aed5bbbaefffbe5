//! FFprobe duration lookup.

use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::command::{check_ffprobe, stderr_tail};
use crate::error::{MediaError, MediaResult};

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Probe a video for its duration in whole milliseconds.
pub async fn probe_duration_ms(locator: &str, timeout: Option<Duration>) -> MediaResult<u64> {
    check_ffprobe()?;

    debug!(locator = %locator, "Probing video duration");

    let child = Command::new("ffprobe")
        .args(["-v", "error", "-print_format", "json", "-show_format"])
        .arg(locator)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let output = match timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| MediaError::Timeout(limit.as_secs()))??,
        None => child.wait_with_output().await?,
    };

    if !output.status.success() {
        return Err(MediaError::ffprobe_failed(
            "FFprobe failed",
            Some(stderr_tail(&output.stderr)),
        ));
    }

    parse_duration_ms(&output.stdout)
}

/// Extract the duration from FFprobe JSON, as `floor(seconds * 1000)`.
///
/// A missing or zero duration is treated as an invalid video.
pub fn parse_duration_ms(json: &[u8]) -> MediaResult<u64> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;

    let seconds = probe
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|s| s.is_finite() && *s > 0.0)
        .ok_or_else(|| MediaError::InvalidVideo("Could not determine video duration".to_string()))?;

    Ok((seconds * 1000.0).floor() as u64)
}

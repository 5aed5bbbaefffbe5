//! Video locator screening.
//!
//! Locators handed to FFmpeg must be HTTP(S) URLs that either name a video
//! file or point at a known object storage / CDN host. Internal addresses and
//! cloud metadata endpoints are always refused.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;
use url::Url;

use crate::error::{MediaError, MediaResult};

/// Maximum URL length.
const MAX_URL_LENGTH: usize = 2048;

/// Extensions accepted as direct video links.
const VIDEO_EXTENSIONS: &[&str] = &[
    ".mp4", ".avi", ".mov", ".mkv", ".webm", ".flv", ".wmv", ".m4v", ".mpeg", ".mpg",
];

/// Host fragments of object storage and CDN providers.
const TRUSTED_HOST_FRAGMENTS: &[&str] = &[
    "s3.",
    "amazonaws.com",
    "cloudfront.net",
    "cdn.",
    "storage.googleapis.com",
    "blob.core.windows.net",
    "digitaloceanspaces.com",
];

/// Blocked URL patterns (internal networks, metadata endpoints).
static BLOCKED_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^https?://127\.",
        r"^https?://localhost",
        r"^https?://10\.",
        r"^https?://172\.(1[6-9]|2[0-9]|3[0-1])\.",
        r"^https?://192\.168\.",
        r"^https?://169\.254\.",
        r"^https?://\[::1\]",
        r"^https?://\[fd",
        r"^https?://\[fe80",
        r"^https?://metadata\.",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

const UNSUPPORTED_MESSAGE: &str = "Invalid video URL. Please provide a direct link to a video file \
     (e.g., .mp4, .avi, .mov) or an S3/CDN URL.";

/// Screen a locator before it reaches FFmpeg.
pub fn screen_locator(locator: &str) -> MediaResult<Url> {
    let locator = locator.trim();

    if locator.is_empty() {
        return Err(MediaError::invalid_locator("URL cannot be empty"));
    }
    if locator.len() > MAX_URL_LENGTH {
        return Err(MediaError::invalid_locator(format!(
            "URL exceeds maximum length of {} characters",
            MAX_URL_LENGTH
        )));
    }

    let parsed = Url::parse(locator)
        .map_err(|e| MediaError::invalid_locator(format!("Invalid URL format: {}", e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(MediaError::invalid_locator(format!(
                "Invalid protocol '{}'. Only HTTP and HTTPS are allowed.",
                scheme
            )))
        }
    }

    let lower = locator.to_lowercase();
    if BLOCKED_PATTERNS.iter().any(|p| p.is_match(&lower)) {
        warn!(locator = %locator, "Blocked URL pattern detected");
        return Err(MediaError::invalid_locator(
            "URL appears to target an internal or restricted endpoint",
        ));
    }

    let host = parsed.host_str().unwrap_or_default().to_lowercase();
    let has_video_extension = VIDEO_EXTENSIONS
        .iter()
        .any(|ext| parsed.path().to_lowercase().ends_with(ext));
    let trusted_host = TRUSTED_HOST_FRAGMENTS.iter().any(|f| host.contains(f));

    if has_video_extension || trusted_host {
        Ok(parsed)
    } else {
        Err(MediaError::invalid_locator(UNSUPPORTED_MESSAGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_video_links() {
        assert!(screen_locator("https://example.com/videos/clip.mp4").is_ok());
        assert!(screen_locator("https://example.com/videos/CLIP.MOV?sig=abc").is_ok());
        assert!(screen_locator("http://example.com/a.webm").is_ok());
    }

    #[test]
    fn test_trusted_hosts() {
        assert!(screen_locator("https://bucket.s3.amazonaws.com/object").is_ok());
        assert!(screen_locator("https://d111.cloudfront.net/asset").is_ok());
        assert!(screen_locator("https://acct.blob.core.windows.net/c/blob").is_ok());
    }

    #[test]
    fn test_rejected_locators() {
        assert!(screen_locator("").is_err());
        assert!(screen_locator("not a url").is_err());
        assert!(screen_locator("ftp://example.com/a.mp4").is_err());
        assert!(screen_locator("https://example.com/page.html").is_err());
        assert!(screen_locator("http://127.0.0.1/a.mp4").is_err());
        assert!(screen_locator("http://169.254.169.254/latest/meta-data.mp4").is_err());

        let long = format!("https://cdn.example.com/{}.mp4", "a".repeat(MAX_URL_LENGTH));
        assert!(screen_locator(&long).is_err());
    }
}

//! HTTP reachability check run before probing a remote video.
//!
//! FFmpeg reports network failures as free-form text. A `HEAD` request gives
//! the frame source a structured status to classify instead.

use std::time::Duration;

use reqwest::StatusCode;
use tracing::debug;

use crate::error::{MediaError, MediaResult, SourceErrorKind};

/// Map an HTTP status to a source failure, if it is one.
pub fn classify_status(status: StatusCode) -> Option<SourceErrorKind> {
    match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => Some(SourceErrorKind::NotFound),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Some(SourceErrorKind::AccessDenied),
        // Some origins reject HEAD; leave the verdict to the probe.
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => None,
        s if s.is_server_error() => Some(SourceErrorKind::Unreachable),
        _ => None,
    }
}

/// Classify a transport error from the HTTP client.
pub fn classify_transport(err: &reqwest::Error) -> SourceErrorKind {
    if err.is_connect() || err.is_timeout() {
        SourceErrorKind::Unreachable
    } else if err.is_builder() {
        SourceErrorKind::Malformed
    } else {
        SourceErrorKind::Unknown
    }
}

/// Issues `HEAD` requests against video locators.
#[derive(Debug, Clone)]
pub struct SourcePreflight {
    client: reqwest::Client,
}

impl SourcePreflight {
    pub fn new(timeout: Duration) -> MediaResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MediaError::internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Check that the locator answers and is readable.
    pub async fn check(&self, locator: &str) -> MediaResult<()> {
        let response = self
            .client
            .head(locator)
            .send()
            .await
            .map_err(|e| MediaError::classified(classify_transport(&e), e.to_string()))?;

        let status = response.status();
        debug!(locator = %locator, status = status.as_u16(), "Preflight response");

        match classify_status(status) {
            Some(kind) => Err(MediaError::classified(
                kind,
                format!("HEAD {} returned {}", locator, status),
            )),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::NOT_FOUND), Some(SourceErrorKind::NotFound));
        assert_eq!(classify_status(StatusCode::GONE), Some(SourceErrorKind::NotFound));
        assert_eq!(classify_status(StatusCode::FORBIDDEN), Some(SourceErrorKind::AccessDenied));
        assert_eq!(classify_status(StatusCode::UNAUTHORIZED), Some(SourceErrorKind::AccessDenied));
        assert_eq!(classify_status(StatusCode::BAD_GATEWAY), Some(SourceErrorKind::Unreachable));
        assert_eq!(classify_status(StatusCode::OK), None);
        assert_eq!(classify_status(StatusCode::METHOD_NOT_ALLOWED), None);
    }
}

//! Extraction response types.

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Color sampled at one timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorResult {
    /// Timestamp in milliseconds
    pub timestamp: u64,
    pub color: Rgb,
}

/// Response to an extraction request. Results follow request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub locator: String,
    pub results: Vec<ColorResult>,
}

impl ExtractionResponse {
    /// Timestamps in result order.
    pub fn timestamps(&self) -> Vec<u64> {
        self.results.iter().map(|r| r.timestamp).collect()
    }
}

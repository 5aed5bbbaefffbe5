//! Cache and health status payloads.

use serde::{Deserialize, Serialize};

/// Result cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Live entries currently held
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses)`, or 0 before any lookup
    pub hit_rate: f64,
}

impl CacheStats {
    pub fn new(entries: usize, hits: u64, misses: u64) -> Self {
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };

        Self {
            entries,
            hits,
            misses,
            hit_rate,
        }
    }
}

/// Availability of the frame source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub available: bool,
    pub message: String,
}

impl HealthStatus {
    pub fn available(message: impl Into<String>) -> Self {
        Self {
            available: true,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            available: false,
            message: message.into(),
        }
    }
}

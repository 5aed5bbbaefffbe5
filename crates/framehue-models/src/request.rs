//! Extraction request model and validation.
//!
//! A request names a video locator and exactly one sampling list: absolute
//! timestamps in milliseconds or percentages of the video duration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of samples in a single request.
pub const MAX_SAMPLES: usize = 10;

/// Maximum locator length.
pub const MAX_LOCATOR_LENGTH: usize = 2048;

/// Result type for request validation.
pub type RequestResult<T> = Result<T, RequestError>;

/// Request validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("Locator must not be empty")]
    EmptyLocator,

    #[error("Locator exceeds maximum length of {} characters", MAX_LOCATOR_LENGTH)]
    LocatorTooLong,

    #[error("Either timestamps or percentages must be provided")]
    MissingSamples,

    #[error("Provide either timestamps OR percentages, not both")]
    ConflictingSamples,

    #[error("{field} accepts at most {} values, got {count}", MAX_SAMPLES)]
    TooManySamples { field: &'static str, count: usize },

    #[error("Timestamp {0} must be a non-negative integer")]
    NegativeTimestamp(i64),

    #[error("Percentage {0} must be between 0 and 100")]
    PercentageOutOfRange(f64),

    #[error("Timestamps [{}] exceed video duration of {duration_ms}ms", join_list(.offending))]
    ExceedsDuration {
        offending: Vec<u64>,
        duration_ms: u64,
    },
}

fn join_list(values: &[u64]) -> String {
    values
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Request to extract dominant colors from a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    /// Video locator (usually an HTTP(S) URL)
    #[serde(alias = "videoUrl")]
    pub locator: String,

    /// Absolute sample points in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamps: Option<Vec<i64>>,

    /// Sample points as percentages of the video duration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentages: Option<Vec<f64>>,
}

impl ExtractionRequest {
    /// Create a request sampling absolute timestamps.
    pub fn at_timestamps(locator: impl Into<String>, timestamps: impl IntoIterator<Item = u64>) -> Self {
        Self {
            locator: locator.into(),
            timestamps: Some(timestamps.into_iter().map(|t| t as i64).collect()),
            percentages: None,
        }
    }

    /// Create a request sampling duration percentages.
    pub fn at_percentages(locator: impl Into<String>, percentages: impl IntoIterator<Item = f64>) -> Self {
        Self {
            locator: locator.into(),
            timestamps: None,
            percentages: Some(percentages.into_iter().collect()),
        }
    }

    /// Validate the request shape and field values.
    ///
    /// An empty list is treated the same as an absent one.
    pub fn validate(&self) -> RequestResult<SamplePlan> {
        if self.locator.trim().is_empty() {
            return Err(RequestError::EmptyLocator);
        }
        if self.locator.len() > MAX_LOCATOR_LENGTH {
            return Err(RequestError::LocatorTooLong);
        }

        let timestamps = self.timestamps.as_deref().filter(|t| !t.is_empty());
        let percentages = self.percentages.as_deref().filter(|p| !p.is_empty());

        match (timestamps, percentages) {
            (Some(_), Some(_)) => Err(RequestError::ConflictingSamples),
            (None, None) => Err(RequestError::MissingSamples),
            (Some(timestamps), None) => {
                check_count("timestamps", timestamps.len())?;
                let resolved = timestamps
                    .iter()
                    .map(|&ts| u64::try_from(ts).map_err(|_| RequestError::NegativeTimestamp(ts)))
                    .collect::<RequestResult<Vec<_>>>()?;
                Ok(SamplePlan::Timestamps(resolved))
            }
            (None, Some(percentages)) => {
                check_count("percentages", percentages.len())?;
                if let Some(&bad) = percentages
                    .iter()
                    .find(|p| !p.is_finite() || **p < 0.0 || **p > 100.0)
                {
                    return Err(RequestError::PercentageOutOfRange(bad));
                }
                Ok(SamplePlan::Percentages(percentages.to_vec()))
            }
        }
    }
}

fn check_count(field: &'static str, count: usize) -> RequestResult<()> {
    if count > MAX_SAMPLES {
        return Err(RequestError::TooManySamples { field, count });
    }
    Ok(())
}

/// Validated sampling plan.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplePlan {
    /// Absolute timestamps in milliseconds
    Timestamps(Vec<u64>),
    /// Percentages in `[0, 100]`
    Percentages(Vec<f64>),
}

impl SamplePlan {
    /// Number of samples in the plan.
    pub fn len(&self) -> usize {
        match self {
            Self::Timestamps(t) => t.len(),
            Self::Percentages(p) => p.len(),
        }
    }

    /// Whether the plan is empty. Never true for a validated plan.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve the plan to absolute timestamps, preserving input order.
    pub fn resolve(&self, duration_ms: u64) -> Vec<u64> {
        match self {
            Self::Timestamps(t) => t.clone(),
            Self::Percentages(p) => p
                .iter()
                .map(|&pct| percentage_to_timestamp(pct, duration_ms))
                .collect(),
        }
    }
}

/// Convert a duration percentage to an absolute timestamp.
///
/// # Examples
/// ```
/// use framehue_models::percentage_to_timestamp;
/// assert_eq!(percentage_to_timestamp(50.0, 10_000), 5_000);
/// assert_eq!(percentage_to_timestamp(25.0, 1_000), 250);
/// assert_eq!(percentage_to_timestamp(100.0, 10_000), 10_000);
/// ```
pub fn percentage_to_timestamp(percentage: f64, duration_ms: u64) -> u64 {
    (percentage / 100.0 * duration_ms as f64).floor() as u64
}

/// Reject timestamps past the end of the video, listing every offender.
pub fn ensure_within_duration(timestamps: &[u64], duration_ms: u64) -> RequestResult<()> {
    let offending: Vec<u64> = timestamps
        .iter()
        .copied()
        .filter(|&ts| ts > duration_ms)
        .collect();

    if offending.is_empty() {
        Ok(())
    } else {
        Err(RequestError::ExceedsDuration {
            offending,
            duration_ms,
        })
    }
}

//! Worker configuration.

use std::time::Duration;

use framehue_media::ColorAlgorithm;

/// Extraction core configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum extraction tasks running at once, across all requests
    pub max_concurrent_tasks: usize,
    /// Wall-clock limit for one task, measured from when it starts running
    pub task_timeout: Duration,
    /// Time-to-live for cached durations and colors
    pub cache_ttl: Duration,
    /// Maximum cached entries, shared by both namespaces
    pub cache_max_entries: usize,
    /// Color algorithm used for frames
    pub color_algorithm: ColorAlgorithm,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 4,
            task_timeout: Duration::from_millis(600_000), // 10 minutes
            cache_ttl: Duration::from_secs(3600),
            cache_max_entries: 10_000,
            color_algorithm: ColorAlgorithm::Dominant,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from a variable lookup. Unparsable or zero values
    /// fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let positive = |key: &str| -> Option<u64> {
            lookup(key)
                .and_then(|s| s.trim().parse().ok())
                .filter(|n| *n > 0)
        };
        let defaults = Self::default();

        Self {
            max_concurrent_tasks: positive("EXTRACT_MAX_CONCURRENCY")
                .map(|n| n as usize)
                .unwrap_or(defaults.max_concurrent_tasks),
            task_timeout: positive("EXTRACT_TASK_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.task_timeout),
            cache_ttl: lookup("CACHE_TTL_SECS")
                .and_then(|s| s.trim().parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            cache_max_entries: positive("CACHE_MAX_ENTRIES")
                .map(|n| n as usize)
                .unwrap_or(defaults.cache_max_entries),
            color_algorithm: lookup("COLOR_ALGORITHM")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.color_algorithm),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.max_concurrent_tasks, 4);
        assert_eq!(config.task_timeout, Duration::from_secs(600));
        assert_eq!(config.cache_ttl, Duration::from_secs(3600));
        assert_eq!(config.cache_max_entries, 10_000);
        assert_eq!(config.color_algorithm, ColorAlgorithm::Dominant);
    }

    #[test]
    fn zero_or_invalid_values_fall_back() {
        let vars: HashMap<&str, &str> = [
            ("EXTRACT_TASK_TIMEOUT_MS", "0"),
            ("EXTRACT_MAX_CONCURRENCY", "0"),
            ("CACHE_MAX_ENTRIES", "lots"),
        ]
        .into_iter()
        .collect();

        let config = WorkerConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.task_timeout, Duration::from_millis(600_000));
        assert_eq!(config.max_concurrent_tasks, 4);
        assert_eq!(config.cache_max_entries, 10_000);
    }

    #[test]
    fn positive_values_are_used() {
        let vars: HashMap<&str, &str> = [
            ("EXTRACT_TASK_TIMEOUT_MS", "2500"),
            ("EXTRACT_MAX_CONCURRENCY", "8"),
            ("CACHE_TTL_SECS", "60"),
            ("COLOR_ALGORITHM", "sqrt"),
        ]
        .into_iter()
        .collect();

        let config = WorkerConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.task_timeout, Duration::from_millis(2_500));
        assert_eq!(config.max_concurrent_tasks, 8);
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.color_algorithm, ColorAlgorithm::Sqrt);
    }
}

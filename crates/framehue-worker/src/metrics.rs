//! Metrics emitted by the extraction core.
//!
//! Recorded through the `metrics` facade; the binary hosting the core decides
//! whether a recorder is installed.

use metrics::{counter, gauge, histogram};

/// Metric names as constants for consistency.
pub mod names {
    // Cache metrics
    pub const CACHE_LOOKUPS_TOTAL: &str = "framehue_cache_lookups_total";

    // Extraction metrics
    pub const EXTRACTIONS_TOTAL: &str = "framehue_extractions_total";
    pub const EXTRACTION_DURATION_SECONDS: &str = "framehue_extraction_duration_seconds";
    pub const FRAMES_PROCESSED_TOTAL: &str = "framehue_frames_processed_total";

    // Work queue metrics
    pub const QUEUE_TASKS_IN_FLIGHT: &str = "framehue_queue_tasks_in_flight";
    pub const QUEUE_TASKS_PENDING: &str = "framehue_queue_tasks_pending";

    // Batch metrics
    pub const BATCH_MESSAGES_TOTAL: &str = "framehue_batch_messages_total";
}

/// Record a cache lookup.
pub fn record_cache_lookup(namespace: &'static str, hit: bool) {
    let labels = [
        ("namespace", namespace),
        ("result", if hit { "hit" } else { "miss" }),
    ];
    counter!(names::CACHE_LOOKUPS_TOTAL, &labels).increment(1);
}

/// Record a finished extraction request.
pub fn record_extraction(outcome: &'static str, duration_secs: f64) {
    let labels = [("outcome", outcome)];
    counter!(names::EXTRACTIONS_TOTAL, &labels).increment(1);
    histogram!(names::EXTRACTION_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record one per-timestamp task outcome.
pub fn record_frame(outcome: &'static str) {
    let labels = [("outcome", outcome)];
    counter!(names::FRAMES_PROCESSED_TOTAL, &labels).increment(1);
}

/// Update work queue gauges.
pub fn set_queue_depth(in_flight: usize, pending: usize) {
    gauge!(names::QUEUE_TASKS_IN_FLIGHT).set(in_flight as f64);
    gauge!(names::QUEUE_TASKS_PENDING).set(pending as f64);
}

/// Record a batch message outcome.
pub fn record_batch_message(outcome: &'static str) {
    let labels = [("outcome", outcome)];
    counter!(names::BATCH_MESSAGES_TOTAL, &labels).increment(1);
}

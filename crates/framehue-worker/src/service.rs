//! Color extraction orchestration.
//!
//! Validates a request, resolves the video duration, fans one task per
//! timestamp out to the work queue and assembles the ordered response. A
//! request succeeds only if every timestamp succeeds; all tasks settle before
//! the outcome is decided.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use framehue_media::{ColorEstimator, FrameSource};
use framehue_models::{
    ensure_within_duration, CacheStats, ColorResult, ExtractionRequest, ExtractionResponse,
    HealthStatus,
};
use tracing::{info, Instrument};

use crate::cache::{CacheConfig, CacheKey, ResultCache};
use crate::config::WorkerConfig;
use crate::error::{ExtractionError, ExtractionResult};
use crate::logging::ExtractionLogger;
use crate::metrics::{record_extraction, record_frame};
use crate::task::FrameColorTask;
use crate::work_queue::{TaskError, WorkQueue};

/// Extraction orchestrator. Cloning shares the cache and queue.
#[derive(Clone)]
pub struct ColorExtractionService {
    source: Arc<dyn FrameSource>,
    estimator: Arc<dyn ColorEstimator>,
    cache: Arc<ResultCache>,
    queue: WorkQueue,
}

impl ColorExtractionService {
    pub fn new(
        source: Arc<dyn FrameSource>,
        estimator: Arc<dyn ColorEstimator>,
        cache: Arc<ResultCache>,
        queue: WorkQueue,
    ) -> Self {
        Self {
            source,
            estimator,
            cache,
            queue,
        }
    }

    /// Build the service with its own cache and queue.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn from_config(config: &WorkerConfig, source: Arc<dyn FrameSource>) -> Self {
        let cache = Arc::new(ResultCache::new(CacheConfig {
            ttl: config.cache_ttl,
            max_entries: config.cache_max_entries,
        }));
        let queue = WorkQueue::new(config.max_concurrent_tasks, config.task_timeout);

        Self::new(source, config.color_algorithm.estimator(), cache, queue)
    }

    pub fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    /// Extract one color per requested moment.
    pub async fn extract(&self, request: &ExtractionRequest) -> ExtractionResult<ExtractionResponse> {
        let logger = ExtractionLogger::new("extract_colors");
        self.extract_with_logger(request, &logger).await
    }

    /// Extract with a caller-provided logger (request or message ID).
    pub async fn extract_with_logger(
        &self,
        request: &ExtractionRequest,
        logger: &ExtractionLogger,
    ) -> ExtractionResult<ExtractionResponse> {
        let started = Instant::now();
        let result = self
            .run_extraction(request, logger)
            .instrument(logger.create_span())
            .await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) if e.is_validation() => "rejected",
            Err(_) => "failed",
        };
        record_extraction(outcome, started.elapsed().as_secs_f64());

        result
    }

    async fn run_extraction(
        &self,
        request: &ExtractionRequest,
        logger: &ExtractionLogger,
    ) -> ExtractionResult<ExtractionResponse> {
        let plan = request.validate()?;
        let locator = request.locator.as_str();
        logger.log_start(&format!("{} with {} samples", locator, plan.len()));

        let duration_ms = self.resolve_duration(locator).await?;
        let timestamps = plan.resolve(duration_ms);
        ensure_within_duration(&timestamps, duration_ms)?;

        logger.log_progress(&format!(
            "Sampling {:?} of {}ms video",
            timestamps, duration_ms
        ));

        // Repeated timestamps share one task; the response still lists each.
        let mut unique = Vec::with_capacity(timestamps.len());
        for &timestamp in &timestamps {
            if !unique.contains(&timestamp) {
                unique.push(timestamp);
            }
        }
        if unique.len() < timestamps.len() {
            logger.log_warning(&format!(
                "{} repeated timestamps share a frame",
                timestamps.len() - unique.len()
            ));
        }

        let tasks = unique.iter().map(|&timestamp| {
            FrameColorTask {
                source: Arc::clone(&self.source),
                estimator: Arc::clone(&self.estimator),
                cache: Arc::clone(&self.cache),
                locator: locator.to_string(),
                timestamp,
            }
            .run()
        });
        let outcomes = self.queue.run_all(tasks).await;

        let mut colors = HashMap::with_capacity(unique.len());
        let mut first_error = None;

        for (&timestamp, outcome) in unique.iter().zip(outcomes) {
            match outcome {
                Ok(color) => {
                    record_frame("success");
                    colors.insert(timestamp, color);
                }
                Err(err) => {
                    record_frame(match &err {
                        TaskError::Failed(_) => "failed",
                        TaskError::Timeout(_) => "timeout",
                        TaskError::Aborted => "aborted",
                    });
                    let err = ExtractionError::from_task(locator, timestamp, err);
                    logger.log_error(&err.to_string());
                    first_error.get_or_insert(err);
                }
            }
        }

        // `unique` keeps first-occurrence order, so this is also the first
        // failure in input order.
        if let Some(err) = first_error {
            return Err(err);
        }

        let results: Vec<ColorResult> = timestamps
            .iter()
            .filter_map(|&timestamp| {
                colors
                    .get(&timestamp)
                    .map(|&color| ColorResult { timestamp, color })
            })
            .collect();

        logger.log_completion(&format!("{} colors for {}", results.len(), locator));
        Ok(ExtractionResponse {
            locator: locator.to_string(),
            results,
        })
    }

    /// Video duration in milliseconds, cached per locator.
    pub async fn resolve_duration(&self, locator: &str) -> ExtractionResult<u64> {
        if let Some(duration_ms) = self.cache.get_duration(locator) {
            return Ok(duration_ms);
        }

        let duration_ms = self
            .source
            .duration_ms(locator)
            .await
            .map_err(|e| ExtractionError::duration_resolution(locator, e))?;

        self.cache.set_duration(locator, duration_ms);
        Ok(duration_ms)
    }

    /// Availability of the frame source.
    pub async fn health(&self) -> HealthStatus {
        self.source.health().await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop every cached entry. Returns how many were removed.
    pub fn clear_cache(&self) -> usize {
        let removed = self.cache.clear();
        info!(removed, "Cache cleared");
        removed
    }

    /// Drop cached entries for a locator: one color entry when a timestamp
    /// is given, otherwise everything cached for it.
    pub fn invalidate(&self, locator: &str, timestamp: Option<u64>) -> usize {
        let removed = match timestamp {
            Some(ts) => usize::from(self.cache.delete(&CacheKey::color(locator, ts))),
            None => self.cache.delete_locator(locator),
        };
        info!(locator = %locator, ?timestamp, removed, "Cache entries invalidated");
        removed
    }
}

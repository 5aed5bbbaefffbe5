//! Instrumented collaborators for extraction tests.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use framehue_media::image::{DynamicImage, Rgba, RgbaImage};
use framehue_media::{
    ColorEstimator, DominantColorEstimator, FrameSource, MediaError, MediaResult, SourceErrorKind,
};
use framehue_models::{HealthStatus, Rgb};
use framehue_worker::{CacheConfig, ColorExtractionService, ResultCache, WorkQueue};

/// Color a stub frame renders at a timestamp.
pub fn color_for(timestamp: u64) -> Rgb {
    Rgb::new((timestamp % 256) as u8, ((timestamp / 256) % 256) as u8, 0x42)
}

/// Frame source with call counters and a concurrency high-water mark.
#[derive(Default)]
pub struct StubSource {
    durations: HashMap<String, u64>,
    duration_failures: HashMap<String, SourceErrorKind>,
    failing: HashSet<u64>,
    hanging: HashSet<u64>,
    capture_delay: Duration,
    pub duration_calls: AtomicUsize,
    pub capture_calls: AtomicUsize,
    running: AtomicUsize,
    peak: AtomicUsize,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duration(mut self, locator: &str, duration_ms: u64) -> Self {
        self.durations.insert(locator.to_string(), duration_ms);
        self
    }

    pub fn with_duration_failure(mut self, locator: &str, kind: SourceErrorKind) -> Self {
        self.duration_failures.insert(locator.to_string(), kind);
        self
    }

    pub fn failing_at(mut self, timestamp: u64) -> Self {
        self.failing.insert(timestamp);
        self
    }

    pub fn hanging_at(mut self, timestamp: u64) -> Self {
        self.hanging.insert(timestamp);
        self
    }

    pub fn with_capture_delay(mut self, delay: Duration) -> Self {
        self.capture_delay = delay;
        self
    }

    pub fn duration_calls(&self) -> usize {
        self.duration_calls.load(Ordering::SeqCst)
    }

    pub fn capture_calls(&self) -> usize {
        self.capture_calls.load(Ordering::SeqCst)
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameSource for StubSource {
    async fn duration_ms(&self, locator: &str) -> MediaResult<u64> {
        self.duration_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;

        if let Some(kind) = self.duration_failures.get(locator) {
            return Err(MediaError::classified(*kind, format!("stub failure for {}", locator)));
        }
        self.durations
            .get(locator)
            .copied()
            .ok_or_else(|| MediaError::classified(SourceErrorKind::NotFound, locator.to_string()))
    }

    async fn capture_frame(&self, _locator: &str, timestamp_ms: u64) -> MediaResult<DynamicImage> {
        self.capture_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if self.hanging.contains(&timestamp_ms) {
            tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
        }
        tokio::time::sleep(self.capture_delay).await;
        self.running.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&timestamp_ms) {
            return Err(MediaError::ffmpeg_failed("stub capture failed", None, Some(1)));
        }

        let c = color_for(timestamp_ms);
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            2,
            2,
            Rgba([c.r, c.g, c.b, 255]),
        )))
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus::available("stub source ready")
    }
}

/// Dominant color estimator that counts invocations.
#[derive(Default)]
pub struct CountingEstimator {
    pub calls: AtomicUsize,
}

impl CountingEstimator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ColorEstimator for CountingEstimator {
    async fn estimate(&self, frame: &DynamicImage) -> MediaResult<Rgb> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        DominantColorEstimator.estimate(frame).await
    }
}

pub struct Harness {
    pub source: Arc<StubSource>,
    pub estimator: Arc<CountingEstimator>,
    pub cache: Arc<ResultCache>,
    pub service: ColorExtractionService,
}

pub struct HarnessConfig {
    pub concurrency: usize,
    pub task_timeout: Duration,
    pub cache_ttl: Duration,
    pub cache_max_entries: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            task_timeout: Duration::from_millis(600_000),
            cache_ttl: Duration::from_secs(3600),
            cache_max_entries: 10_000,
        }
    }
}

pub fn harness(source: StubSource) -> Harness {
    harness_with(source, HarnessConfig::default())
}

pub fn harness_with(source: StubSource, config: HarnessConfig) -> Harness {
    let source = Arc::new(source);
    let estimator = Arc::new(CountingEstimator::default());
    let cache = Arc::new(ResultCache::new(CacheConfig {
        ttl: config.cache_ttl,
        max_entries: config.cache_max_entries,
    }));
    let queue = WorkQueue::new(config.concurrency, config.task_timeout);

    let service = ColorExtractionService::new(
        Arc::clone(&source) as Arc<dyn FrameSource>,
        Arc::clone(&estimator) as Arc<dyn ColorEstimator>,
        Arc::clone(&cache),
        queue,
    );

    Harness {
        source,
        estimator,
        cache,
        service,
    }
}

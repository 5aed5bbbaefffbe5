use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use framehue_api::{create_router, ApiConfig, AppState};
use framehue_media::image::{DynamicImage, Rgba, RgbaImage};
use framehue_media::{
    DominantColorEstimator, FrameSource, MediaError, MediaResult, SourceErrorKind,
};
use framehue_models::HealthStatus;
use framehue_worker::{CacheConfig, ColorExtractionService, ResultCache, WorkQueue};
use serde_json::{json, Value};
use tower::ServiceExt;

#[derive(Default)]
struct StubSource {
    durations: HashMap<String, u64>,
    failing: HashSet<u64>,
    captures: AtomicUsize,
}

#[async_trait]
impl FrameSource for StubSource {
    async fn duration_ms(&self, locator: &str) -> MediaResult<u64> {
        self.durations
            .get(locator)
            .copied()
            .ok_or_else(|| MediaError::classified(SourceErrorKind::NotFound, locator.to_string()))
    }

    async fn capture_frame(&self, _locator: &str, timestamp_ms: u64) -> MediaResult<DynamicImage> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&timestamp_ms) {
            return Err(MediaError::ffmpeg_failed("stub capture failed", None, Some(1)));
        }
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            4,
            4,
            Rgba([0x10, 0x20, 0x30, 255]),
        )))
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus::available("FFmpeg is available and working")
    }
}

fn app_with(source: StubSource) -> (Router, Arc<StubSource>) {
    let source = Arc::new(source);
    let service = ColorExtractionService::new(
        Arc::clone(&source) as Arc<dyn FrameSource>,
        Arc::new(DominantColorEstimator),
        Arc::new(ResultCache::new(CacheConfig::default())),
        WorkQueue::new(4, Duration::from_secs(600)),
    );
    let state = AppState::new(ApiConfig::default(), service);
    (create_router(state, None), source)
}

fn app() -> (Router, Arc<StubSource>) {
    let mut source = StubSource::default();
    source.durations.insert("v1".to_string(), 10_000);
    source.failing.insert(7_000);
    app_with(source)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn extracts_colors_for_percentages() {
    let (app, _) = app();
    let body = json!({ "videoUrl": "v1", "percentages": [0, 50, 100] }).to_string();

    let (status, json) = send(&app, post_json("/api/video/extract-colors", &body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["locator"], "v1");
    assert_eq!(
        json["results"],
        json!([
            { "timestamp": 0, "color": "#102030" },
            { "timestamp": 5000, "color": "#102030" },
            { "timestamp": 10000, "color": "#102030" },
        ])
    );
}

#[tokio::test]
async fn conflicting_samples_are_bad_request() {
    let (app, source) = app();
    let body = json!({ "locator": "v1", "timestamps": [1000], "percentages": [10] }).to_string();

    let (status, json) = send(&app, post_json("/api/video/extract-colors", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["detail"], "Provide either timestamps OR percentages, not both");
    assert_eq!(source.captures.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let (app, _) = app();

    let (status, json) = send(&app, post_json("/api/video/extract-colors", "{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["detail"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn timestamps_past_duration_are_listed() {
    let (app, _) = app();
    let body = json!({ "locator": "v1", "timestamps": [500, 12000, 15000] }).to_string();

    let (status, json) = send(&app, post_json("/api/video/extract-colors", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        json["detail"],
        "Timestamps [12000, 15000] exceed video duration of 10000ms"
    );
}

#[tokio::test]
async fn frame_failure_fails_whole_request() {
    let (app, source) = app();
    let body = json!({ "locator": "v1", "timestamps": [1000, 7000, 9000] }).to_string();

    let (status, json) = send(&app, post_json("/api/video/extract-colors", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "FRAME_EXTRACTION_ERROR");
    assert!(json["detail"]
        .as_str()
        .unwrap()
        .starts_with("Failed to extract colors: Failed to process timestamp 7000ms"));
    assert!(json.get("results").is_none());
    assert_eq!(source.captures.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unknown_video_is_duration_error() {
    let (app, _) = app();
    let body = json!({ "locator": "gone", "timestamps": [0] }).to_string();

    let (status, json) = send(&app, post_json("/api/video/extract-colors", &body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "DURATION_RESOLUTION_ERROR");
}

#[tokio::test]
async fn cache_stats_clear_and_invalidate() {
    let (app, _) = app();
    let body = json!({ "locator": "v1", "timestamps": [1000, 2000] }).to_string();
    let (status, _) = send(&app, post_json("/api/video/extract-colors", &body)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, post_json("/api/video/extract-colors", &body)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, stats) = send(&app, request("GET", "/api/video/cache/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats, json!({ "entries": 3, "hits": 3, "misses": 3, "hitRate": 0.5 }));

    let (status, json) = send(
        &app,
        request("DELETE", "/api/video/cache/entries?locator=v1&timestamp=1000"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "removed": 1 }));

    let (status, json) = send(&app, request("DELETE", "/api/video/cache")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "message": "Cache cleared successfully", "removed": 2 }));

    let (_, stats) = send(&app, request("GET", "/api/video/cache/stats")).await;
    assert_eq!(stats["entries"], 0);
}

#[tokio::test]
async fn invalidate_requires_locator() {
    let (app, _) = app();

    let (status, json) = send(&app, request("DELETE", "/api/video/cache/entries")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn video_health_reports_source() {
    let (app, _) = app();

    let (status, json) = send(&app, request("GET", "/api/video/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json,
        json!({ "available": true, "message": "FFmpeg is available and working" })
    );
}

#[tokio::test]
async fn liveness_echoes_request_id() {
    let (app, _) = app();
    let request = Request::builder()
        .uri("/health")
        .header("X-Request-ID", "req-123")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["X-Request-ID"], "req-123");
    assert_eq!(response.headers()["X-Content-Type-Options"], "nosniff");
}

#[tokio::test]
async fn metrics_route_absent_when_disabled() {
    let (app, _) = app();

    let response = app.clone().oneshot(request("GET", "/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn request_id_generated_when_absent() {
    let (app, _) = app();
    let body = json!({ "locator": "v1", "timestamps": [0] }).to_string();

    let response = app
        .clone()
        .oneshot(post_json("/api/video/extract-colors", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let id = response.headers()["X-Request-ID"].to_str().unwrap();
    assert_eq!(id.len(), 36);
    assert_eq!(id.matches('-').count(), 4);
}

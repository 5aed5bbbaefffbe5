//! Cache inspection and invalidation handlers.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use framehue_models::CacheStats;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Current cache statistics.
pub async fn cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.service.cache_stats())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearCacheResponse {
    pub message: String,
    pub removed: usize,
}

/// Drop every cached duration and color.
pub async fn clear_cache(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    let removed = state.service.clear_cache();
    Json(ClearCacheResponse {
        message: "Cache cleared successfully".to_string(),
        removed,
    })
}

#[derive(Debug, Deserialize)]
pub struct InvalidateQuery {
    pub locator: String,
    pub timestamp: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvalidateResponse {
    pub removed: usize,
}

/// Drop one color entry, or every entry for a locator when no timestamp is given.
pub async fn invalidate_entries(
    State(state): State<AppState>,
    query: Result<Query<InvalidateQuery>, QueryRejection>,
) -> ApiResult<Json<InvalidateResponse>> {
    let Query(query) = query?;
    if query.locator.trim().is_empty() {
        return Err(ApiError::bad_request("locator must not be empty"));
    }

    let removed = state.service.invalidate(&query.locator, query.timestamp);
    Ok(Json(InvalidateResponse { removed }))
}

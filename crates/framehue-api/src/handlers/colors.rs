//! Color extraction handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use framehue_models::{ExtractionRequest, ExtractionResponse};
use framehue_worker::ExtractionLogger;

use crate::error::ApiResult;
use crate::middleware::RequestId;
use crate::state::AppState;

/// Extract the dominant color at each requested timestamp or percentage.
pub async fn extract_colors(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    payload: Result<Json<ExtractionRequest>, JsonRejection>,
) -> ApiResult<Json<ExtractionResponse>> {
    let Json(request) = payload?;

    let logger = match request_id {
        Some(Extension(RequestId(id))) => ExtractionLogger::with_id(&id, "extract_colors"),
        None => ExtractionLogger::new("extract_colors"),
    };

    let response = state.service.extract_with_logger(&request, &logger).await?;
    Ok(Json(response))
}

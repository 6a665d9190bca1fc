//! POST /api/generate: three short ad texts for one product brief.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use copy_pipeline::{
    AdCopyResponse, GenerationRequest, PipelineError,
    request::{BENEFIT_LABEL, PAIN_POINT_LABEL, PRODUCT_LABEL},
};
use tracing::{info, instrument, warn};

use crate::core::app_state::AppState;

/// Handler: POST /api/generate
///
/// Always answers 200 with the generation envelope, including soft failures
/// and bodies that are not valid JSON.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/api/generate \
///   -H 'content-type: application/json' \
///   -d '{"product":"꿀잠 베개","benefit":"5분 만에 숙면","painPoint":"새벽까지 뒤척임"}'
/// ```
#[instrument(name = "generate_route", skip(state, body))]
pub async fn generate_route(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GenerationRequest>, JsonRejection>,
) -> Json<AdCopyResponse> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(status = %rejection.status(), error = %rejection.body_text(), "rejected generation body");
            return Json(malformed_body(rejection.body_text()));
        }
    };

    let response = state.pipeline.generate(request).await;
    info!(ok = response.ok, count = response.ad_texts.len(), "generation answered");
    Json(response)
}

fn malformed_body(detail: String) -> AdCopyResponse {
    let err = PipelineError::RequestInvalid {
        missing: vec![PRODUCT_LABEL, BENEFIT_LABEL, PAIN_POINT_LABEL],
    };
    AdCopyResponse {
        detail: Some(detail),
        ..AdCopyResponse::failure(&err)
    }
}

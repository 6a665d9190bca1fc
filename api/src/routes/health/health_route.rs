use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use tracing::instrument;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

/// Handler: GET /health
///
/// 200 with the provider snapshot when the completion service answers and
/// lists the model, 503 otherwise.
#[instrument(name = "health_route", skip(state), fields(model = %state.provider.config().model))]
pub async fn health_route(State(state): State<Arc<AppState>>) -> Response {
    let status = state.provider.probe_models().await;

    if status.ok {
        ApiResponse::success(status).into_response_with_status(StatusCode::OK)
    } else {
        let message = status.message.clone();
        ApiResponse::failure(status, "UPSTREAM_UNHEALTHY", message)
            .into_response_with_status(StatusCode::SERVICE_UNAVAILABLE)
    }
}

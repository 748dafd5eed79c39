//! Outreach run handlers.

use crate::api::AppState;
use crate::api::error_response::status_for;
use crate::config::RunConfig;
use crate::error::ApiError;
use crate::outreach::failure_result;
use crate::types::RunResult;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// POST /api/automation - Run outreach to completion
///
/// The response is sent once the run ends. Requests that fail before the
/// first fetch get a `success: false` result with the matching status code.
pub async fn run_automation(
    State(state): State<AppState>,
    payload: Result<Json<RunConfig>, JsonRejection>,
) -> Response {
    let config = match payload {
        Ok(Json(config)) => config,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "malformed automation request");
            let result = RunResult::failed("Invalid request parameters", rejection.body_text());
            return (StatusCode::BAD_REQUEST, Json(result)).into_response();
        }
    };

    match state.runner.run(config).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "automation request failed");
            (status_for(&e), Json(failure_result(&e))).into_response()
        }
    }
}

/// POST /api/automation/cancel - Cancel the active run
pub async fn cancel_automation(State(state): State<AppState>) -> Response {
    if state.runner.cancel_current() {
        tracing::info!("cancellation requested for active outreach run");
        (
            StatusCode::ACCEPTED,
            Json(json!({"status": "cancellation requested"})),
        )
            .into_response()
    } else {
        (
            StatusCode::CONFLICT,
            Json(ApiError::new("no_active_run", "no outreach run is in progress")),
        )
            .into_response()
    }
}

/// GET /api/automation - Whether a run is in flight
pub async fn automation_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "running": state.runner.is_running() }))
}

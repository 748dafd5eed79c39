//! HTTP error response handling for the API
//!
//! Conversions from domain errors to HTTP responses with appropriate status
//! codes and JSON error bodies.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// HTTP status for an error, falling back to 500 for anything unmapped
pub(crate) fn status_for(error: &Error) -> StatusCode {
    StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = status_for(&self);
        let api_error: ApiError = self.into();
        (status_code, Json(api_error)).into_response()
    }
}

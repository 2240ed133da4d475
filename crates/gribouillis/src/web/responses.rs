//! Error to HTTP response mapping
//!
//! Failures are reported as short plain-text bodies.

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::errors::AppError;

/// Convert an application error into its HTTP response.
pub fn handle_error(error: AppError) -> Response {
    match &error {
        AppError::RateLimited { retry_after } => {
            let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(header::RETRY_AFTER, seconds.to_string())],
                "rate limited",
            )
                .into_response()
        }
        AppError::InputTooLarge { .. } => (
            StatusCode::PAYLOAD_TOO_LARGE,
            format!("could not save image: {error}"),
        )
            .into_response(),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("could not save image: {error}"),
        )
            .into_response(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        handle_error(self)
    }
}

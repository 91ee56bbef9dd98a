use crate::model::ErrorResponse;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shortpath_allocator::{AllocError, ErrorKind};
use std::error::Error as _;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

const INTERNAL_ERROR: &str = "internal server error";

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Alloc(#[from] AllocError),
    #[error(transparent)]
    Body(#[from] JsonRejection),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Body(rejection) => (rejection.status(), rejection.body_text()),
            AppError::Alloc(e) => match e.kind() {
                ErrorKind::Validation => (StatusCode::BAD_REQUEST, e.to_string()),
                ErrorKind::Conflict => (StatusCode::CONFLICT, e.to_string()),
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, e.to_string()),
                ErrorKind::Server => {
                    let cause = e.source().map(ToString::to_string).unwrap_or_default();
                    error!(
                        error = %e,
                        cause = %cause,
                        compensation_failed = e.is_compensation_failure(),
                        "Request failed"
                    );
                    (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR.to_string())
                }
            },
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

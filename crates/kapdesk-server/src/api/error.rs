//! Error-to-status translation for the HTTP layer.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use kapdesk_core::error::KapdeskError;

use crate::api::envelope::ApiResponse;

/// An API error: a status code plus the human-readable message placed
/// in the envelope. Validation-class faults map to 400, store faults
/// to 500. NotFound maps to 400 by default (mutations against missing
/// tickets); lookups use [`ApiError::lookup`] to report 404 instead.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<KapdeskError> for ApiError {
    fn from(err: KapdeskError) -> Self {
        let status = match &err {
            KapdeskError::Validation { .. }
            | KapdeskError::NotFound { .. }
            | KapdeskError::UserNotFound { .. }
            | KapdeskError::InvalidStatus { .. }
            | KapdeskError::ScheduledDateRequired
            | KapdeskError::InvalidRole { .. }
            | KapdeskError::AlreadyExists { .. } => StatusCode::BAD_REQUEST,
            KapdeskError::Database(_) | KapdeskError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl ApiError {
    /// Translation for GET-by-id endpoints, where a missing entity is
    /// 404 rather than 400.
    pub fn lookup(err: KapdeskError) -> Self {
        if matches!(err, KapdeskError::NotFound { .. }) {
            return Self {
                status: StatusCode::NOT_FOUND,
                message: err.to_string(),
            };
        }
        err.into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::failure(self.message))).into_response()
    }
}

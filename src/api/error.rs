//! HTTP error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::ReportError;

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable code for programmatic handling
    pub code: String,
    /// Human-readable message
    pub message: String,
}

/// Handler error; wraps a [`ReportError`] and picks the status from its variant.
#[derive(Debug)]
pub struct ApiError(pub ReportError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            ReportError::NotFound(_) => StatusCode::NOT_FOUND,
            ReportError::Validation(_) => StatusCode::BAD_REQUEST,
            ReportError::Conflict(_) => StatusCode::CONFLICT,
            ReportError::LimitExceeded(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ReportError::Connection(_)
            | ReportError::Query(_)
            | ReportError::Config(_)
            | ReportError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self.0 {
            ReportError::NotFound(_) => "NOT_FOUND",
            ReportError::Validation(_) => "BAD_REQUEST",
            ReportError::Conflict(_) => "CONFLICT",
            ReportError::LimitExceeded(_) => "LIMIT_EXCEEDED",
            ReportError::Connection(_) | ReportError::Query(_) => "DATABASE_ERROR",
            ReportError::Config(_) | ReportError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}: {}", self.0.category(), self.0);
        }
        let body = ErrorBody {
            code: self.code().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

//! Mapping of core and auth failures onto HTTP responses.
//!
//! Body shape: `{"error": "<code>", "message": "<human readable>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::common::{AuthError, CoreError};

#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    Auth(AuthError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(err) => match err {
                CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                CoreError::InvalidTransition { .. }
                | CoreError::EventFull
                | CoreError::AlreadyRegistered
                | CoreError::AlreadyLiked
                | CoreError::NotLiked => StatusCode::CONFLICT,
                CoreError::InvalidReason { .. }
                | CoreError::EventNotOpen
                | CoreError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CoreError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            ApiError::Auth(err) => match err {
                AuthError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
                AuthError::AdminRequired(_) => StatusCode::FORBIDDEN,
            },
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Core(err) => err.code(),
            ApiError::Auth(AuthError::AuthenticationRequired) => "authentication_required",
            ApiError::Auth(AuthError::AdminRequired(_)) => "admin_required",
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Core(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Core(CoreError::StorageUnavailable(source)) => {
                error!(error = ?source, "Storage unavailable");
                "storage is temporarily unavailable, retry the request".to_string()
            }
            ApiError::Core(err) => err.to_string(),
            ApiError::Auth(err) => err.to_string(),
        };

        let body = ErrorBody {
            error: self.code(),
            message,
        };

        (self.status(), Json(body)).into_response()
    }
}

//! Custom error types for the API service

use auth::AuthError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::error::ValidationErrors;
use media::PhotoError;
use thiserror::Error;
use tracing::error;

use crate::response::ErrorBody;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Photo(#[from] PhotoError),

    /// Request could not be parsed into the expected shape
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    /// No route matched
    #[error("API endpoint not found")]
    RouteNotFound,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Rejected {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(e) => match e {
                AuthError::NotFound => StatusCode::NOT_FOUND,
                AuthError::DuplicateUsername => StatusCode::CONFLICT,
                AuthError::InvalidRegisterKey
                | AuthError::Forbidden(_)
                | AuthError::SelfDeletion
                | AuthError::SelfStatusChange => StatusCode::FORBIDDEN,
                AuthError::InvalidCredentials
                | AuthError::AccountInactive
                | AuthError::MissingToken
                | AuthError::TokenExpired
                | AuthError::TokenInvalid
                | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
                AuthError::CurrentPasswordRequired | AuthError::CurrentPasswordIncorrect => {
                    StatusCode::BAD_REQUEST
                }
                AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                AuthError::Hashing(_) | AuthError::TokenIssue(_) | AuthError::Store(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Photo(e) => match e {
                PhotoError::NotFound | PhotoError::NoPhotos => StatusCode::NOT_FOUND,
                PhotoError::PermissionDenied => StatusCode::FORBIDDEN,
                PhotoError::MissingUrl | PhotoError::Validation(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                PhotoError::MissingFile | PhotoError::InvalidFile(_) => StatusCode::BAD_REQUEST,
                PhotoError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                PhotoError::Upload(_) | PhotoError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Rejected { status, .. } => *status,
            ApiError::RouteNotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Per-field errors for validation failures
    fn field_errors(&self) -> Option<ValidationErrors> {
        match self {
            ApiError::Auth(AuthError::Validation(errors))
            | ApiError::Photo(PhotoError::Validation(errors)) => Some(errors.clone()),
            ApiError::Photo(PhotoError::MissingUrl) => {
                Some(ValidationErrors::single("url", PhotoError::MissingUrl.to_string()))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = if status.is_server_error() {
            error!("Request failed: {}", self);
            ErrorBody::new("Internal server error").with_detail(self.to_string())
        } else if let Some(errors) = self.field_errors() {
            ErrorBody::new("Validation failed").with_errors(errors)
        } else {
            ErrorBody::new(self.to_string())
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

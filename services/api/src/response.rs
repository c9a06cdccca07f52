//! JSON response envelope
//!
//! Every response body carries `success`, `message` and an RFC 3339
//! `timestamp`. Successful responses add `data` (and `pagination` for
//! paged lists); failures may add per-field `errors` or, in diagnostic
//! mode, an `error` detail.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use common::error::ValidationErrors;
use common::pagination::{Page, Pagination};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

static DIAGNOSTICS: AtomicBool = AtomicBool::new(false);

/// Include internal error details in failure responses
pub fn set_diagnostics(enabled: bool) {
    DIAGNOSTICS.store(enabled, Ordering::Relaxed);
}

pub fn diagnostics_enabled() -> bool {
    DIAGNOSTICS.load(Ordering::Relaxed)
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Successful response
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    #[serde(skip)]
    status: StatusCode,
    success: bool,
    message: String,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pagination: Option<Pagination>,
    timestamp: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::OK,
            success: true,
            message: message.into(),
            data,
            pagination: None,
            timestamp: timestamp(),
        }
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self {
            status: StatusCode::CREATED,
            ..Self::ok(message, data)
        }
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    pub fn paginated(message: impl Into<String>, page: Page<T>) -> Self {
        Self {
            pagination: Some(page.pagination),
            ..Self::ok(message, page.data)
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload; `data` is `null`
    pub fn message(message: impl Into<String>) -> Self {
        Self::ok(message, ())
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Failure body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<ValidationErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    timestamp: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
            error: None,
            timestamp: timestamp(),
        }
    }

    pub fn with_errors(mut self, errors: ValidationErrors) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Attach an internal detail, dropped unless diagnostics are on
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        if diagnostics_enabled() {
            self.error = Some(detail.into());
        }
        self
    }
}

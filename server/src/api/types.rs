//! Shared API types
//!
//! Error mapping from domain and store failures onto HTTP responses. Every
//! error body carries `{ ok: false, error, code }` so the UI collaborator
//! can branch without inspecting status codes.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::data::duckdb::DuckdbError;
use crate::domain::pages::view::ViewError;

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    ServiceUnavailable { message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    pub fn from_duckdb(e: DuckdbError) -> Self {
        match e {
            DuckdbError::Timeout { timeout_secs } => Self::service_unavailable(format!(
                "Query timed out after {timeout_secs}s"
            )),
            other => {
                tracing::error!(error = %other, "DuckDB error");
                Self::internal("Database operation failed")
            }
        }
    }
}

impl From<ViewError> for ApiError {
    fn from(e: ViewError) -> Self {
        match e {
            ViewError::UnknownPage(id) => {
                Self::not_found("UNKNOWN_PAGE", format!("Unknown page: {id}"))
            }
            ViewError::UnknownSavedFilter(id) => {
                Self::not_found("UNKNOWN_SAVED_FILTER", format!("Unknown saved filter: {id}"))
            }
            ViewError::MissingTable(table) => {
                tracing::error!(table, "Page references a missing table");
                Self::internal("Page table not found")
            }
            ViewError::Filter(e) => Self::bad_request("INVALID_FILTER", e.to_string()),
            ViewError::Store(e) => Self::from_duckdb(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, code, message),
            Self::ServiceUnavailable { message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE".to_string(),
                message,
            ),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "ok": false,
                "error": message,
                "code": code
            })),
        )
            .into_response()
    }
}

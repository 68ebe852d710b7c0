//! Error types for Brandsheet services
//!
//! One [`AppError`] covers every way a sync request can fail. On the way
//! out it becomes a `{ error, code }` body. Failures of the sheet or its
//! backend are 500s; only requests the gateway cannot parse are 400s.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Machine-readable failure kind, sent next to the message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Request (1xxx)
    InvalidRequest,
    MalformedJson,

    // Sheet (4xxx)
    SheetNotFound,

    // Backend (8xxx)
    SpreadsheetUnavailable,
    MissingCredentials,

    // Gateway (9xxx)
    Internal,
    Misconfigured,
}

impl ErrorCode {
    /// Numeric form; the thousands digit is the family
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::InvalidRequest => 1001,
            ErrorCode::MalformedJson => 1002,
            ErrorCode::SheetNotFound => 4001,
            ErrorCode::SpreadsheetUnavailable => 8001,
            ErrorCode::MissingCredentials => 8002,
            ErrorCode::Internal => 9001,
            ErrorCode::Misconfigured => 9002,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    /// Well-formed JSON of the wrong shape, e.g. an unknown action
    #[error("Invalid request: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    #[error("Malformed request body: {message}")]
    InvalidFormat { message: String },

    #[error("Sheet \"{title}\" not found")]
    SheetNotFound { title: String },

    /// The service account or spreadsheet id is absent or unusable
    #[error("Missing spreadsheet credentials: {message}")]
    MissingCredentials { message: String },

    #[error("Spreadsheet service error: {message}")]
    Upstream { message: String },

    #[error("Spreadsheet service unreachable: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Could not encode spreadsheet payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Shorthand for an upstream failure with a formatted message
    pub fn upstream(message: impl Into<String>) -> Self {
        AppError::Upstream {
            message: message.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::InvalidRequest,
            AppError::InvalidFormat { .. } => ErrorCode::MalformedJson,
            AppError::SheetNotFound { .. } => ErrorCode::SheetNotFound,
            AppError::MissingCredentials { .. } => ErrorCode::MissingCredentials,
            AppError::Upstream { .. } | AppError::HttpClient(_) => ErrorCode::SpreadsheetUnavailable,
            AppError::Configuration { .. } => ErrorCode::Misconfigured,
            AppError::Internal { .. } | AppError::Serialization(_) | AppError::Other(_) => {
                ErrorCode::Internal
            }
        }
    }

    /// Whether the request itself was unusable
    pub fn is_caller_fault(&self) -> bool {
        matches!(self, AppError::Validation { .. } | AppError::InvalidFormat { .. })
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_caller_fault() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Body of every failed sync response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable message, never a stack trace
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            error: err.to_string(),
            code: Some(err.code()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::from(&self);

        if self.is_caller_fault() {
            tracing::warn!(code = ?body.code, error = %body.error, "Rejected sync request");
        } else {
            tracing::error!(
                code = ?body.code,
                error = %body.error,
                status = status.as_u16(),
                "Sync request failed"
            );
        }

        (status, Json(body)).into_response()
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration {
            message: err.to_string(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::MissingCredentials {
            message: format!("Unable to sign service account assertion: {}", err),
        }
    }
}

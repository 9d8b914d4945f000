//! # API Error Type
//!
//! Unified error type for console commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Console                            │
//! │                                                                         │
//! │  depot report --from 2025-01-01 --to 2025-01-31                         │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<String, ApiError>                                        │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Bad date? ──────── ReportError::InvalidRange ────┐             │  │
//! │  │         │                                         │             │  │
//! │  │         ▼                                         ▼             │  │
//! │  │  Backend error? ─── StoreError::Backend ──────── ApiError ─────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  stderr: error: [REPORT_QUERY_FAILED] JWT expired                      │
//! │  exit code 1                                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! With `--json` the error is printed as `{"code": "...", "message": "..."}`.

use serde::Serialize;
use std::fmt;

use depot_core::{CoreError, ReportError, ValidationError};
use depot_store::StoreError;

use crate::state::ConfigError;

/// API error returned from console commands.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for scripts
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Report dates missing or malformed
    InvalidRange,

    /// The backend failed the report query
    ReportQueryFailed,

    /// Any other backend failure
    BackendError,

    /// No session, or it expired
    NotAuthenticated,

    /// Configuration file or environment unusable
    ConfigError,

    /// Writing the export failed
    ExportError,

    /// Internal error
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::InvalidRange => "INVALID_RANGE",
            ErrorCode::ReportQueryFailed => "REPORT_QUERY_FAILED",
            ErrorCode::BackendError => "BACKEND_ERROR",
            ErrorCode::NotAuthenticated => "NOT_AUTHENTICATED",
            ErrorCode::ConfigError => "CONFIG_ERROR",
            ErrorCode::ExportError => "EXPORT_ERROR",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    pub fn not_authenticated() -> Self {
        ApiError::new(
            ErrorCode::NotAuthenticated,
            "Not signed in. Run `depot login` first",
        )
    }
}

/// Converts backend errors to API errors.
///
/// Backend messages are passed through unchanged.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotAuthenticated => ApiError::not_authenticated(),
            StoreError::AuthFailed(message) => {
                ApiError::new(ErrorCode::NotAuthenticated, message)
            }
            StoreError::Backend {
                status: 401,
                message,
                ..
            } => ApiError::new(ErrorCode::NotAuthenticated, message),
            StoreError::Backend { message, .. } => ApiError::new(ErrorCode::BackendError, message),
            StoreError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            StoreError::Invalid(e) => ApiError::validation(e.to_string()),
            StoreError::InvalidConfig(message) => ApiError::new(ErrorCode::ConfigError, message),
            err @ (StoreError::Http(_) | StoreError::Decode(_)) => {
                tracing::error!("Backend request failed: {}", err);
                ApiError::new(ErrorCode::BackendError, err.to_string())
            }
        }
    }
}

/// Converts report pipeline errors to API errors.
impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::InvalidRange(_) => ApiError::new(ErrorCode::InvalidRange, err.to_string()),
            ReportError::ReportQueryFailed(message) => {
                tracing::error!("Report query failed: {}", message);
                ApiError::new(ErrorCode::ReportQueryFailed, message)
            }
            ReportError::ExportNoOp => ApiError::new(ErrorCode::ExportError, err.to_string()),
            ReportError::Export(_) => ApiError::new(ErrorCode::ExportError, err.to_string()),
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::EmptyCatalog => ApiError::new(ErrorCode::NotFound, err.to_string()),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("I/O error: {}", err);
        ApiError::new(ErrorCode::ExportError, err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for console commands.
pub type ApiResult<T> = Result<T, ApiError>;

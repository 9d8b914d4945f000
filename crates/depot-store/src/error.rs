//! # Store Error Types
//!
//! Error types for backend operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  reqwest::Error / non-2xx response / bad row                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Keeps the backend's own message            │
//! │       │                                                                 │
//! │       ├──► ReportError::ReportQueryFailed (report pipeline)            │
//! │       ▼                                                                 │
//! │  ApiError (console) ← Printed as [CODE] message                        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use depot_core::{ReportError, ValidationError};
use thiserror::Error;

/// Backend operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request never got a response.
    ///
    /// ## When This Occurs
    /// - No network / DNS failure
    /// - Timeout
    /// - TLS handshake failure
    #[error("Network error: {0}")]
    Http(String),

    /// The backend answered with a non-2xx status.
    ///
    /// `message` is the backend's own text (PostgREST `message`, GoTrue
    /// `error_description` / `msg`), unmodified.
    #[error("{message}")]
    Backend {
        status: u16,
        message: String,
        code: Option<String>,
    },

    /// The response body didn't have the expected shape.
    ///
    /// ## When This Occurs
    /// - A column was renamed or removed on the backend
    /// - A value outside the known vocabulary (e.g. a new payment method)
    /// - A sale item with a non-positive quantity
    #[error("Unexpected response from backend: {0}")]
    Decode(String),

    /// No session, or the session could not be refreshed.
    #[error("Not signed in")]
    NotAuthenticated,

    /// Sign-in or token refresh was rejected.
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Backend URL or key unusable.
    #[error("Invalid backend configuration: {0}")]
    InvalidConfig(String),

    /// Input rejected before any request was made.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Entity not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },
}

impl StoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        StoreError::Decode(message.into())
    }

    /// True when the operator has to sign in again.
    pub fn is_auth(&self) -> bool {
        match self {
            StoreError::NotAuthenticated | StoreError::AuthFailed(_) => true,
            StoreError::Backend { status, .. } => *status == 401,
            _ => false,
        }
    }
}

/// Convert reqwest errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// body decode failure   → StoreError::Decode
/// builder (bad URL)     → StoreError::InvalidConfig
/// everything else       → StoreError::Http
/// ```
impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else if err.is_builder() {
            StoreError::InvalidConfig(err.to_string())
        } else {
            StoreError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for StoreError {
    fn from(err: url::ParseError) -> Self {
        StoreError::InvalidConfig(err.to_string())
    }
}

/// A failed report fetch keeps the store's message verbatim.
impl From<StoreError> for ReportError {
    fn from(err: StoreError) -> Self {
        ReportError::ReportQueryFailed(err.to_string())
    }
}

/// Result type for backend operations.
pub type StoreResult<T> = Result<T, StoreError>;

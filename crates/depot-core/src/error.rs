//! # Error Types
//!
//! Domain-specific error types for depot-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  depot-core errors (this file)                                         │
//! │  ├── CoreError        - General domain errors                          │
//! │  ├── ReportError      - Sales report pipeline failures                 │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  depot-store errors (separate crate)                                   │
//! │  └── StoreError       - Backend call failures                          │
//! │                                                                         │
//! │  Console errors (in app)                                               │
//! │  └── ApiError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → StoreError → ApiError → Terminal  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these are fatal. The console prints them and keeps whatever it
//! was showing before.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found in the catalog that was loaded.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// The catalog has no products at all, so a sale form has no default.
    #[error("No products available")]
    EmptyCatalog,

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Report Error
// =============================================================================

/// Failures of the sales report pipeline.
///
/// ## User Workflow
/// ```text
/// Filter change
///      │
///      ▼
/// DateRange::build ──── bad/empty day ───► InvalidRange (no query sent)
///      │
///      ▼
/// Report query ──────── backend error ───► ReportQueryFailed (old rows stay)
///      │
///      ▼
/// Export ────────────── nothing loaded ──► ExportNoOp (silently skipped)
/// ```
#[derive(Debug, Error)]
pub enum ReportError {
    /// A range boundary is empty or not a `YYYY-MM-DD` calendar day.
    ///
    /// ## When This Occurs
    /// - The operator cleared one of the date inputs
    /// - A typo such as `2025-13-01` or `01/02/2025`
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    /// The backend rejected or failed the report query.
    ///
    /// The message is the backend's own, passed through verbatim.
    #[error("{0}")]
    ReportQueryFailed(String),

    /// Export was requested before any report was loaded.
    #[error("Nothing to export")]
    ExportNoOp,

    /// The CSV writer failed while serializing into memory.
    #[error("CSV export failed: {0}")]
    Export(String),
}

impl ReportError {
    /// Builds an `InvalidRange` for one side of the range.
    pub fn invalid_day(field: &str, value: &str) -> Self {
        if value.trim().is_empty() {
            ReportError::InvalidRange(format!("{field} date is required"))
        } else {
            ReportError::InvalidRange(format!("{field} date '{value}' is not YYYY-MM-DD"))
        }
    }

    /// True for errors the console should not even mention.
    pub fn is_silent(&self) -> bool {
        matches!(self, ReportError::ExportNoOp)
    }
}

impl From<csv::Error> for ReportError {
    fn from(err: csv::Error) -> Self {
        ReportError::Export(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when operator input doesn't meet requirements.
/// Used for early validation before anything is sent to the backend.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

pub type CoreResult<T> = Result<T, CoreError>;

pub type ReportResult<T> = Result<T, ReportError>;

// =============================================================================
// Unit Tests
// =============================================================================

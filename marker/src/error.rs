//! Marker Error Types
//!
//! This module defines [`MarkerError`], the single error type returned by the grading
//! engine, and [`StoreError`], the error type of the [`ResultStore`](crate::traits::store::ResultStore)
//! boundary.
//!
//! Errors fall into three groups:
//! - caller errors (`UnknownLabel`, `UnknownQuestion`, `SessionNotOpen`) that leave the
//!   session untouched,
//! - configuration or data errors (`InvalidPolicy`, `InvalidCatalog`, `InvalidRecord`),
//! - fatal invariant failures (`OutOfBoundsMark`, `AggregationInvariantViolation`), which
//!   mean the engine refused to report a total rather than report a wrong one.
//!
//! Persistence failures are carried unchanged inside [`MarkerError::Persistence`].
//!
//! # Example
//!
//! ```rust
//! use exam_marker::error::MarkerError;
//!
//! fn require_label(label: &str) -> Result<(), MarkerError> {
//!     if label.trim().is_empty() {
//!         return Err(MarkerError::UnknownLabel(label.to_string()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Represents all error types that can occur in the grading engine.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MarkerError {
    /// An assessment label outside the configured set was supplied.
    #[error("Unknown assessment label: '{0}'")]
    UnknownLabel(String),
    /// An edit named a question that is not part of the session's catalog.
    #[error("Unknown question: '{0}'")]
    UnknownQuestion(String),
    /// An awarded mark fell outside `[0, max_mark]`, or could not be clamped (NaN).
    #[error("Mark {mark} for question '{question_id}' is outside [0, {max_mark}]")]
    OutOfBoundsMark {
        question_id: String,
        mark: f64,
        max_mark: f64,
    },
    /// Aggregation found inconsistent data. Fatal: no total is reported.
    #[error("Aggregation invariant violated: {0}")]
    AggregationInvariantViolation(String),
    /// The assessment policy table was rejected at construction.
    #[error("Invalid assessment policy: {0}")]
    InvalidPolicy(String),
    /// The question catalog was rejected at construction.
    #[error("Invalid question catalog: {0}")]
    InvalidCatalog(String),
    /// A stored or wire-format result record could not be used.
    #[error("Invalid result record: {0}")]
    InvalidRecord(String),
    /// An edit or save was attempted before a session was opened.
    #[error("No grading session is open")]
    SessionNotOpen,
    /// The result store failed; propagated unchanged.
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Failures reported by a result store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// I/O error (unreadable file, failed write or rename, ...).
    #[error("Result store I/O error: {0}")]
    Io(String),
    /// A stored record could not be encoded or decoded.
    #[error("Result store serialization error: {0}")]
    Serialization(String),
    /// The store refused the operation.
    #[error("Result store rejected the request: {0}")]
    Rejected(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

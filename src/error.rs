//! Crate-level error type.
//!
//! Only the run driver and the batch-key boundary can fail. The GA
//! operators themselves are total over well-formed timetables.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors surfaced by the timetabling entry points.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimetableError {
    /// No batches were supplied, so there is nothing to schedule.
    #[error("no active batches supplied; nothing to schedule")]
    NoBatches,

    /// A batch label did not decompose into exactly four components.
    #[error("malformed batch key '{input}': expected 4 comma-separated components, found {found}")]
    MalformedBatchKey {
        /// The offending label.
        input: String,
        /// Number of components actually found.
        found: usize,
    },

    /// GA parameters are unusable (e.g. zero population).
    #[error("invalid GA configuration: {0}")]
    InvalidConfig(String),

    /// The subject catalog failed validation.
    #[error("invalid timetable input: {} problem(s), first: {}", .0.len(), .0.first().map(|e| e.message.as_str()).unwrap_or("-"))]
    InvalidInput(Vec<ValidationError>),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, TimetableError>;

//! Input validation for timetabling problems.
//!
//! Checks structural integrity of the subject catalog before a run.
//! Detects:
//! - Batches requested for the run but missing from the catalog
//! - Batches with no subjects
//! - Subjects with no teacher candidates
//! - Duplicate subject names within a batch
//!
//! Cap inversions and out-of-range caps are not errors here;
//! [`SubjectConstraints`] corrects them on construction and cannot be
//! built any other way.
//!
//! [`SubjectConstraints`]: crate::models::SubjectConstraints

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::models::{BatchKey, SubjectCatalog};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// A batch scheduled for the run has no catalog entry.
    UnknownBatch,
    /// A batch has an empty subject list.
    EmptyBatch,
    /// A subject has no teacher candidates.
    EmptyTeacherList,
    /// Two subjects in the same batch share a name.
    DuplicateSubject,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validates the catalog for a run over `batches`.
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_catalog(catalog: &SubjectCatalog, batches: &[BatchKey]) -> ValidationResult {
    let mut errors = Vec::new();

    for batch in batches {
        if !catalog.contains(batch) {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownBatch,
                format!("Batch '{batch}' has no subjects in the catalog"),
            ));
            continue;
        }

        let subjects = catalog.subjects(batch);
        if subjects.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyBatch,
                format!("Batch '{batch}' has an empty subject list"),
            ));
        }

        let mut names = HashSet::new();
        for subject in subjects {
            if !names.insert(subject.name.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateSubject,
                    format!("Duplicate subject '{}' in batch '{batch}'", subject.name),
                ));
            }
            if !subject.has_teachers() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::EmptyTeacherList,
                    format!(
                        "Subject '{}' in batch '{batch}' has no teacher candidates",
                        subject.name
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

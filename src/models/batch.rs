//! Batch identity.
//!
//! A batch is a student cohort identified by four ordered components:
//! course, year, semester, and batch id. [`BatchKey`] is the single
//! structured representation; its `Display` impl is the one canonical
//! formatter and its `FromStr` impl the one canonical parser, used
//! wherever the identity crosses a string boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TimetableError;

/// Component separator used by the canonical label format.
pub const BATCH_KEY_SEPARATOR: char = ',';

/// Four-component batch identity.
///
/// Ordering is component-wise (course, year, semester, batch), which keeps
/// batch iteration stable across runs. Serializes as its canonical label,
/// so it can key JSON objects directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct BatchKey {
    /// Course identifier.
    pub course_id: String,
    /// Academic year.
    pub year: String,
    /// Semester within the year.
    pub semester: String,
    /// Batch (section) identifier.
    pub batch_id: String,
}

impl BatchKey {
    /// Creates a key, trimming surrounding whitespace from each component.
    pub fn new(
        course_id: impl Into<String>,
        year: impl Into<String>,
        semester: impl Into<String>,
        batch_id: impl Into<String>,
    ) -> Self {
        Self {
            course_id: trimmed(course_id.into()),
            year: trimmed(year.into()),
            semester: trimmed(semester.into()),
            batch_id: trimmed(batch_id.into()),
        }
    }

    /// Parses a label such as `"1, 2024, 1, A"`.
    ///
    /// Whitespace around components is ignored. Fails with
    /// [`TimetableError::MalformedBatchKey`] unless exactly four
    /// components are present.
    pub fn parse(label: &str) -> Result<Self, TimetableError> {
        let parts: Vec<&str> = label.split(BATCH_KEY_SEPARATOR).map(str::trim).collect();
        match parts.as_slice() {
            [course, year, semester, batch] => Ok(Self::new(*course, *year, *semester, *batch)),
            _ => Err(TimetableError::MalformedBatchKey {
                input: label.to_string(),
                found: parts.len(),
            }),
        }
    }

    /// Component tuple, in identity order.
    pub fn components(&self) -> (&str, &str, &str, &str) {
        (&self.course_id, &self.year, &self.semester, &self.batch_id)
    }

    /// Whether a free-form label names this batch (component-wise).
    pub fn matches_label(&self, label: &str) -> bool {
        Self::parse(label).map(|k| &k == self).unwrap_or(false)
    }
}

fn trimmed(s: String) -> String {
    let t = s.trim();
    if t.len() == s.len() {
        s
    } else {
        t.to_string()
    }
}

impl fmt::Display for BatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep} {}{sep} {}{sep} {}",
            self.course_id,
            self.year,
            self.semester,
            self.batch_id,
            sep = BATCH_KEY_SEPARATOR
        )
    }
}

impl FromStr for BatchKey {
    type Err = TimetableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<BatchKey> for String {
    fn from(key: BatchKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for BatchKey {
    type Error = TimetableError;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        Self::parse(&label)
    }
}

//! Subject, teacher, and per-batch catalog models.
//!
//! Subjects are scoped to one batch and carry their own period caps.
//! A [`SubjectCatalog`] maps every batch to its ordered subject list;
//! timetable slots refer to subjects and teachers by index into that list.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{BatchKey, DAYS_PER_WEEK, PERIODS_PER_DAY};
use crate::error::TimetableError;

/// Daily cap applied when no explicit configuration exists.
pub const DEFAULT_MAX_PERIODS_PER_DAY: u32 = 1;
/// Weekly cap applied when no explicit configuration exists.
pub const DEFAULT_MAX_PERIODS_PER_WEEK: u32 = 3;

const MAX_PER_DAY: u32 = PERIODS_PER_DAY as u32;
const MAX_PER_WEEK: u32 = (DAYS_PER_WEEK * PERIODS_PER_DAY) as u32;

/// A teacher qualified for a subject.
///
/// The name is the cross-batch identity used for conflict detection.
/// Contact metadata is carried through for presentation only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    /// Display name; also the identity for double-booking checks.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_path: Option<String>,
}

impl Teacher {
    /// Creates a teacher with no contact metadata.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            phone: None,
            department: None,
            appointment_date: None,
            photo_path: None,
        }
    }

    /// Sets the email address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the department.
    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }
}

/// Per-subject period caps.
///
/// Construction normalizes the pair: the daily cap lies in
/// `1..=PERIODS_PER_DAY` and the weekly cap in `daily..=DAYS_PER_WEEK *
/// PERIODS_PER_DAY`. The fields are private so [`SubjectConstraints::new`]
/// and deserialization are the only ways in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawConstraints")]
pub struct SubjectConstraints {
    max_periods_per_day: u32,
    max_periods_per_week: u32,
}

#[derive(Deserialize)]
struct RawConstraints {
    #[serde(default = "default_per_day")]
    max_periods_per_day: u32,
    #[serde(default = "default_per_week")]
    max_periods_per_week: u32,
}

fn default_per_day() -> u32 {
    DEFAULT_MAX_PERIODS_PER_DAY
}

fn default_per_week() -> u32 {
    DEFAULT_MAX_PERIODS_PER_WEEK
}

impl From<RawConstraints> for SubjectConstraints {
    fn from(raw: RawConstraints) -> Self {
        Self::new(raw.max_periods_per_day, raw.max_periods_per_week)
    }
}

impl Default for SubjectConstraints {
    fn default() -> Self {
        Self {
            max_periods_per_day: DEFAULT_MAX_PERIODS_PER_DAY,
            max_periods_per_week: DEFAULT_MAX_PERIODS_PER_WEEK,
        }
    }
}

impl SubjectConstraints {
    /// Creates a normalized cap pair.
    pub fn new(max_periods_per_day: u32, max_periods_per_week: u32) -> Self {
        let per_day = max_periods_per_day.clamp(1, MAX_PER_DAY);
        if per_day != max_periods_per_day {
            warn!("daily cap {max_periods_per_day} out of range; clamped to {per_day}");
        }
        let per_week = if max_periods_per_week < per_day {
            warn!(
                "weekly cap {} below daily cap {}; raising weekly cap to {}",
                max_periods_per_week, per_day, per_day
            );
            per_day
        } else if max_periods_per_week > MAX_PER_WEEK {
            warn!("weekly cap {max_periods_per_week} exceeds {MAX_PER_WEEK} slots; clamped");
            MAX_PER_WEEK
        } else {
            max_periods_per_week
        };
        Self {
            max_periods_per_day: per_day,
            max_periods_per_week: per_week,
        }
    }

    /// Maximum occurrences on any single day.
    #[inline]
    pub fn max_periods_per_day(&self) -> u32 {
        self.max_periods_per_day
    }

    /// Maximum occurrences across the week.
    #[inline]
    pub fn max_periods_per_week(&self) -> u32 {
        self.max_periods_per_week
    }
}

/// A subject taught to one batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Subject code (e.g. "CS101").
    pub code: String,
    /// Display name; unique within a batch.
    pub name: String,
    /// Qualified teacher candidates. Non-empty in valid input.
    pub teachers: Vec<Teacher>,
    /// Period caps.
    #[serde(default)]
    pub constraints: SubjectConstraints,
}

impl Subject {
    /// Creates a subject with default caps and no teachers.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            teachers: Vec::new(),
            constraints: SubjectConstraints::default(),
        }
    }

    /// Adds a teacher candidate.
    pub fn with_teacher(mut self, teacher: Teacher) -> Self {
        self.teachers.push(teacher);
        self
    }

    /// Sets the caps (normalized).
    pub fn with_caps(mut self, max_per_day: u32, max_per_week: u32) -> Self {
        self.constraints = SubjectConstraints::new(max_per_day, max_per_week);
        self
    }

    #[inline]
    pub fn max_per_day(&self) -> u32 {
        self.constraints.max_periods_per_day()
    }

    #[inline]
    pub fn max_per_week(&self) -> u32 {
        self.constraints.max_periods_per_week()
    }

    /// Whether the subject can be placed at all.
    #[inline]
    pub fn has_teachers(&self) -> bool {
        !self.teachers.is_empty()
    }
}

/// Subjects for every batch, keyed by batch identity.
///
/// Slot assignments refer to a subject by its position in the batch's
/// list, so the order of each list must not change during a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectCatalog {
    batches: BTreeMap<BatchKey, Vec<Subject>>,
}

impl SubjectCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from string-labelled batches.
    ///
    /// Fails on the first label that is not a valid batch key. Labels that
    /// differ only in whitespace collapse onto the same batch.
    pub fn from_labeled<'a, I>(entries: I) -> Result<Self, TimetableError>
    where
        I: IntoIterator<Item = (&'a str, Vec<Subject>)>,
    {
        let mut catalog = Self::new();
        for (label, subjects) in entries {
            let key = BatchKey::parse(label)?;
            for subject in subjects {
                catalog.add_subject(key.clone(), subject);
            }
        }
        Ok(catalog)
    }

    /// Sets the subject list for a batch, replacing any previous list.
    pub fn insert(&mut self, batch: BatchKey, subjects: Vec<Subject>) {
        self.batches.insert(batch, subjects);
    }

    /// Appends a subject to a batch.
    pub fn add_subject(&mut self, batch: BatchKey, subject: Subject) {
        self.batches.entry(batch).or_default().push(subject);
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_batch(mut self, batch: BatchKey, subjects: Vec<Subject>) -> Self {
        self.insert(batch, subjects);
        self
    }

    /// Subjects for a batch; empty when the batch is unknown.
    pub fn subjects(&self, batch: &BatchKey) -> &[Subject] {
        self.batches.get(batch).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether the catalog knows this batch.
    pub fn contains(&self, batch: &BatchKey) -> bool {
        self.batches.contains_key(batch)
    }

    /// Looks up a subject by batch and index.
    pub fn subject(&self, batch: &BatchKey, index: usize) -> Option<&Subject> {
        self.subjects(batch).get(index)
    }

    /// All batch keys, in order.
    pub fn batch_keys(&self) -> Vec<BatchKey> {
        self.batches.keys().cloned().collect()
    }

    /// Iterates `(batch, subjects)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&BatchKey, &[Subject])> {
        self.batches.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }
}

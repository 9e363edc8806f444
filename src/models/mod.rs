//! Timetabling domain models.
//!
//! Provides the data types for weekly academic timetabling: batch
//! identity, subjects with period caps, teacher candidates, and the
//! per-batch week grid.
//!
//! # Domain Mappings
//!
//! | u-timetable | School | University |
//! |-------------|--------|------------|
//! | Batch | Class/Section | Course cohort |
//! | Subject | Subject | Course module |
//! | Teacher | Teacher | Lecturer |
//! | Slot | Period | Lecture hour |

mod batch;
mod subject;
mod timetable;

pub use batch::{BatchKey, BATCH_KEY_SEPARATOR};
pub use subject::{
    Subject, SubjectCatalog, SubjectConstraints, Teacher, DEFAULT_MAX_PERIODS_PER_DAY,
    DEFAULT_MAX_PERIODS_PER_WEEK,
};
pub use timetable::{Slot, Timetable, WeekGrid, Weekday, DAYS_PER_WEEK, PERIODS_PER_DAY};

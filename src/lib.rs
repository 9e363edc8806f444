//! Weekly academic timetabling for the U-Engine ecosystem.
//!
//! Builds a Monday–Friday, seven-period timetable for a set of student
//! batches with a genetic algorithm, enforces per-subject daily and weekly
//! caps, and reports compliance of the result.
//!
//! # Modules
//!
//! - **`models`**: Domain types — `BatchKey`, `Subject`, `Teacher`,
//!   `SubjectCatalog`, `Slot`, `WeekGrid`, `Timetable`
//! - **`validation`**: Catalog integrity checks (unknown batches, missing teachers)
//! - **`ga`**: Population, fitness, operators, repair, and the GA driver
//! - **`analysis`**: Per-batch, per-subject compliance reporting
//! - **`error`**: Crate error type
//!
//! # Example
//!
//! ```
//! use u_timetable::models::{BatchKey, Subject, SubjectCatalog, Teacher};
//!
//! let batch = BatchKey::new("1", "2024", "1", "A");
//! let catalog = SubjectCatalog::new().with_batch(
//!     batch.clone(),
//!     vec![
//!         Subject::new("M1", "Math").with_teacher(Teacher::new("Alice")).with_caps(2, 4),
//!         Subject::new("P1", "Physics").with_teacher(Teacher::new("Bob")).with_caps(1, 3),
//!     ],
//! );
//!
//! let result = u_timetable::run(&catalog, &[batch.clone()], 10, 50, 0.1).unwrap();
//! let report = u_timetable::analyze(&result.timetable, &catalog, &[batch]);
//! assert!(report.skipped.is_empty());
//! ```
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Schaerf (1999), "A Survey of Automated Timetabling"

pub mod analysis;
pub mod error;
pub mod ga;
pub mod models;
pub mod validation;

pub use analysis::{analyze, ComplianceReport};
pub use error::{Result, TimetableError};
pub use ga::{run, GaConfig, GaResult, GaRunner};

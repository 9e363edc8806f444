//! GA-based timetable search.
//!
//! A timetable is its own chromosome: one week grid per batch. The
//! operators work directly on grids and keep weekly caps in view, so no
//! decoding step is needed.
//!
//! # Submodules
//!
//! - [`population`]: Random, weekly-cap-aware initial timetables
//! - [`fitness`]: Penalty evaluation (caps, teacher conflicts, layout)
//! - [`operators`]: Tournament selection, day crossover, slot mutation
//! - [`repair`]: Deterministic post-search cap enforcement and compaction
//!
//! The driver ([`GaRunner`], [`run`]) ties these together.
//!
//! # Reference
//! Burke & Petrovic (2002), "Recent research directions in automated timetabling"

mod config;
pub mod fitness;
pub mod operators;
pub mod population;
pub mod repair;
mod runner;

pub use config::{FitnessWeights, GaConfig};
pub use fitness::FitnessEvaluator;
pub use repair::{repair, RepairStats};
pub use runner::{run, GaResult, GaRunner};

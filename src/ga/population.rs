//! Initial population generation.
//!
//! Each individual is built independently: for every batch and day the
//! periods are visited in shuffled order, and each is filled with a
//! probability of `assign_probability` by a subject still under its weekly
//! cap. Daily caps are deliberately not enforced here; the evaluator
//! penalizes them and the repair pass removes what survives.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use crate::models::{
    BatchKey, Slot, Subject, SubjectCatalog, Timetable, WeekGrid, Weekday, PERIODS_PER_DAY,
};

/// Subject indices whose weekly count is still below the cap and that have
/// at least one teacher.
pub(crate) fn eligible_subjects(subjects: &[Subject], weekly_counts: &[u32]) -> Vec<usize> {
    subjects
        .iter()
        .enumerate()
        .filter(|(i, s)| s.has_teachers() && weekly_counts.get(*i).copied().unwrap_or(0) < s.max_per_week())
        .map(|(i, _)| i)
        .collect()
}

/// Picks a random eligible subject and one of its teachers.
pub(crate) fn random_assignment<R: Rng>(
    subjects: &[Subject],
    weekly_counts: &[u32],
    rng: &mut R,
) -> Option<Slot> {
    let subject = *eligible_subjects(subjects, weekly_counts).choose(rng)?;
    let teacher = random_teacher(&subjects[subject], rng)?;
    Some(Slot::assigned(subject, teacher))
}

/// Uniformly picks a teacher index for a subject.
pub(crate) fn random_teacher<R: Rng>(subject: &Subject, rng: &mut R) -> Option<usize> {
    if subject.teachers.is_empty() {
        None
    } else {
        Some(rng.random_range(0..subject.teachers.len()))
    }
}

fn fill_week<R: Rng>(grid: &mut WeekGrid, subjects: &[Subject], assign_probability: f64, rng: &mut R) {
    let mut weekly_counts = vec![0u32; subjects.len()];
    for day in Weekday::ALL {
        let mut order: [usize; PERIODS_PER_DAY] = std::array::from_fn(|p| p);
        order.shuffle(rng);

        for period in order {
            if !rng.random_bool(assign_probability) {
                continue;
            }
            if let Some(slot) = random_assignment(subjects, &weekly_counts, rng) {
                if let Some(s) = slot.subject() {
                    weekly_counts[s] += 1;
                }
                grid.set(day, period, slot);
            }
        }
    }
}

/// Builds one random timetable over `batches`.
pub fn random_timetable<R: Rng>(
    catalog: &SubjectCatalog,
    batches: &[BatchKey],
    assign_probability: f64,
    rng: &mut R,
) -> Timetable {
    let mut timetable = Timetable::new(batches);
    for batch in batches {
        let subjects = catalog.subjects(batch);
        if let Some(grid) = timetable.grid_mut(batch) {
            fill_week(grid, subjects, assign_probability, rng);
        }
    }
    timetable
}

/// Builds `size` independent random timetables.
pub fn initial_population<R: Rng>(
    catalog: &SubjectCatalog,
    batches: &[BatchKey],
    size: usize,
    assign_probability: f64,
    rng: &mut R,
) -> Vec<Timetable> {
    (0..size)
        .map(|_| random_timetable(catalog, batches, assign_probability, rng))
        .collect()
}

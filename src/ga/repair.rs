//! Post-search repair and compaction.
//!
//! [`repair`] is the only entry point and always runs, per batch:
//!
//! 1. **Cap enforcement** — clears occurrences past a subject's daily cap
//!    (latest periods of the day first), then past its weekly cap (latest
//!    day and period of the week first).
//! 2. **Compaction** — for subjects still under both caps, extends an
//!    existing occurrence into an adjacent empty period of the same day,
//!    with a freshly drawn teacher, until a cap is reached.
//!
//! Compaction only fills empty slots and never exceeds a cap, so a second
//! `repair` on its output finds nothing to clear and nothing to fill.

use log::trace;
use rand::Rng;

use super::population::random_teacher;
use crate::models::{Slot, Subject, SubjectCatalog, Timetable, WeekGrid, Weekday, PERIODS_PER_DAY};

/// What a repair pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairStats {
    /// Slots cleared for exceeding a daily cap.
    pub cleared_daily: usize,
    /// Slots cleared for exceeding a weekly cap.
    pub cleared_weekly: usize,
    /// Empty slots filled by compaction.
    pub filled: usize,
}

impl RepairStats {
    /// Whether the pass left the timetable untouched.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Enforces caps, then compacts, for every batch of `timetable`.
pub fn repair<R: Rng>(
    timetable: &mut Timetable,
    catalog: &SubjectCatalog,
    rng: &mut R,
) -> RepairStats {
    let mut stats = RepairStats::default();
    for (batch, grid) in timetable.iter_mut() {
        let subjects = catalog.subjects(batch);
        enforce_caps(grid, subjects, &mut stats);
        compact(grid, subjects, rng, &mut stats);
        trace!("repaired batch {batch}: {stats:?}");
    }
    stats
}

fn enforce_caps(grid: &mut WeekGrid, subjects: &[Subject], stats: &mut RepairStats) {
    // Daily: keep the earliest `max_per_day` occurrences of each subject.
    for day in Weekday::ALL {
        let mut seen = vec![0u32; subjects.len()];
        for slot in grid.day_mut(day).iter_mut() {
            let Some(s) = slot.subject() else { continue };
            let Some(subject) = subjects.get(s) else { continue };
            if seen[s] >= subject.max_per_day() {
                *slot = Slot::Empty;
                stats.cleared_daily += 1;
            } else {
                seen[s] += 1;
            }
        }
    }

    // Weekly: trim from the end of the week backwards.
    let counts = grid.weekly_counts(subjects.len());
    for (s, subject) in subjects.iter().enumerate() {
        let mut excess = counts[s].saturating_sub(subject.max_per_week());
        'week: for day in Weekday::ALL.into_iter().rev() {
            for period in (0..PERIODS_PER_DAY).rev() {
                if excess == 0 {
                    break 'week;
                }
                if grid.get(day, period).holds(s) {
                    grid.set(day, period, Slot::Empty);
                    excess -= 1;
                    stats.cleared_weekly += 1;
                }
            }
        }
    }
}

fn compact<R: Rng>(grid: &mut WeekGrid, subjects: &[Subject], rng: &mut R, stats: &mut RepairStats) {
    let mut weekly = grid.weekly_counts(subjects.len());

    for day in Weekday::ALL {
        if grid.empty_runs(day).is_empty() {
            continue;
        }
        for (s, subject) in subjects.iter().enumerate() {
            let mut daily = grid.daily_count(day, s);
            let has_room =
                |weekly: u32, daily: u32| weekly < subject.max_per_week() && daily < subject.max_per_day();

            // Extend rightwards: subject followed by an empty period.
            for p in 0..PERIODS_PER_DAY - 1 {
                if !has_room(weekly[s], daily) {
                    break;
                }
                if grid.get(day, p).holds(s) && grid.get(day, p + 1).is_empty() {
                    let Some(teacher) = random_teacher(subject, rng) else { break };
                    grid.set(day, p + 1, Slot::assigned(s, teacher));
                    weekly[s] += 1;
                    daily += 1;
                    stats.filled += 1;
                }
            }

            // Extend leftwards, scanning right to left so runs keep growing.
            for p in (1..PERIODS_PER_DAY).rev() {
                if !has_room(weekly[s], daily) {
                    break;
                }
                if grid.get(day, p).holds(s) && grid.get(day, p - 1).is_empty() {
                    let Some(teacher) = random_teacher(subject, rng) else { break };
                    grid.set(day, p - 1, Slot::assigned(s, teacher));
                    weekly[s] += 1;
                    daily += 1;
                    stats.filled += 1;
                }
            }
        }
    }
}

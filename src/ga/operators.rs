//! Genetic operators for timetables.
//!
//! - [`select_parents`]: tournament selection over cached penalties
//! - [`day_crossover`]: whole-day inheritance per batch
//! - [`mutate`]: per-slot clear/reassign respecting weekly caps
//!
//! # Usage
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//! use u_timetable::ga::operators::select_parents;
//!
//! let penalties = [40, 10, 25, 90];
//! let mut rng = SmallRng::seed_from_u64(1);
//! let (a, b) = select_parents(&penalties, 4, &mut rng).unwrap();
//! // A full-size tournament always returns the best member.
//! assert_eq!((a, b), (1, 1));
//! ```

use rand::seq::index;
use rand::Rng;

use super::population::random_assignment;
use crate::models::{Slot, SubjectCatalog, Timetable, Weekday, PERIODS_PER_DAY};

/// Runs one tournament and returns the index of the winner.
///
/// Draws `min(tournament_size, len)` distinct members and keeps the one
/// with the lowest penalty (earliest drawn on ties).
pub fn tournament<R: Rng>(penalties: &[i64], tournament_size: usize, rng: &mut R) -> Option<usize> {
    if penalties.is_empty() {
        return None;
    }
    let k = tournament_size.clamp(1, penalties.len());
    index::sample(rng, penalties.len(), k)
        .into_iter()
        .min_by_key(|&i| penalties[i])
}

/// Picks two parents by independent tournaments.
///
/// `penalties[i]` is the fitness of population member `i`. Returns `None`
/// only for an empty population. Selection never touches the members
/// themselves.
pub fn select_parents<R: Rng>(
    penalties: &[i64],
    tournament_size: usize,
    rng: &mut R,
) -> Option<(usize, usize)> {
    let first = tournament(penalties, tournament_size, rng)?;
    let second = tournament(penalties, tournament_size, rng)?;
    Some((first, second))
}

/// Day-granular crossover.
///
/// For every batch and day a fair coin decides whether the child's day is
/// copied from `a` or `b`. Batches missing from `b` are inherited from `a`.
pub fn day_crossover<R: Rng>(a: &Timetable, b: &Timetable, rng: &mut R) -> Timetable {
    let mut child = a.clone();
    for (batch, grid) in child.iter_mut() {
        let donor = b.grid(batch);
        for day in Weekday::ALL {
            let from_b = rng.random_bool(0.5);
            if let (true, Some(donor)) = (from_b, donor) {
                *grid.day_mut(day) = *donor.day(day);
            }
        }
    }
    child
}

/// Mutates a timetable in place.
///
/// Each slot is picked with probability `mutation_rate`. A picked slot is
/// cleared with probability `clear_probability`; otherwise it receives a
/// random subject still under its weekly cap (and a random teacher for
/// it). If no subject is eligible the slot is left unchanged. Weekly
/// counts are tracked per batch as the pass proceeds.
pub fn mutate<R: Rng>(
    timetable: &mut Timetable,
    catalog: &SubjectCatalog,
    mutation_rate: f64,
    clear_probability: f64,
    rng: &mut R,
) {
    for (batch, grid) in timetable.iter_mut() {
        let subjects = catalog.subjects(batch);
        let mut counts = grid.weekly_counts(subjects.len());

        for day in Weekday::ALL {
            for period in 0..PERIODS_PER_DAY {
                if !rng.random_bool(mutation_rate) {
                    continue;
                }
                let old = grid.get(day, period);

                if rng.random_bool(clear_probability) {
                    release(&mut counts, old);
                    grid.set(day, period, Slot::Empty);
                    continue;
                }

                if let Some(new) = random_assignment(subjects, &counts, rng) {
                    release(&mut counts, old);
                    if let Some(c) = new.subject().and_then(|s| counts.get_mut(s)) {
                        *c += 1;
                    }
                    grid.set(day, period, new);
                }
            }
        }
    }
}

fn release(counts: &mut [u32], slot: Slot) {
    if let Some(c) = slot.subject().and_then(|s| counts.get_mut(s)) {
        *c = c.saturating_sub(1);
    }
}

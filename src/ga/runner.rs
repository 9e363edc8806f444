//! Generational GA driver.
//!
//! # Algorithm
//!
//! 1. Build a random initial population and score it.
//! 2. Each generation: fill a same-size population by repeating
//!    {tournament-select 2 parents → day crossover → mutate}, then score it.
//! 3. Keep a copy of the best timetable seen so far.
//! 4. Stop after `max_generations`, when the best penalty reaches 0 or
//!    below, or when the time limit has elapsed (checked between
//!    generations only).
//! 5. Run [`repair`] once on the best timetable.

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};

use super::fitness::FitnessEvaluator;
use super::operators::{day_crossover, mutate, select_parents};
use super::population::initial_population;
use super::repair::{repair, RepairStats};
use super::GaConfig;
use crate::error::TimetableError;
use crate::models::{BatchKey, SubjectCatalog, Timetable};
use crate::validation::validate_catalog;

/// Result of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult {
    /// The repaired best timetable.
    pub timetable: Timetable,
    /// Best penalty found by the search, before repair.
    pub best_penalty: i64,
    /// Penalty of the returned timetable, after repair.
    pub final_penalty: i64,
    /// Generations actually run.
    pub generations: usize,
    /// Whether the search stopped because the penalty reached 0 or below.
    pub target_reached: bool,
    /// Total elapsed time, repair included.
    pub elapsed: Duration,
    /// Best-so-far penalty after each generation.
    pub history: Vec<i64>,
    /// What the final repair pass changed.
    pub repair: RepairStats,
}

/// Timetabling GA runner.
///
/// # Example
///
/// ```
/// use u_timetable::ga::{GaConfig, GaRunner};
/// use u_timetable::models::{BatchKey, Subject, SubjectCatalog, Teacher};
///
/// let batch = BatchKey::new("1", "2024", "1", "A");
/// let catalog = SubjectCatalog::new().with_batch(
///     batch.clone(),
///     vec![Subject::new("M1", "Math").with_teacher(Teacher::new("Alice")).with_caps(2, 4)],
/// );
/// let config = GaConfig::default().with_seed(1).with_max_generations(20);
/// let result = GaRunner::new(&catalog, config).run(&[batch]).unwrap();
/// assert_eq!(result.timetable.batch_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GaRunner<'a> {
    catalog: &'a SubjectCatalog,
    config: GaConfig,
}

impl<'a> GaRunner<'a> {
    pub fn new(catalog: &'a SubjectCatalog, config: GaConfig) -> Self {
        Self { catalog, config }
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Runs the search over `batches`.
    ///
    /// # Errors
    /// - [`TimetableError::NoBatches`] when `batches` is empty.
    /// - [`TimetableError::InvalidConfig`] for unusable parameters.
    /// - [`TimetableError::InvalidInput`] when the catalog fails validation.
    pub fn run(&self, batches: &[BatchKey]) -> Result<GaResult, TimetableError> {
        if batches.is_empty() {
            return Err(TimetableError::NoBatches);
        }
        self.config.validate().map_err(TimetableError::InvalidConfig)?;

        let mut batches = batches.to_vec();
        batches.sort();
        batches.dedup();
        validate_catalog(self.catalog, &batches).map_err(TimetableError::InvalidInput)?;

        let config = &self.config;
        let start = Instant::now();
        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let evaluator = FitnessEvaluator::new(self.catalog, config.weights);

        info!(
            "Starting timetable GA: {} batches, population {}, up to {} generations",
            batches.len(),
            config.population_size,
            config.max_generations
        );

        let mut population = initial_population(
            self.catalog,
            &batches,
            config.population_size,
            config.assign_probability,
            &mut rng,
        );
        let mut penalties = evaluator.evaluate_all(&population, config.parallel);

        let mut best: Option<(Timetable, i64)> = None;
        let mut history = Vec::with_capacity(config.max_generations);
        let mut generations = 0;
        let mut target_reached = false;

        for generation in 1..=config.max_generations {
            if generation > 1 && config.time_limit.is_some_and(|limit| start.elapsed() >= limit) {
                info!("Time limit reached after {} generations", generations);
                break;
            }

            let mut next = Vec::with_capacity(config.population_size);
            while next.len() < config.population_size {
                let Some((i, j)) = select_parents(&penalties, config.tournament_size, &mut rng)
                else {
                    break;
                };
                let mut child = day_crossover(&population[i], &population[j], &mut rng);
                mutate(
                    &mut child,
                    self.catalog,
                    config.mutation_rate,
                    config.clear_probability,
                    &mut rng,
                );
                next.push(child);
            }
            population = next;
            penalties = evaluator.evaluate_all(&population, config.parallel);
            generations = generation;

            if let Some((idx, &penalty)) = penalties.iter().enumerate().min_by_key(|(_, p)| **p) {
                let improved = best.as_ref().is_none_or(|(_, b)| penalty < *b);
                if improved {
                    debug!("Generation {generation}: best penalty {penalty}");
                    best = Some((population[idx].clone(), penalty));
                }
            }

            let best_penalty = best.as_ref().map_or(i64::MAX, |(_, p)| *p);
            history.push(best_penalty);
            if best_penalty <= 0 {
                target_reached = true;
                break;
            }
        }

        let (mut timetable, best_penalty) = best.ok_or_else(|| {
            TimetableError::InvalidConfig("no generation completed".to_string())
        })?;

        let repair_stats = repair(&mut timetable, self.catalog, &mut rng);
        let final_penalty = evaluator.evaluate(&timetable);
        let elapsed = start.elapsed();

        info!(
            "Timetable GA finished in {:.2?}: {} generations, best penalty {}, after repair {}",
            elapsed, generations, best_penalty, final_penalty
        );

        Ok(GaResult {
            timetable,
            best_penalty,
            final_penalty,
            generations,
            target_reached,
            elapsed,
            history,
            repair: repair_stats,
        })
    }
}

/// Runs the GA with default settings apart from the three classic knobs.
///
/// Equivalent to [`GaRunner::run`] with a [`GaConfig`] carrying
/// `population_size`, `generations` and `mutation_rate`.
pub fn run(
    catalog: &SubjectCatalog,
    batches: &[BatchKey],
    population_size: usize,
    generations: usize,
    mutation_rate: f64,
) -> Result<GaResult, TimetableError> {
    let config = GaConfig::default()
        .with_population_size(population_size)
        .with_max_generations(generations)
        .with_mutation_rate(mutation_rate);
    GaRunner::new(catalog, config).run(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::models::{Subject, SubjectConstraints, Teacher, Weekday};

    fn batch(id: &str) -> BatchKey {
        BatchKey::new("1", "2024", "1", id)
    }

    fn sample_catalog() -> SubjectCatalog {
        SubjectCatalog::new()
            .with_batch(
                batch("A"),
                vec![
                    Subject::new("M1", "Math")
                        .with_teacher(Teacher::new("Alice"))
                        .with_caps(2, 4),
                    Subject::new("P1", "Physics")
                        .with_teacher(Teacher::new("Bob"))
                        .with_caps(1, 3),
                ],
            )
            .with_batch(
                batch("B"),
                vec![
                    Subject::new("M1", "Math")
                        .with_teacher(Teacher::new("Alice"))
                        .with_caps(2, 4),
                    Subject::new("E1", "English")
                        .with_teacher(Teacher::new("Carol"))
                        .with_caps(1, 3),
                ],
            )
    }

    fn seeded() -> GaConfig {
        GaConfig::default()
            .with_population_size(12)
            .with_max_generations(30)
            .with_seed(42)
            .with_parallel(false)
    }

    #[test]
    fn test_empty_batches_is_reported() {
        let catalog = sample_catalog();
        let err = run(&catalog, &[], 10, 100, 0.1).unwrap_err();
        assert_eq!(err, TimetableError::NoBatches);
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let catalog = sample_catalog();
        let err = GaRunner::new(&catalog, seeded().with_population_size(0))
            .run(&[batch("A")])
            .unwrap_err();
        assert!(matches!(err, TimetableError::InvalidConfig(_)));
    }

    #[test]
    fn test_invalid_catalog_is_reported() {
        let catalog = sample_catalog();
        let err = GaRunner::new(&catalog, seeded())
            .run(&[batch("Z")])
            .unwrap_err();
        assert!(matches!(err, TimetableError::InvalidInput(ref e) if !e.is_empty()));
    }

    #[test]
    fn test_run_produces_capped_timetable() {
        let catalog = sample_catalog();
        let batches = catalog.batch_keys();
        let result = GaRunner::new(&catalog, seeded()).run(&batches).unwrap();

        assert_eq!(result.timetable.batch_count(), 2);
        assert!(result.generations >= 1);
        assert_eq!(result.history.len(), result.generations);
        for (b, grid) in result.timetable.iter() {
            let subjects = catalog.subjects(b);
            let weekly = grid.weekly_counts(subjects.len());
            for (s, subject) in subjects.iter().enumerate() {
                assert!(weekly[s] <= subject.max_per_week());
                for day in Weekday::ALL {
                    assert!(grid.daily_count(day, s) <= subject.max_per_day());
                }
            }
        }
    }

    #[test]
    fn test_history_is_non_increasing() {
        let catalog = sample_catalog();
        let batches = catalog.batch_keys();
        let result = GaRunner::new(&catalog, seeded()).run(&batches).unwrap();
        assert!(result.history.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(result.history.last().copied(), Some(result.best_penalty));
    }

    #[test]
    fn test_early_stop_on_success() {
        let catalog = sample_catalog();
        let batches = catalog.batch_keys();
        let result = GaRunner::new(&catalog, seeded().with_max_generations(500))
            .run(&batches)
            .unwrap();
        if result.target_reached {
            assert!(result.best_penalty <= 0);
            assert!(result.generations <= 500);
        } else {
            assert_eq!(result.generations, 500);
        }
    }

    #[test]
    fn test_seed_makes_run_reproducible() {
        let catalog = sample_catalog();
        let batches = catalog.batch_keys();
        let a = GaRunner::new(&catalog, seeded()).run(&batches).unwrap();
        let b = GaRunner::new(&catalog, seeded()).run(&batches).unwrap();
        assert_eq!(a.timetable, b.timetable);
        assert_eq!(a.history, b.history);
    }

    #[test]
    fn test_parallel_evaluation_matches_serial() {
        let catalog = sample_catalog();
        let batches = catalog.batch_keys();
        let serial = GaRunner::new(&catalog, seeded()).run(&batches).unwrap();
        let parallel = GaRunner::new(&catalog, seeded().with_parallel(true))
            .run(&batches)
            .unwrap();
        assert_eq!(serial.timetable, parallel.timetable);
    }

    #[test]
    fn test_zero_time_limit_runs_one_generation() {
        let catalog = sample_catalog();
        let batches = catalog.batch_keys();
        let config = seeded()
            .with_max_generations(1000)
            .with_time_limit(Duration::ZERO);
        let result = GaRunner::new(&catalog, config).run(&batches).unwrap();
        assert_eq!(result.generations, 1);
    }

    #[test]
    fn test_inverted_caps_cannot_reach_the_run() {
        let b = batch("A");
        let mut subject = Subject::new("M1", "Math").with_teacher(Teacher::new("Alice"));
        subject.constraints = SubjectConstraints::new(3, 1);
        let catalog = SubjectCatalog::new().with_batch(b.clone(), vec![subject]);

        let result = GaRunner::new(&catalog, seeded()).run(&[b.clone()]).unwrap();
        let report = analyze(&result.timetable, &catalog, &[b.clone()]);
        let math = &report.batches[&b].subjects["Math"];
        assert_eq!(math.max_weekly, 3);
        assert!(math.daily_counts.iter().all(|d| d.max <= math.max_weekly));
        assert!(math.compliant);
    }

    #[test]
    fn test_duplicate_batches_are_merged() {
        let catalog = sample_catalog();
        let result = GaRunner::new(&catalog, seeded())
            .run(&[batch("A"), batch("A")])
            .unwrap();
        assert_eq!(result.timetable.batch_count(), 1);
    }
}

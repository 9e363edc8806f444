//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop;
//! [`FitnessWeights`] holds the penalty terms used by the evaluator.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Penalty weights for timetable fitness.
///
/// Hard-constraint terms are added per violation; the layout terms
/// (`consecutive_reward`, `isolated_gap`) are heuristics and can be tuned
/// freely.
///
/// ```
/// use u_timetable::ga::FitnessWeights;
///
/// let w = FitnessWeights::default();
/// assert_eq!(w.teacher_conflict, 100);
/// assert_eq!(w.consecutive_reward, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    /// Added each time a subject's daily count goes past its daily cap.
    pub daily_cap_violation: i64,
    /// Added for each slot whose teacher is already booked in another batch.
    pub teacher_conflict: i64,
    /// Multiplied by the number of periods over a subject's weekly cap.
    pub weekly_excess: i64,
    /// Subtracted for each adjacent same-day pair holding the same subject.
    pub consecutive_reward: i64,
    /// Added for each empty period whose both neighbours are occupied.
    pub isolated_gap: i64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            daily_cap_violation: 50,
            teacher_conflict: 100,
            weekly_excess: 200,
            consecutive_reward: 2,
            isolated_gap: 1,
        }
    }
}

/// Configuration for the timetabling GA.
///
/// # Defaults
///
/// ```
/// use u_timetable::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 10);
/// assert_eq!(config.max_generations, 100);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_timetable::ga::GaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(30)
///     .with_max_generations(200)
///     .with_mutation_rate(0.05)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GaConfig {
    /// Number of timetables per generation.
    pub population_size: usize,

    /// Maximum number of generations before termination.
    pub max_generations: usize,

    /// Per-slot mutation probability (0.0–1.0).
    pub mutation_rate: f64,

    /// Tournament size for parent selection (capped at population size).
    pub tournament_size: usize,

    /// Probability that the initializer attempts to fill a slot (0.0–1.0).
    pub assign_probability: f64,

    /// Probability that a mutated slot is cleared rather than reassigned.
    pub clear_probability: f64,

    /// Whether to evaluate the population in parallel using rayon.
    pub parallel: bool,

    /// Random seed for reproducibility. `None` seeds from the OS.
    pub seed: Option<u64>,

    /// Wall-clock budget, checked between generations only.
    pub time_limit: Option<Duration>,

    /// Fitness penalty weights.
    pub weights: FitnessWeights,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 10,
            max_generations: 100,
            mutation_rate: 0.1,
            tournament_size: 3,
            assign_probability: 0.8,
            clear_probability: 0.25,
            parallel: true,
            seed: None,
            time_limit: None,
            weights: FitnessWeights::default(),
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the maximum number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the per-slot mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = clamp_probability(rate);
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    /// Sets the initial fill probability.
    pub fn with_assign_probability(mut self, p: f64) -> Self {
        self.assign_probability = clamp_probability(p);
        self
    }

    /// Sets the clear-on-mutation probability.
    pub fn with_clear_probability(mut self, p: f64) -> Self {
        self.clear_probability = clamp_probability(p);
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Sets the fitness weights.
    pub fn with_weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size == 0 {
            return Err("population_size must be at least 1".into());
        }
        if self.max_generations == 0 {
            return Err("max_generations must be at least 1".into());
        }
        if self.tournament_size == 0 {
            return Err("tournament_size must be at least 1".into());
        }
        for (name, p) in [
            ("mutation_rate", self.mutation_rate),
            ("assign_probability", self.assign_probability),
            ("clear_probability", self.clear_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{name} must lie in [0, 1], got {p}"));
            }
        }
        Ok(())
    }
}

fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

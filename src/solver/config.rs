//! Solver configuration.

use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::error::Result;
use crate::ga::GaSettings;

/// Which route assignment strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Cheapest-arc construction improved by 2-opt, relocate and 2-opt*.
    #[default]
    ConstraintSearch,
    /// Cheapest-arc construction, then a GA per vehicle tour.
    Evolutionary,
}

/// What to do with customers no vehicle can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnservedPolicy {
    /// Return the assignment with the customers listed as unserved.
    #[default]
    Report,
    /// Fail with [`RoutingError::NoFeasibleSolution`](crate::RoutingError::NoFeasibleSolution).
    Reject,
}

/// Search limits. Hitting one is not an error: the best assignment found so
/// far is returned with status `BudgetExhausted`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Budget {
    /// Local-search passes.
    pub max_iterations: usize,
    /// Caps [`GaSettings::generations`] when set.
    pub max_generations: Option<usize>,
    /// Wall-clock limit in milliseconds.
    pub time_limit_ms: Option<u64>,
}

impl Default for Budget {
    fn default() -> Self {
        Self {
            max_iterations: 1_000,
            max_generations: None,
            time_limit_ms: None,
        }
    }
}

impl Budget {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    pub(crate) fn deadline(&self) -> Deadline {
        Deadline {
            at: self.time_limit().map(|limit| Instant::now() + limit),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub(crate) fn expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }

    /// Whole milliseconds left, `None` without a limit.
    pub(crate) fn remaining_ms(&self) -> Option<u64> {
        self.at.map(|at| {
            let left = at.saturating_duration_since(Instant::now());
            u64::try_from(left.as_millis()).unwrap_or(u64::MAX)
        })
    }
}

/// Full solver configuration.
///
/// # Examples
///
/// ```
/// use eco_routing::solver::{SolverConfig, Strategy, UnservedPolicy};
///
/// let config: SolverConfig = serde_json::from_str(
///     r#"{"strategy": "evolutionary", "unserved_policy": "reject", "ga": {"generations": 10}}"#,
/// )
/// .unwrap();
/// assert_eq!(config.strategy, Strategy::Evolutionary);
/// assert_eq!(config.unserved_policy, UnservedPolicy::Reject);
/// assert_eq!(config.ga.generations, 10);
/// assert_eq!(config.seed, 42);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub strategy: Strategy,
    pub ga: GaSettings,
    pub budget: Budget,
    pub unserved_policy: UnservedPolicy,
    /// Seed for [`solve_vrp`](super::solve_vrp).
    pub seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            ga: GaSettings::default(),
            budget: Budget::default(),
            unserved_policy: UnservedPolicy::default(),
            seed: 42,
        }
    }
}

impl SolverConfig {
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_ga(mut self, ga: GaSettings) -> Self {
        self.ga = ga;
        self
    }

    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = budget;
        self
    }

    pub fn with_unserved_policy(mut self, policy: UnservedPolicy) -> Self {
        self.unserved_policy = policy;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.ga.validate()
    }

    /// GA parameters with the generation budget applied.
    pub(crate) fn effective_ga(&self) -> GaSettings {
        let mut ga = self.ga.clone();
        if let Some(max) = self.budget.max_generations {
            ga.generations = ga.generations.min(max);
        }
        ga
    }
}

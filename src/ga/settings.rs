//! GA parameters as read from solver configuration.

use serde::Deserialize;
use u_metaheur::ga::GaConfig;

use crate::error::{Result, RoutingError};

/// GA parameters, turned into a [`GaConfig`] for each run.
///
/// Defaults: population 50, 40 generations, crossover 0.7, mutation 0.2,
/// per-gene shuffle probability 0.05, tournament size 3, elite ratio 0.1.
/// Runs never stop on stagnation; they spend the whole generation budget
/// unless cancelled or out of time.
///
/// # Examples
///
/// ```
/// use eco_routing::ga::GaSettings;
///
/// let settings = GaSettings::default().with_population_size(20).with_generations(10);
/// assert!(settings.validate().is_ok());
///
/// let config = settings.runner_config(7);
/// assert_eq!(config.population_size, 20);
/// assert_eq!(config.max_generations, 10);
/// assert_eq!(config.seed, Some(7));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GaSettings {
    pub population_size: usize,
    pub generations: usize,
    pub crossover_rate: f64,
    pub mutation_rate: f64,
    /// Probability of each gene being swapped when an individual mutates.
    pub gene_mutation_rate: f64,
    pub tournament_size: usize,
    /// Share of each generation carried over unchanged.
    pub elite_ratio: f64,
}

impl Default for GaSettings {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 40,
            crossover_rate: 0.7,
            mutation_rate: 0.2,
            gene_mutation_rate: 0.05,
            tournament_size: 3,
            elite_ratio: 0.1,
        }
    }
}

impl GaSettings {
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    pub fn with_gene_mutation_rate(mut self, rate: f64) -> Self {
        self.gene_mutation_rate = rate;
        self
    }

    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size;
        self
    }

    pub fn with_elite_ratio(mut self, ratio: f64) -> Self {
        self.elite_ratio = ratio;
        self
    }

    /// Runner configuration seeded with `seed`.
    pub fn runner_config(&self, seed: u64) -> GaConfig {
        GaConfig::default()
            .with_population_size(self.population_size)
            .with_max_generations(self.generations)
            .with_tournament_size(self.tournament_size)
            .with_crossover_rate(self.crossover_rate)
            .with_mutation_rate(self.mutation_rate)
            .with_elite_ratio(self.elite_ratio)
            .with_stagnation_limit(0)
            .with_parallel(false)
            .with_seed(seed)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tournament_size == 0 {
            return Err(RoutingError::Config("tournament_size must be positive".into()));
        }
        for (name, rate) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
            ("gene_mutation_rate", self.gene_mutation_rate),
            ("elite_ratio", self.elite_ratio),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(RoutingError::Config(format!(
                    "{name} must lie in [0, 1], got {rate}"
                )));
            }
        }
        // population, generation and elite counts
        self.runner_config(0).validate().map_err(RoutingError::Config)
    }
}

use crate::consts::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod aggregator;
pub mod engine;
pub mod hall_of_fame;
pub mod objective;
pub mod selection;
pub mod statistics;
pub mod variation;

pub use aggregator::AggregatorError;
pub use engine::{EvolutionEngine, EvolutionResult, Operators};
pub use hall_of_fame::HallOfFame;
pub use objective::{FitnessFunction, MeanSquaredError, RegressionData};
pub use selection::{SelectionOperator, TournamentSelection};
pub use statistics::{Logbook, LogbookRecord};
pub use variation::{
    CrossoverOperator, GaussianMutation, MutationOperator, TwoPointCrossover,
    UniformResetMutation,
};

#[derive(Error, Debug)]
pub enum EvolutionError {
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("Invalid hyperparameter: {0}")]
    InvalidHyperparameter(String),
    #[error("Cannot run a tournament over an empty population")]
    EmptyPopulation,
    #[error("Degenerate tournament: {0}")]
    DegenerateTournament(String),
    #[error("Individual at index {index} has no fitness yet")]
    UnevaluatedIndividual { index: usize },
    #[error(transparent)]
    Aggregation(#[from] AggregatorError),
}

fn default_max_concurrency() -> usize {
    num_cpus::get()
}

/// Which continuous mutation the standard operator set uses.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum MutationPolicy {
    /// Add N(0, sigma²) to the gene.
    Gaussian,
    /// Redraw the gene from U[0, 1).
    UniformReset,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub p_crossover: f64,
    pub p_mutation: f64,
    pub max_generations: usize,
    pub hall_of_fame_size: usize,
    pub tournament_size: usize,
    pub gene_mutation_probability: f64,
    pub mutation_policy: MutationPolicy,
    pub mutation_sigma: f64,
    pub unique_hall_of_fame: bool,
    pub global_seed: Option<u64>,
    pub parallel_evaluation: bool,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    pub generation_check_interval: usize,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        EvolutionConfig {
            population_size: POPULATION_SIZE,
            p_crossover: P_CROSSOVER,
            p_mutation: P_MUTATION,
            max_generations: MAX_GENERATIONS,
            hall_of_fame_size: HALL_OF_FAME_SIZE,
            tournament_size: TOURNAMENT_SIZE,
            gene_mutation_probability: GENE_MUTATION_PROBABILITY,
            mutation_policy: MutationPolicy::Gaussian,
            mutation_sigma: MUTATION_SIGMA,
            unique_hall_of_fame: false,
            global_seed: None,
            parallel_evaluation: false,
            max_concurrency: default_max_concurrency(),
            generation_check_interval: GENERATION_CHECK_INTERVAL,
        }
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<(), EvolutionError> {
        let probabilities = [
            ("p_crossover", self.p_crossover),
            ("p_mutation", self.p_mutation),
            ("gene_mutation_probability", self.gene_mutation_probability),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(EvolutionError::InvalidHyperparameter(format!(
                    "{} must lie in [0, 1], got {}",
                    name, value
                )));
            }
        }

        let counts = [
            ("population_size", self.population_size),
            ("max_generations", self.max_generations),
            ("hall_of_fame_size", self.hall_of_fame_size),
            ("tournament_size", self.tournament_size),
            ("generation_check_interval", self.generation_check_interval),
        ];
        for (name, value) in counts {
            if value == 0 {
                return Err(EvolutionError::InvalidHyperparameter(format!(
                    "{} must be positive",
                    name
                )));
            }
        }

        if self.tournament_size > self.population_size {
            return Err(EvolutionError::InvalidHyperparameter(format!(
                "tournament size {} exceeds population size {}",
                self.tournament_size, self.population_size
            )));
        }
        if !self.mutation_sigma.is_finite() || self.mutation_sigma < 0.0 {
            return Err(EvolutionError::InvalidHyperparameter(format!(
                "mutation_sigma must be finite and non-negative, got {}",
                self.mutation_sigma
            )));
        }
        if self.parallel_evaluation && self.max_concurrency == 0 {
            return Err(EvolutionError::InvalidHyperparameter(
                "max_concurrency must be positive when parallel evaluation is on".into(),
            ));
        }
        Ok(())
    }
}

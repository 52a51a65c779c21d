use crate::evolution::hall_of_fame::HallOfFame;
use crate::evolution::objective::FitnessFunction;
use crate::evolution::selection::{SelectionOperator, TournamentSelection};
use crate::evolution::statistics::Logbook;
use crate::evolution::variation::{
    vary, CrossoverOperator, GaussianMutation, MutationOperator, TwoPointCrossover,
    UniformResetMutation,
};
use crate::evolution::{EvolutionConfig, EvolutionError, MutationPolicy};
use crate::individual::Individual;
use crate::population::Population;
use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The named strategies the engine composes. Swapping any of them is how
/// tests (or callers) plug in a different cost or operator.
#[derive(Debug)]
pub struct Operators {
    pub evaluate: Box<dyn FitnessFunction>,
    pub select: Box<dyn SelectionOperator>,
    pub crossover: Box<dyn CrossoverOperator>,
    pub mutate: Box<dyn MutationOperator>,
}

impl Operators {
    /// Tournament selection, two-point crossover and the configured
    /// continuous mutation around the given cost. Fails on a config the
    /// engine would reject.
    pub fn standard<F: FitnessFunction + 'static>(
        evaluate: F,
        config: &EvolutionConfig,
    ) -> Result<Self, EvolutionError> {
        config.validate()?;
        let mutate: Box<dyn MutationOperator> = match config.mutation_policy {
            MutationPolicy::Gaussian => Box::new(GaussianMutation::new(
                config.mutation_sigma,
                config.gene_mutation_probability,
            )?),
            MutationPolicy::UniformReset => Box::new(UniformResetMutation::new(
                config.gene_mutation_probability,
            )?),
        };
        Ok(Operators {
            evaluate: Box::new(evaluate),
            select: Box::new(TournamentSelection::new(config.tournament_size)),
            crossover: Box::new(TwoPointCrossover::new()),
            mutate,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EvolutionResult {
    pub population: Population,
    pub hall_of_fame: HallOfFame,
    pub logbook: Logbook,
    /// Seed the run actually used, drawn from the OS when none was configured.
    pub seed: u64,
    pub generations_completed: usize,
    pub cancelled: bool,
}

impl EvolutionResult {
    pub fn best(&self) -> Option<&Individual> {
        self.hall_of_fame.best()
    }
}

pub struct EvolutionEngine {
    config: EvolutionConfig,
    operators: Operators,
    rng: ChaCha20Rng,
    seed: u64,
    thread_pool: Option<rayon::ThreadPool>,
    stop_flag: Option<Arc<AtomicBool>>,
}

impl EvolutionEngine {
    pub fn new(config: EvolutionConfig, operators: Operators) -> Result<Self, EvolutionError> {
        config.validate()?;

        let seed = config.global_seed.unwrap_or_else(|| OsRng.next_u64());
        let rng = ChaCha20Rng::seed_from_u64(seed);

        let thread_pool = if config.parallel_evaluation {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.max_concurrency)
                .build()
                .map_err(|e| {
                    EvolutionError::InvalidHyperparameter(format!(
                        "could not build evaluation pool: {}",
                        e
                    ))
                })?;
            Some(pool)
        } else {
            None
        };

        Ok(EvolutionEngine {
            config,
            operators,
            rng,
            seed,
            thread_pool,
            stop_flag: None,
        })
    }

    /// Builds the standard operators and the engine from one config.
    pub fn standard<F: FitnessFunction + 'static>(
        config: EvolutionConfig,
        evaluate: F,
    ) -> Result<Self, EvolutionError> {
        let operators = Operators::standard(evaluate, &config)?;
        EvolutionEngine::new(config, operators)
    }

    /// Stops the run at the next generation boundary once the flag is set.
    pub fn with_stop_flag(mut self, stop_flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(stop_flag);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    /// Runs from a freshly initialized U[0, 1) population.
    pub fn run(mut self) -> Result<EvolutionResult, EvolutionError> {
        let dimensionality = self.operators.evaluate.dimension().ok_or_else(|| {
            EvolutionError::InvalidHyperparameter(
                "fitness function does not declare a dimensionality, start with run_from".into(),
            )
        })?;
        let population =
            Population::initialize(self.config.population_size, dimensionality, &mut self.rng)?;
        self.evolve(population)
    }

    /// Runs from a caller-supplied initial population.
    pub fn run_from(self, population: Population) -> Result<EvolutionResult, EvolutionError> {
        if population.len() != self.config.population_size {
            return Err(EvolutionError::InvalidHyperparameter(format!(
                "initial population has {} members, configured size is {}",
                population.len(),
                self.config.population_size
            )));
        }
        let expected = self
            .operators
            .evaluate
            .dimension()
            .or_else(|| population.members.first().map(|i| i.dimension()));
        if let Some(expected) = expected {
            if let Some(bad) = population.iter().find(|i| i.dimension() != expected) {
                return Err(EvolutionError::ShapeMismatch(format!(
                    "initial individual has {} genes, expected {}",
                    bad.dimension(),
                    expected
                )));
            }
        }
        self.evolve(population)
    }

    fn stop_requested(&self) -> bool {
        self.stop_flag
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::SeqCst))
    }

    /// Computes the cost of every member lacking one and returns how many
    /// evaluations that took. The whole generation is evaluated before this
    /// returns, parallel or not.
    fn evaluate(&self, population: &mut Population) -> Result<usize, EvolutionError> {
        let fitness_function = self.operators.evaluate.as_ref();
        let pending = population
            .members
            .iter_mut()
            .filter(|individual| !individual.is_evaluated())
            .collect::<Vec<&mut Individual>>();
        let evaluations = pending.len();

        match &self.thread_pool {
            Some(pool) => {
                let costs = pool.install(|| {
                    pending
                        .par_iter()
                        .map(|individual| fitness_function.compute(&individual.genes))
                        .collect::<Result<Vec<f64>, EvolutionError>>()
                })?;
                for (individual, cost) in pending.into_iter().zip(costs) {
                    individual.fitness = Some(cost);
                }
            }
            None => {
                for individual in pending {
                    individual.fitness = Some(fitness_function.compute(&individual.genes)?);
                }
            }
        }
        Ok(evaluations)
    }

    fn evolve(mut self, initial_population: Population) -> Result<EvolutionResult, EvolutionError> {
        let population_size = self.config.population_size;
        let max_generations = self.config.max_generations;

        let mut population = initial_population;
        let mut hall_of_fame = if self.config.unique_hall_of_fame {
            HallOfFame::unique(self.config.hall_of_fame_size)
        } else {
            HallOfFame::new(self.config.hall_of_fame_size)
        };
        let mut logbook = Logbook::new();
        let mut generation = 0;
        let mut cancelled = false;

        info!(
            seed = self.seed,
            population_size,
            max_generations,
            parallel = self.config.parallel_evaluation,
            "Starting evolution"
        );

        loop {
            // --- Evaluating ---
            let evaluations = self.evaluate(&mut population)?;

            // --- Recording ---
            hall_of_fame.update(&population)?;
            let record = logbook.record(generation, evaluations, &population)?;
            let best_so_far = hall_of_fame.best().and_then(|best| best.fitness);
            debug!(
                generation,
                evaluations,
                min = record.min_fitness,
                avg = record.avg_fitness,
                "Generation recorded"
            );
            if generation % self.config.generation_check_interval == 0 {
                info!(
                    generation,
                    min = record.min_fitness,
                    avg = record.avg_fitness,
                    best = ?best_so_far,
                    "Progress"
                );
            }

            // --- Terminal check ---
            if generation == max_generations {
                break;
            }
            if self.stop_requested() {
                warn!(generation, "Stop requested, ending evolution early");
                cancelled = true;
                break;
            }

            // --- Selecting ---
            let mating_pool =
                self.operators
                    .select
                    .select(&population, population_size, &mut self.rng)?;

            // --- Varying ---
            let offspring = vary(
                mating_pool,
                self.operators.crossover.as_ref(),
                self.operators.mutate.as_ref(),
                self.config.p_crossover,
                self.config.p_mutation,
                &mut self.rng,
            )?;

            // --- Replaced ---
            population = Population::new(offspring);
            generation += 1;
        }

        info!(
            generations = generation,
            best = ?hall_of_fame.best().and_then(|best| best.fitness),
            "Evolution finished"
        );

        Ok(EvolutionResult {
            population,
            hall_of_fame,
            logbook,
            seed: self.seed,
            generations_completed: generation,
            cancelled,
        })
    }
}

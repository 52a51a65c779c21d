// Reference hyperparameters for a standard run.
pub const POPULATION_SIZE: usize = 100;
pub const P_CROSSOVER: f64 = 0.9;
pub const P_MUTATION: f64 = 0.1;
pub const MAX_GENERATIONS: usize = 50;
pub const HALL_OF_FAME_SIZE: usize = 10;
pub const TOURNAMENT_SIZE: usize = 3;
/// Per-gene probability used once an individual has been picked for mutation.
pub const GENE_MUTATION_PROBABILITY: f64 = 0.05;
/// Standard deviation of the gaussian perturbation applied to a mutated gene.
pub const MUTATION_SIGMA: f64 = 0.1;
pub const GENERATION_CHECK_INTERVAL: usize = 10;

pub const FLOAT_COMPARISON_EPSILON: f64 = 1e-9;

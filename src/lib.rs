//! Evolutionary search for the weights of a linear predictor.
//!
//! A population of real-valued weight vectors is evolved against a cost
//! (mean squared error by default) with tournament selection, two-point
//! crossover, continuous mutation and a hall of fame of the best vectors seen.

// Modules
pub mod consts;
pub mod evolution;
pub mod individual;
pub mod population;

pub use crate::evolution::{
    EvolutionConfig, EvolutionEngine, EvolutionError, EvolutionResult, MeanSquaredError,
    Operators, RegressionData,
};
pub use crate::individual::Individual;
pub use crate::population::Population;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A candidate weight vector together with its cached cost.
///
/// `fitness` is `None` until the individual has been evaluated and is reset
/// every time a variation operator touches the genes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub genes: Vec<f64>,
    pub fitness: Option<f64>,
}

impl Individual {
    pub fn new(genes: Vec<f64>) -> Self {
        Individual {
            genes,
            fitness: None,
        }
    }

    pub fn with_fitness(genes: Vec<f64>, fitness: f64) -> Self {
        Individual {
            genes,
            fitness: Some(fitness),
        }
    }

    pub fn dimension(&self) -> usize {
        self.genes.len()
    }

    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_some()
    }

    /// Marks the cached fitness as dirty. Called by every operator that
    /// rewrites genes.
    pub fn invalidate(&mut self) {
        self.fitness = None;
    }

    /// Lower cost wins. Unevaluated individuals sort after evaluated ones,
    /// NaN costs of either sign sort after every other cost.
    pub fn cmp_fitness(&self, other: &Individual) -> Ordering {
        match (self.fitness, other.fitness) {
            (Some(a), Some(b)) => a
                .is_nan()
                .cmp(&b.is_nan())
                .then_with(|| a.partial_cmp(&b).unwrap_or(Ordering::Equal)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    /// Strict improvement check used by the hall of fame.
    pub fn is_better_than(&self, other: &Individual) -> bool {
        self.cmp_fitness(other) == Ordering::Less
    }
}

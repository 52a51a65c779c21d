use crate::evolution::EvolutionError;
use crate::individual::Individual;
use rand::distributions::Uniform;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

/// The individuals alive in one generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    pub members: Vec<Individual>,
}

impl Population {
    pub fn new(members: Vec<Individual>) -> Self {
        Population { members }
    }

    /// Draws every gene i.i.d. from U[0, 1). Nothing keeps genes inside that
    /// interval afterwards.
    pub fn initialize<R: Rng + ?Sized>(
        population_size: usize,
        dimensionality: usize,
        rng: &mut R,
    ) -> Result<Self, EvolutionError> {
        if population_size == 0 && dimensionality == 0 {
            return Err(EvolutionError::InvalidHyperparameter(
                "Both population size and dimensionality are zero".into(),
            ));
        } else if population_size == 0 {
            return Err(EvolutionError::InvalidHyperparameter(
                "Population size cannot be zero".into(),
            ));
        } else if dimensionality == 0 {
            return Err(EvolutionError::InvalidHyperparameter(
                "Dimensionality cannot be zero".into(),
            ));
        }

        let uniform = Uniform::new(0., 1.);
        let members = (0..population_size)
            .map(|_| {
                let genes = (0..dimensionality)
                    .map(|_| rng.sample(uniform))
                    .collect::<Vec<f64>>();
                Individual::new(genes)
            })
            .collect();
        Ok(Population { members })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Individual> {
        self.members.iter()
    }

    /// Every cached cost, in member order. Fails on the first member that was
    /// never evaluated.
    pub fn fitness_values(&self) -> Result<Vec<f64>, EvolutionError> {
        self.members
            .iter()
            .enumerate()
            .map(|(index, individual)| {
                individual
                    .fitness
                    .ok_or(EvolutionError::UnevaluatedIndividual { index })
            })
            .collect()
    }

    pub fn unevaluated_count(&self) -> usize {
        self.members.iter().filter(|i| !i.is_evaluated()).count()
    }

    pub fn best(&self) -> Option<&Individual> {
        self.members
            .iter()
            .filter(|individual| individual.is_evaluated())
            .min_by(|a, b| a.cmp_fitness(b))
    }
}

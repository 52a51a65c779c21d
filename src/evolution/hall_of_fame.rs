use crate::evolution::EvolutionError;
use crate::individual::Individual;
use crate::population::Population;
use serde::{Deserialize, Serialize};

/// Bounded archive of the best individuals seen over a run, cheapest first.
///
/// Entries are copies, so later changes to the live population never reach
/// into the archive. A candidate only displaces the worst entry when it is
/// strictly better, and the sort is stable, so ties keep arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HallOfFame {
    capacity: usize,
    entries: Vec<Individual>,
    unique: bool,
}

impl HallOfFame {
    pub fn new(capacity: usize) -> Self {
        HallOfFame {
            capacity,
            entries: Vec::with_capacity(capacity),
            unique: false,
        }
    }

    /// Variant that skips candidates whose genes already sit in the archive.
    pub fn unique(capacity: usize) -> Self {
        HallOfFame {
            unique: true,
            ..HallOfFame::new(capacity)
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Individual] {
        &self.entries
    }

    pub fn best(&self) -> Option<&Individual> {
        self.entries.first()
    }

    pub fn worst(&self) -> Option<&Individual> {
        self.entries.last()
    }

    pub fn update(&mut self, population: &Population) -> Result<(), EvolutionError> {
        if let Some(index) = population.iter().position(|i| !i.is_evaluated()) {
            return Err(EvolutionError::UnevaluatedIndividual { index });
        }
        for individual in population.iter() {
            self.consider(individual);
        }
        Ok(())
    }

    fn consider(&mut self, candidate: &Individual) {
        if self.capacity == 0 {
            return;
        }
        let has_room = self.entries.len() < self.capacity;
        let beats_worst = self
            .worst()
            .map_or(true, |worst| candidate.is_better_than(worst));
        if !(has_room || beats_worst) {
            return;
        }
        if self.unique && self.entries.iter().any(|entry| entry.genes == candidate.genes) {
            return;
        }

        // Insert after every entry that is not worse, which keeps the order stable.
        let position = self
            .entries
            .partition_point(|entry| !candidate.is_better_than(entry));
        self.entries.insert(position, candidate.clone());
        self.entries.truncate(self.capacity);
    }
}

use crate::evolution::aggregator::{Aggregator, ArithmeticMean, Minimum};
use crate::evolution::EvolutionError;
use crate::population::Population;
use serde::{Deserialize, Serialize};

/// One row of the logbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogbookRecord {
    pub generation: usize,
    /// Fitness evaluations spent on this generation (cached costs are free).
    pub evaluations: usize,
    pub min_fitness: f64,
    pub avg_fitness: f64,
}

/// Append-only per-generation statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Logbook {
    records: Vec<LogbookRecord>,
}

impl Logbook {
    pub fn new() -> Self {
        Logbook::default()
    }

    /// Appends min and mean cost of an evaluated population.
    pub fn record(
        &mut self,
        generation: usize,
        evaluations: usize,
        population: &Population,
    ) -> Result<&LogbookRecord, EvolutionError> {
        let fitness_values = population.fitness_values()?;
        let record = LogbookRecord {
            generation,
            evaluations,
            min_fitness: Minimum.value(&fitness_values)?,
            avg_fitness: ArithmeticMean.value(&fitness_values)?,
        };
        self.records.push(record);
        Ok(&self.records[self.records.len() - 1])
    }

    pub fn records(&self) -> &[LogbookRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&LogbookRecord> {
        self.records.last()
    }

    pub fn min_fitness_series(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.min_fitness).collect()
    }

    pub fn avg_fitness_series(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.avg_fitness).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FLOAT_COMPARISON_EPSILON;
    use crate::individual::Individual;

    #[test]
    fn test_record_min_and_mean() {
        let population = Population::new(vec![
            Individual::with_fitness(vec![0.], 4.),
            Individual::with_fitness(vec![1.], 1.),
            Individual::with_fitness(vec![2.], 7.),
        ]);
        let mut logbook = Logbook::new();
        let record = logbook.record(0, 3, &population).unwrap().clone();
        assert_eq!(record.generation, 0);
        assert_eq!(record.evaluations, 3);
        assert!((record.min_fitness - 1.).abs() < FLOAT_COMPARISON_EPSILON);
        assert!((record.avg_fitness - 4.).abs() < FLOAT_COMPARISON_EPSILON);
        assert_eq!(logbook.len(), 1);
    }

    #[test]
    fn test_grows_one_row_per_call() {
        let population = Population::new(vec![Individual::with_fitness(vec![0.], 2.)]);
        let mut logbook = Logbook::new();
        for generation in 0..5 {
            logbook.record(generation, 0, &population).unwrap();
        }
        assert_eq!(logbook.len(), 5);
        assert_eq!(
            logbook.records().iter().map(|r| r.generation).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4]
        );
        assert_eq!(logbook.min_fitness_series(), vec![2.; 5]);
        assert_eq!(logbook.avg_fitness_series(), vec![2.; 5]);
    }

    #[test]
    fn test_unevaluated_population_leaves_logbook_untouched() {
        let population = Population::new(vec![Individual::new(vec![0.])]);
        let mut logbook = Logbook::new();
        assert!(logbook.record(0, 0, &population).is_err());
        assert!(logbook.is_empty());
    }

    #[test]
    fn test_empty_population_is_an_aggregation_error() {
        let mut logbook = Logbook::new();
        assert!(matches!(
            logbook.record(0, 0, &Population::new(vec![])),
            Err(EvolutionError::Aggregation(_))
        ));
    }
}

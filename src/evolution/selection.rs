use crate::evolution::EvolutionError;
use crate::individual::Individual;
use crate::population::Population;
use rand::{Rng, RngCore};

pub trait SelectionOperator: std::fmt::Debug + Send + Sync {
    /// Builds a mating pool of `n` copies drawn from an evaluated population.
    fn select(
        &self,
        population: &Population,
        n: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Individual>, EvolutionError>;
}

/// Tournament selection with replacement: draw `tournament_size` contestants,
/// keep the cheapest.
#[derive(Debug, Clone)]
pub struct TournamentSelection {
    pub tournament_size: usize,
}

impl TournamentSelection {
    pub fn new(tournament_size: usize) -> Self {
        TournamentSelection { tournament_size }
    }

    fn run_tournament<'a>(
        &self,
        members: &'a [Individual],
        rng: &mut dyn RngCore,
    ) -> &'a Individual {
        // Contestants are drawn with replacement, so the same individual may
        // face itself.
        let mut winner = &members[rng.gen_range(0..members.len())];
        for _ in 1..self.tournament_size {
            let contestant = &members[rng.gen_range(0..members.len())];
            if contestant.is_better_than(winner) {
                winner = contestant;
            }
        }
        winner
    }
}

impl SelectionOperator for TournamentSelection {
    fn select(
        &self,
        population: &Population,
        n: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Individual>, EvolutionError> {
        if population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }
        if self.tournament_size == 0 {
            return Err(EvolutionError::DegenerateTournament(format!(
                "tournament size 0 over a population of {}",
                population.len()
            )));
        }
        if let Some(index) = population.iter().position(|i| !i.is_evaluated()) {
            return Err(EvolutionError::UnevaluatedIndividual { index });
        }

        Ok((0..n)
            .map(|_| self.run_tournament(&population.members, rng).clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn ranked_population(size: usize) -> Population {
        Population::new(
            (0..size)
                .map(|i| Individual::with_fitness(vec![i as f64], i as f64))
                .collect(),
        )
    }

    #[test]
    fn test_pool_has_requested_size() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let pool = TournamentSelection::new(3)
            .select(&ranked_population(10), 17, &mut rng)
            .unwrap();
        assert_eq!(pool.len(), 17);
    }

    #[test]
    fn test_winners_come_from_population() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let population = ranked_population(8);
        let pool = TournamentSelection::new(3)
            .select(&population, 50, &mut rng)
            .unwrap();
        for winner in pool.iter() {
            assert!(population.iter().any(|member| member == winner));
        }
    }

    #[test]
    fn test_selection_prefers_fitter() {
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let population = ranked_population(20);
        let pool = TournamentSelection::new(3)
            .select(&population, 2000, &mut rng)
            .unwrap();
        let average_cost = pool.iter().filter_map(|i| i.fitness).sum::<f64>() / pool.len() as f64;
        // uniform sampling would average 9.5
        assert!(average_cost < 8.0, "average selected cost {}", average_cost);
    }

    #[test]
    fn test_tournament_of_one_is_uniform_sampling() {
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let population = ranked_population(5);
        let pool = TournamentSelection::new(1)
            .select(&population, 500, &mut rng)
            .unwrap();
        // every member should show up at least once
        for member in population.iter() {
            assert!(pool.contains(member));
        }
    }

    #[test]
    fn test_empty_population_is_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let result = TournamentSelection::new(3).select(&Population::new(vec![]), 3, &mut rng);
        assert!(matches!(result, Err(EvolutionError::EmptyPopulation)));
    }

    #[test]
    fn test_zero_tournament_is_degenerate() {
        let mut rng = ChaCha20Rng::seed_from_u64(6);
        let result = TournamentSelection::new(0).select(&ranked_population(4), 3, &mut rng);
        assert!(matches!(result, Err(EvolutionError::DegenerateTournament(_))));
    }

    #[test]
    fn test_unevaluated_population_is_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let population = Population::new(vec![
            Individual::with_fitness(vec![0.], 0.),
            Individual::new(vec![1.]),
        ]);
        let result = TournamentSelection::new(2).select(&population, 2, &mut rng);
        assert!(matches!(
            result,
            Err(EvolutionError::UnevaluatedIndividual { index: 1 })
        ));
    }
}

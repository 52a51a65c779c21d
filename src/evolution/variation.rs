use crate::evolution::EvolutionError;
use crate::individual::Individual;
use rand::distributions::Uniform;
use rand::seq::index;
use rand::{Rng, RngCore};
use rand_distr::{Distribution, Normal};

pub trait CrossoverOperator: std::fmt::Debug + Send + Sync {
    /// Recombines two parents into two fresh, unevaluated children.
    fn crossover(
        &self,
        parent_1: &Individual,
        parent_2: &Individual,
        rng: &mut dyn RngCore,
    ) -> Result<(Individual, Individual), EvolutionError>;
}

pub trait MutationOperator: std::fmt::Debug + Send + Sync {
    /// Perturbs genes in place and invalidates the cached fitness.
    fn mutate(&self, individual: &mut Individual, rng: &mut dyn RngCore);
}

/// Swaps the segment `[i, j)` between the parents, `i < j` drawn without
/// replacement from `[0, len)`.
#[derive(Debug, Clone, Default)]
pub struct TwoPointCrossover;

impl TwoPointCrossover {
    pub fn new() -> Self {
        TwoPointCrossover
    }
}

impl CrossoverOperator for TwoPointCrossover {
    fn crossover(
        &self,
        parent_1: &Individual,
        parent_2: &Individual,
        rng: &mut dyn RngCore,
    ) -> Result<(Individual, Individual), EvolutionError> {
        if parent_1.dimension() != parent_2.dimension() {
            return Err(EvolutionError::ShapeMismatch(format!(
                "cannot cross parents of length {} and {}",
                parent_1.dimension(),
                parent_2.dimension()
            )));
        }

        let mut child_1 = Individual::new(parent_1.genes.clone());
        let mut child_2 = Individual::new(parent_2.genes.clone());

        let length = parent_1.dimension();
        if length < 2 {
            // no two distinct cut points exist
            return Ok((child_1, child_2));
        }

        let cuts = index::sample(rng, length, 2);
        let (start, end) = (cuts.index(0).min(cuts.index(1)), cuts.index(0).max(cuts.index(1)));

        child_1.genes[start..end].copy_from_slice(&parent_2.genes[start..end]);
        child_2.genes[start..end].copy_from_slice(&parent_1.genes[start..end]);

        Ok((child_1, child_2))
    }
}

/// Adds N(0, sigma²) noise to each gene with probability `gene_probability`.
#[derive(Debug, Clone)]
pub struct GaussianMutation {
    pub gene_probability: f64,
    noise: Normal<f64>,
}

impl GaussianMutation {
    pub fn new(sigma: f64, gene_probability: f64) -> Result<Self, EvolutionError> {
        if !(0.0..=1.0).contains(&gene_probability) {
            return Err(EvolutionError::InvalidHyperparameter(format!(
                "gene mutation probability must lie in [0, 1], got {}",
                gene_probability
            )));
        }
        let noise = Normal::new(0.0, sigma).map_err(|e| {
            EvolutionError::InvalidHyperparameter(format!("mutation sigma {}: {}", sigma, e))
        })?;
        Ok(GaussianMutation {
            gene_probability,
            noise,
        })
    }

    pub fn sigma(&self) -> f64 {
        self.noise.std_dev()
    }
}

impl MutationOperator for GaussianMutation {
    fn mutate(&self, individual: &mut Individual, rng: &mut dyn RngCore) {
        for gene in individual.genes.iter_mut() {
            if rng.gen_bool(self.gene_probability) {
                *gene += self.noise.sample(rng);
            }
        }
        individual.invalidate();
    }
}

/// Replaces each gene with a fresh U[0, 1) draw with probability
/// `gene_probability`, i.e. re-runs the initializer on single genes.
#[derive(Debug, Clone)]
pub struct UniformResetMutation {
    pub gene_probability: f64,
}

impl UniformResetMutation {
    pub fn new(gene_probability: f64) -> Result<Self, EvolutionError> {
        if !(0.0..=1.0).contains(&gene_probability) {
            return Err(EvolutionError::InvalidHyperparameter(format!(
                "gene mutation probability must lie in [0, 1], got {}",
                gene_probability
            )));
        }
        Ok(UniformResetMutation { gene_probability })
    }
}

impl MutationOperator for UniformResetMutation {
    fn mutate(&self, individual: &mut Individual, rng: &mut dyn RngCore) {
        let uniform = Uniform::new(0., 1.);
        for gene in individual.genes.iter_mut() {
            if rng.gen_bool(self.gene_probability) {
                *gene = rng.sample(uniform);
            }
        }
        individual.invalidate();
    }
}

/// Crossover on consecutive pairs of the mating pool, then mutation on every
/// offspring. Pairs that do not cross keep their genes and cached fitness; an
/// odd trailing individual never crosses.
pub fn vary(
    mating_pool: Vec<Individual>,
    crossover: &dyn CrossoverOperator,
    mutation: &dyn MutationOperator,
    p_crossover: f64,
    p_mutation: f64,
    rng: &mut dyn RngCore,
) -> Result<Vec<Individual>, EvolutionError> {
    let mut offspring = mating_pool;

    for pair in offspring.chunks_exact_mut(2) {
        if rng.gen_bool(p_crossover) {
            let (child_1, child_2) = crossover.crossover(&pair[0], &pair[1], rng)?;
            pair[0] = child_1;
            pair[1] = child_2;
        }
    }

    for individual in offspring.iter_mut() {
        if rng.gen_bool(p_mutation) {
            mutation.mutate(individual, rng);
        }
    }

    Ok(offspring)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_two_point_children_inherit_every_gene() {
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let parent_1 = Individual::with_fitness(vec![1., 2., 3., 4., 5.], 0.1);
        let parent_2 = Individual::with_fitness(vec![-1., -2., -3., -4., -5.], 0.2);
        for _ in 0..50 {
            let (child_1, child_2) = TwoPointCrossover
                .crossover(&parent_1, &parent_2, &mut rng)
                .unwrap();
            assert_eq!(child_1.dimension(), 5);
            assert_eq!(child_2.dimension(), 5);
            assert!(!child_1.is_evaluated() && !child_2.is_evaluated());
            for i in 0..5 {
                // children are complementary at every locus
                assert!(
                    (child_1.genes[i] == parent_1.genes[i] && child_2.genes[i] == parent_2.genes[i])
                        || (child_1.genes[i] == parent_2.genes[i]
                            && child_2.genes[i] == parent_1.genes[i])
                );
            }
        }
    }

    #[test]
    fn test_two_point_swaps_a_contiguous_nonempty_segment() {
        let mut rng = ChaCha20Rng::seed_from_u64(12);
        let parent_1 = Individual::new(vec![0.; 6]);
        let parent_2 = Individual::new(vec![1.; 6]);
        for _ in 0..50 {
            let (child_1, _) = TwoPointCrossover
                .crossover(&parent_1, &parent_2, &mut rng)
                .unwrap();
            let swapped = child_1
                .genes
                .iter()
                .enumerate()
                .filter(|(_, g)| **g == 1.)
                .map(|(i, _)| i)
                .collect::<Vec<usize>>();
            assert!(!swapped.is_empty());
            // the last cut is exclusive and below the length, so the tail is never swapped
            assert!(!swapped.contains(&5));
            assert_eq!(swapped.last().unwrap() - swapped[0] + 1, swapped.len());
        }
    }

    #[test]
    fn test_two_point_single_gene_passes_through() {
        let mut rng = ChaCha20Rng::seed_from_u64(13);
        let (child_1, child_2) = TwoPointCrossover
            .crossover(&Individual::new(vec![0.3]), &Individual::new(vec![0.7]), &mut rng)
            .unwrap();
        assert_eq!(child_1.genes, vec![0.3]);
        assert_eq!(child_2.genes, vec![0.7]);
    }

    #[test]
    fn test_two_point_rejects_mismatched_parents() {
        let mut rng = ChaCha20Rng::seed_from_u64(14);
        let result = TwoPointCrossover.crossover(
            &Individual::new(vec![0.3, 0.1]),
            &Individual::new(vec![0.7]),
            &mut rng,
        );
        assert!(matches!(result, Err(EvolutionError::ShapeMismatch(_))));
    }

    #[test]
    fn test_gaussian_mutation_invalidates_and_keeps_length() {
        let mut rng = ChaCha20Rng::seed_from_u64(15);
        let mutation = GaussianMutation::new(0.5, 1.0).unwrap();
        assert_eq!(mutation.sigma(), 0.5);
        let mut individual = Individual::with_fitness(vec![0.2, 0.4, 0.6], 1.0);
        mutation.mutate(&mut individual, &mut rng);
        assert_eq!(individual.dimension(), 3);
        assert!(!individual.is_evaluated());
        assert_ne!(individual.genes, vec![0.2, 0.4, 0.6]);
    }

    #[test]
    fn test_zero_gene_probability_leaves_genes_alone() {
        let mut rng = ChaCha20Rng::seed_from_u64(16);
        let mut individual = Individual::with_fitness(vec![0.2, 0.4], 1.0);
        GaussianMutation::new(1.0, 0.0)
            .unwrap()
            .mutate(&mut individual, &mut rng);
        assert_eq!(individual.genes, vec![0.2, 0.4]);
        // the operator still ran, so the cost is dirty
        assert!(!individual.is_evaluated());
    }

    #[test]
    fn test_uniform_reset_stays_in_unit_interval() {
        let mut rng = ChaCha20Rng::seed_from_u64(17);
        let mutation = UniformResetMutation::new(1.0).unwrap();
        let mut individual = Individual::new(vec![5.0, -3.0, 12.0]);
        mutation.mutate(&mut individual, &mut rng);
        for gene in individual.genes.iter() {
            assert!((0.0..1.0).contains(gene));
        }
    }

    #[test]
    fn test_invalid_mutation_parameters() {
        assert!(GaussianMutation::new(-1.0, 0.5).is_err());
        assert!(GaussianMutation::new(0.1, 1.5).is_err());
        assert!(UniformResetMutation::new(-0.1).is_err());
    }

    #[test]
    fn test_vary_without_variation_is_identity() {
        let mut rng = ChaCha20Rng::seed_from_u64(18);
        let pool = vec![
            Individual::with_fitness(vec![0.1, 0.2], 1.0),
            Individual::with_fitness(vec![0.3, 0.4], 2.0),
            Individual::with_fitness(vec![0.5, 0.6], 3.0),
        ];
        let mutation = GaussianMutation::new(0.1, 1.0).unwrap();
        let offspring = vary(pool.clone(), &TwoPointCrossover, &mutation, 0.0, 0.0, &mut rng).unwrap();
        assert_eq!(offspring, pool);
    }

    #[test]
    fn test_vary_always_crossing_invalidates_pairs_only() {
        let mut rng = ChaCha20Rng::seed_from_u64(19);
        let pool = vec![
            Individual::with_fitness(vec![0.1, 0.2], 1.0),
            Individual::with_fitness(vec![0.3, 0.4], 2.0),
            Individual::with_fitness(vec![0.5, 0.6], 3.0),
        ];
        let mutation = GaussianMutation::new(0.1, 1.0).unwrap();
        let offspring = vary(pool, &TwoPointCrossover, &mutation, 1.0, 0.0, &mut rng).unwrap();
        assert_eq!(offspring.len(), 3);
        assert!(!offspring[0].is_evaluated());
        assert!(!offspring[1].is_evaluated());
        // odd one out never has a partner
        assert_eq!(offspring[2].fitness, Some(3.0));
    }
}

//! Seeded simple random sampling without replacement.

use rand::rngs::StdRng;
use rand::SeedableRng;

pub struct Sampler {
    size: usize,
    seed: u64,
}

impl Sampler {
    pub fn new(size: usize, seed: u64) -> Self {
        Self { size, seed }
    }

    /// Row indices of a uniform sample drawn from `population` rows, or
    /// `None` when the population is smaller than the requested size.
    pub fn sample(&self, population: usize) -> Option<Vec<usize>> {
        if population < self.size {
            return None;
        }
        let mut rng = StdRng::seed_from_u64(self.seed);
        Some(rand::seq::index::sample(&mut rng, population, self.size).into_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn same_seed_same_sample() {
        let sampler = Sampler::new(50, 42);
        assert_eq!(sampler.sample(1_000), sampler.sample(1_000));
    }

    #[test]
    fn draws_without_replacement() {
        let rows = Sampler::new(100, 7).sample(120).unwrap();
        assert_eq!(rows.len(), 100);
        assert!(rows.iter().all(|&r| r < 120));
        assert_eq!(rows.iter().collect::<HashSet<_>>().len(), 100);
    }

    #[test]
    fn undersized_population_is_skipped() {
        assert_eq!(Sampler::new(500_000, 42).sample(499_999), None);
        assert_eq!(Sampler::new(3, 42).sample(3).map(|r| r.len()), Some(3));
    }

    #[test]
    fn different_seeds_differ() {
        let a = Sampler::new(20, 1).sample(10_000);
        let b = Sampler::new(20, 2).sample(10_000);
        assert_ne!(a, b);
    }
}

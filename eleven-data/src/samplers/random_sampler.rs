use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::traits::Sampler;

/// Visits every index once per pass, in a fresh random order each time.
#[derive(Debug, Clone)]
pub struct RandomSampler {
    rng: StdRng,
}

impl RandomSampler {
    /// A sampler seeded from the operating system.
    pub fn new() -> Self {
        RandomSampler {
            rng: StdRng::from_entropy(),
        }
    }

    /// A reproducible sampler.
    pub fn with_seed(seed: u64) -> Self {
        RandomSampler {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        RandomSampler::new()
    }
}

impl Sampler for RandomSampler {
    fn iter(&mut self, dataset_len: usize) -> Box<dyn Iterator<Item = usize>> {
        let mut indices: Vec<usize> = (0..dataset_len).collect();
        indices.shuffle(&mut self.rng);
        Box::new(indices.into_iter())
    }
}

#[cfg(test)]
#[path = "random_sampler_test.rs"]
mod tests;

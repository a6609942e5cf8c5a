use rand::{rngs::StdRng, Rng, SeedableRng};

/// Seedable Bernoulli stream for the per-codon inclusion draws.
///
/// One `draw` consumes exactly one value from the underlying generator, so
/// a fixed seed reproduces the whole stream as long as callers keep their
/// draw order. Passed by mutable reference into the enumerator; never a
/// process-wide singleton.
#[derive(Clone, Debug)]
pub struct BernoulliSampler {
    rng: StdRng,
}

impl BernoulliSampler {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// One boolean draw with the given success probability.
    pub fn draw(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let mut a = BernoulliSampler::from_seed(42);
        let mut b = BernoulliSampler::from_seed(42);
        let draws_a: Vec<bool> = (0..100).map(|_| a.draw(0.5)).collect();
        let draws_b: Vec<bool> = (0..100).map(|_| b.draw(0.5)).collect();
        assert_eq!(draws_a, draws_b);
        assert!(draws_a.iter().any(|d| *d));
        assert!(draws_a.iter().any(|d| !*d));
    }

    #[test]
    fn test_seed_changes_stream() {
        let mut a = BernoulliSampler::from_seed(1);
        let mut b = BernoulliSampler::from_seed(2);
        let draws_a: Vec<bool> = (0..64).map(|_| a.draw(0.5)).collect();
        let draws_b: Vec<bool> = (0..64).map(|_| b.draw(0.5)).collect();
        assert_ne!(draws_a, draws_b);
    }

    #[test]
    fn test_degenerate_probabilities() {
        let mut sampler = BernoulliSampler::from_seed(7);
        assert!((0..50).all(|_| !sampler.draw(0.0)));
        assert!((0..50).all(|_| sampler.draw(1.0)));
    }
}

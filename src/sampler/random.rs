//! Pseudo-random sampler.

use crate::error::Result;
use crate::matrix::DesignMatrix;
use crate::rng_util::{self, Stream};
use crate::sampler::{Sampler, check_request};

/// Independent uniform draws from a seeded generator.
///
/// Points are generated row by row, so the first `m` rows of an `n`-point
/// sample equal an `m`-point sample with the same seed and dimensions.
///
/// # Examples
///
/// ```
/// use metafunction::sampler::{RandomSampler, Sampler};
///
/// let m = RandomSampler::with_seed(42).sample(16, 3).unwrap();
/// assert_eq!(m.n_rows(), 16);
/// assert!(m.as_slice().iter().all(|v| (0.0..1.0).contains(v)));
/// ```
#[derive(Clone, Debug)]
pub struct RandomSampler {
    seed: u64,
}

impl RandomSampler {
    /// Creates a new random sampler with a fixed seed for reproducibility.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl Sampler for RandomSampler {
    fn name(&self) -> &'static str {
        "random"
    }

    fn sample(&self, n: usize, dims: usize) -> Result<DesignMatrix> {
        check_request(n, dims)?;
        let mut rng = rng_util::seeded(self.seed, Stream::Sampling);
        let mut matrix = DesignMatrix::zeros(n, dims);
        for i in 0..n {
            for v in matrix.row_mut(i) {
                *v = rng.f64();
            }
        }
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_unit_interval() {
        let m = RandomSampler::with_seed(3).sample(200, 4).unwrap();
        assert!(m.as_slice().iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn reproducible() {
        let a = RandomSampler::with_seed(42).sample(10, 3).unwrap();
        let b = RandomSampler::with_seed(42).sample(10, 3).unwrap();
        assert_eq!(a, b);
        let c = RandomSampler::with_seed(43).sample(10, 3).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn smaller_sample_is_prefix() {
        let big = RandomSampler::with_seed(8).sample(32, 2).unwrap();
        let small = RandomSampler::with_seed(8).sample(8, 2).unwrap();
        assert_eq!(&big.as_slice()[..16], small.as_slice());
    }

    #[test]
    fn empty_requests_fail() {
        let s = RandomSampler::with_seed(0);
        assert!(s.sample(0, 2).is_err());
        assert!(s.sample(2, 0).is_err());
    }
}

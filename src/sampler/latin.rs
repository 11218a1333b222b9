//! Latin hypercube sampler.

use crate::error::Result;
use crate::matrix::DesignMatrix;
use crate::rng_util::{self, Stream};
use crate::sampler::{Sampler, check_request};

/// Latin hypercube sampling: each dimension is cut into `n` equal strata
/// and every stratum holds exactly one point, jittered uniformly inside it.
///
/// Strata are paired across dimensions by independent random permutations.
#[derive(Clone, Debug)]
pub struct LatinHypercubeSampler {
    seed: u64,
}

impl LatinHypercubeSampler {
    /// Creates a new Latin hypercube sampler with a fixed seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }
}

impl Sampler for LatinHypercubeSampler {
    fn name(&self) -> &'static str {
        "latin_hypercube"
    }

    #[allow(clippy::cast_precision_loss)]
    fn sample(&self, n: usize, dims: usize) -> Result<DesignMatrix> {
        check_request(n, dims)?;
        let mut rng = rng_util::seeded(self.seed, Stream::Sampling);
        let mut matrix = DesignMatrix::zeros(n, dims);
        let mut strata: Vec<usize> = (0..n).collect();
        let width = 1.0 / n as f64;

        for dim in 0..dims {
            rng.shuffle(&mut strata);
            for (i, &s) in strata.iter().enumerate() {
                let low = s as f64 * width;
                let v = rng_util::f64_range(&mut rng, low, low + width);
                // Guard against rounding up to exactly 1.0.
                matrix.set(i, dim, v.min(1.0 - f64::EPSILON));
            }
        }
        Ok(matrix)
    }
}

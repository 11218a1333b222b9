//! Quasi-random sampler using Sobol low-discrepancy sequences.
//!
//! [`SobolSampler`] draws points from a Sobol sequence (scrambled via the
//! Burley 2020 algorithm). Point `i` of the sample is sequence index `i`,
//! and column `j` is Sobol dimension `j`, so a smaller sample is always a
//! prefix of a larger one with the same seed.

use sobol_burley::sample;

use crate::error::{Error, Result};
use crate::matrix::DesignMatrix;
use crate::sampler::{Sampler, check_request};

/// Number of dimensions the underlying direction numbers cover.
pub const MAX_DIMENSIONS: usize = 256;

/// Largest number of points per sample.
pub const MAX_POINTS: usize = 1 << 16;

/// Quasi-random sampler using a scrambled Sobol sequence.
///
/// Different seeds give statistically independent scramblings of the same
/// sequence.
///
/// # Examples
///
/// ```
/// use metafunction::sampler::{Sampler, SobolSampler};
///
/// let m = SobolSampler::with_seed(0).sample(64, 4).unwrap();
/// assert_eq!(m.n_cols(), 4);
/// ```
#[derive(Clone, Debug)]
pub struct SobolSampler {
    seed: u32,
}

impl SobolSampler {
    /// Creates a new Sobol sampler with the given seed.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: seed as u32 }
    }
}

impl Sampler for SobolSampler {
    fn name(&self) -> &'static str {
        "sobol"
    }

    #[allow(clippy::cast_possible_truncation)]
    fn sample(&self, n: usize, dims: usize) -> Result<DesignMatrix> {
        check_request(n, dims)?;
        if dims > MAX_DIMENSIONS {
            return Err(Error::TooManyDimensions {
                scheme: "sobol",
                requested: dims,
                max: MAX_DIMENSIONS,
            });
        }
        if n > MAX_POINTS {
            return Err(Error::InvalidSampleSize {
                n,
                reason: "sobol sequences are limited to 65536 points",
            });
        }

        let mut matrix = DesignMatrix::zeros(n, dims);
        for i in 0..n {
            for (dim, v) in matrix.row_mut(i).iter_mut().enumerate() {
                *v = f64::from(sample(i as u32, dim as u32, self.seed));
            }
        }
        Ok(matrix)
    }
}

#[cfg(test)]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
mod tests {
    use super::*;

    #[test]
    fn within_unit_interval() {
        let m = SobolSampler::with_seed(42).sample(256, 6).unwrap();
        assert!(m.as_slice().iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn deterministic_with_same_seed() {
        let a = SobolSampler::with_seed(42).sample(32, 3).unwrap();
        let b = SobolSampler::with_seed(42).sample(32, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_produce_different_sequences() {
        let a = SobolSampler::with_seed(0).sample(16, 2).unwrap();
        let b = SobolSampler::with_seed(12345).sample(16, 2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn better_coverage_than_random() {
        // 20 Sobol points should fill at least 8 of 10 equal-width bins.
        let m = SobolSampler::with_seed(0).sample(20, 1).unwrap();
        let mut bins = [0u32; 10];
        for v in m.column(0) {
            bins[((v * 10.0).floor() as usize).min(9)] += 1;
        }
        let filled = bins.iter().filter(|&&c| c > 0).count();
        assert!(filled >= 8, "expected at least 8/10 bins filled, got {filled}: {bins:?}");
    }

    #[test]
    fn smaller_sample_is_prefix() {
        let big = SobolSampler::with_seed(5).sample(64, 3).unwrap();
        let small = SobolSampler::with_seed(5).sample(16, 3).unwrap();
        assert_eq!(&big.as_slice()[..48], small.as_slice());
    }

    #[test]
    fn rejects_unsupported_requests() {
        let s = SobolSampler::with_seed(0);
        assert!(matches!(
            s.sample(8, MAX_DIMENSIONS + 1),
            Err(Error::TooManyDimensions { .. })
        ));
        assert!(s.sample(MAX_POINTS + 1, 1).is_err());
    }
}

//! Unit-hypercube samplers.
//!
//! A [`Sampler`] produces an `n × dims` matrix of points in `[0, 1)^dims`.
//! Three strategies are provided:
//!
//! | Sampler | Strategy |
//! |---------|----------|
//! | [`RandomSampler`] | Independent pseudo-random draws |
//! | [`SobolSampler`] | Scrambled Sobol low-discrepancy sequence |
//! | [`LatinHypercubeSampler`] | One point per stratum in every dimension |
//!
//! All samplers are seeded and stateless between calls: sampling twice with
//! the same arguments yields the same matrix.

pub mod latin;
pub mod random;
pub mod sobol;

pub use latin::LatinHypercubeSampler;
pub use random::RandomSampler;
pub use sobol::SobolSampler;

use crate::error::{Error, Result};
use crate::matrix::DesignMatrix;

/// Trait for strategies that fill the unit hypercube.
///
/// Implementations must be deterministic for a given seed so that every
/// experiment row is reproducible on any worker.
pub trait Sampler: Send + Sync {
    /// Human-readable name of the strategy.
    fn name(&self) -> &'static str;

    /// Draw `n` points in `[0, 1)^dims`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSampleSize`] or [`Error::InvalidDimensions`]
    /// for empty requests, and [`Error::TooManyDimensions`] when the strategy
    /// cannot cover `dims`.
    fn sample(&self, n: usize, dims: usize) -> Result<DesignMatrix>;
}

/// Shared argument check for every sampler.
pub(crate) fn check_request(n: usize, dims: usize) -> Result<()> {
    if n == 0 {
        return Err(Error::InvalidSampleSize {
            n,
            reason: "must be at least 1",
        });
    }
    if dims == 0 {
        return Err(Error::InvalidDimensions);
    }
    Ok(())
}

//! Sampling designs for Sobol' index estimation.
//!
//! Estimating total-order indices needs the model evaluated on matrices that
//! recombine columns of two independent base samples `A` and `B`:
//!
//! - `ABᵢ` is `A` with column `i` taken from `B`,
//! - `BAᵢ` is `B` with column `i` taken from `A`.
//!
//! [`generate`] stacks the blocks requested by a [`MatrixSet`] vertically,
//! in the order `A, B, AB₁..AB_k, BA₁..BA_k`, each block holding `n` rows.
//!
//! # Example
//!
//! ```
//! use metafunction::design::{generate, MatrixSet, SamplingScheme};
//!
//! let params = ["X1", "X2", "X3"];
//! let m = generate(8, &params, SamplingScheme::Sobol, MatrixSet::CrossPickFreeze, 1).unwrap();
//! assert_eq!(m.n_rows(), 8 * (2 * 3 + 2));
//! assert_eq!(m.n_cols(), 3);
//! ```

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::matrix::DesignMatrix;
use crate::sampler::{LatinHypercubeSampler, RandomSampler, Sampler, SobolSampler};

/// Strategy used to fill the unit hypercube.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SamplingScheme {
    /// Pseudo-random Monte Carlo.
    Random,
    /// Scrambled Sobol quasi-Monte Carlo.
    Sobol,
    /// Latin hypercube sampling.
    LatinHypercube,
}

impl SamplingScheme {
    pub const ALL: [Self; 3] = [Self::Random, Self::Sobol, Self::LatinHypercube];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Sobol => "sobol",
            Self::LatinHypercube => "lhs",
        }
    }

    /// The sampler implementing this scheme, seeded with `seed`.
    #[must_use]
    pub fn sampler(self, seed: u64) -> Box<dyn Sampler> {
        match self {
            Self::Random => Box::new(RandomSampler::with_seed(seed)),
            Self::Sobol => Box::new(SobolSampler::with_seed(seed)),
            Self::LatinHypercube => Box::new(LatinHypercubeSampler::with_seed(seed)),
        }
    }
}

impl fmt::Display for SamplingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for SamplingScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "random" | "r" => Ok(Self::Random),
            "sobol" | "qrn" => Ok(Self::Sobol),
            "lhs" | "latin_hypercube" => Ok(Self::LatinHypercube),
            _ => Err(Error::InvalidConfig(format!("unknown sampling scheme '{s}'"))),
        }
    }
}

/// Which blocks of the recombined design to generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MatrixSet {
    /// `A` only: a plain sample, enough for output statistics.
    Base,
    /// `A, B, AB`: pick-freeze design for Saltelli/Jansen estimators.
    PickFreeze,
    /// `A, B, AB, BA`: cross design required by the Azzini estimators.
    CrossPickFreeze,
}

impl MatrixSet {
    /// Number of `n`-row blocks the design holds for `k` parameters.
    #[must_use]
    pub fn n_blocks(self, k: usize) -> usize {
        match self {
            Self::Base => 1,
            Self::PickFreeze => k + 2,
            Self::CrossPickFreeze => 2 * k + 2,
        }
    }

    /// Number of unit-hypercube dimensions the base sample needs.
    #[must_use]
    pub fn base_dimensions(self, k: usize) -> usize {
        match self {
            Self::Base => k,
            Self::PickFreeze | Self::CrossPickFreeze => 2 * k,
        }
    }

    /// The matrix identifiers in this set, e.g. `"A,B,AB,BA"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Base => "A",
            Self::PickFreeze => "A,B,AB",
            Self::CrossPickFreeze => "A,B,AB,BA",
        }
    }
}

impl fmt::Display for MatrixSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// Generate the design for `n` base samples of `params`.
///
/// The same `(n, params.len(), scheme, matrix_set, seed)` always yields the
/// same matrix.
///
/// # Errors
///
/// Returns [`Error::InvalidSampleSize`] or [`Error::InvalidDimensions`] for
/// empty requests, and [`Error::TooManyDimensions`] if the scheme cannot
/// cover `2k` dimensions.
pub fn generate<S: AsRef<str>>(
    n: usize,
    params: &[S],
    scheme: SamplingScheme,
    matrix_set: MatrixSet,
    seed: u64,
) -> Result<DesignMatrix> {
    let k = params.len();
    if k == 0 {
        return Err(Error::InvalidDimensions);
    }
    let base = scheme
        .sampler(seed)
        .sample(n, matrix_set.base_dimensions(k))?;
    if matrix_set == MatrixSet::Base {
        return Ok(base);
    }

    let mut out = DesignMatrix::zeros(n * matrix_set.n_blocks(k), k);
    copy_block(&mut out, &base, 0, Half::A, None);
    copy_block(&mut out, &base, 1, Half::B, None);
    for i in 0..k {
        copy_block(&mut out, &base, 2 + i, Half::A, Some(i));
    }
    if matrix_set == MatrixSet::CrossPickFreeze {
        for i in 0..k {
            copy_block(&mut out, &base, 2 + k + i, Half::B, Some(i));
        }
    }
    Ok(out)
}

/// Which half of the base sample a block is built from.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Half {
    A,
    B,
}

/// Write block `block` of `out`: columns of `half`, except column `swap`
/// which comes from the other half.
fn copy_block(
    out: &mut DesignMatrix,
    base: &DesignMatrix,
    block: usize,
    half: Half,
    swap: Option<usize>,
) {
    let n = base.n_rows();
    let k = out.n_cols();
    for i in 0..n {
        let src = base.row(i);
        let dst = out.row_mut(block * n + i);
        for (j, v) in dst.iter_mut().enumerate() {
            let from_b = (half == Half::B) != (swap == Some(j));
            *v = if from_b { src[k + j] } else { src[j] };
        }
    }
}

//! Marginal distributions for metafunction inputs.
//!
//! Samples are generated in the unit hypercube and pushed through the
//! quantile function of one of seven fixed marginal laws. A
//! [`DistributionSelector`] either applies one law to every column or
//! draws a law per column from a generator seeded by the row seed.
//!
//! # Example
//!
//! ```
//! use metafunction::distribution::{Distribution, DistributionSelector, select_and_apply};
//! use metafunction::DesignMatrix;
//!
//! let mut m = DesignMatrix::from_rows(&[vec![0.25, 0.5], vec![0.75, 0.0]]);
//! let selector = DistributionSelector::from_index(1).unwrap();
//! let laws = select_and_apply(&mut m, selector, 7).unwrap();
//!
//! assert_eq!(laws, vec![Distribution::Uniform, Distribution::Uniform]);
//! assert_eq!(m.row(0), &[-0.5, 0.0]);
//! ```

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use statrs::distribution::{Beta, ContinuousCDF, Normal};

use crate::error::{Error, Result};
use crate::matrix::DesignMatrix;
use crate::rng_util::{self, Stream};

/// Probabilities are clamped to `[EPS, 1 - EPS]` for laws with unbounded
/// support so a draw of exactly zero stays finite.
const EPS: f64 = 1e-12;

/// The fixed catalog of marginal laws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Distribution {
    /// Uniform on `(-1, 1)`.
    Uniform,
    /// Normal with mean 0 and standard deviation 0.3.
    Normal,
    /// Beta(8, 2).
    Beta8_2,
    /// Beta(2, 8).
    Beta2_8,
    /// Beta(2, 0.8).
    Beta2_08,
    /// Beta(0.8, 2).
    Beta08_2,
    /// Logit-normal with µ = 0 and σ = 3.16.
    LogitNormal,
}

impl Distribution {
    /// Every law, in selector order (`ALL[phi - 1]`).
    pub const ALL: [Self; 7] = [
        Self::Uniform,
        Self::Normal,
        Self::Beta8_2,
        Self::Beta2_8,
        Self::Beta2_08,
        Self::Beta08_2,
        Self::LogitNormal,
    ];

    /// Short name used in reports and by [`FromStr`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Normal => "normal",
            Self::Beta8_2 => "beta_8_2",
            Self::Beta2_8 => "beta_2_8",
            Self::Beta2_08 => "beta_2_0.8",
            Self::Beta08_2 => "beta_0.8_2",
            Self::LogitNormal => "logitnormal",
        }
    }

    fn law(self) -> Result<Law> {
        let law = match self {
            Self::Uniform => Law::Uniform {
                low: -1.0,
                high: 1.0,
            },
            Self::Normal => Law::Normal(normal(0.0, 0.3)?),
            Self::Beta8_2 => Law::Beta(beta(8.0, 2.0)?),
            Self::Beta2_8 => Law::Beta(beta(2.0, 8.0)?),
            Self::Beta2_08 => Law::Beta(beta(2.0, 0.8)?),
            Self::Beta08_2 => Law::Beta(beta(0.8, 2.0)?),
            Self::LogitNormal => Law::LogitNormal(normal(0.0, 3.16)?),
        };
        Ok(law)
    }

    /// Quantile function: map a uniform draw `u` in `[0, 1)` to this law.
    ///
    /// Prefer [`apply`](Self::apply) for whole columns; this rebuilds the
    /// underlying law on every call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Distribution`] if the law cannot be constructed.
    pub fn quantile(self, u: f64) -> Result<f64> {
        Ok(self.law()?.quantile(u))
    }

    /// Transform a column of uniform draws in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Distribution`] if the law cannot be constructed.
    pub fn apply(self, column: &mut [f64]) -> Result<()> {
        let law = self.law()?;
        for v in column.iter_mut() {
            *v = law.quantile(*v);
        }
        Ok(())
    }

    /// Transform column `col` of `matrix` in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Distribution`] if the law cannot be constructed.
    pub fn apply_to_column(self, matrix: &mut DesignMatrix, col: usize) -> Result<()> {
        let law = self.law()?;
        matrix.map_column(col, |u| law.quantile(u));
        Ok(())
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Distribution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownDistribution(s.to_owned()))
    }
}

/// A constructed law, built once per column.
enum Law {
    Uniform { low: f64, high: f64 },
    Normal(Normal),
    Beta(Beta),
    LogitNormal(Normal),
}

impl Law {
    fn quantile(&self, u: f64) -> f64 {
        match self {
            Self::Uniform { low, high } => low + u * (high - low),
            Self::Normal(n) => n.inverse_cdf(u.clamp(EPS, 1.0 - EPS)),
            Self::Beta(b) => b.inverse_cdf(u),
            Self::LogitNormal(n) => {
                let z = n.inverse_cdf(u.clamp(EPS, 1.0 - EPS));
                1.0 / (1.0 + (-z).exp())
            }
        }
    }
}

fn normal(mean: f64, sd: f64) -> Result<Normal> {
    Normal::new(mean, sd).map_err(|e| Error::Distribution(e.to_string()))
}

fn beta(a: f64, b: f64) -> Result<Beta> {
    Beta::new(a, b).map_err(|e| Error::Distribution(e.to_string()))
}

/// How marginal laws are assigned to the columns of a design matrix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DistributionSelector {
    /// Every column follows the same law.
    Fixed(Distribution),
    /// Each column draws its own law, seeded by the row seed.
    Mixed,
}

impl DistributionSelector {
    /// Largest valid selector index (`catalog size + 1`).
    pub const MAX_INDEX: usize = Distribution::ALL.len() + 1;

    /// Build a selector from its 1-based index `phi`.
    ///
    /// `1..=7` select a single law, `8` selects a per-column mixture.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSelector`] if `phi` is outside `1..=8`.
    pub fn from_index(phi: usize) -> Result<Self> {
        match phi {
            0 => Err(Error::InvalidSelector {
                selector: phi,
                max: Self::MAX_INDEX,
            }),
            p if p <= Distribution::ALL.len() => Ok(Self::Fixed(Distribution::ALL[p - 1])),
            p if p == Self::MAX_INDEX => Ok(Self::Mixed),
            _ => Err(Error::InvalidSelector {
                selector: phi,
                max: Self::MAX_INDEX,
            }),
        }
    }

    /// The 1-based index this selector was built from.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Fixed(d) => Distribution::ALL
                .iter()
                .position(|&x| x == d)
                .map_or(Self::MAX_INDEX, |p| p + 1),
            Self::Mixed => Self::MAX_INDEX,
        }
    }

    /// The law of each of `k` columns.
    ///
    /// For [`Mixed`](Self::Mixed) the draw is independent per column, with
    /// replacement, from a generator seeded with `seed`: the same
    /// `(seed, k)` always yields the same assignment.
    #[must_use]
    pub fn assign(self, k: usize, seed: u64) -> Vec<Distribution> {
        match self {
            Self::Fixed(d) => vec![d; k],
            Self::Mixed => {
                let mut rng = rng_util::seeded(seed, Stream::Distributions);
                rng_util::choose_with_replacement(&mut rng, &Distribution::ALL, k)
            }
        }
    }
}

/// Transform every column of `matrix` according to `selector`.
///
/// Returns the law applied to each column.
///
/// # Errors
///
/// Returns [`Error::Distribution`] if a law cannot be constructed.
pub fn select_and_apply(
    matrix: &mut DesignMatrix,
    selector: DistributionSelector,
    seed: u64,
) -> Result<Vec<Distribution>> {
    let laws = selector.assign(matrix.n_cols(), seed);
    for (col, law) in laws.iter().enumerate() {
        law.apply_to_column(matrix, col)?;
    }
    Ok(laws)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_maps_to_minus_one_one() {
        let mut col = vec![0.0, 0.25, 0.5, 0.75];
        Distribution::Uniform.apply(&mut col).unwrap();
        assert_eq!(col, vec![-1.0, -0.5, 0.0, 0.5]);
    }

    #[test]
    fn normal_median_is_zero_and_spread_matches() {
        assert!(Distribution::Normal.quantile(0.5).unwrap().abs() < 1e-9);
        // Φ⁻¹(0.975) ≈ 1.959964
        let q = Distribution::Normal.quantile(0.975).unwrap();
        assert!((q - 0.3 * 1.959_964).abs() < 1e-4, "q = {q}");
    }

    #[test]
    fn zero_draw_stays_finite() {
        for d in Distribution::ALL {
            let q = d.quantile(0.0).unwrap();
            assert!(q.is_finite(), "{d} produced {q}");
        }
    }

    #[test]
    fn beta_and_logitnormal_stay_in_unit_interval() {
        for d in [
            Distribution::Beta8_2,
            Distribution::Beta2_8,
            Distribution::Beta2_08,
            Distribution::Beta08_2,
            Distribution::LogitNormal,
        ] {
            for i in 0..50 {
                let u = f64::from(i) / 50.0;
                let q = d.quantile(u).unwrap();
                assert!((0.0..=1.0).contains(&q), "{d}({u}) = {q}");
            }
        }
    }

    #[test]
    fn beta_quantiles_are_skewed_as_expected() {
        // Beta(8, 2) has mean 0.8, Beta(2, 8) has mean 0.2.
        assert!(Distribution::Beta8_2.quantile(0.5).unwrap() > 0.7);
        assert!(Distribution::Beta2_8.quantile(0.5).unwrap() < 0.3);
    }

    #[test]
    fn names_round_trip() {
        for d in Distribution::ALL {
            assert_eq!(d.name().parse::<Distribution>().unwrap(), d);
        }
        assert!(matches!(
            "cauchy".parse::<Distribution>(),
            Err(Error::UnknownDistribution(_))
        ));
    }

    #[test]
    fn selector_indices() {
        for (i, d) in Distribution::ALL.iter().enumerate() {
            let sel = DistributionSelector::from_index(i + 1).unwrap();
            assert_eq!(sel, DistributionSelector::Fixed(*d));
            assert_eq!(sel.index(), i + 1);
        }
        assert_eq!(
            DistributionSelector::from_index(8).unwrap(),
            DistributionSelector::Mixed
        );
        assert!(DistributionSelector::from_index(0).is_err());
        let err = DistributionSelector::from_index(9).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn mixed_assignment_is_reproducible() {
        let a = DistributionSelector::Mixed.assign(12, 42);
        let b = DistributionSelector::Mixed.assign(12, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn mixed_assignment_depends_on_seed() {
        let reference = DistributionSelector::Mixed.assign(10, 1);
        let changed = (2..10).any(|seed| DistributionSelector::Mixed.assign(10, seed) != reference);
        assert!(changed);
    }

    #[test]
    fn mixed_single_column_draws_one_law() {
        for seed in 0..20 {
            let laws = DistributionSelector::Mixed.assign(1, seed);
            assert_eq!(laws.len(), 1);
            assert!(Distribution::ALL.contains(&laws[0]));
        }
    }

    #[test]
    fn select_and_apply_uses_assignment_per_column() {
        let mut m = DesignMatrix::from_rows(&[vec![0.3, 0.3, 0.3], vec![0.6, 0.6, 0.6]]);
        let laws = select_and_apply(&mut m, DistributionSelector::Mixed, 5).unwrap();
        assert_eq!(laws, DistributionSelector::Mixed.assign(3, 5));
        for (col, law) in laws.iter().enumerate() {
            assert_eq!(m.get(0, col), law.quantile(0.3).unwrap());
            assert_eq!(m.get(1, col), law.quantile(0.6).unwrap());
        }
    }
}

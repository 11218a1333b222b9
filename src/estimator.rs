//! Sobol' sensitivity index estimators.
//!
//! Converts model outputs evaluated on a recombined design (see
//! [`design`](crate::design)) into per-parameter first-order (`Sᵢ`) and
//! total-order (`Tᵢ`) indices.
//!
//! # Estimators
//!
//! With `f_A`, `f_B`, `f_ABᵢ`, `f_BAᵢ` the outputs of the corresponding
//! blocks:
//!
//! | Estimator | Formula | Needs |
//! |-----------|---------|-------|
//! | Azzini `Sᵢ` | `2 Σ (f_BAᵢ − f_B)(f_A − f_ABᵢ) / Dᵢ` | `A,B,AB,BA` |
//! | Azzini `Tᵢ` | `Σ [(f_B − f_BAᵢ)² + (f_A − f_ABᵢ)²] / Dᵢ` | `A,B,AB,BA` |
//! | Saltelli `Sᵢ` | `mean(f_B (f_ABᵢ − f_A)) / V(Y)` | `A,B,AB` |
//! | Jansen `Tᵢ` | `½ mean((f_A − f_ABᵢ)²) / V(Y)` | `A,B,AB` |
//!
//! where `Dᵢ = Σ [(f_A − f_B)² + (f_BAᵢ − f_ABᵢ)²]` and `V(Y)` is the sample
//! population variance of `f_A` and `f_B` pooled.
//!
//! # References
//!
//! - Azzini, I., Mara, T. A. & Rosati, R. (2020). "Monte Carlo estimators of
//!   first- and total-orders Sobol' indices." arXiv:2006.08232.
//! - Saltelli, A. et al. (2010). "Variance based sensitivity analysis of
//!   model output." Computer Physics Communications 181(2).
//! - Jansen, M. J. W. (1999). "Analysis of variance designs for model
//!   output." Computer Physics Communications 117(1–2).
//!
//! Finite-sample estimates can be negative or exceed one. Such values are
//! reported as they are; see [`SobolIndices::has_anomaly`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::design::MatrixSet;
use crate::error::{Error, Result};

/// First-order index estimator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FirstOrder {
    #[default]
    Azzini,
    Saltelli,
}

/// Total-order index estimator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TotalOrder {
    #[default]
    Azzini,
    Jansen,
}

/// The pair of estimators used for one computation (Azzini/Azzini by
/// default).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Estimators {
    pub first: FirstOrder,
    pub total: TotalOrder,
}

impl Estimators {
    fn needs_cross_blocks(self) -> bool {
        self.first == FirstOrder::Azzini || self.total == TotalOrder::Azzini
    }
}

/// Per-parameter Sobol' index estimates.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SobolIndices {
    /// Parameter names, in column order.
    pub parameters: Vec<String>,
    /// First-order index of each parameter.
    pub first_order: Vec<f64>,
    /// Total-order index of each parameter.
    pub total_order: Vec<f64>,
    /// `Σ Sᵢ`.
    pub first_order_sum: f64,
    /// `Σ Tᵢ`, a proxy for the effective dimension of the model.
    pub total_order_sum: f64,
}

impl SobolIndices {
    fn new(parameters: Vec<String>, first_order: Vec<f64>, total_order: Vec<f64>) -> Self {
        let first_order_sum = first_order.iter().sum();
        let total_order_sum = total_order.iter().sum();
        Self {
            parameters,
            first_order,
            total_order,
            first_order_sum,
            total_order_sum,
        }
    }

    /// `(Sᵢ, Tᵢ)` for the parameter called `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<(f64, f64)> {
        self.parameters
            .iter()
            .position(|p| p == name)
            .map(|i| (self.first_order[i], self.total_order[i]))
    }

    /// Number of parameters whose total-order index exceeds `threshold`.
    #[must_use]
    pub fn n_important(&self, threshold: f64) -> usize {
        self.total_order.iter().filter(|&&t| t > threshold).count()
    }

    /// Whether any estimate is negative or non-finite, or the first-order
    /// indices sum outside `[0, 1]`.
    #[must_use]
    pub fn has_anomaly(&self) -> bool {
        let bad = |v: &f64| !v.is_finite() || *v < 0.0;
        self.first_order.iter().any(bad)
            || self.total_order.iter().any(bad)
            || !(0.0..=1.0).contains(&self.first_order_sum)
    }
}

/// Estimate Sobol' indices from model outputs on a recombined design.
///
/// `output` must hold `n × matrix_set.n_blocks(k)` values laid out as
/// produced by [`design::generate`](crate::design::generate).
///
/// # Errors
///
/// Returns [`Error::IncompatibleMatrixSet`] if the estimators need blocks
/// the matrix set lacks, [`Error::OutputLengthMismatch`] if `output` has the
/// wrong length, and [`Error::InvalidSampleSize`] / [`Error::InvalidDimensions`]
/// for empty inputs.
#[allow(clippy::cast_precision_loss)]
pub fn sobol_indices<S: AsRef<str>>(
    output: &[f64],
    n: usize,
    params: &[S],
    matrix_set: MatrixSet,
    estimators: Estimators,
) -> Result<SobolIndices> {
    let k = params.len();
    if k == 0 {
        return Err(Error::InvalidDimensions);
    }
    if n < 2 {
        return Err(Error::InvalidSampleSize {
            n,
            reason: "index estimation needs at least 2 base samples",
        });
    }
    match matrix_set {
        MatrixSet::Base => {
            return Err(Error::IncompatibleMatrixSet {
                estimator: "sobol",
                required: MatrixSet::PickFreeze.label(),
                got: matrix_set.label(),
            });
        }
        MatrixSet::PickFreeze if estimators.needs_cross_blocks() => {
            return Err(Error::IncompatibleMatrixSet {
                estimator: "azzini",
                required: MatrixSet::CrossPickFreeze.label(),
                got: matrix_set.label(),
            });
        }
        _ => {}
    }
    let expected = n * matrix_set.n_blocks(k);
    if output.len() != expected {
        return Err(Error::OutputLengthMismatch {
            expected,
            got: output.len(),
        });
    }

    let f_a = block(output, n, 0);
    let f_b = block(output, n, 1);
    let vy = pooled_variance(f_a, f_b);
    let nf = n as f64;

    let mut first = Vec::with_capacity(k);
    let mut total = Vec::with_capacity(k);
    for i in 0..k {
        let f_ab = block(output, n, 2 + i);
        // BA blocks only exist in the cross design.
        let azzini = (matrix_set == MatrixSet::CrossPickFreeze).then(|| {
            let f_ba = block(output, n, 2 + k + i);
            let denominator: f64 = (0..n)
                .map(|r| (f_a[r] - f_b[r]).powi(2) + (f_ba[r] - f_ab[r]).powi(2))
                .sum();
            (f_ba, denominator)
        });
        let cross = || azzini.ok_or(Error::Internal("Azzini estimator without BA blocks"));

        let s = match estimators.first {
            FirstOrder::Azzini => {
                let (f_ba, d) = cross()?;
                let num: f64 = (0..n)
                    .map(|r| (f_ba[r] - f_b[r]) * (f_a[r] - f_ab[r]))
                    .sum();
                2.0 * num / d
            }
            FirstOrder::Saltelli => {
                let num: f64 = (0..n).map(|r| f_b[r] * (f_ab[r] - f_a[r])).sum();
                num / nf / vy
            }
        };

        let t = match estimators.total {
            TotalOrder::Azzini => {
                let (f_ba, d) = cross()?;
                let num: f64 = (0..n)
                    .map(|r| (f_b[r] - f_ba[r]).powi(2) + (f_a[r] - f_ab[r]).powi(2))
                    .sum();
                num / d
            }
            TotalOrder::Jansen => {
                let num: f64 = (0..n).map(|r| (f_a[r] - f_ab[r]).powi(2)).sum();
                0.5 * num / nf / vy
            }
        };

        first.push(s);
        total.push(t);
    }

    let names = params.iter().map(|p| p.as_ref().to_owned()).collect();
    Ok(SobolIndices::new(names, first, total))
}

/// The `b`-th `n`-row block of `output`.
fn block(output: &[f64], n: usize, b: usize) -> &[f64] {
    &output[b * n..(b + 1) * n]
}

/// Population variance of `a` and `b` taken together.
#[allow(clippy::cast_precision_loss)]
fn pooled_variance(a: &[f64], b: &[f64]) -> f64 {
    let count = (a.len() + b.len()) as f64;
    let mean = a.iter().chain(b).sum::<f64>() / count;
    a.iter().chain(b).map(|v| (v - mean).powi(2)).sum::<f64>() / count
}

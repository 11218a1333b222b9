//! One experiment row: generate, transform, evaluate, estimate.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::design::{self, MatrixSet, SamplingScheme};
use crate::distribution::{self, Distribution, DistributionSelector};
use crate::error::{Error, Result};
use crate::estimator::{self, Estimators, SobolIndices};
use crate::metafunction;

/// The full parameter set of one unit of work.
///
/// Rows are produced by [`ExperimentGrid`](crate::grid::ExperimentGrid) and
/// never change once built.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExperimentRow {
    /// Unique task identity, used to reassemble results.
    pub id: usize,
    /// Outer-design point this row replicates.
    pub base_id: usize,
    /// Number of model inputs.
    pub k: usize,
    /// Seeds function assignment, law mixture and sampler scrambling.
    pub seed: u64,
    /// Highest interaction order.
    pub order: usize,
    pub selector: DistributionSelector,
    /// Number of base samples `N`.
    pub sample_size: usize,
    pub scheme: SamplingScheme,
    pub matrix_set: MatrixSet,
    pub estimators: Estimators,
}

impl ExperimentRow {
    /// Parameter names `X1..Xk`.
    #[must_use]
    pub fn parameter_names(&self) -> Vec<String> {
        (1..=self.k).map(|i| format!("X{i}")).collect()
    }
}

impl fmt::Display for ExperimentRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {} (base {}): k={} seed={} order={} phi={} N={} scheme={} matrices={}",
            self.id,
            self.base_id,
            self.k,
            self.seed,
            self.order,
            self.selector.index(),
            self.sample_size,
            self.scheme,
            self.matrix_set,
        )
    }
}

/// What a successful row produces.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RunOutput {
    /// Arithmetic mean of the model output over the `A` block.
    pub mean_output: f64,
    /// Sobol' indices; `None` when the row only samples `A`.
    pub indices: Option<SobolIndices>,
    /// Law applied to each input column.
    pub distributions: Vec<Distribution>,
}

/// Execute one experiment row.
///
/// Every stochastic step is seeded from `row.seed`, so the same row gives
/// the same output on any thread.
///
/// # Errors
///
/// Propagates configuration errors (e.g. `order > k`) and estimator errors
/// unchanged.
#[allow(clippy::cast_precision_loss)]
pub fn run(row: &ExperimentRow) -> Result<RunOutput> {
    let params = row.parameter_names();
    let mut matrix = design::generate(
        row.sample_size,
        &params,
        row.scheme,
        row.matrix_set,
        row.seed,
    )?;
    let distributions = distribution::select_and_apply(&mut matrix, row.selector, row.seed)?;
    let output = metafunction::evaluate(&matrix, row.seed, row.order)?;

    let head = output
        .get(..row.sample_size)
        .ok_or(Error::Internal("model output shorter than the A block"))?;
    let mean_output = head.iter().sum::<f64>() / row.sample_size as f64;

    let indices = match row.matrix_set {
        MatrixSet::Base => None,
        set => Some(estimator::sobol_indices(
            &output,
            row.sample_size,
            &params,
            set,
            row.estimators,
        )?),
    };

    Ok(RunOutput {
        mean_output,
        indices,
        distributions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ExperimentRow {
        ExperimentRow {
            id: 0,
            base_id: 0,
            k: 4,
            seed: 7,
            order: 2,
            selector: DistributionSelector::Fixed(Distribution::Uniform),
            sample_size: 64,
            scheme: SamplingScheme::Sobol,
            matrix_set: MatrixSet::CrossPickFreeze,
            estimators: Estimators::default(),
        }
    }

    #[test]
    fn produces_indices_for_each_input() {
        let out = run(&row()).unwrap();
        let idx = out.indices.unwrap();
        assert_eq!(idx.parameters, vec!["X1", "X2", "X3", "X4"]);
        assert_eq!(idx.first_order.len(), 4);
        assert_eq!(out.distributions, vec![Distribution::Uniform; 4]);
        assert!(out.mean_output.is_finite());
    }

    #[test]
    fn base_matrix_skips_estimation() {
        let r = ExperimentRow {
            matrix_set: MatrixSet::Base,
            ..row()
        };
        let out = run(&r).unwrap();
        assert!(out.indices.is_none());
    }

    #[test]
    fn mean_uses_a_block_only() {
        // Sobol coordinates do not depend on the total dimension count, so
        // A is the same point set for every matrix set.
        let full = run(&row()).unwrap();
        let base = run(&ExperimentRow {
            matrix_set: MatrixSet::Base,
            ..row()
        })
        .unwrap();
        assert_eq!(full.mean_output, base.mean_output);
        let pf = run(&ExperimentRow {
            matrix_set: MatrixSet::PickFreeze,
            estimators: Estimators {
                first: estimator::FirstOrder::Saltelli,
                total: estimator::TotalOrder::Jansen,
            },
            ..row()
        })
        .unwrap();
        assert_eq!(full.mean_output, pf.mean_output);
    }

    #[test]
    fn same_row_same_output() {
        assert_eq!(run(&row()).unwrap(), run(&row()).unwrap());
    }

    #[test]
    fn order_above_k_fails_with_configuration_error() {
        let r = ExperimentRow { order: 5, ..row() };
        let err = run(&r).unwrap_err();
        assert!(matches!(err, Error::InteractionOrderTooHigh { order: 5, k: 4 }));
    }

    #[test]
    fn display_lists_parameters() {
        let s = row().to_string();
        assert!(s.contains("k=4"));
        assert!(s.contains("seed=7"));
        assert!(s.contains("scheme=sobol"));
        assert!(s.contains("phi=1"));
    }
}

//! Aggregation of grid outcomes.
//!
//! [`GridResults`] keeps one [`RowOutcome`] per row, ordered by row id, and
//! derives the quantities the study is about:
//!
//! - [`convergence`](GridResults::convergence): how fast the mean model
//!   output settles as the sample size grows, per sampling scheme,
//! - [`effective_dimensions`](GridResults::effective_dimensions): how many
//!   inputs matter and how much interaction there is,
//! - [`anomalies`](GridResults::anomalies): index estimates outside their
//!   theoretical range.

use core::fmt;
use core::fmt::Write as _;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::design::SamplingScheme;
use crate::error::{Error, Result};
use crate::experiment::{ExperimentRow, RunOutput};

/// Total-order threshold above which an input counts as important.
pub const DEFAULT_IMPORTANCE_THRESHOLD: f64 = 0.05;

/// A row and what running it produced.
#[derive(Debug)]
pub struct RowOutcome {
    pub row: ExperimentRow,
    pub result: Result<RunOutput>,
}

/// A failed row, displayable with its full parameter set.
#[derive(Debug)]
pub struct Failure<'a> {
    pub row: &'a ExperimentRow,
    pub error: &'a Error,
}

impl fmt::Display for Failure<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.row, self.error)
    }
}

/// RMSE of the mean output at one sample size, against the largest size.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ConvergencePoint {
    pub scheme: SamplingScheme,
    pub sample_size: usize,
    pub rmse: f64,
    /// Number of outer-design points that contributed.
    pub n_rows: usize,
}

/// Effective-dimension statistics of one run at the largest sample size.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EffectiveDimension {
    pub id: usize,
    pub base_id: usize,
    pub scheme: SamplingScheme,
    pub k: usize,
    pub order: usize,
    /// `Σ Sᵢ`; values well below one indicate interactions.
    pub first_order_sum: f64,
    /// Count of inputs with `Tᵢ` above the threshold.
    pub n_important: usize,
    /// `Σ Tᵢ`.
    pub total_order_sum: f64,
}

/// Counts of runs with out-of-range index estimates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnomalyReport {
    /// Runs that produced indices.
    pub n_runs: usize,
    /// Runs whose first-order sum falls outside `[0, 1]`.
    pub first_order_sum_out_of_range: usize,
    /// Runs with at least one negative first- or total-order index.
    pub negative_index: usize,
}

/// Outcomes of a grid run, ordered by row id.
#[derive(Debug, Default)]
pub struct GridResults {
    outcomes: Vec<RowOutcome>,
}

impl GridResults {
    /// Collect outcomes in any order.
    #[must_use]
    pub fn new(mut outcomes: Vec<RowOutcome>) -> Self {
        outcomes.sort_by_key(|o| o.row.id);
        Self { outcomes }
    }

    #[must_use]
    pub fn outcomes(&self) -> &[RowOutcome] {
        &self.outcomes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Outcome of the row with id `id`.
    #[must_use]
    pub fn get(&self, id: usize) -> Option<&RowOutcome> {
        self.outcomes
            .binary_search_by_key(&id, |o| o.row.id)
            .ok()
            .map(|i| &self.outcomes[i])
    }

    /// Rows that failed, with their errors.
    #[must_use]
    pub fn failures(&self) -> Vec<Failure<'_>> {
        self.outcomes
            .iter()
            .filter_map(|o| {
                o.result.as_ref().err().map(|error| Failure {
                    row: &o.row,
                    error,
                })
            })
            .collect()
    }

    /// Rows that succeeded, with their outputs.
    #[must_use]
    pub fn successes(&self) -> Vec<(&ExperimentRow, &RunOutput)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|out| (&o.row, out)))
            .collect()
    }

    fn largest_sample_size(&self) -> Option<usize> {
        self.outcomes.iter().map(|o| o.row.sample_size).max()
    }

    /// Root-mean-square error of the mean output per scheme and sample
    /// size.
    ///
    /// The reference for each outer-design point is its own mean output
    /// under the same scheme at the largest sample size of the grid, so the
    /// largest size itself is not reported. Points whose reference row
    /// failed are left out.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn convergence(&self) -> Vec<ConvergencePoint> {
        let Some(largest) = self.largest_sample_size() else {
            return Vec::new();
        };
        let successes = self.successes();

        let reference: BTreeMap<(SamplingScheme, usize), f64> = successes
            .iter()
            .filter(|(row, _)| row.sample_size == largest)
            .map(|(row, out)| ((row.scheme, row.base_id), out.mean_output))
            .collect();

        let mut squared: BTreeMap<(SamplingScheme, usize), (f64, usize)> = BTreeMap::new();
        for (row, out) in &successes {
            if row.sample_size == largest {
                continue;
            }
            if let Some(r) = reference.get(&(row.scheme, row.base_id)) {
                let entry = squared.entry((row.scheme, row.sample_size)).or_default();
                entry.0 += (out.mean_output - r).powi(2);
                entry.1 += 1;
            }
        }

        squared
            .into_iter()
            .map(|((scheme, sample_size), (sum, n))| ConvergencePoint {
                scheme,
                sample_size,
                rmse: (sum / n as f64).sqrt(),
                n_rows: n,
            })
            .collect()
    }

    /// Effective-dimension statistics of every successful run at the
    /// largest sample size that produced indices.
    #[must_use]
    pub fn effective_dimensions(&self, threshold: f64) -> Vec<EffectiveDimension> {
        let Some(largest) = self.largest_sample_size() else {
            return Vec::new();
        };
        self.successes()
            .into_iter()
            .filter(|(row, _)| row.sample_size == largest)
            .filter_map(|(row, out)| {
                out.indices.as_ref().map(|idx| EffectiveDimension {
                    id: row.id,
                    base_id: row.base_id,
                    scheme: row.scheme,
                    k: row.k,
                    order: row.order,
                    first_order_sum: idx.first_order_sum,
                    n_important: idx.n_important(threshold),
                    total_order_sum: idx.total_order_sum,
                })
            })
            .collect()
    }

    /// Count runs whose estimates left their theoretical range.
    #[must_use]
    pub fn anomalies(&self) -> AnomalyReport {
        let mut report = AnomalyReport::default();
        for (_, out) in self.successes() {
            let Some(idx) = &out.indices else { continue };
            report.n_runs += 1;
            if !(0.0..=1.0).contains(&idx.first_order_sum) {
                report.first_order_sum_out_of_range += 1;
            }
            if idx
                .first_order
                .iter()
                .chain(&idx.total_order)
                .any(|&v| v < 0.0)
            {
                report.negative_index += 1;
            }
        }
        report
    }

    /// Human-readable overview of the run.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut s = String::new();
        let failures = self.failures();
        let _ = writeln!(
            s,
            "{} rows, {} succeeded, {} failed",
            self.len(),
            self.len() - failures.len(),
            failures.len()
        );
        for f in &failures {
            let _ = writeln!(s, "  failed {f}");
        }

        let convergence = self.convergence();
        if !convergence.is_empty() {
            let _ = writeln!(s, "convergence (RMSE of mean output):");
            for p in &convergence {
                let _ = writeln!(
                    s,
                    "  {:<6} N={:<6} rmse={:.6} ({} points)",
                    p.scheme, p.sample_size, p.rmse, p.n_rows
                );
            }
        }

        let dims = self.effective_dimensions(DEFAULT_IMPORTANCE_THRESHOLD);
        if !dims.is_empty() {
            #[allow(clippy::cast_precision_loss)]
            let mean_important =
                dims.iter().map(|d| d.n_important as f64).sum::<f64>() / dims.len() as f64;
            let _ = writeln!(
                s,
                "effective dimension: {:.2} important inputs on average over {} runs",
                mean_important,
                dims.len()
            );
        }

        let a = self.anomalies();
        let _ = writeln!(
            s,
            "anomalies: {} of {} runs with first-order sum outside [0, 1], {} with negative indices",
            a.first_order_sum_out_of_range, a.n_runs, a.negative_index
        );
        s
    }
}

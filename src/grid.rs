//! The experiment grid: outer design, replication and execution.
//!
//! An outer scrambled Sobol design of `base_size` points over four unit
//! dimensions is rescaled to `(k, seed, order, phi)` tuples. Each tuple is
//! then replicated once per sample size and sampling scheme, producing the
//! [`ExperimentRow`]s that are run independently.
//!
//! # Example
//!
//! ```
//! use metafunction::grid::{ExperimentGrid, GridConfig};
//!
//! let config = GridConfig::default()
//!     .base_size(4)
//!     .max_k(3)
//!     .sample_sizes(vec![16, 32]);
//! let grid = ExperimentGrid::build(&config).unwrap();
//! assert_eq!(grid.len(), 4 * 2 * 3);
//!
//! let results = grid.run();
//! assert_eq!(results.len(), grid.len());
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::design::{MatrixSet, SamplingScheme};
use crate::distribution::DistributionSelector;
use crate::error::{Error, Result};
use crate::estimator::{Estimators, FirstOrder, TotalOrder};
use crate::experiment::{self, ExperimentRow};
use crate::results::{GridResults, RowOutcome};
use crate::sampler::{Sampler, SobolSampler, sobol};

/// Parameters of an experiment grid.
///
/// # Defaults
///
/// - `base_size`: 64 outer-design points
/// - `max_k`: 10 inputs
/// - `sample_sizes`: `2^7, 2^8, ..., 2^14`
/// - `schemes`: random, Sobol, Latin hypercube
/// - `matrix_set`: `A,B,AB,BA`
/// - `seed`: 0
/// - `estimators`: Azzini first and total order
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridConfig {
    /// Number of outer-design points.
    pub base_size: usize,
    /// Largest model dimension drawn.
    pub max_k: usize,
    /// Base sample sizes each point is replicated at.
    pub sample_sizes: Vec<usize>,
    /// Sampling schemes each point is replicated with.
    pub schemes: Vec<SamplingScheme>,
    pub matrix_set: MatrixSet,
    /// Scrambling seed of the outer design.
    pub seed: u64,
    pub estimators: Estimators,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            base_size: 64,
            max_k: 10,
            sample_sizes: (7..=14).map(|p| 1 << p).collect(),
            schemes: SamplingScheme::ALL.to_vec(),
            matrix_set: MatrixSet::CrossPickFreeze,
            seed: 0,
            estimators: Estimators::default(),
        }
    }
}

impl GridConfig {
    #[must_use]
    pub fn base_size(mut self, n: usize) -> Self {
        self.base_size = n;
        self
    }

    #[must_use]
    pub fn max_k(mut self, k: usize) -> Self {
        self.max_k = k;
        self
    }

    #[must_use]
    pub fn sample_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.sample_sizes = sizes;
        self
    }

    #[must_use]
    pub fn schemes(mut self, schemes: Vec<SamplingScheme>) -> Self {
        self.schemes = schemes;
        self
    }

    #[must_use]
    pub fn matrix_set(mut self, set: MatrixSet) -> Self {
        self.matrix_set = set;
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn estimators(mut self, estimators: Estimators) -> Self {
        self.estimators = estimators;
        self
    }

    /// Check that the configuration describes a runnable grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(Error::InvalidConfig(msg)) };
        if self.base_size == 0 || self.base_size > sobol::MAX_POINTS {
            return invalid(format!(
                "base_size must be in 1..={}, got {}",
                sobol::MAX_POINTS,
                self.base_size
            ));
        }
        if self.max_k < 2 {
            return invalid(format!("max_k must be at least 2, got {}", self.max_k));
        }
        if self.sample_sizes.is_empty() {
            return invalid("sample_sizes is empty".into());
        }
        if let Some(&n) = self.sample_sizes.iter().find(|&&n| n < 2) {
            return invalid(format!("sample sizes must be at least 2, got {n}"));
        }
        if self.schemes.is_empty() {
            return invalid("schemes is empty".into());
        }
        if self.schemes.contains(&SamplingScheme::Sobol) {
            let dims = self.matrix_set.base_dimensions(self.max_k);
            if dims > sobol::MAX_DIMENSIONS {
                return invalid(format!(
                    "Sobol sampling supports {} dimensions, max_k={} needs {dims}",
                    sobol::MAX_DIMENSIONS,
                    self.max_k
                ));
            }
            if let Some(&n) = self.sample_sizes.iter().find(|&&n| n > sobol::MAX_POINTS) {
                return invalid(format!(
                    "Sobol sampling supports {} points, got sample size {n}",
                    sobol::MAX_POINTS
                ));
            }
        }
        if self.matrix_set == MatrixSet::PickFreeze
            && self.estimators
                != (Estimators {
                    first: FirstOrder::Saltelli,
                    total: TotalOrder::Jansen,
                })
        {
            return invalid(format!(
                "matrix set {} only supports Saltelli/Jansen estimators",
                self.matrix_set
            ));
        }
        Ok(())
    }
}

/// Map `u ∈ [0, 1)` to an integer in `min..=max`.
///
/// Computes `floor(u (max − min + 1) + min)`, capped at `max`. An empty
/// range (`min > max`) yields `min`.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn rescale(u: f64, min: usize, max: usize) -> usize {
    if min >= max {
        return min;
    }
    let span = (max - min) as f64 + 1.0;
    let v = (u * span + min as f64).floor().max(min as f64) as usize;
    v.min(max)
}

/// An ordered list of experiment rows ready to run.
#[derive(Clone, Debug)]
pub struct ExperimentGrid {
    rows: Vec<ExperimentRow>,
}

impl ExperimentGrid {
    /// Build the grid described by `config`.
    ///
    /// Rows are ordered by sample size, then scheme, then outer-design
    /// point, and numbered sequentially. Building is deterministic for a
    /// given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` fails
    /// [`validate`](GridConfig::validate).
    pub fn build(config: &GridConfig) -> Result<Self> {
        config.validate()?;

        let outer = SobolSampler::with_seed(config.seed).sample(config.base_size, 4)?;
        let points = outer
            .rows()
            .map(|u| {
                let k = rescale(u[0], 2, config.max_k);
                let seed = rescale(u[1], 1, config.base_size) as u64;
                let order = rescale(u[2], 1, config.max_k).min(k);
                let selector =
                    DistributionSelector::from_index(rescale(u[3], 1, DistributionSelector::MAX_INDEX))?;
                Ok((k, seed, order, selector))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut rows = Vec::with_capacity(points.len() * config.sample_sizes.len() * config.schemes.len());
        for &sample_size in &config.sample_sizes {
            for &scheme in &config.schemes {
                for (base_id, &(k, seed, order, selector)) in points.iter().enumerate() {
                    rows.push(ExperimentRow {
                        id: rows.len(),
                        base_id,
                        k,
                        seed,
                        order,
                        selector,
                        sample_size,
                        scheme,
                        matrix_set: config.matrix_set,
                        estimators: config.estimators,
                    });
                }
            }
        }

        trace_info!(n_rows = rows.len(), base_size = config.base_size, "grid built");
        Ok(Self { rows })
    }

    /// Wrap explicit rows, e.g. a filtered subset of another grid.
    #[must_use]
    pub fn from_rows(rows: Vec<ExperimentRow>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[ExperimentRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Run every row on the current thread.
    ///
    /// A failing row is recorded in the results and does not stop the
    /// others.
    #[must_use]
    pub fn run(&self) -> GridResults {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("grid_run", n_rows = self.rows.len()).entered();

        let outcomes = self
            .rows
            .iter()
            .map(|row| {
                let result = experiment::run(row);
                log_outcome(row, &result);
                RowOutcome {
                    row: *row,
                    result,
                }
            })
            .collect();

        let results = GridResults::new(outcomes);
        trace_info!(n_failed = results.failures().len(), "grid run finished");
        results
    }

    /// Run rows concurrently on tokio's blocking pool.
    ///
    /// At most `concurrency` rows are in flight. Errors and panics inside a
    /// row are recorded against that row; results are ordered by row id,
    /// not by completion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `concurrency` is zero and
    /// [`Error::TaskError`] if the semaphore is closed or a task cannot be
    /// joined.
    ///
    /// # Examples
    ///
    /// ```
    /// use metafunction::grid::{ExperimentGrid, GridConfig};
    ///
    /// # #[cfg(feature = "async")]
    /// # async fn example() -> metafunction::Result<()> {
    /// let config = GridConfig::default().base_size(4).max_k(3).sample_sizes(vec![16]);
    /// let grid = ExperimentGrid::build(&config)?;
    /// let results = grid.run_parallel(4).await?;
    /// assert_eq!(results.len(), grid.len());
    /// # Ok(())
    /// # }
    /// ```
    #[cfg(feature = "async")]
    pub async fn run_parallel(&self, concurrency: usize) -> Result<GridResults> {
        use std::sync::Arc;

        use tokio::sync::Semaphore;
        use tokio::task::JoinSet;

        if concurrency == 0 {
            return Err(Error::InvalidConfig("concurrency must be at least 1".into()));
        }

        #[cfg(feature = "tracing")]
        let _span =
            tracing::info_span!("grid_run_parallel", n_rows = self.rows.len(), concurrency).entered();

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let mut join_set: JoinSet<RowOutcome> = JoinSet::new();
        let mut outcomes = Vec::with_capacity(self.rows.len());

        for &row in &self.rows {
            // Keep the join set bounded so finished rows are collected early.
            while join_set.len() >= concurrency {
                if let Some(joined) = join_set.join_next().await {
                    outcomes.push(joined.map_err(|e| Error::TaskError(e.to_string()))?);
                }
            }

            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| Error::TaskError(e.to_string()))?;

            join_set.spawn(async move {
                let result = tokio::task::spawn_blocking(move || experiment::run(&row))
                    .await
                    .unwrap_or_else(|e| Err(Error::TaskError(e.to_string())));
                drop(permit);
                log_outcome(&row, &result);
                RowOutcome { row, result }
            });
        }

        while let Some(joined) = join_set.join_next().await {
            outcomes.push(joined.map_err(|e| Error::TaskError(e.to_string()))?);
        }

        let results = GridResults::new(outcomes);
        trace_info!(n_failed = results.failures().len(), "grid run finished");
        Ok(results)
    }
}

#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
fn log_outcome(row: &ExperimentRow, result: &Result<experiment::RunOutput>) {
    match result {
        Ok(_) => {
            trace_debug!(row_id = row.id, "row completed");
        }
        Err(e) => {
            trace_debug!(row_id = row.id, error = %e, row = %row, "row failed");
        }
    }
}

/// Default worker count: 75% of the logical cores, at least one.
#[must_use]
pub fn default_concurrency() -> usize {
    let cores = std::thread::available_parallelism().map_or(1, core::num::NonZeroUsize::get);
    (cores * 3 / 4).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> GridConfig {
        GridConfig::default()
            .base_size(8)
            .max_k(4)
            .sample_sizes(vec![8, 16])
    }

    #[test]
    fn rescale_covers_inclusive_range() {
        assert_eq!(rescale(0.0, 2, 10), 2);
        assert_eq!(rescale(0.999_999, 2, 10), 10);
        assert_eq!(rescale(1.0, 2, 10), 10);
        assert_eq!(rescale(0.5, 1, 8), 5);
        for i in 0..100 {
            let v = rescale(f64::from(i) / 100.0, 1, 8);
            assert!((1..=8).contains(&v));
        }
    }

    #[test]
    fn rescale_of_degenerate_range() {
        assert_eq!(rescale(0.7, 3, 3), 3);
        assert_eq!(rescale(0.7, 5, 2), 5);
    }

    #[test]
    fn rows_stay_in_range() {
        let grid = ExperimentGrid::build(&small()).unwrap();
        assert_eq!(grid.len(), 8 * 2 * 3);
        for row in grid.rows() {
            assert!((2..=4).contains(&row.k), "{row}");
            assert!((1..=8).contains(&row.seed), "{row}");
            assert!(row.order >= 1 && row.order <= row.k, "{row}");
            assert!((1..=DistributionSelector::MAX_INDEX).contains(&row.selector.index()));
        }
    }

    #[test]
    fn ids_are_sequential_and_replicas_share_parameters() {
        let grid = ExperimentGrid::build(&small()).unwrap();
        for (i, row) in grid.rows().iter().enumerate() {
            assert_eq!(row.id, i);
        }
        let first = grid.rows()[0];
        let replicas: Vec<_> = grid
            .rows()
            .iter()
            .filter(|r| r.base_id == first.base_id)
            .collect();
        assert_eq!(replicas.len(), 2 * 3);
        for r in replicas {
            assert_eq!((r.k, r.seed, r.order, r.selector), (first.k, first.seed, first.order, first.selector));
        }
    }

    #[test]
    fn replication_order_is_size_then_scheme_then_point() {
        let grid = ExperimentGrid::build(&small()).unwrap();
        let rows = grid.rows();
        assert_eq!(rows[0].sample_size, 8);
        assert_eq!(rows[0].scheme, SamplingScheme::Random);
        assert_eq!(rows[7].base_id, 7);
        assert_eq!(rows[8].scheme, SamplingScheme::Sobol);
        assert_eq!(rows[24].sample_size, 16);
    }

    #[test]
    fn build_is_deterministic() {
        let a = ExperimentGrid::build(&small()).unwrap();
        let b = ExperimentGrid::build(&small()).unwrap();
        assert_eq!(a.rows(), b.rows());
    }

    #[test]
    fn invalid_configs_are_rejected() {
        for cfg in [
            small().base_size(0),
            small().max_k(1),
            small().sample_sizes(vec![]),
            small().sample_sizes(vec![1, 8]),
            small().schemes(vec![]),
            small().matrix_set(MatrixSet::PickFreeze),
            small().max_k(200),
        ] {
            let err = ExperimentGrid::build(&cfg).unwrap_err();
            assert!(matches!(err, Error::InvalidConfig(_)), "{cfg:?}");
            assert!(err.is_configuration());
        }
    }

    #[test]
    fn default_concurrency_is_positive() {
        assert!(default_concurrency() >= 1);
    }
}

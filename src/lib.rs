#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Metafunction ensembles for studying how variance-based sensitivity
//! indices converge and how many inputs effectively matter.
//!
//! A *metafunction* maps `k` inputs through randomly drawn elementary
//! transforms and adds interaction products up to a chosen order. Running
//! thousands of randomly parametrised metafunctions over several sampling
//! schemes and sample sizes shows how fast Monte Carlo, quasi-Monte Carlo
//! and Latin hypercube designs converge, and how Sobol' indices distribute
//! across inputs.
//!
//! # Getting Started
//!
//! Evaluate one metafunction and estimate its Sobol' indices:
//!
//! ```
//! use metafunction::prelude::*;
//!
//! let params = ["X1", "X2", "X3"];
//! let n = 256;
//! let mut x = generate(n, &params, SamplingScheme::Sobol, MatrixSet::CrossPickFreeze, 42).unwrap();
//! select_and_apply(&mut x, DistributionSelector::Fixed(Distribution::Uniform), 42).unwrap();
//!
//! let y = metafunction::metafunction::evaluate(&x, 42, 2).unwrap();
//! let idx = sobol_indices(&y, n, &params, MatrixSet::CrossPickFreeze, Estimators::default()).unwrap();
//! assert_eq!(idx.first_order.len(), 3);
//! ```
//!
//! Or run a whole experiment grid:
//!
//! ```
//! use metafunction::prelude::*;
//!
//! let config = GridConfig::default().base_size(4).max_k(4).sample_sizes(vec![32, 64]);
//! let results = ExperimentGrid::build(&config).unwrap().run();
//! println!("{}", results.summary());
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`DesignMatrix`] | Sample points, one row per point and one column per input. |
//! | [`Distribution`](distribution::Distribution) | Marginal law applied to a column by inverse CDF. |
//! | [`Function`](function::Function) | Elementary transform applied to one input. |
//! | [`Metafunction`](metafunction::Metafunction) | Sum of transformed inputs plus interaction products. |
//! | [`SobolIndices`](estimator::SobolIndices) | First- and total-order estimates per input. |
//! | [`ExperimentGrid`](grid::ExperimentGrid) | Rows to run, sequentially or in parallel. |
//! | [`GridResults`](results::GridResults) | Convergence, effective dimension and anomaly analysis. |
//!
//! # Sampling schemes
//!
//! | Scheme | Sampler |
//! |--------|---------|
//! | Monte Carlo | [`RandomSampler`](sampler::RandomSampler) |
//! | Quasi-Monte Carlo | [`SobolSampler`](sampler::SobolSampler) (scrambled, up to 256 dimensions) |
//! | Latin hypercube | [`LatinHypercubeSampler`](sampler::LatinHypercubeSampler) |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `async` | [`ExperimentGrid::run_parallel`](grid::ExperimentGrid::run_parallel) on tokio's blocking pool | on |
//! | `serde` | `Serialize`/`Deserialize` on configs, rows and results | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) around grid runs | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

pub mod design;
pub mod distribution;
mod error;
pub mod estimator;
pub mod experiment;
pub mod function;
pub mod grid;
pub mod interaction;
mod matrix;
pub mod metafunction;
pub mod results;
mod rng_util;
pub mod sampler;

pub use error::{Error, Result};
pub use matrix::DesignMatrix;

/// Convenient wildcard import for the most common types.
///
/// ```
/// use metafunction::prelude::*;
/// ```
pub mod prelude {
    pub use crate::design::{MatrixSet, SamplingScheme, generate};
    pub use crate::distribution::{Distribution, DistributionSelector, select_and_apply};
    pub use crate::error::{Error, Result};
    pub use crate::estimator::{Estimators, FirstOrder, SobolIndices, TotalOrder, sobol_indices};
    pub use crate::experiment::{ExperimentRow, RunOutput};
    pub use crate::function::Function;
    pub use crate::grid::{ExperimentGrid, GridConfig, default_concurrency};
    pub use crate::matrix::DesignMatrix;
    pub use crate::metafunction::{FunctionAssignment, Metafunction};
    pub use crate::results::{GridResults, RowOutcome};
    pub use crate::sampler::{LatinHypercubeSampler, RandomSampler, Sampler, SobolSampler};
}

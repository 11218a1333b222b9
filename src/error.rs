/// Errors produced while building or running metafunction experiments.
///
/// Most variants describe misconfiguration (see [`Error::is_configuration`]).
/// They are fatal for the run that raised them and are never retried, but a
/// grid run records them against the offending row and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the interaction order exceeds the number of inputs.
    #[error("interaction order {order} exceeds the number of inputs ({k})")]
    InteractionOrderTooHigh {
        /// The requested interaction order.
        order: usize,
        /// The number of model inputs.
        k: usize,
    },

    /// Returned when the interaction order is zero.
    #[error("invalid interaction order {0}: must be at least 1")]
    InvalidInteractionOrder(usize),

    /// Returned when a distribution name is not part of the catalog.
    #[error("unknown distribution '{0}'")]
    UnknownDistribution(String),

    /// Returned when an elementary function name is not part of the catalog.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// Returned when a distribution selector lies outside `1..=max`.
    #[error("invalid distribution selector {selector}: must be in 1..={max}")]
    InvalidSelector {
        /// The requested selector.
        selector: usize,
        /// The largest valid selector.
        max: usize,
    },

    /// Returned when a function assignment does not cover every column.
    #[error("function assignment has {got} entries but the matrix has {expected} columns")]
    AssignmentLengthMismatch {
        /// The number of matrix columns.
        expected: usize,
        /// The number of assigned functions.
        got: usize,
    },

    /// Returned when a sample size is zero or too large for the sampling scheme.
    #[error("invalid sample size {n}: {reason}")]
    InvalidSampleSize {
        /// The requested sample size.
        n: usize,
        /// Why the sample size was rejected.
        reason: &'static str,
    },

    /// Returned when a design is requested with zero parameters.
    #[error("design requires at least one parameter")]
    InvalidDimensions,

    /// Returned when a scheme cannot produce the requested number of dimensions.
    #[error("{scheme} supports at most {max} dimensions, {requested} requested")]
    TooManyDimensions {
        /// Name of the sampling scheme.
        scheme: &'static str,
        /// Requested number of unit-hypercube dimensions.
        requested: usize,
        /// Largest supported number of dimensions.
        max: usize,
    },

    /// Returned when an estimator needs matrix blocks the design does not provide.
    #[error("{estimator} estimator requires the {required} matrix set, got {got}")]
    IncompatibleMatrixSet {
        /// Name of the estimator.
        estimator: &'static str,
        /// The matrix set the estimator needs.
        required: &'static str,
        /// The matrix set that was supplied.
        got: &'static str,
    },

    /// Returned when the number of model outputs does not match the design.
    #[error("expected {expected} model outputs, got {got}")]
    OutputLengthMismatch {
        /// Output length implied by the sample size and matrix set.
        expected: usize,
        /// The actual output length.
        got: usize,
    },

    /// Returned when a grid configuration is inconsistent.
    #[error("invalid grid configuration: {0}")]
    InvalidConfig(String),

    /// Returned when a marginal law cannot be constructed.
    #[error("distribution error: {0}")]
    Distribution(String),

    /// Returned when an async task fails or panics.
    #[cfg(feature = "async")]
    #[error("async task error: {0}")]
    TaskError(String),

    /// Returned when an internal invariant is violated.
    #[error("internal error: {0}")]
    Internal(&'static str),
}

impl Error {
    /// Whether this error signals misconfiguration upstream rather than a
    /// runtime failure.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InteractionOrderTooHigh { .. }
                | Self::InvalidInteractionOrder(_)
                | Self::UnknownDistribution(_)
                | Self::UnknownFunction(_)
                | Self::InvalidSelector { .. }
                | Self::AssignmentLengthMismatch { .. }
                | Self::InvalidSampleSize { .. }
                | Self::InvalidDimensions
                | Self::TooManyDimensions { .. }
                | Self::IncompatibleMatrixSet { .. }
                | Self::InvalidConfig(_)
        )
    }
}

pub type Result<T> = core::result::Result<T, Error>;

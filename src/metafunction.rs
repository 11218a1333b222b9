//! The parametrised metafunction.
//!
//! A metafunction over `k` inputs assigns one elementary [`Function`] to
//! each input, sums the transformed inputs (first-order terms) and, for an
//! interaction order `n ≥ 2`, adds the product of every subset of 2 to `n`
//! transformed inputs:
//!
//! ```text
//! y = Σᵢ fᵢ(xᵢ) + Σ_{o=2..n} Σ_{|S|=o} Πᵢ∈S fᵢ(xᵢ)
//! ```
//!
//! # Example
//!
//! ```
//! use metafunction::function::Function;
//! use metafunction::metafunction::{FunctionAssignment, Metafunction};
//! use metafunction::DesignMatrix;
//!
//! let x = DesignMatrix::from_columns(&[vec![0.5, -0.3], vec![0.2, 0.7]]);
//! let assignment = FunctionAssignment::new(vec![Function::Linear; 2], x.n_cols()).unwrap();
//! let f = Metafunction::new(assignment, 2).unwrap();
//!
//! let y = f.evaluate(&x).unwrap();
//! assert!((y[0] - 0.8).abs() < 1e-12);
//! assert!((y[1] - 0.19).abs() < 1e-12);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::function::Function;
use crate::interaction::Combinations;
use crate::matrix::DesignMatrix;
use crate::rng_util::{self, Stream};

/// The elementary function applied to each input column, co-indexed with
/// the columns of the design matrix.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FunctionAssignment {
    functions: Vec<Function>,
}

impl FunctionAssignment {
    /// Use an explicit assignment for a matrix with `n_columns` columns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssignmentLengthMismatch`] if `functions` does not
    /// have exactly one entry per column.
    pub fn new(functions: Vec<Function>, n_columns: usize) -> Result<Self> {
        if functions.len() != n_columns {
            return Err(Error::AssignmentLengthMismatch {
                expected: n_columns,
                got: functions.len(),
            });
        }
        Ok(Self { functions })
    }

    /// Draw one function per input, with replacement, seeded by `seed`.
    #[must_use]
    pub fn sample(k: usize, seed: u64) -> Self {
        let mut rng = rng_util::seeded(seed, Stream::Functions);
        Self {
            functions: rng_util::choose_with_replacement(&mut rng, &Function::ALL, k),
        }
    }

    #[must_use]
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Model output split into its first-order and interaction parts.
#[derive(Clone, Debug, PartialEq)]
pub struct Decomposition {
    /// Row-wise sum of the transformed inputs.
    pub first_order: Vec<f64>,
    /// Row-wise sum of every interaction product (zeros when `n < 2`).
    pub interactions: Vec<f64>,
}

impl Decomposition {
    /// Total model output, `first_order + interactions`.
    #[must_use]
    pub fn total(&self) -> Vec<f64> {
        self.first_order
            .iter()
            .zip(&self.interactions)
            .map(|(a, b)| a + b)
            .collect()
    }
}

/// A metafunction with a fixed function assignment and interaction order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Metafunction {
    assignment: FunctionAssignment,
    order: usize,
}

impl Metafunction {
    /// Build a metafunction from an explicit assignment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInteractionOrder`] if `order` is zero and
    /// [`Error::InteractionOrderTooHigh`] if it exceeds the number of inputs.
    pub fn new(assignment: FunctionAssignment, order: usize) -> Result<Self> {
        check_order(order, assignment.len())?;
        Ok(Self { assignment, order })
    }

    /// Build a metafunction over `k` inputs whose functions are drawn with
    /// `seed`.
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new).
    pub fn seeded(k: usize, seed: u64, order: usize) -> Result<Self> {
        check_order(order, k)?;
        Self::new(FunctionAssignment::sample(k, seed), order)
    }

    #[must_use]
    pub fn assignment(&self) -> &FunctionAssignment {
        &self.assignment
    }

    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of inputs.
    #[must_use]
    pub fn k(&self) -> usize {
        self.assignment.len()
    }

    /// Evaluate every row of `matrix`, keeping first-order and interaction
    /// contributions apart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssignmentLengthMismatch`] if the matrix does not
    /// have one column per input.
    pub fn decompose(&self, matrix: &DesignMatrix) -> Result<Decomposition> {
        if matrix.n_cols() != self.k() {
            return Err(Error::AssignmentLengthMismatch {
                expected: matrix.n_cols(),
                got: self.k(),
            });
        }

        let mut transformed = matrix.clone();
        for (col, func) in self.assignment.functions.iter().enumerate() {
            transformed.map_column(col, |x| func.eval(x));
        }

        let first_order: Vec<f64> = transformed.rows().map(|r| r.iter().sum()).collect();

        let mut interactions = vec![0.0; matrix.n_rows()];
        for order in 2..=self.order {
            Combinations::new(self.k(), order).for_each_subset(|subset| {
                for (acc, row) in interactions.iter_mut().zip(transformed.rows()) {
                    *acc += subset.iter().map(|&j| row[j]).product::<f64>();
                }
            });
        }

        Ok(Decomposition {
            first_order,
            interactions,
        })
    }

    /// Evaluate every row of `matrix`.
    ///
    /// # Errors
    ///
    /// Same as [`decompose`](Self::decompose).
    pub fn evaluate(&self, matrix: &DesignMatrix) -> Result<Vec<f64>> {
        Ok(self.decompose(matrix)?.total())
    }
}

fn check_order(order: usize, k: usize) -> Result<()> {
    if order == 0 {
        return Err(Error::InvalidInteractionOrder(order));
    }
    if order > k {
        return Err(Error::InteractionOrderTooHigh { order, k });
    }
    Ok(())
}

/// Evaluate the metafunction seeded by `seed` with interaction order
/// `order` on every row of `matrix`.
///
/// Identical `(matrix, seed, order)` always produce bit-identical output.
///
/// # Errors
///
/// Returns [`Error::InteractionOrderTooHigh`] if `order` exceeds the number
/// of columns and [`Error::InvalidInteractionOrder`] if it is zero.
pub fn evaluate(matrix: &DesignMatrix, seed: u64, order: usize) -> Result<Vec<f64>> {
    Metafunction::seeded(matrix.n_cols(), seed, order)?.evaluate(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(k: usize, order: usize) -> Metafunction {
        let assignment = FunctionAssignment::new(vec![Function::Linear; k], k).unwrap();
        Metafunction::new(assignment, order).unwrap()
    }

    #[test]
    fn two_linear_inputs_with_pair_interaction() {
        let x = DesignMatrix::from_columns(&[vec![0.5, -0.3], vec![0.2, 0.7]]);
        let d = linear(2, 2).decompose(&x).unwrap();

        assert!((d.first_order[0] - 0.7).abs() < 1e-12);
        assert!((d.first_order[1] - 0.4).abs() < 1e-12);
        assert!((d.interactions[0] - 0.10).abs() < 1e-12);
        assert!((d.interactions[1] + 0.21).abs() < 1e-12);

        let y = d.total();
        assert!((y[0] - 0.8).abs() < 1e-12);
        assert!((y[1] - 0.19).abs() < 1e-12);
    }

    #[test]
    fn order_one_has_no_interactions() {
        let x = DesignMatrix::from_rows(&[vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]]);
        let f = Metafunction::seeded(3, 11, 1).unwrap();
        let d = f.decompose(&x).unwrap();
        assert!(d.interactions.iter().all(|&v| v == 0.0));
        assert_eq!(d.total(), d.first_order);
    }

    #[test]
    fn full_order_includes_k_way_product() {
        // All-linear, x = (2, 3, 5): pairs 6 + 10 + 15, triple 30.
        let x = DesignMatrix::from_rows(&[vec![2.0, 3.0, 5.0]]);
        let d = linear(3, 3).decompose(&x).unwrap();
        assert_eq!(d.first_order, vec![10.0]);
        assert_eq!(d.interactions, vec![61.0]);

        let pairs_only = linear(3, 2).decompose(&x).unwrap();
        assert_eq!(pairs_only.interactions, vec![31.0]);
    }

    #[test]
    fn order_above_k_is_rejected() {
        for k in 1..6 {
            let x = DesignMatrix::zeros(4, k);
            let err = evaluate(&x, 3, k + 1).unwrap_err();
            assert!(matches!(err, Error::InteractionOrderTooHigh { order, k: kk } if order == k + 1 && kk == k));
            assert!(err.is_configuration());
        }
    }

    #[test]
    fn order_zero_is_rejected() {
        let x = DesignMatrix::zeros(2, 2);
        assert!(matches!(
            evaluate(&x, 1, 0),
            Err(Error::InvalidInteractionOrder(0))
        ));
    }

    #[test]
    fn assignment_length_is_validated() {
        let err = FunctionAssignment::new(vec![Function::Linear; 3], 4).unwrap_err();
        assert!(matches!(
            err,
            Error::AssignmentLengthMismatch {
                expected: 4,
                got: 3
            }
        ));

        let f = linear(3, 1);
        assert!(f.evaluate(&DesignMatrix::zeros(2, 4)).is_err());
    }

    #[test]
    fn evaluation_is_deterministic() {
        let mut rng = rng_util::seeded(5, Stream::Sampling);
        let rows: Vec<Vec<f64>> = (0..64)
            .map(|_| (0..6).map(|_| rng_util::f64_range(&mut rng, -1.0, 1.0)).collect())
            .collect();
        let x = DesignMatrix::from_rows(&rows);

        let a = evaluate(&x, 17, 4).unwrap();
        let b = evaluate(&x, 17, 4).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn assignment_is_seeded() {
        assert_eq!(
            FunctionAssignment::sample(20, 3),
            FunctionAssignment::sample(20, 3)
        );
        let reference = FunctionAssignment::sample(20, 3);
        assert!((4..10).any(|s| FunctionAssignment::sample(20, s) != reference));
    }
}

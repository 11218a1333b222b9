//! Dense row-major sample matrix.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An `N × k` table of samples: one row per sample, one column per input.
///
/// Values start in the unit hypercube and are replaced in place when a
/// marginal distribution is applied. Column `j` always corresponds to the
/// `j`-th entry of the parameter list the matrix was generated for.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DesignMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DesignMatrix {
    /// Creates a matrix of zeros.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates a matrix from a list of rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows do not all have the same length.
    #[must_use]
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            assert_eq!(row.len(), cols, "all rows must have the same length");
            data.extend_from_slice(row);
        }
        Self {
            rows: rows.len(),
            cols,
            data,
        }
    }

    /// Creates a matrix from a list of columns.
    ///
    /// # Panics
    ///
    /// Panics if the columns do not all have the same length.
    #[must_use]
    pub fn from_columns(columns: &[Vec<f64>]) -> Self {
        let rows = columns.first().map_or(0, Vec::len);
        let mut matrix = Self::zeros(rows, columns.len());
        for (j, column) in columns.iter().enumerate() {
            assert_eq!(column.len(), rows, "all columns must have the same length");
            for (i, &v) in column.iter().enumerate() {
                matrix.set(i, j, v);
            }
        }
        matrix
    }

    /// Number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Borrow one row.
    #[must_use]
    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Mutably borrow one row.
    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Iterate over the rows.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // `chunks_exact(0)` panics, and a zero-column matrix has no data anyway.
        self.data.chunks_exact(self.cols.max(1)).take(self.rows)
    }

    /// Copy one column out.
    #[must_use]
    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self.get(i, col)).collect()
    }

    /// Apply `f` to every value of one column in place.
    pub fn map_column(&mut self, col: usize, mut f: impl FnMut(f64) -> f64) {
        for i in 0..self.rows {
            let idx = i * self.cols + col;
            self.data[idx] = f(self.data[idx]);
        }
    }

    /// Row-major view of all values.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

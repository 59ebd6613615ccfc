use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;

use crate::{MlErr, Result};

/// A fitted regression model mapping an encoded feature vector to a single value.
pub trait Model {
    /// Returns the amount of features the model expects per row.
    fn n_features(&self) -> usize;

    /// Predicts the target of a single row.
    ///
    /// # Arguments
    /// * `x` - The encoded features of the row.
    ///
    /// # Returns
    /// The prediction or an error if `x` doesn't have `n_features` values.
    fn predict_row(&self, x: ArrayView1<f64>) -> Result<f64>;

    /// Predicts the target of every row of `x`, in parallel.
    ///
    /// # Arguments
    /// * `x` - A matrix with one encoded row per sample.
    ///
    /// # Returns
    /// One prediction per row, in row order.
    fn predict(&self, x: ArrayView2<f64>) -> Result<Array1<f64>>
    where
        Self: Sync,
    {
        if x.ncols() != self.n_features() {
            return Err(MlErr::SizeMismatch {
                what: "feature columns",
                got: x.ncols(),
                expected: self.n_features(),
            });
        }

        x.axis_iter(Axis(0))
            .into_par_iter()
            .map(|row| self.predict_row(row))
            .collect::<Result<Vec<_>>>()
            .map(Array1::from)
    }
}

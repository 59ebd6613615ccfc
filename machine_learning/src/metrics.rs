use ndarray::ArrayView1;

use crate::{MlErr, Result};

/// Computes the coefficient of determination of a prediction.
///
/// # Arguments
/// * `y_true` - The expected values.
/// * `y_pred` - The predicted values.
///
/// # Returns
/// `1 - SS_res / SS_tot`. When `y_true` is constant the score is `1.0` for a perfect
/// prediction and `0.0` otherwise.
pub fn r2_score(y_true: ArrayView1<f64>, y_pred: ArrayView1<f64>) -> Result<f64> {
    if y_true.len() != y_pred.len() {
        return Err(MlErr::SizeMismatch {
            what: "predictions",
            got: y_pred.len(),
            expected: y_true.len(),
        });
    }

    let Some(mean) = y_true.mean() else {
        return Err(MlErr::EmptyDataset);
    };

    let ss_res: f64 = y_true
        .iter()
        .zip(&y_pred)
        .map(|(y, y_hat)| (y - y_hat).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|y| (y - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }

    Ok(1.0 - ss_res / ss_tot)
}

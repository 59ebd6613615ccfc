use ndarray::{ArrayView1, ArrayView2};
use rand::Rng;

use super::TreeParams;

/// The best way found to split the samples of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Split {
    pub feature: usize,
    pub threshold: f64,
    /// Reduction of the node's sum of squared errors.
    pub gain: f64,
}

/// Searches the split with the largest squared error reduction over the candidate features.
///
/// A candidate threshold lies halfway between two consecutive distinct values of a feature,
/// samples with a value `<=` than it go left. Splits leaving fewer than `min_samples_leaf`
/// samples on either side are skipped.
///
/// # Arguments
/// * `x` - The full feature matrix.
/// * `y` - The full target vector.
/// * `samples` - The row indices reaching the node, duplicates allowed.
/// * `params` - The tree's growth parameters.
/// * `rng` - Used to draw the candidate features when `max_features` is below the total.
///
/// # Returns
/// The best split or `None` if no split reduces the error.
pub(super) fn best_split<R: Rng>(
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    samples: &[usize],
    params: &TreeParams,
    rng: &mut R,
) -> Option<Split> {
    let n = samples.len();
    if n < 2 {
        return None;
    }

    let min_leaf = params.min_samples_leaf;
    let total: f64 = samples.iter().map(|&i| y[i]).sum();
    let parent_score = total * total / n as f64;

    let mut order = samples.to_vec();
    let mut best: Option<Split> = None;

    for feature in candidate_features(x.ncols(), params.max_features, rng) {
        let column = x.column(feature);
        order.sort_unstable_by(|&a, &b| column[a].total_cmp(&column[b]));

        let mut left_sum = 0.0;
        for k in 0..n - 1 {
            left_sum += y[order[k]];

            let (n_left, n_right) = (k + 1, n - k - 1);
            if n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            let (current, next) = (column[order[k]], column[order[k + 1]]);
            if current >= next {
                continue;
            }

            let right_sum = total - left_sum;
            // Minimizing the children's squared error is maximizing this score.
            let score =
                left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64;
            let gain = score - parent_score;

            if gain > 0.0 && best.is_none_or(|b| gain > b.gain) {
                best = Some(Split {
                    feature,
                    threshold: midpoint(current, next),
                    gain,
                });
            }
        }
    }

    best
}

fn candidate_features<R: Rng>(n_features: usize, max_features: usize, rng: &mut R) -> Vec<usize> {
    if max_features >= n_features {
        return (0..n_features).collect();
    }

    let mut features = rand::seq::index::sample(rng, n_features, max_features).into_vec();
    features.sort_unstable();
    features
}

fn midpoint(a: f64, b: f64) -> f64 {
    let mid = a + (b - a) / 2.0;
    // Rounding can land on `b`, which would send its samples left.
    if mid >= b { a } else { mid }
}

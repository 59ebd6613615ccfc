use ndarray::{ArrayView1, ArrayView2};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::split::best_split;
use crate::{MlErr, Result};

/// A node of a `RegressionTree`. Children are referenced by their index in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// The growth limits of a single tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split, values above the feature count mean all of them.
    pub max_features: usize,
}

/// A node still waiting to be grown.
struct Pending {
    node: usize,
    samples: Vec<usize>,
    depth: usize,
}

/// A CART regression tree minimizing the squared error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    n_features: usize,
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Grows a new tree over the given samples.
    ///
    /// # Arguments
    /// * `x` - The full feature matrix.
    /// * `y` - The full target vector.
    /// * `samples` - The row indices the tree is fitted on, duplicates allowed.
    /// * `params` - The growth limits.
    /// * `rng` - Used to draw candidate features.
    ///
    /// # Returns
    /// The fitted tree.
    pub fn fit<R: Rng>(
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        samples: Vec<usize>,
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut stack = vec![Pending {
            node: 0,
            samples,
            depth: 0,
        }];

        while let Some(Pending {
            node,
            samples,
            depth,
        }) = stack.pop()
        {
            let split = if Self::can_split(y, &samples, depth, params) {
                best_split(x, y, &samples, params, rng)
            } else {
                None
            };

            let Some(split) = split else {
                nodes[node] = Node::Leaf {
                    value: mean(y, &samples),
                };
                continue;
            };

            let column = x.column(split.feature);
            let (left_samples, right_samples): (Vec<_>, Vec<_>) = samples
                .into_iter()
                .partition(|&i| column[i] <= split.threshold);

            let (left, right) = (nodes.len(), nodes.len() + 1);
            nodes.push(Node::Leaf { value: 0.0 });
            nodes.push(Node::Leaf { value: 0.0 });
            nodes[node] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };

            stack.push(Pending {
                node: right,
                samples: right_samples,
                depth: depth + 1,
            });
            stack.push(Pending {
                node: left,
                samples: left_samples,
                depth: depth + 1,
            });
        }

        Self {
            n_features: x.ncols(),
            nodes,
        }
    }

    fn can_split(y: ArrayView1<f64>, samples: &[usize], depth: usize, params: &TreeParams) -> bool {
        if samples.len() < params.min_samples_split.max(2 * params.min_samples_leaf) {
            return false;
        }

        if params.max_depth.is_some_and(|max| depth >= max) {
            return false;
        }

        // A pure node has nothing left to explain.
        let first = y[samples[0]];
        samples.iter().any(|&i| y[i] != first)
    }

    /// Predicts the target of a row.
    ///
    /// # Panics
    /// If `x` has fewer than `n_features` values or the tree was not validated.
    pub fn predict_row(&self, x: ArrayView1<f64>) -> f64 {
        let mut i = 0;
        loop {
            match self.nodes[i] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => i = if x[feature] <= threshold { left } else { right },
            }
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns the length of the longest root to leaf path.
    pub fn depth(&self) -> usize {
        let mut depths = vec![0; self.nodes.len()];
        let mut max = 0;

        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split { left, right, .. } = *node {
                depths[left] = depths[i] + 1;
                depths[right] = depths[i] + 1;
                max = max.max(depths[i] + 1);
            }
        }

        max
    }

    /// Checks that a deserialized tree can be traversed without going out of bounds or looping.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(MlErr::InvalidConfig("a tree must have at least one node".into()));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= self.n_features {
                        return Err(MlErr::SizeMismatch {
                            what: "split feature",
                            got: feature,
                            expected: self.n_features,
                        });
                    }

                    // Children always come after their parent, which rules out cycles.
                    let in_range = |child: usize| child > i && child < self.nodes.len();
                    if !in_range(left) || !in_range(right) || !threshold.is_finite() {
                        return Err(MlErr::InvalidConfig(format!("node {i} is malformed")));
                    }
                }
                Node::Leaf { value } if !value.is_finite() => {
                    return Err(MlErr::InvalidConfig(format!("leaf {i} is not finite")));
                }
                Node::Leaf { .. } => {}
            }
        }

        Ok(())
    }
}

fn mean(y: ArrayView1<f64>, samples: &[usize]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    samples.iter().map(|&i| y[i]).sum::<f64>() / samples.len() as f64
}

#[cfg(test)]
mod tests {
    use ndarray::{Array1, Array2, array};
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: usize::MAX,
        }
    }

    fn fit(x: &Array2<f64>, y: &Array1<f64>, params: &TreeParams) -> RegressionTree {
        let mut rng = StdRng::seed_from_u64(42);
        let samples = (0..y.len()).collect();
        RegressionTree::fit(x.view(), y.view(), samples, params, &mut rng)
    }

    #[test]
    fn fully_grown_tree_memorizes_distinct_rows() {
        let x = array![[0.0, 1.0], [1.0, 0.0], [2.0, 1.0], [3.0, 0.0]];
        let y = Array1::from(vec![5.0, -1.0, 8.0, 2.5]);
        let tree = fit(&x, &y, &params());

        for (row, target) in x.rows().into_iter().zip(&y) {
            assert_eq!(tree.predict_row(row), *target);
        }
        tree.validate().unwrap();
    }

    #[test]
    fn max_depth_limits_the_tree() {
        let x = Array2::from_shape_fn((16, 1), |(i, _)| i as f64);
        let y = Array1::from_shape_fn(16, |i| (i * i) as f64);
        let params = TreeParams {
            max_depth: Some(2),
            ..params()
        };

        let tree = fit(&x, &y, &params);

        assert_eq!(tree.depth(), 2);
        assert!(tree.nodes().len() <= 7);
    }

    #[test]
    fn pure_samples_give_a_single_leaf() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = Array1::from(vec![3.0, 3.0, 3.0]);
        let tree = fit(&x, &y, &params());

        assert_eq!(tree.nodes(), [Node::Leaf { value: 3.0 }]);
    }

    #[test]
    fn validate_rejects_backward_children() {
        let tree = RegressionTree {
            n_features: 1,
            nodes: vec![
                Node::Leaf { value: 1.0 },
                Node::Split {
                    feature: 0,
                    threshold: 0.5,
                    left: 0,
                    right: 0,
                },
            ],
        };

        assert!(tree.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_features() {
        let tree = RegressionTree {
            n_features: 1,
            nodes: vec![
                Node::Split {
                    feature: 3,
                    threshold: 0.5,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { value: 1.0 },
                Node::Leaf { value: 2.0 },
            ],
        };

        assert!(matches!(tree.validate(), Err(MlErr::SizeMismatch { .. })));
    }
}

use log::debug;
use ndarray::{ArrayView1, ArrayView2};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Model, RegressionTree};
use crate::{MlErr, Result, training::ForestConfig};

/// A bagged ensemble of regression trees. Its prediction is the mean of its trees' predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    /// Fits a new `RandomForest`, growing its trees in parallel.
    ///
    /// Every tree draws its bootstrap sample and candidate features from its own rng, seeded
    /// from the config's seed and the tree's index, so the result doesn't depend on scheduling.
    ///
    /// # Arguments
    /// * `config` - The forest's hyperparameters.
    /// * `x` - The feature matrix, one row per sample.
    /// * `y` - The target of each sample.
    ///
    /// # Returns
    /// The fitted forest or an error if `x` and `y` don't match or are empty.
    pub fn fit(config: &ForestConfig, x: ArrayView2<f64>, y: ArrayView1<f64>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(MlErr::SizeMismatch {
                what: "training rows",
                got: y.len(),
                expected: x.nrows(),
            });
        }

        if y.is_empty() {
            return Err(MlErr::EmptyDataset);
        }

        let n = y.len();
        let params = config.tree_params();

        let trees = (0..config.n_estimators())
            .into_par_iter()
            .map(|i| {
                let mut rng = StdRng::seed_from_u64(config.seed().wrapping_add(i as u64));
                let samples = if config.bootstrap() {
                    (0..n).map(|_| rng.random_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };

                let tree = RegressionTree::fit(x, y, samples, &params, &mut rng);
                debug!(tree = i, nodes = tree.nodes().len(), depth = tree.depth(); "tree grown");
                tree
            })
            .collect();

        Ok(Self {
            n_features: x.ncols(),
            trees,
        })
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    /// Checks that a deserialized forest is usable.
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(MlErr::InvalidConfig("a forest must have at least one tree".into()));
        }

        for tree in &self.trees {
            if tree.n_features() != self.n_features {
                return Err(MlErr::SizeMismatch {
                    what: "tree features",
                    got: tree.n_features(),
                    expected: self.n_features,
                });
            }

            tree.validate()?;
        }

        Ok(())
    }
}

impl Model for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_row(&self, x: ArrayView1<f64>) -> Result<f64> {
        if x.len() != self.n_features {
            return Err(MlErr::SizeMismatch {
                what: "features",
                got: x.len(),
                expected: self.n_features,
            });
        }

        let total: f64 = self.trees.iter().map(|tree| tree.predict_row(x)).sum();
        Ok(total / self.trees.len() as f64)
    }
}

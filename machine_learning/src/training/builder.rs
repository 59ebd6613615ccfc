use serde::{Deserialize, Serialize};

use crate::{MlErr, Result, arch::TreeParams};

/// The hyperparameters of a `RandomForest`. Built and validated by a `ForestBuilder`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    n_estimators: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    min_samples_leaf: usize,
    max_features: Option<usize>,
    bootstrap: bool,
    seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    pub fn bootstrap(&self) -> bool {
        self.bootstrap
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the growth limits every tree of the forest shares.
    pub fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            max_features: self.max_features.unwrap_or(usize::MAX),
        }
    }
}

/// Builds `ForestConfig`s, starting from the defaults.
#[derive(Debug, Default)]
pub struct ForestBuilder {
    config: ForestConfig,
}

impl ForestBuilder {
    /// Creates a new `ForestBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the amount of trees in the forest.
    pub fn n_estimators(mut self, n: usize) -> Self {
        self.config.n_estimators = n;
        self
    }

    /// Caps the depth of every tree, trees are grown until their leaves are pure otherwise.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = Some(depth);
        self
    }

    /// Sets the minimum amount of samples a node needs to be split.
    pub fn min_samples_split(mut self, n: usize) -> Self {
        self.config.min_samples_split = n;
        self
    }

    /// Sets the minimum amount of samples each leaf must keep.
    pub fn min_samples_leaf(mut self, n: usize) -> Self {
        self.config.min_samples_leaf = n;
        self
    }

    /// Sets the amount of features drawn as split candidates at each node.
    pub fn max_features(mut self, n: usize) -> Self {
        self.config.max_features = Some(n);
        self
    }

    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.config.bootstrap = bootstrap;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Validates and returns the config.
    ///
    /// # Returns
    /// The config or an `InvalidConfig` error naming the offending value.
    pub fn build(self) -> Result<ForestConfig> {
        let config = self.config;
        let invalid = |msg: &str| Err(MlErr::InvalidConfig(msg.to_string()));

        if config.n_estimators == 0 {
            return invalid("n_estimators must be greater than 0");
        }
        if config.max_depth == Some(0) {
            return invalid("max_depth must be greater than 0");
        }
        if config.min_samples_split < 2 {
            return invalid("min_samples_split must be at least 2");
        }
        if config.min_samples_leaf == 0 {
            return invalid("min_samples_leaf must be greater than 0");
        }
        if config.max_features == Some(0) {
            return invalid("max_features must be greater than 0");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_exported_model() {
        let config = ForestBuilder::new().build().unwrap();

        assert_eq!(config, ForestConfig::default());
        assert_eq!(config.n_estimators(), 100);
        assert_eq!(config.seed(), 42);
        assert!(config.bootstrap());
        assert_eq!(config.tree_params().max_features, usize::MAX);
    }

    #[test]
    fn build_rejects_invalid_values() {
        assert!(ForestBuilder::new().n_estimators(0).build().is_err());
        assert!(ForestBuilder::new().max_depth(0).build().is_err());
        assert!(ForestBuilder::new().min_samples_split(1).build().is_err());
        assert!(ForestBuilder::new().min_samples_leaf(0).build().is_err());
        assert!(ForestBuilder::new().max_features(0).build().is_err());
    }

    #[test]
    fn tree_params_follow_the_config() {
        let params = ForestBuilder::new()
            .max_depth(6)
            .min_samples_leaf(3)
            .max_features(4)
            .build()
            .unwrap()
            .tree_params();

        assert_eq!(params.max_depth, Some(6));
        assert_eq!(params.min_samples_leaf, 3);
        assert_eq!(params.max_features, 4);
    }
}

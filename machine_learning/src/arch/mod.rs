mod forest;
mod model;
mod split;
mod tree;

pub use forest::RandomForest;
pub use model::Model;
pub use tree::{Node, RegressionTree, TreeParams};

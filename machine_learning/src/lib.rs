pub mod arch;
pub mod artifacts;
pub mod dataset;
pub mod encoding;
pub mod error;
pub mod features;
pub mod metrics;
pub mod training;

pub use error::{MlErr, Result};

mod builder;
mod export;

pub use builder::{ForestBuilder, ForestConfig};
pub use export::{ExportJob, ExportReport, Stage};

use std::{
    fmt,
    path::{Path, PathBuf},
};

use log::info;

use super::ForestConfig;
use crate::{
    Result,
    arch::{Model, RandomForest},
    artifacts::ModelArtifact,
    dataset::{self, TrainingSet},
    metrics::r2_score,
};

/// A step of the export job, reported as it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loading,
    Encoding,
    Training { n_estimators: usize },
    Saving,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Loading => write!(f, "Loading dataset..."),
            Stage::Encoding => write!(f, "Encoding categorical features..."),
            Stage::Training { n_estimators } => write!(
                f,
                "Training Random Forest Regressor with {n_estimators} trees (this may take a moment)..."
            ),
            Stage::Saving => write!(f, "Saving model and encoders..."),
        }
    }
}

/// The outcome of a successful export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportReport {
    pub rows: usize,
    pub trees: usize,
    /// The model's R² over the training data.
    pub r2: f64,
}

/// Fits the encoders and the forest over a csv dataset and persists both as artifacts.
#[derive(Debug, Clone)]
pub struct ExportJob {
    data_path: PathBuf,
    model_path: PathBuf,
    encoders_path: PathBuf,
    forest: ForestConfig,
}

impl ExportJob {
    /// Creates a new `ExportJob` using the default forest config.
    ///
    /// # Arguments
    /// * `data_path` - The csv dataset to train on.
    /// * `model_path` - Where to write the model artifact.
    /// * `encoders_path` - Where to write the encoders artifact.
    pub fn new<D, M, E>(data_path: D, model_path: M, encoders_path: E) -> Self
    where
        D: AsRef<Path>,
        M: AsRef<Path>,
        E: AsRef<Path>,
    {
        Self {
            data_path: data_path.as_ref().to_path_buf(),
            model_path: model_path.as_ref().to_path_buf(),
            encoders_path: encoders_path.as_ref().to_path_buf(),
            forest: ForestConfig::default(),
        }
    }

    pub fn with_forest(mut self, forest: ForestConfig) -> Self {
        self.forest = forest;
        self
    }

    pub fn run(&self) -> Result<ExportReport> {
        self.run_with(|_| {})
    }

    /// Runs the export, calling `on_stage` as each step starts.
    ///
    /// Nothing is written until the model has been fitted, so a missing or malformed dataset
    /// leaves any previous artifacts untouched.
    ///
    /// # Arguments
    /// * `on_stage` - Progress callback.
    ///
    /// # Returns
    /// The export report or the first error found.
    pub fn run_with<F>(&self, mut on_stage: F) -> Result<ExportReport>
    where
        F: FnMut(Stage),
    {
        on_stage(Stage::Loading);
        let observations = dataset::read_csv(&self.data_path)?;

        on_stage(Stage::Encoding);
        let set = TrainingSet::fit(&observations)?;
        drop(observations);

        on_stage(Stage::Training {
            n_estimators: self.forest.n_estimators(),
        });
        let forest = RandomForest::fit(&self.forest, set.x(), set.y())?;
        let r2 = r2_score(set.y(), forest.predict(set.x())?.view())?;
        info!(rows = set.rows(), r2 = r2; "forest fitted");

        let model = ModelArtifact::new(forest)?;

        on_stage(Stage::Saving);
        model.save(&self.model_path)?;
        set.encoders().save(&self.encoders_path)?;

        Ok(ExportReport {
            rows: set.rows(),
            trees: model.forest().trees().len(),
            r2,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::{MlErr, encoding::EncoderSet, training::ForestBuilder};

    fn tmp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("export-{}-{name}", std::process::id()))
    }

    fn write_dataset(path: &Path) {
        let mut csv = String::from(
            ",airline,flight,source_city,departure_time,stops,arrival_time,\
             destination_city,class,duration,days_left,price\n",
        );

        for i in 0..40 {
            let (airline, class, base) = match i % 4 {
                0 => ("Indigo", "Economy", 4000),
                1 => ("Vistara", "Economy", 6000),
                2 => ("Vistara", "Business", 45000),
                _ => ("Air_India", "Business", 40000),
            };
            let days_left = 1 + i % 10;
            let price = base + 2000 / days_left;
            csv.push_str(&format!(
                "{i},{airline},XX-{i},Delhi,Morning,zero,Night,Mumbai,{class},2.5,{days_left},{price}\n"
            ));
        }

        fs::write(path, csv).unwrap();
    }

    #[test]
    fn run_writes_both_artifacts() {
        let dir = tmp_dir("run");
        fs::create_dir_all(&dir).unwrap();
        let data = dir.join("data.csv");
        write_dataset(&data);

        let forest = ForestBuilder::new().n_estimators(10).build().unwrap();
        let job = ExportJob::new(&data, dir.join("out/model.json"), dir.join("out/encoders.json"))
            .with_forest(forest);

        let mut stages = Vec::new();
        let report = job.run_with(|stage| stages.push(stage)).unwrap();

        assert_eq!(report.rows, 40);
        assert_eq!(report.trees, 10);
        assert!(report.r2 > 0.9, "r2 was {}", report.r2);
        assert_eq!(
            stages,
            [
                Stage::Loading,
                Stage::Encoding,
                Stage::Training { n_estimators: 10 },
                Stage::Saving,
            ]
        );

        let model = ModelArtifact::load(dir.join("out/model.json")).unwrap();
        let encoders = EncoderSet::load(dir.join("out/encoders.json")).unwrap();
        assert_eq!(model.forest().trees().len(), 10);
        assert_eq!(encoders.len(), 8);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_dataset_leaves_previous_artifacts_untouched() {
        let dir = tmp_dir("missing");
        fs::create_dir_all(&dir).unwrap();
        let model_path = dir.join("model.json");
        fs::write(&model_path, "previous").unwrap();

        let job = ExportJob::new(dir.join("nope.csv"), &model_path, dir.join("encoders.json"));
        let err = job.run().unwrap_err();

        assert!(matches!(err, MlErr::Io { .. }));
        assert_eq!(fs::read_to_string(&model_path).unwrap(), "previous");
        assert!(!dir.join("encoders.json").exists());

        fs::remove_dir_all(dir).unwrap();
    }
}

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::info;
use ndarray::ArrayView1;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
    MlErr, Result,
    arch::{Model, RandomForest},
    encoding::EncoderSet,
    features::Column,
};

/// The persisted model: the fitted forest and the feature columns it was trained on, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    feature_columns: Vec<String>,
    forest: RandomForest,
}

impl ModelArtifact {
    /// Wraps a forest trained on `Column::ALL`.
    pub fn new(forest: RandomForest) -> Result<Self> {
        let artifact = Self {
            feature_columns: Column::names(),
            forest,
        };

        artifact.validate()?;
        Ok(artifact)
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Predicts the price of an encoded trip.
    pub fn predict(&self, x: ArrayView1<f64>) -> Result<f64> {
        self.forest.predict_row(x)
    }

    /// Checks that the artifact takes exactly the features of `Column::ALL`, in that order.
    pub fn validate(&self) -> Result<()> {
        let expected = Column::names();
        if self.feature_columns != expected || self.forest.n_features() != expected.len() {
            return Err(MlErr::SchemaMismatch {
                got: self.feature_columns.clone(),
                expected,
            });
        }

        self.forest.validate()
    }

    /// Loads and validates a model artifact.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let artifact: Self = load_json(&path)?;
        artifact.validate()?;

        let shown = path.as_ref().display().to_string();
        info!(path = shown.as_str(), trees = artifact.forest.trees().len(); "model loaded");
        Ok(artifact)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_json(path, self)
    }
}

impl EncoderSet {
    /// Loads and validates an encoder set artifact.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let encoders: Self = load_json(&path)?;
        encoders.validate()?;

        let shown = path.as_ref().display().to_string();
        info!(path = shown.as_str(), encoders = encoders.len(); "encoders loaded");
        Ok(encoders)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        save_json(path, self)
    }
}

/// Deserializes a json file.
pub fn load_json<T, P>(path: P) -> Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| MlErr::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| MlErr::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Serializes `value` as json into `path`.
///
/// The value is first written to a sibling temporary file that is then renamed over `path`,
/// so an existing file is only replaced by a complete one. Missing parent directories are
/// created.
pub fn save_json<T, P>(path: P, value: &T) -> Result<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let io_err = |source: std::io::Error| MlErr::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }

    let tmp = tmp_path(path);
    let write = || -> Result<()> {
        let mut writer = BufWriter::new(File::create(&tmp).map_err(io_err)?);
        serde_json::to_writer(&mut writer, value).map_err(|source| MlErr::Json {
            path: path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(io_err)
    };

    if let Err(e) = write() {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    fs::rename(&tmp, path).map_err(io_err)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

use std::{
    error::Error,
    fmt::{self, Display},
    io,
    path::PathBuf,
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Csv {
        path: PathBuf,
        source: csv::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    EmptyDataset,
    MissingColumn(&'static str),
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    EmptyVocabulary {
        column: String,
    },
    UnseenLabel {
        column: String,
        label: String,
    },
    MissingEncoder {
        column: &'static str,
    },
    SchemaMismatch {
        got: Vec<String>,
        expected: Vec<String>,
    },
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    InvalidConfig(String),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::Io { path, source } => write!(f, "io error on {}: {source}", path.display()),
            MlErr::Csv { path, source } => {
                write!(f, "failed to read csv {}: {source}", path.display())
            }
            MlErr::Json { path, source } => {
                write!(f, "invalid artifact {}: {source}", path.display())
            }
            MlErr::EmptyDataset => write!(f, "the dataset has no rows"),
            MlErr::MissingColumn(column) => {
                write!(f, "the dataset is missing the required column '{column}'")
            }
            MlErr::InvalidValue { row, column, value } => {
                write!(f, "row {row}: invalid value '{value}' for column '{column}'")
            }
            MlErr::EmptyVocabulary { column } => {
                write!(f, "cannot fit an encoder for '{column}' without any labels")
            }
            MlErr::UnseenLabel { column, label } => {
                write!(f, "y contains previously unseen label '{label}' for '{column}'")
            }
            MlErr::MissingEncoder { column } => {
                write!(f, "there's no encoder for the categorical column '{column}'")
            }
            MlErr::SchemaMismatch { got, expected } => write!(
                f,
                "feature columns {got:?} don't match the expected columns {expected:?}"
            ),
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch in {what}, got {got} and expected {expected}"
            ),
            MlErr::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for MlErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MlErr::Io { source, .. } => Some(source),
            MlErr::Csv { source, .. } => Some(source),
            MlErr::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

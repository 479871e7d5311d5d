use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("failed to parse {}: {source}", path.display())]
    Json { path: PathBuf, #[source] source: serde_json::Error },
    #[error("model {model} expects {expected} features but the vocabulary has {actual}")]
    DimensionMismatch { model: String, expected: usize, actual: usize },
    #[error("model {model} got a row of {actual} features, expected {expected}")]
    RowWidth { model: String, expected: usize, actual: usize },
    #[error("malformed model {model}: {reason}")]
    Malformed { model: String, reason: String },
    #[error("class id {0} is not known to the label encoder")]
    UnknownClass(usize),
    #[error("invalid artifact: {0}")]
    Invalid(String),
}

impl ModelError {
    pub(crate) fn malformed(model: &str, reason: impl Into<String>) -> Self {
        ModelError::Malformed { model: model.to_string(), reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;

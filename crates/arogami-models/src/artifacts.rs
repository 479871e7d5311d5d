//! Loading of the exported artifacts from one directory.
//!
//! ```text
//! <dir>/feature_names.json    ["itching", "skin_rash", ...]
//! <dir>/label_encoder.json    ["Acne", "AIDS", ...]
//! <dir>/models/<Name>.json    tagged model export per ensemble member
//! <dir>/descriptions.json     {"Acne": "...", ...}
//! <dir>/specialists.json      {"Acne": "Dermatologist", ...}
//! <dir>/synonyms.json         optional {"tummy pain": "abdominal pain", ...}
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::classifier::Classifier;
use crate::error::{ModelError, Result};
use crate::label::LabelEncoder;

/// Specialist corrections applied on top of the exported table.
const SPECIALIST_OVERRIDES: &[(&str, &str)] = &[("Tuberculosis", "Pulmonologist")];

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).map_err(|source| ModelError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_slice(&bytes).map_err(|source| ModelError::Json { path: path.to_path_buf(), source })
}

#[derive(Debug, Clone)]
pub struct ArtifactDir { root: PathBuf }

impl ArtifactDir {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    pub fn root(&self) -> &Path { &self.root }

    pub fn model_path(&self, name: &str) -> PathBuf { self.root.join("models").join(format!("{name}.json")) }

    pub fn feature_names(&self) -> Result<Vec<String>> {
        let names: Vec<String> = read_json(&self.root.join("feature_names.json"))?;
        if names.is_empty() { return Err(ModelError::Invalid("feature_names.json is empty".into())); }
        let mut seen = HashSet::with_capacity(names.len());
        if let Some(dup) = names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(ModelError::Invalid(format!("duplicate feature name {dup:?}")));
        }
        Ok(names)
    }

    pub fn label_encoder(&self) -> Result<LabelEncoder> {
        LabelEncoder::new(read_json(&self.root.join("label_encoder.json"))?)
    }

    /// Loads a model and checks it against the vocabulary width and the label encoder.
    pub fn model(&self, name: &str, n_features: usize, labels: &LabelEncoder) -> Result<Classifier> {
        let model = Classifier::from_path(name, &self.model_path(name))?;
        if model.n_features() != n_features {
            return Err(ModelError::DimensionMismatch { model: name.to_string(), expected: model.n_features(), actual: n_features });
        }
        if let Some(bad) = model.classes().iter().find(|c| **c >= labels.len()) {
            return Err(ModelError::malformed(name, format!("class id {bad} outside label encoder of {}", labels.len())));
        }
        tracing::debug!(model = name, algorithm = model.algorithm(), classes = model.n_classes(), "model loaded");
        Ok(model)
    }

    pub fn descriptions(&self) -> Result<HashMap<String, String>> { read_json(&self.root.join("descriptions.json")) }

    pub fn specialists(&self) -> Result<HashMap<String, String>> {
        let mut table: HashMap<String, String> = read_json(&self.root.join("specialists.json"))?;
        for (disease, specialist) in SPECIALIST_OVERRIDES {
            if let Some(v) = table.get_mut(*disease) { *v = specialist.to_string(); }
        }
        Ok(table)
    }

    /// Extra synonym mappings, if the directory ships any.
    pub fn synonyms(&self) -> Result<Option<HashMap<String, String>>> {
        let path = self.root.join("synonyms.json");
        if !path.exists() { return Ok(None); }
        read_json(&path).map(Some)
    }
}

use arogami_models::{Classifier, LabelEncoder, ModelError};
use arogami_schema::ModelInfo;
use metrics::counter;

use crate::encoder::FeatureRow;

#[derive(Debug, Clone, PartialEq)]
pub struct Vote { pub model: String, pub disease: String }

/// Fixed set of classifiers consulted together. Read-only after startup.
#[derive(Debug, Clone)]
pub struct Ensemble { members: Vec<Classifier> }

impl Ensemble {
    pub fn new(members: Vec<Classifier>) -> Self { Self { members } }

    pub fn len(&self) -> usize { self.members.len() }
    pub fn is_empty(&self) -> bool { self.members.is_empty() }
    pub fn members(&self) -> &[Classifier] { &self.members }

    /// One label per member, in member order.
    pub fn vote(&self, row: &FeatureRow, labels: &LabelEncoder) -> Result<Vec<Vote>, ModelError> {
        let mut out = Vec::with_capacity(self.members.len());
        for m in &self.members {
            let id = m.predict(row.view())?;
            let disease = labels.inverse_transform(id)?.to_string();
            counter!("model_votes_total", 1, "model" => m.name().to_string());
            out.push(Vote { model: m.name().to_string(), disease });
        }
        Ok(out)
    }

    pub fn info(&self) -> Vec<ModelInfo> {
        self.members.iter().map(|m| ModelInfo {
            name: m.name().to_string(),
            algorithm: m.algorithm().to_string(),
            n_features: m.n_features(),
            n_classes: m.n_classes(),
            supports_proba: m.supports_proba(),
        }).collect()
    }
}

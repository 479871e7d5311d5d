use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Description returned by the dual-model route when a disease has no description row.
pub const NO_DESCRIPTION: &str = "No description available";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictRequest { #[serde(default)] pub symptoms: Vec<String> }

/// One ranked disease in a consensus response. Field names follow the
/// tabular shape clients already consume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    #[serde(rename = "Disease")]
    pub disease: String,
    #[serde(rename = "Chances")]
    pub chances: f64,
    #[serde(rename = "Specialist")]
    pub specialist: Option<String>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVerdict { pub disease: String, pub confidence: f64, pub description: String }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DualPredictResponse {
    pub predictions: BTreeMap<String, ModelVerdict>,
    pub input_symptoms: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomsResponse { pub symptoms: Vec<String>, pub total: usize }
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiseasesResponse { pub diseases: Vec<String>, pub total: usize }
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse { pub status: String, pub message: String, pub available_endpoints: Vec<String> }
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo { pub name: String, pub algorithm: String, pub n_features: usize, pub n_classes: usize, pub supports_proba: bool }
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody { pub detail: String }

impl SymptomsResponse { pub fn new(symptoms: Vec<String>) -> Self { let total = symptoms.len(); Self { symptoms, total } } }
impl DiseasesResponse { pub fn new(diseases: Vec<String>) -> Self { let total = diseases.len(); Self { diseases, total } } }

/// Response key for a model in the dual-model body: "Random Forest" -> "random_forest".
pub fn model_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for word in name.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
        if !out.is_empty() { out.push('_'); }
        out.push_str(&word.to_lowercase());
    }
    out
}

/// Sum of the vote shares in a consensus response.
pub fn total_chances(rows: &[PredictionRow]) -> f64 { rows.iter().map(|r| r.chances).sum() }

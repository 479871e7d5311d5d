use std::collections::{BTreeMap, HashMap};

use anyhow::{bail, Context};
use arogami_models::{ArtifactDir, Classifier, LabelEncoder, ModelError};
use arogami_schema::{model_key, DualPredictResponse, ModelVerdict, PredictionRow, NO_DESCRIPTION};
use metrics::{counter, histogram};
use thiserror::Error;

use crate::config::Config;
use crate::consensus::{self, ReferenceTables};
use crate::encoder::{encode, FeatureRow};
use crate::ensemble::Ensemble;
use crate::normalizer::{normalize, Normalized, SynonymTable, Vocabulary};

const SUGGESTION_COUNT: usize = 5;

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("No symptoms provided")]
    NoSymptoms,
    #[error("None of the provided symptoms could be recognized. Please use symptoms like: {}...", suggestions.join(", "))]
    NoneRecognized { suggestions: Vec<String> },
    #[error("model {0} does not report probabilities")]
    NoProbabilities(String),
    #[error(transparent)]
    Model(#[from] ModelError),
}

impl PredictError {
    pub fn is_user_error(&self) -> bool { matches!(self, PredictError::NoSymptoms | PredictError::NoneRecognized { .. }) }
}

/// Everything loaded at startup. Shared read-only by all requests.
#[derive(Debug)]
pub struct AppContext {
    vocab: Vocabulary,
    synonyms: SynonymTable,
    labels: LabelEncoder,
    ensemble: Ensemble,
    dual: Vec<Classifier>,
    tables: ReferenceTables,
}

impl AppContext {
    pub fn new(vocab: Vocabulary, synonyms: SynonymTable, labels: LabelEncoder, ensemble: Ensemble, dual: Vec<Classifier>, tables: ReferenceTables) -> anyhow::Result<Self> {
        if vocab.is_empty() { bail!("feature vocabulary is empty"); }
        if ensemble.is_empty() { bail!("ensemble has no members"); }
        for m in ensemble.members().iter().chain(&dual) {
            if m.n_features() != vocab.len() {
                bail!("model {} expects {} features, vocabulary has {}", m.name(), m.n_features(), vocab.len());
            }
        }
        if let Some(m) = dual.iter().find(|m| !m.supports_proba()) {
            bail!("dual model {} does not report probabilities", m.name());
        }
        Ok(Self { vocab, synonyms, labels, ensemble, dual, tables })
    }

    pub fn load(cfg: &Config) -> anyhow::Result<Self> {
        let dir = ArtifactDir::new(&cfg.artifact_dir);
        let features = dir.feature_names().context("loading feature names")?;
        let labels = dir.label_encoder().context("loading label encoder")?;
        let mut models = HashMap::new();
        for name in cfg.all_models() {
            let m = dir.model(&name, features.len(), &labels).with_context(|| format!("loading model {name}"))?;
            models.insert(name, m);
        }
        let pick = |names: &[String]| names.iter().filter_map(|n| models.get(n).cloned()).collect::<Vec<_>>();
        let ensemble = Ensemble::new(pick(&cfg.ensemble));
        let dual = pick(&cfg.dual);
        let synonyms = match dir.synonyms().context("loading synonyms")? {
            Some(extra) => SynonymTable::with_overrides(extra),
            None => SynonymTable::builtin(),
        };
        let tables = ReferenceTables {
            specialists: dir.specialists().context("loading specialist table")?,
            descriptions: dir.descriptions().context("loading description table")?,
        };
        tracing::info!(
            dir = %dir.root().display(),
            features = features.len(),
            diseases = labels.len(),
            members = ensemble.len(),
            synonyms = synonyms.len(),
            "artifacts loaded"
        );
        Self::new(Vocabulary::new(features), synonyms, labels, ensemble, dual, tables)
    }

    pub fn list_symptoms(&self) -> &[String] { self.vocab.names() }
    pub fn list_diseases(&self) -> &[String] { self.labels.classes() }
    pub fn ensemble(&self) -> &Ensemble { &self.ensemble }

    /// Normalized symptoms that are in the vocabulary; stale synonym targets drop here.
    pub fn resolve<S: AsRef<str>>(&self, symptoms: &[S]) -> Result<Vec<String>, PredictError> {
        if symptoms.is_empty() { return Err(PredictError::NoSymptoms); }
        let resolved = match normalize(&self.vocab, &self.synonyms, symptoms) {
            Normalized::Recognized { symptoms, unmatched } => {
                if !unmatched.is_empty() { tracing::warn!(?unmatched, "could not map symptoms"); }
                symptoms.into_iter().filter(|s| self.vocab.contains(s)).collect::<Vec<_>>()
            }
            Normalized::NoneRecognized => vec![],
        };
        if resolved.is_empty() {
            let suggestions = self.vocab.names().iter().take(SUGGESTION_COUNT).cloned().collect();
            return Err(PredictError::NoneRecognized { suggestions });
        }
        histogram!("normalized_symptoms", resolved.len() as f64);
        tracing::debug!(?resolved, "valid symptoms for prediction");
        Ok(resolved)
    }

    fn row<S: AsRef<str>>(&self, symptoms: &[S]) -> Result<FeatureRow, PredictError> {
        let resolved = self.resolve(symptoms).inspect_err(|e| {
            let reason = match e { PredictError::NoSymptoms => "empty", PredictError::NoneRecognized { .. } => "unrecognized", _ => return };
            counter!("predict_rejected_total", 1, "reason" => reason);
        })?;
        let row = encode(&self.vocab, &resolved);
        tracing::debug!(width = row.len(), active = row.active(), "encoded feature row");
        Ok(row)
    }

    /// Pooled ensemble vote, ranked by share.
    pub fn predict<S: AsRef<str>>(&self, symptoms: &[S]) -> Result<Vec<PredictionRow>, PredictError> {
        let row = self.row(symptoms)?;
        let votes = {
            let _s = tracing::info_span!("ensemble_vote", members = self.ensemble.len()).entered();
            self.ensemble.vote(&row, &self.labels)?
        };
        for v in &votes { tracing::debug!(model = %v.model, disease = %v.disease, "member vote"); }
        let _s = tracing::info_span!("consensus").entered();
        let labels: Vec<&str> = votes.iter().map(|v| v.disease.as_str()).collect();
        Ok(consensus::compute(&labels, &self.tables))
    }

    /// Each dual model's own top prediction with its confidence.
    pub fn predict_dual<S: AsRef<str>>(&self, symptoms: &[S]) -> Result<DualPredictResponse, PredictError> {
        let row = self.row(symptoms)?;
        let mut predictions = BTreeMap::new();
        let mut lead_confidence = None;
        for m in &self.dual {
            let (id, confidence) = m.predict_with_confidence(row.view())?.ok_or_else(|| PredictError::NoProbabilities(m.name().to_string()))?;
            let disease = self.labels.inverse_transform(id)?.to_string();
            let description = self.tables.description(&disease).unwrap_or(NO_DESCRIPTION).to_string();
            lead_confidence.get_or_insert(confidence);
            predictions.insert(model_key(m.name()), ModelVerdict { disease, confidence, description });
        }
        Ok(DualPredictResponse {
            predictions,
            input_symptoms: symptoms.iter().map(|s| s.as_ref().to_string()).collect(),
            recommendations: consensus::recommendations(lead_confidence.unwrap_or(0.0)),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ensemble::tests::stump;
    use arogami_schema::total_chances;

    /// Vocabulary ["itching", "skin_rash", "high fever"]; every stump splits on "itching".
    pub(crate) fn context() -> AppContext {
        let vocab = Vocabulary::new(vec!["itching".into(), "skin_rash".into(), "high fever".into()]);
        let labels = LabelEncoder::new(vec!["Cold".into(), "Flu".into(), "Allergy".into()]).unwrap();
        let ensemble = Ensemble::new(vec![stump("a", 0, 1), stump("b", 0, 1), stump("c", 1, 0), stump("d", 0, 1)]);
        let dual = vec![stump("Random Forest", 0, 2), stump("Decision Tree", 1, 1)];
        let tables = ReferenceTables {
            specialists: HashMap::from([("Flu".to_string(), "General Physician".to_string())]),
            descriptions: HashMap::from([("Allergy".to_string(), "Immune reaction".to_string())]),
        };
        AppContext::new(vocab, SynonymTable::builtin(), labels, ensemble, dual, tables).unwrap()
    }

    #[test]
    fn scenario_votes_three_to_one() {
        let rows = context().predict(&["ITCHING", "fever"]).unwrap();
        assert_eq!(rows.iter().map(|r| (r.disease.as_str(), r.chances)).collect::<Vec<_>>(), vec![("Flu", 75.0), ("Cold", 25.0)]);
        assert_eq!(rows[0].specialist.as_deref(), Some("General Physician"));
        assert!((total_chances(&rows) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_input_rejected_before_encoding() {
        let err = context().predict::<&str>(&[]).unwrap_err();
        assert!(matches!(err, PredictError::NoSymptoms));
        assert!(err.is_user_error());
    }

    #[test]
    fn unknown_only_input_lists_suggestions() {
        let err = context().predict(&["xyz-not-a-real-symptom"]).unwrap_err();
        assert!(err.is_user_error());
        assert_eq!(err.to_string(), "None of the provided symptoms could be recognized. Please use symptoms like: itching, skin_rash, high fever...");
    }

    #[test]
    fn stale_synonym_alone_counts_as_unrecognized() {
        let err = context().resolve(&["tummy pain"]).unwrap_err();
        assert!(matches!(err, PredictError::NoneRecognized { .. }));
    }

    #[test]
    fn dual_reports_each_model() {
        let resp = context().predict_dual(&["itching"]).unwrap();
        assert_eq!(resp.predictions["random_forest"].disease, "Allergy");
        assert_eq!(resp.predictions["random_forest"].description, "Immune reaction");
        assert_eq!(resp.predictions["decision_tree"].disease, "Flu");
        assert_eq!(resp.predictions["decision_tree"].description, NO_DESCRIPTION);
        assert_eq!(resp.input_symptoms, vec!["itching"]);
        assert!(resp.recommendations[0].starts_with("High confidence"));
    }

    #[test]
    fn width_mismatch_refuses_to_build() {
        let vocab = Vocabulary::new(vec!["only".into()]);
        let labels = LabelEncoder::new(vec!["Cold".into(), "Flu".into()]).unwrap();
        let r = AppContext::new(vocab, SynonymTable::builtin(), labels, Ensemble::new(vec![stump("a", 0, 1)]), vec![], ReferenceTables::default());
        assert!(r.is_err());
    }

    fn write_bundle(dir: &std::path::Path) {
        // One split on "cough": absent -> Allergy, present -> Tuberculosis.
        let nodes = r#""children_left":[1,-1,-1],"children_right":[2,-1,-1],"feature":[1,-2,-2],"threshold":[0.5,-2.0,-2.0],"value":[[1.0,1.0],[1.0,0.0],[0.0,1.0]]"#;
        let tree = format!(r#"{{"algorithm":"decision_tree","n_features":2,{nodes}}}"#);
        let forest = format!(r#"{{"algorithm":"random_forest","n_features":2,"trees":[{{{nodes}}},{{{nodes}}}]}}"#);
        let svm = r#"{"algorithm":"linear_svm","n_features":2,"coef":[[0.0,1.0]],"intercept":[-0.5]}"#;
        std::fs::create_dir_all(dir.join("models")).unwrap();
        for (rel, body) in [
            ("feature_names.json", r#"["itching", "cough"]"#),
            ("label_encoder.json", r#"["Allergy", "Tuberculosis"]"#),
            ("descriptions.json", r#"{"Tuberculosis": "Bacterial lung infection"}"#),
            ("specialists.json", r#"{"Tuberculosis": "General Physician"}"#),
            ("synonyms.json", r#"{"hacking": "cough"}"#),
            ("models/Decision Tree.json", tree.as_str()),
            ("models/Random Forest.json", forest.as_str()),
            ("models/SVM.json", svm),
        ] {
            std::fs::write(dir.join(rel), body).unwrap();
        }
    }

    #[test]
    fn loads_artifact_directory() {
        let tmp = tempfile::tempdir().unwrap();
        write_bundle(tmp.path());
        let cfg = Config::from_lookup(|k| match k {
            "AROGAMI_ARTIFACT_DIR" => Some(tmp.path().display().to_string()),
            "AROGAMI_ENSEMBLE" => Some(r#"["Decision Tree","SVM","Random Forest"]"#.into()),
            _ => None,
        }).unwrap();
        let ctx = AppContext::load(&cfg).unwrap();
        assert_eq!(ctx.ensemble().len(), 3);
        let rows = ctx.predict(&["Hacking"]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].disease, "Tuberculosis");
        assert_eq!(rows[0].chances, 100.0);
        assert_eq!(rows[0].specialist.as_deref(), Some("Pulmonologist"));
        assert_eq!(ctx.predict_dual(&["hacking"]).unwrap().predictions["random_forest"].confidence, 1.0);
    }

    #[test]
    fn missing_model_refuses_to_load() {
        let tmp = tempfile::tempdir().unwrap();
        write_bundle(tmp.path());
        let cfg = Config::from_lookup(|k| match k {
            "AROGAMI_ARTIFACT_DIR" => Some(tmp.path().display().to_string()),
            _ => None,
        }).unwrap();
        let err = AppContext::load(&cfg).unwrap_err();
        assert!(format!("{err:#}").contains("Logistic Regression"));
    }

    #[test]
    fn accessors_expose_tables() {
        let ctx = context();
        assert_eq!(ctx.list_symptoms(), ["itching", "skin_rash", "high fever"]);
        assert_eq!(ctx.list_diseases(), ["Cold", "Flu", "Allergy"]);
    }
}

use std::path::Path;

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::knn::{Knn, KnnData};
use crate::linear::{LinearData, LinearModel};
use crate::naive_bayes::{GaussianNb, GaussianNbData};
use crate::tree::{DecisionTree, ForestData, RandomForest, TreeData};

/// Parameters of one fitted estimator, tagged by algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum ModelParams {
    DecisionTree(TreeData),
    RandomForest(ForestData),
    LogisticRegression(LinearData),
    LinearSvm(LinearData),
    GaussianNb(GaussianNbData),
    Knn(KnnData),
}

/// On-disk model export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelExport {
    pub n_features: usize,
    /// Label encoder id of each output position; identity when absent.
    #[serde(default)]
    pub classes: Option<Vec<usize>>,
    #[serde(flatten)]
    pub params: ModelParams,
}

#[derive(Debug, Clone)]
enum Estimator {
    Tree(DecisionTree),
    Forest(RandomForest),
    Logistic(LinearModel),
    Svm(LinearModel),
    Bayes(GaussianNb),
    Knn(Knn),
}

impl Estimator {
    fn algorithm(&self) -> &'static str {
        match self {
            Estimator::Tree(_) => "decision_tree",
            Estimator::Forest(_) => "random_forest",
            Estimator::Logistic(_) => "logistic_regression",
            Estimator::Svm(_) => "linear_svm",
            Estimator::Bayes(_) => "gaussian_nb",
            Estimator::Knn(_) => "knn",
        }
    }

    fn n_outputs(&self) -> usize {
        match self {
            Estimator::Tree(m) => m.n_classes(),
            Estimator::Forest(m) => m.n_classes(),
            Estimator::Logistic(m) | Estimator::Svm(m) => m.n_classes(),
            Estimator::Bayes(m) => m.n_classes(),
            Estimator::Knn(m) => m.n_classes(),
        }
    }

    fn predict_proba(&self, x: ArrayView1<f64>) -> Option<Array1<f64>> {
        match self {
            Estimator::Tree(m) => Some(m.predict_proba(x)),
            Estimator::Forest(m) => Some(m.predict_proba(x)),
            Estimator::Logistic(m) => Some(m.predict_proba(x)),
            Estimator::Svm(_) => None,
            Estimator::Bayes(m) => Some(m.predict_proba(x)),
            Estimator::Knn(m) => Some(m.predict_proba(x)),
        }
    }

    fn scores(&self, x: ArrayView1<f64>) -> Array1<f64> {
        match self {
            Estimator::Svm(m) => m.class_scores(x),
            Estimator::Bayes(m) => m.joint_log_likelihood(x),
            other => other.predict_proba(x).unwrap_or_else(|| Array1::zeros(other.n_outputs())),
        }
    }
}

/// A loaded, named classifier. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Classifier {
    name: String,
    n_features: usize,
    classes: Vec<usize>,
    estimator: Estimator,
}

impl Classifier {
    pub fn from_export(name: &str, export: ModelExport) -> Result<Self> {
        let n = export.n_features;
        let declared = export.classes.as_ref().map(Vec::len);
        let estimator = match export.params {
            ModelParams::DecisionTree(d) => Estimator::Tree(DecisionTree::from_data(name, d, n)?),
            ModelParams::RandomForest(d) => Estimator::Forest(RandomForest::from_data(name, d, n)?),
            ModelParams::LogisticRegression(d) => Estimator::Logistic(LinearModel::from_data(name, d, n)?),
            ModelParams::LinearSvm(d) => Estimator::Svm(LinearModel::from_data(name, d, n)?),
            ModelParams::GaussianNb(d) => Estimator::Bayes(GaussianNb::from_data(name, d, n)?),
            ModelParams::Knn(d) => Estimator::Knn(Knn::from_data(name, d, n, declared)?),
        };
        let outputs = estimator.n_outputs();
        let classes = export.classes.unwrap_or_else(|| (0..outputs).collect());
        if classes.len() != outputs {
            return Err(ModelError::malformed(name, format!("{} classes listed for {outputs} outputs", classes.len())));
        }
        Ok(Self { name: name.to_string(), n_features: n, classes, estimator })
    }

    pub fn from_path(name: &str, path: &Path) -> Result<Self> {
        let export: ModelExport = crate::artifacts::read_json(path)?;
        Self::from_export(name, export)
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn algorithm(&self) -> &'static str { self.estimator.algorithm() }
    pub fn n_features(&self) -> usize { self.n_features }
    pub fn n_classes(&self) -> usize { self.classes.len() }
    pub fn supports_proba(&self) -> bool { !matches!(self.estimator, Estimator::Svm(_)) }
    /// Label encoder ids this model can emit, by output position.
    pub fn classes(&self) -> &[usize] { &self.classes }

    fn check_width(&self, row: ArrayView1<f64>) -> Result<()> {
        if row.len() != self.n_features {
            return Err(ModelError::RowWidth { model: self.name.clone(), expected: self.n_features, actual: row.len() });
        }
        Ok(())
    }

    /// Label encoder id of the top class.
    pub fn predict(&self, row: ArrayView1<f64>) -> Result<usize> {
        self.check_width(row)?;
        Ok(self.classes[argmax(&self.estimator.scores(row))])
    }

    /// Class distribution by output position, or `None` for models without probabilities.
    pub fn predict_proba(&self, row: ArrayView1<f64>) -> Result<Option<Array1<f64>>> {
        self.check_width(row)?;
        Ok(self.estimator.predict_proba(row))
    }

    /// Top class id with its probability, for models that expose probabilities.
    pub fn predict_with_confidence(&self, row: ArrayView1<f64>) -> Result<Option<(usize, f64)>> {
        Ok(self.predict_proba(row)?.map(|p| {
            let top = argmax(&p);
            (self.classes[top], p[top])
        }))
    }
}

/// Index of the largest value; the first one wins on ties.
pub fn argmax(v: &Array1<f64>) -> usize {
    let mut best = 0;
    for (i, x) in v.iter().enumerate() {
        if *x > v[best] { best = i; }
    }
    best
}

pub(crate) fn softmax(v: &Array1<f64>) -> Array1<f64> {
    let max = v.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let e = v.mapv(|x| (x - max).exp());
    let s = e.sum();
    e / s
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn load(json: serde_json::Value) -> Result<Classifier> {
        let export: ModelExport = serde_json::from_value(json).expect("export parses");
        Classifier::from_export("m", export)
    }

    #[test]
    fn tagged_tree_export_maps_classes() {
        let c = load(serde_json::json!({
            "algorithm": "decision_tree", "n_features": 2, "classes": [7, 3],
            "children_left": [1, -1, -1], "children_right": [2, -1, -1],
            "feature": [0, -2, -2], "threshold": [0.5, -2.0, -2.0],
            "value": [[1.0, 1.0], [1.0, 0.0], [0.0, 1.0]]
        })).unwrap();
        assert_eq!(c.algorithm(), "decision_tree");
        assert_eq!(c.predict(array![1.0, 0.0].view()).unwrap(), 3);
        assert_eq!(c.predict(array![0.0, 0.0].view()).unwrap(), 7);
        assert_eq!(c.predict_with_confidence(array![1.0, 0.0].view()).unwrap(), Some((3, 1.0)));
    }

    #[test]
    fn svm_predicts_without_probabilities() {
        let c = load(serde_json::json!({
            "algorithm": "linear_svm", "n_features": 2,
            "coef": [[1.0, -1.0], [-1.0, 1.0]], "intercept": [0.0, 0.0]
        })).unwrap();
        assert!(!c.supports_proba());
        assert_eq!(c.predict(array![0.0, 1.0].view()).unwrap(), 1);
        assert!(c.predict_proba(array![0.0, 1.0].view()).unwrap().is_none());
        assert!(c.predict_with_confidence(array![0.0, 1.0].view()).unwrap().is_none());
    }

    #[test]
    fn gaussian_nb_and_knn_load_from_tags() {
        let nb = load(serde_json::json!({
            "algorithm": "gaussian_nb", "n_features": 1,
            "theta": [[0.0], [1.0]], "var": [[0.2], [0.2]], "class_prior": [0.5, 0.5]
        })).unwrap();
        assert_eq!(nb.predict(array![1.0].view()).unwrap(), 1);
        let knn = load(serde_json::json!({
            "algorithm": "knn", "n_features": 1, "k": 1, "fit_x": [[0.0], [1.0]], "fit_y": [0, 1]
        })).unwrap();
        assert_eq!(knn.predict(array![0.2].view()).unwrap(), 0);
    }

    #[test]
    fn wrong_row_width_is_an_error() {
        let c = load(serde_json::json!({
            "algorithm": "logistic_regression", "n_features": 2,
            "coef": [[1.0, 0.0]], "intercept": [0.0]
        })).unwrap();
        assert!(matches!(c.predict(array![1.0].view()), Err(ModelError::RowWidth { expected: 2, actual: 1, .. })));
    }

    #[test]
    fn class_list_must_match_outputs() {
        let err = load(serde_json::json!({
            "algorithm": "logistic_regression", "n_features": 1, "classes": [0, 1, 2],
            "coef": [[1.0]], "intercept": [0.0]
        })).unwrap_err();
        assert!(matches!(err, ModelError::Malformed { .. }));
    }

    #[test]
    fn unknown_algorithm_fails_to_parse() {
        let de: std::result::Result<ModelExport, _> = serde_json::from_value(serde_json::json!({"algorithm": "xgboost", "n_features": 1}));
        assert!(de.is_err());
    }

    #[test]
    fn argmax_prefers_first_on_ties() {
        assert_eq!(argmax(&array![0.5, 0.5, 0.1]), 0);
        assert_eq!(argmax(&array![0.1, 0.2, 0.2]), 1);
    }
}

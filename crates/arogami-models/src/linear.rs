//! Linear models: logistic regression and linear SVM.
//!
//! Both store a `K x F` weight matrix and `K` intercepts. With `K == 1` the model
//! is binary and the single decision value scores the second class.

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearData {
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct LinearModel {
    coef: Array2<f64>,
    intercept: Array1<f64>,
}

impl LinearModel {
    pub fn from_data(model: &str, data: LinearData, n_features: usize) -> Result<Self> {
        let rows = data.coef.len();
        if rows == 0 { return Err(ModelError::malformed(model, "no coefficient rows")); }
        if data.intercept.len() != rows {
            return Err(ModelError::malformed(model, format!("{} intercepts for {rows} coefficient rows", data.intercept.len())));
        }
        if let Some(bad) = data.coef.iter().find(|r| r.len() != n_features) {
            return Err(ModelError::DimensionMismatch { model: model.to_string(), expected: bad.len(), actual: n_features });
        }
        let flat: Vec<f64> = data.coef.into_iter().flatten().collect();
        let coef = Array2::from_shape_vec((rows, n_features), flat).map_err(|e| ModelError::malformed(model, e.to_string()))?;
        Ok(Self { coef, intercept: Array1::from(data.intercept) })
    }

    /// Number of classes the model separates.
    pub fn n_classes(&self) -> usize { if self.coef.nrows() == 1 { 2 } else { self.coef.nrows() } }

    pub fn decision_function(&self, x: ArrayView1<f64>) -> Array1<f64> { self.coef.dot(&x) + &self.intercept }

    /// Class scores where a larger value wins; expands the binary case to two entries.
    pub fn class_scores(&self, x: ArrayView1<f64>) -> Array1<f64> {
        let d = self.decision_function(x);
        if d.len() == 1 { Array1::from(vec![-d[0], d[0]]) } else { d }
    }

    /// Logistic regression probabilities.
    pub fn predict_proba(&self, x: ArrayView1<f64>) -> Array1<f64> {
        let d = self.decision_function(x);
        if d.len() == 1 {
            let p = 1.0 / (1.0 + (-d[0]).exp());
            Array1::from(vec![1.0 - p, p])
        } else {
            crate::classifier::softmax(&d)
        }
    }
}

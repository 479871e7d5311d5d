use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GaussianNbData {
    pub theta: Vec<Vec<f64>>,
    pub var: Vec<Vec<f64>>,
    pub class_prior: Vec<f64>,
}

/// Gaussian naive Bayes with per-class feature means and variances.
#[derive(Debug, Clone)]
pub struct GaussianNb {
    theta: Array2<f64>,
    var: Array2<f64>,
    /// log prior minus the normalising term `0.5 * sum(ln(2*pi*var))`, per class.
    offset: Array1<f64>,
}

fn matrix(model: &str, what: &str, rows: Vec<Vec<f64>>, n_features: usize) -> Result<Array2<f64>> {
    let n = rows.len();
    if let Some(bad) = rows.iter().find(|r| r.len() != n_features) {
        return Err(ModelError::DimensionMismatch { model: model.to_string(), expected: bad.len(), actual: n_features });
    }
    Array2::from_shape_vec((n, n_features), rows.into_iter().flatten().collect())
        .map_err(|e| ModelError::malformed(model, format!("{what}: {e}")))
}

impl GaussianNb {
    pub fn from_data(model: &str, data: GaussianNbData, n_features: usize) -> Result<Self> {
        let k = data.class_prior.len();
        if k == 0 { return Err(ModelError::malformed(model, "no classes")); }
        if data.theta.len() != k || data.var.len() != k {
            return Err(ModelError::malformed(model, "theta, var and class_prior disagree on class count"));
        }
        if data.class_prior.iter().any(|p| *p <= 0.0) {
            return Err(ModelError::malformed(model, "class priors must be positive"));
        }
        let theta = matrix(model, "theta", data.theta, n_features)?;
        let var = matrix(model, "var", data.var, n_features)?;
        if var.iter().any(|v| *v <= 0.0) {
            return Err(ModelError::malformed(model, "variances must be positive"));
        }
        let norm = var.mapv(|v| (2.0 * std::f64::consts::PI * v).ln()).sum_axis(Axis(1)) * 0.5;
        let offset = Array1::from(data.class_prior).mapv(f64::ln) - norm;
        Ok(Self { theta, var, offset })
    }

    pub fn n_classes(&self) -> usize { self.theta.nrows() }

    pub fn joint_log_likelihood(&self, x: ArrayView1<f64>) -> Array1<f64> {
        let sq = (&self.theta - &x).mapv(|d| d * d) / &self.var;
        sq.sum_axis(Axis(1)) * -0.5 + &self.offset
    }

    pub fn predict_proba(&self, x: ArrayView1<f64>) -> Array1<f64> {
        crate::classifier::softmax(&self.joint_log_likelihood(x))
    }
}

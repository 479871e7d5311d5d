//! Brute-force k-nearest-neighbour classification over the stored training rows.
//!
//! Feature rows are short binary vectors, so a linear scan is cheaper than
//! building a spatial index per request.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnnData {
    pub k: usize,
    pub fit_x: Vec<Vec<f64>>,
    /// Output position of each training row.
    pub fit_y: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct Knn {
    k: usize,
    fit_x: Array2<f64>,
    fit_y: Vec<usize>,
    n_classes: usize,
}

impl Knn {
    /// `n_classes` is the declared output width when the export lists its classes;
    /// otherwise it is inferred from the largest training label.
    pub fn from_data(model: &str, data: KnnData, n_features: usize, n_classes: Option<usize>) -> Result<Self> {
        let samples = data.fit_x.len();
        if samples == 0 { return Err(ModelError::malformed(model, "no training rows")); }
        if data.fit_y.len() != samples {
            return Err(ModelError::malformed(model, format!("{} labels for {samples} training rows", data.fit_y.len())));
        }
        if data.k == 0 || data.k > samples {
            return Err(ModelError::malformed(model, format!("k = {} with {samples} training rows", data.k)));
        }
        if let Some(bad) = data.fit_x.iter().find(|r| r.len() != n_features) {
            return Err(ModelError::DimensionMismatch { model: model.to_string(), expected: bad.len(), actual: n_features });
        }
        let max_label = data.fit_y.iter().copied().max().unwrap_or(0);
        let n_classes = n_classes.unwrap_or(max_label + 1);
        if max_label >= n_classes {
            return Err(ModelError::malformed(model, format!("training label {max_label} exceeds {n_classes} classes")));
        }
        let fit_x = Array2::from_shape_vec((samples, n_features), data.fit_x.into_iter().flatten().collect())
            .map_err(|e| ModelError::malformed(model, e.to_string()))?;
        Ok(Self { k: data.k, fit_x, fit_y: data.fit_y, n_classes })
    }

    pub fn n_classes(&self) -> usize { self.n_classes }

    /// Share of the k nearest rows voting for each class. Equidistant rows keep
    /// their training order.
    pub fn predict_proba(&self, x: ArrayView1<f64>) -> Array1<f64> {
        let dists = (&self.fit_x - &x).mapv(|d| d * d).sum_axis(Axis(1));
        let mut order: Vec<usize> = (0..dists.len()).collect();
        order.sort_by(|a, b| dists[*a].total_cmp(&dists[*b]));
        let mut votes = Array1::<f64>::zeros(self.n_classes);
        for idx in order.into_iter().take(self.k) { votes[self.fit_y[idx]] += 1.0; }
        votes / self.k as f64
    }
}

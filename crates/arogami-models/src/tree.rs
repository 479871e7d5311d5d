//! Decision tree and random forest inference over scikit-learn's flat node arrays.
//!
//! A tree is stored as parallel arrays indexed by node id. Internal nodes send a
//! row left when `x[feature] <= threshold`; a leaf has `children_left == -1` and
//! carries per-class weights in `value`.

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

const LEAF: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeData {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestData {
    pub trees: Vec<TreeData>,
}

#[derive(Debug, Clone)]
pub struct DecisionTree {
    left: Vec<i64>,
    right: Vec<i64>,
    feature: Vec<usize>,
    threshold: Vec<f64>,
    /// Leaf class distributions, already normalised; rows of internal nodes are unused.
    proba: Array2<f64>,
}

impl DecisionTree {
    pub fn from_data(model: &str, data: TreeData, n_features: usize) -> Result<Self> {
        let n = data.children_left.len();
        if n == 0 { return Err(ModelError::malformed(model, "tree has no nodes")); }
        if data.children_right.len() != n || data.feature.len() != n || data.threshold.len() != n || data.value.len() != n {
            return Err(ModelError::malformed(model, "tree node arrays differ in length"));
        }
        let n_classes = data.value[0].len();
        if n_classes == 0 { return Err(ModelError::malformed(model, "tree leaves carry no classes")); }

        let mut feature = Vec::with_capacity(n);
        let mut proba = Array2::<f64>::zeros((n, n_classes));
        for node in 0..n {
            let (l, r) = (data.children_left[node], data.children_right[node]);
            if data.value[node].len() != n_classes {
                return Err(ModelError::malformed(model, format!("node {node} has {} class weights, expected {n_classes}", data.value[node].len())));
            }
            if l == LEAF {
                let total: f64 = data.value[node].iter().sum();
                if total <= 0.0 { return Err(ModelError::malformed(model, format!("leaf {node} has no weight"))); }
                for (c, w) in data.value[node].iter().enumerate() { proba[[node, c]] = w / total; }
                feature.push(0);
                continue;
            }
            // Children always follow their parent in the node arrays, which keeps the walk finite.
            let in_range = |c: i64| c > node as i64 && (c as usize) < n;
            if !in_range(l) || !in_range(r) {
                return Err(ModelError::malformed(model, format!("node {node} has invalid children ({l}, {r})")));
            }
            let f = data.feature[node];
            if f < 0 || f as usize >= n_features {
                return Err(ModelError::malformed(model, format!("node {node} splits on feature {f}, model has {n_features}")));
            }
            feature.push(f as usize);
        }
        Ok(Self { left: data.children_left, right: data.children_right, feature, threshold: data.threshold, proba })
    }

    pub fn n_classes(&self) -> usize { self.proba.ncols() }

    fn leaf(&self, x: ArrayView1<f64>) -> usize {
        let mut node = 0usize;
        while self.left[node] != LEAF {
            node = if x[self.feature[node]] <= self.threshold[node] { self.left[node] as usize } else { self.right[node] as usize };
        }
        node
    }

    pub fn predict_proba(&self, x: ArrayView1<f64>) -> Array1<f64> { self.proba.row(self.leaf(x)).to_owned() }
}

#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn from_data(model: &str, data: ForestData, n_features: usize) -> Result<Self> {
        if data.trees.is_empty() { return Err(ModelError::malformed(model, "forest has no trees")); }
        let trees = data.trees.into_iter().map(|t| DecisionTree::from_data(model, t, n_features)).collect::<Result<Vec<_>>>()?;
        let n_classes = trees[0].n_classes();
        if trees.iter().any(|t| t.n_classes() != n_classes) {
            return Err(ModelError::malformed(model, "forest trees disagree on class count"));
        }
        Ok(Self { trees })
    }

    pub fn n_classes(&self) -> usize { self.trees[0].n_classes() }

    /// Mean of the per-tree leaf distributions.
    pub fn predict_proba(&self, x: ArrayView1<f64>) -> Array1<f64> {
        let mut acc = Array1::<f64>::zeros(self.n_classes());
        for t in &self.trees { acc += &t.predict_proba(x); }
        acc / self.trees.len() as f64
    }
}

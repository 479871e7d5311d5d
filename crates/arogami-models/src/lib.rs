//! Inference-only classifiers for the Arogami prediction service.
//!
//! Training happens offline with scikit-learn; the fitted estimators are
//! exported to JSON and loaded here once at startup.
//!
//! ## Algorithms
//! - Decision tree and random forest: node-array walk, leaf class weights
//! - Logistic regression: softmax (or sigmoid for binary) over linear logits
//! - Linear SVM: one-vs-rest decision values, no probabilities
//! - Gaussian naive Bayes: joint log likelihood per class
//! - KNN: Euclidean k-nearest vote over the stored training rows
//!
//! Every model maps its output positions onto label encoder ids, so all
//! members of an ensemble speak the same class vocabulary.

pub mod artifacts;
pub mod classifier;
pub mod error;
pub mod knn;
pub mod label;
pub mod linear;
pub mod naive_bayes;
pub mod tree;

pub use artifacts::ArtifactDir;
pub use classifier::{Classifier, ModelExport};
pub use error::{ModelError, Result};
pub use label::LabelEncoder;

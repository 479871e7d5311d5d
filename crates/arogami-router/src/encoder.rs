use ndarray::{Array1, ArrayView1};

use crate::normalizer::Vocabulary;

/// Binary presence row aligned to vocabulary order. Always `vocab.len()` wide.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow(Array1<f64>);

impl FeatureRow {
    pub fn view(&self) -> ArrayView1<'_, f64> { self.0.view() }
    pub fn len(&self) -> usize { self.0.len() }
    pub fn active(&self) -> usize { self.0.iter().filter(|v| **v > 0.0).count() }
}

/// Names outside the vocabulary are ignored; duplicates collapse.
pub fn encode<S: AsRef<str>>(vocab: &Vocabulary, symptoms: &[S]) -> FeatureRow {
    let mut row = Array1::<f64>::zeros(vocab.len());
    for s in symptoms {
        if let Some(i) = vocab.position(s.as_ref()) { row[i] = 1.0; }
    }
    FeatureRow(row)
}

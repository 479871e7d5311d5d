use std::collections::HashMap;

use crate::error::{ModelError, Result};

/// Bidirectional mapping between classifier class ids and disease names,
/// in the order the encoder was fitted with.
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Result<Self> {
        let mut index = HashMap::with_capacity(classes.len());
        for (id, name) in classes.iter().enumerate() {
            if index.insert(name.clone(), id).is_some() {
                return Err(ModelError::Invalid(format!("duplicate class label {name:?}")));
            }
        }
        Ok(Self { classes, index })
    }

    pub fn inverse_transform(&self, id: usize) -> Result<&str> {
        self.classes.get(id).map(String::as_str).ok_or(ModelError::UnknownClass(id))
    }

    pub fn transform(&self, name: &str) -> Option<usize> { self.index.get(name).copied() }

    pub fn classes(&self) -> &[String] { &self.classes }

    pub fn len(&self) -> usize { self.classes.len() }

    pub fn is_empty(&self) -> bool { self.classes.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_both_directions() {
        let le = LabelEncoder::new(vec!["Acne".into(), "Malaria".into()]).unwrap();
        assert_eq!(le.inverse_transform(1).unwrap(), "Malaria");
        assert_eq!(le.transform("Acne"), Some(0));
        assert_eq!(le.transform("Flu"), None);
        assert!(matches!(le.inverse_transform(2), Err(ModelError::UnknownClass(2))));
    }

    #[test]
    fn rejects_duplicate_labels() {
        assert!(LabelEncoder::new(vec!["Flu".into(), "Flu".into()]).is_err());
    }
}

use std::cmp::Ordering;
use std::collections::HashMap;

use arogami_schema::PredictionRow;

/// Disease -> specialist and disease -> description lookups joined onto results.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    pub specialists: HashMap<String, String>,
    pub descriptions: HashMap<String, String>,
}

impl ReferenceTables {
    pub fn specialist(&self, disease: &str) -> Option<&str> { self.specialists.get(disease).map(String::as_str) }
    pub fn description(&self, disease: &str) -> Option<&str> { self.descriptions.get(disease).map(String::as_str) }
}

/// Vote share per distinct label, highest first, ties alphabetical by disease.
pub fn compute<S: AsRef<str>>(labels: &[S], tables: &ReferenceTables) -> Vec<PredictionRow> {
    let total = labels.len().max(1) as f64;
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for l in labels { *counts.entry(l.as_ref()).or_insert(0) += 1; }
    let mut rows: Vec<PredictionRow> = counts.into_iter().map(|(disease, n)| PredictionRow {
        disease: disease.to_string(),
        chances: n as f64 / total * 100.0,
        specialist: tables.specialist(disease).map(str::to_string),
        description: tables.description(disease).map(str::to_string),
    }).collect();
    rows.sort_by(by_share_then_name);
    rows
}

fn by_share_then_name(a: &PredictionRow, b: &PredictionRow) -> Ordering {
    b.chances.total_cmp(&a.chances).then_with(|| a.disease.cmp(&b.disease))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand { Low, Moderate, High }

impl ConfidenceBand {
    pub fn of(confidence: f64) -> Self {
        if confidence < 0.5 { ConfidenceBand::Low } else if confidence < 0.7 { ConfidenceBand::Moderate } else { ConfidenceBand::High }
    }

    pub fn message(self) -> &'static str {
        match self {
            ConfidenceBand::Low => "Low confidence prediction. Please consult a healthcare professional.",
            ConfidenceBand::Moderate => "Moderate confidence. Consider consulting a doctor for proper diagnosis.",
            ConfidenceBand::High => "High confidence prediction. Please consult a healthcare professional for treatment.",
        }
    }
}

const GENERAL_ADVICE: [&str; 3] = [
    "Monitor your symptoms closely",
    "Stay hydrated and get adequate rest",
    "Seek immediate medical attention if symptoms worsen",
];

pub fn recommendations(confidence: f64) -> Vec<String> {
    std::iter::once(ConfidenceBand::of(confidence).message()).chain(GENERAL_ADVICE).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use arogami_schema::total_chances;
    use proptest::prelude::*;

    fn tables() -> ReferenceTables {
        ReferenceTables {
            specialists: HashMap::from([("Flu".to_string(), "General Physician".to_string())]),
            descriptions: HashMap::from([("Cold".to_string(), "Common viral infection".to_string())]),
        }
    }

    #[test]
    fn three_of_four_votes() {
        let rows = compute(&["Flu", "Flu", "Cold", "Flu"], &tables());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].disease, "Flu");
        assert_eq!(rows[0].chances, 75.0);
        assert_eq!(rows[0].specialist.as_deref(), Some("General Physician"));
        assert_eq!(rows[0].description, None);
        assert_eq!(rows[1].disease, "Cold");
        assert_eq!(rows[1].chances, 25.0);
        assert_eq!(rows[1].specialist, None);
        assert_eq!(rows[1].description.as_deref(), Some("Common viral infection"));
    }

    #[test]
    fn ties_sort_alphabetically() {
        let rows = compute(&["Malaria", "Dengue", "Typhoid", "Dengue", "Malaria", "Acne"], &ReferenceTables::default());
        let order: Vec<&str> = rows.iter().map(|r| r.disease.as_str()).collect();
        assert_eq!(order, vec!["Dengue", "Malaria", "Acne", "Typhoid"]);
    }

    #[test]
    fn no_votes_no_rows() {
        assert!(compute::<&str>(&[], &tables()).is_empty());
    }

    #[test]
    fn confidence_bands() {
        assert_eq!(ConfidenceBand::of(0.42), ConfidenceBand::Low);
        assert_eq!(ConfidenceBand::of(0.5), ConfidenceBand::Moderate);
        assert_eq!(ConfidenceBand::of(0.65), ConfidenceBand::Moderate);
        assert_eq!(ConfidenceBand::of(0.7), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::of(0.81), ConfidenceBand::High);
    }

    #[test]
    fn recommendations_lead_with_band() {
        let r = recommendations(0.42);
        assert_eq!(r.len(), 4);
        assert!(r[0].starts_with("Low confidence"));
        assert_eq!(r[3], "Seek immediate medical attention if symptoms worsen");
    }

    proptest! {
        #[test]
        fn prop_shares_sum_to_hundred(labels in proptest::collection::vec(prop_oneof![Just("Flu"), Just("Cold"), Just("Malaria"), Just("Acne")], 1..12)) {
            let rows = compute(&labels, &ReferenceTables::default());
            prop_assert!((total_chances(&rows) - 100.0).abs() < 1e-9);
            prop_assert!(rows.windows(2).all(|w| w[0].chances >= w[1].chances));
        }
    }
}

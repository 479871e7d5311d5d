use std::collections::HashMap;

/// Common phrasings mapped onto the names the models were trained with.
const BUILTIN_SYNONYMS: &[(&str, &str)] = &[
    ("fever", "high fever"),
    ("low fever", "mild fever"),
    ("temperature", "high fever"),
    ("cold", "cold hands and feets"),
    ("stomach ache", "stomach pain"),
    ("back ache", "back pain"),
    ("headaches", "headache"),
    ("vomit", "vomiting"),
    ("throwing up", "vomiting"),
    ("diarrhea", "diarrhoea"),
    ("loose motion", "diarrhoea"),
    ("tiredness", "fatigue"),
    ("tired", "fatigue"),
    ("weakness", "muscle weakness"),
    ("joint pain", "swelling joints"),
    ("eye pain", "pain behind the eyes"),
    ("hip pain", "hip joint pain"),
    ("breathlessness", "continuous sneezing"),
    ("sneezing", "continuous sneezing"),
    ("runny nose", "congestion"),
    ("stuffy nose", "congestion"),
    ("dizzy", "dizziness"),
    ("light headed", "dizziness"),
    ("belly pain", "abdominal pain"),
    ("tummy pain", "abdominal pain"),
    ("stomach pain", "stomach pain"),
];

/// Ordered symptom names the classifiers take as input columns.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    names: Vec<String>,
    lowered: Vec<String>,
    index: HashMap<String, usize>,
    by_lower: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn new(names: Vec<String>) -> Self {
        let lowered: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
        let index = names.iter().enumerate().map(|(i, n)| (n.clone(), i)).collect();
        let mut by_lower = HashMap::with_capacity(names.len());
        for (i, l) in lowered.iter().enumerate() { by_lower.entry(l.clone()).or_insert(i); }
        Self { names, lowered, index, by_lower }
    }

    pub fn names(&self) -> &[String] { &self.names }
    pub fn len(&self) -> usize { self.names.len() }
    pub fn is_empty(&self) -> bool { self.names.is_empty() }
    pub fn position(&self, name: &str) -> Option<usize> { self.index.get(name).copied() }
    pub fn contains(&self, name: &str) -> bool { self.index.contains_key(name) }

    fn exact_ci(&self, lowered: &str) -> Option<&str> { self.by_lower.get(lowered).map(|i| self.names[*i].as_str()) }

    fn first_overlap(&self, lowered: &str) -> Option<&str> {
        self.lowered.iter().position(|v| v.contains(lowered) || lowered.contains(v.as_str())).map(|i| self.names[i].as_str())
    }
}

/// Lowercase phrase -> canonical symptom name. Targets are not checked against the vocabulary.
#[derive(Debug, Clone)]
pub struct SynonymTable { map: HashMap<String, String> }

impl SynonymTable {
    pub fn builtin() -> Self {
        Self { map: BUILTIN_SYNONYMS.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect() }
    }

    /// Built-in table with `extra` entries layered on top; keys are trimmed and lowercased.
    pub fn with_overrides(extra: HashMap<String, String>) -> Self {
        let mut t = Self::builtin();
        for (k, v) in extra { t.map.insert(k.trim().to_lowercase(), v); }
        t
    }

    pub fn get(&self, lowered: &str) -> Option<&str> { self.map.get(lowered).map(String::as_str) }
    pub fn len(&self) -> usize { self.map.len() }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// At least one input resolved. `unmatched` holds the inputs that did not.
    Recognized { symptoms: Vec<String>, unmatched: Vec<String> },
    NoneRecognized,
}

/// Maps free-form symptom strings onto vocabulary names.
///
/// Per input, first hit wins: case-insensitive exact match, synonym table,
/// then the first vocabulary entry (in vocabulary order) that contains the
/// input or is contained in it. Blank and unresolvable inputs are dropped.
pub fn normalize<S: AsRef<str>>(vocab: &Vocabulary, synonyms: &SynonymTable, inputs: &[S]) -> Normalized {
    let mut symptoms = Vec::with_capacity(inputs.len());
    let mut unmatched = vec![];
    for raw in inputs {
        let lowered = raw.as_ref().trim().to_lowercase();
        let hit = if lowered.is_empty() {
            None
        } else {
            vocab.exact_ci(&lowered).or_else(|| synonyms.get(&lowered)).or_else(|| vocab.first_overlap(&lowered))
        };
        match hit {
            Some(name) => symptoms.push(name.to_string()),
            None => unmatched.push(raw.as_ref().to_string()),
        }
    }
    if symptoms.is_empty() { Normalized::NoneRecognized } else { Normalized::Recognized { symptoms, unmatched } }
}

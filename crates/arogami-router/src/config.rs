use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_ENSEMBLE: [&str; 6] = ["Logistic Regression", "Decision Tree", "Random Forest", "SVM", "NaiveBayes", "K-Nearest Neighbors"];
pub const DEFAULT_DUAL: [&str; 2] = ["Random Forest", "Decision Tree"];

#[derive(Debug, Clone)]
pub struct Config {
    pub artifact_dir: PathBuf,
    pub addr: SocketAddr,
    pub ensemble: Vec<String>,
    /// Models reported individually by `/predict/dual`; the first drives the recommendations.
    pub dual: Vec<String>,
}

fn name_list(raw: Option<String>, default: &[&str]) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str::<Vec<String>>(&s).ok())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.iter().map(|s| s.to_string()).collect())
}

impl Config {
    pub fn from_env() -> Result<Self> { Self::from_lookup(|k| std::env::var(k).ok()) }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let artifact_dir = get("AROGAMI_ARTIFACT_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("artifacts"));
        let host: IpAddr = match get("AROGAMI_BIND") {
            Some(h) => h.parse().with_context(|| format!("AROGAMI_BIND={h:?} is not an IP address"))?,
            None => IpAddr::from([0, 0, 0, 0]),
        };
        let port: u16 = match get("PORT") {
            Some(p) => p.parse().with_context(|| format!("PORT={p:?} is not a port number"))?,
            None => 8000,
        };
        Ok(Self {
            artifact_dir,
            addr: SocketAddr::new(host, port),
            ensemble: name_list(get("AROGAMI_ENSEMBLE"), &DEFAULT_ENSEMBLE),
            dual: name_list(get("AROGAMI_DUAL_MODELS"), &DEFAULT_DUAL),
        })
    }

    /// Every model name either route needs, each once, ensemble order first.
    pub fn all_models(&self) -> Vec<String> {
        let mut out = self.ensemble.clone();
        for d in &self.dual { if !out.contains(d) { out.push(d.clone()); } }
        out
    }
}

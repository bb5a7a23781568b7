//! Run results, per-generation metrics and the provenance manifest.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Candidate, EngineConfig};

/// Per-generation statistics snapshot. Appended to the run history once
/// per engine iteration and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metrics {
    /// Generation index (0-based).
    pub generation: usize,
    /// Best score in this generation.
    pub best: f64,
    /// Mean score in this generation.
    pub mean: f64,
    /// Number of candidates evaluated this generation.
    pub population_size: usize,
}

/// Outcome of an engine run.
#[derive(Debug, Clone)]
pub struct Results {
    /// Per-generation metrics in generation order.
    pub history: Vec<Metrics>,
    /// Best candidate observed across the whole run.
    pub best: Option<(Candidate, f64)>,
    /// All evaluated candidates ranked by score, descending.
    pub ranking: Vec<(Candidate, f64)>,
    /// Flat score sequence, descending (aligned with `ranking`).
    pub scores: Vec<f64>,
    /// Aggregate run statistics.
    pub summary: BTreeMap<String, f64>,
}

impl Results {
    /// Ranked `(candidate id, score)` pairs, descending by score.
    pub fn ranked(&self) -> Vec<(u64, f64)> {
        self.ranking.iter().map(|(c, s)| (c.id, *s)).collect()
    }

    /// Top `n` candidates by score.
    pub fn top(&self, n: usize) -> &[(Candidate, f64)] {
        &self.ranking[..n.min(self.ranking.len())]
    }

    /// Build a reproducibility manifest for this run.
    pub fn to_manifest(&self, config: &EngineConfig) -> Manifest {
        Manifest {
            method: config.method.to_string(),
            seed: config.seed,
            config: config.clone(),
            best_score: self.best.as_ref().map(|(_, s)| *s),
            history: self.history.clone(),
        }
    }
}

/// Reproducibility record: enough to rerun or audit an experiment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Strategy name.
    pub method: String,
    /// Seed the run was started with, if any.
    pub seed: Option<u64>,
    /// Full engine configuration.
    pub config: EngineConfig,
    /// Best score observed.
    pub best_score: Option<f64>,
    /// Per-generation metrics.
    pub history: Vec<Metrics>,
}

impl Manifest {
    /// Write the manifest as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Method, SequenceSpace};

    fn sample_results() -> Results {
        let a = Candidate::new(0, "ACAC".to_string());
        let b = Candidate::new(1, "CCCC".to_string());
        Results {
            history: vec![Metrics {
                generation: 0,
                best: 0.9,
                mean: 0.7,
                population_size: 2,
            }],
            best: Some((a.clone(), 0.9)),
            ranking: vec![(a, 0.9), (b, 0.5)],
            scores: vec![0.9, 0.5],
            summary: BTreeMap::new(),
        }
    }

    #[test]
    fn test_ranked_pairs_descending() {
        let results = sample_results();
        let ranked = results.ranked();
        assert_eq!(ranked, vec![(0, 0.9), (1, 0.5)]);
        assert_eq!(results.top(1).len(), 1);
        assert_eq!(results.top(10).len(), 2);
    }

    #[test]
    fn test_manifest_save_roundtrip() {
        let config = EngineConfig {
            method: Method::CmaesVarlen,
            iterations: 3,
            population_size: 8,
            seed: Some(42),
            space: SequenceSpace::new("AC", 5, 15).unwrap(),
            ..Default::default()
        };
        let manifest = sample_results().to_manifest(&config);
        assert_eq!(manifest.method, "cmaes-varlen");
        assert_eq!(manifest.seed, Some(42));
        assert_eq!(manifest.history.len(), 1);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        manifest.save(&path).unwrap();

        let loaded: Manifest =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.method, manifest.method);
        assert_eq!(loaded.best_score, Some(0.9));
    }
}

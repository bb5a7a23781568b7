//! Candidate sequences and the scoring context passed to reward blocks.

use serde::{Deserialize, Serialize};

/// A proposed sequence under search.
///
/// Candidates are immutable once created. Identity is carried by `id`:
/// two candidates with identical tokens but different ids are distinct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Stable identifier assigned by the strategy that produced this candidate.
    pub id: u64,
    /// Ordered symbols over the search alphabet.
    pub tokens: String,
}

impl Candidate {
    /// Create a new candidate.
    pub fn new(id: u64, tokens: String) -> Self {
        Self { id, tokens }
    }

    /// Number of symbols in the sequence.
    pub fn len(&self) -> usize {
        self.tokens.chars().count()
    }

    /// True if the sequence has no symbols.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Candidate {}

impl std::hash::Hash for Candidate {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Read-only context handed to each scoring component during evaluation.
///
/// A fresh context is created for every evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringContext {
    /// Engine iteration (generation) this evaluation belongs to.
    pub iteration: usize,
    /// Free-form metadata for scoring components.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ScoringContext {
    /// Create a context for the given iteration.
    pub fn new(iteration: usize) -> Self {
        Self {
            iteration,
            metadata: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_identity_by_id() {
        let a = Candidate::new(1, "ACGT".to_string());
        let b = Candidate::new(2, "ACGT".to_string());
        let c = Candidate::new(1, "TTTT".to_string());

        assert_ne!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_candidate_len() {
        let c = Candidate::new(0, "ACDEF".to_string());
        assert_eq!(c.len(), 5);
        assert!(!c.is_empty());
    }
}

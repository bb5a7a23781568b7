//! Built-in reward blocks.
//!
//! Each block implements the [`Reward`] contract and is constructed
//! through an explicit factory function; pipelines are plain vectors:
//!
//! ```rust
//! use seqopt::rewards;
//!
//! let blocks = vec![
//!     rewards::stability(1.0),
//!     rewards::solubility(0.5),
//!     rewards::novelty(vec!["MKTAYIAK".to_string()], 0.3),
//! ];
//! assert_eq!(blocks.len(), 3);
//! ```
//!
//! The stability and solubility blocks are deterministic residue-class
//! heuristics; swapping in model-backed scorers is a matter of
//! implementing [`Reward`] and passing the block in the same list.

use crate::engine::{EvaluationError, Reward};
use crate::schema::{Candidate, ScoringContext};

/// Residues counted as hydrophobic by the stability heuristic.
const HYDROPHOBIC: &str = "AILMFVWY";
/// Residues counted as polar or charged by the solubility heuristic.
const POLAR: &str = "DEKRNQSTH";

struct Stability {
    weight: f64,
}

impl Reward for Stability {
    fn name(&self) -> &str {
        "stability"
    }
    fn weight(&self) -> f64 {
        self.weight
    }
    fn score(&self, candidate: &Candidate, _: &ScoringContext) -> Result<f64, EvaluationError> {
        Ok(class_fraction(&candidate.tokens, HYDROPHOBIC))
    }
}

struct Solubility {
    weight: f64,
}

impl Reward for Solubility {
    fn name(&self) -> &str {
        "solubility"
    }
    fn weight(&self) -> f64 {
        self.weight
    }
    fn score(&self, candidate: &Candidate, _: &ScoringContext) -> Result<f64, EvaluationError> {
        Ok(class_fraction(&candidate.tokens, POLAR))
    }
}

struct Novelty {
    weight: f64,
    baseline: Vec<String>,
}

impl Reward for Novelty {
    fn name(&self) -> &str {
        "novelty"
    }
    fn weight(&self) -> f64 {
        self.weight
    }
    fn score(&self, candidate: &Candidate, _: &ScoringContext) -> Result<f64, EvaluationError> {
        if self.baseline.is_empty() {
            return Ok(1.0);
        }
        let nearest = self
            .baseline
            .iter()
            .map(|b| normalized_hamming(&candidate.tokens, b))
            .fold(f64::INFINITY, f64::min);
        Ok(nearest)
    }
}

struct GcContent {
    weight: f64,
    target: f64,
    tolerance: f64,
}

impl Reward for GcContent {
    fn name(&self) -> &str {
        "gc_content"
    }
    fn weight(&self) -> f64 {
        self.weight
    }
    fn score(&self, candidate: &Candidate, _: &ScoringContext) -> Result<f64, EvaluationError> {
        let gc = class_fraction(&candidate.tokens, "GC");
        let deviation = (gc - self.target).abs();
        if deviation <= self.tolerance {
            Ok(1.0)
        } else {
            Ok((1.0 - (deviation - self.tolerance)).clamp(0.0, 1.0))
        }
    }
}

struct Custom<F> {
    name: String,
    weight: f64,
    f: F,
}

impl<F> Reward for Custom<F>
where
    F: Fn(&Candidate, &ScoringContext) -> f64 + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }
    fn weight(&self) -> f64 {
        self.weight
    }
    fn score(
        &self,
        candidate: &Candidate,
        context: &ScoringContext,
    ) -> Result<f64, EvaluationError> {
        Ok((self.f)(candidate, context))
    }
}

/// Structural stability heuristic: hydrophobic residue fraction.
pub fn stability(weight: f64) -> Box<dyn Reward> {
    Box::new(Stability { weight })
}

/// Solubility heuristic: polar/charged residue fraction.
pub fn solubility(weight: f64) -> Box<dyn Reward> {
    Box::new(Solubility { weight })
}

/// Distance from baseline sequences (normalized Hamming, nearest
/// baseline).
pub fn novelty(baseline: Vec<String>, weight: f64) -> Box<dyn Reward> {
    Box::new(Novelty { weight, baseline })
}

/// Closeness of G/C content to a target fraction within a tolerance band.
pub fn gc_content(target: f64, tolerance: f64, weight: f64) -> Box<dyn Reward> {
    Box::new(GcContent {
        weight,
        target,
        tolerance,
    })
}

/// User-supplied scoring function.
pub fn custom<F>(name: &str, weight: f64, f: F) -> Box<dyn Reward>
where
    F: Fn(&Candidate, &ScoringContext) -> f64 + Send + Sync + 'static,
{
    Box::new(Custom {
        name: name.to_string(),
        weight,
        f,
    })
}

/// Fraction of symbols belonging to the given class. Empty sequences
/// score 0.
fn class_fraction(tokens: &str, class: &str) -> f64 {
    let len = tokens.chars().count();
    if len == 0 {
        return 0.0;
    }
    let hits = tokens.chars().filter(|c| class.contains(*c)).count();
    hits as f64 / len as f64
}

/// Hamming distance over the common prefix plus the length difference,
/// normalized by the longer length. 0.0 for identical sequences, 1.0 for
/// fully dissimilar ones.
fn normalized_hamming(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let longest = len_a.max(len_b);
    if longest == 0 {
        return 0.0;
    }
    let mismatches = a
        .chars()
        .zip(b.chars())
        .filter(|(x, y)| x != y)
        .count()
        + len_a.abs_diff(len_b);
    mismatches as f64 / longest as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(block: &dyn Reward, tokens: &str) -> f64 {
        let candidate = Candidate::new(0, tokens.to_string());
        block.score(&candidate, &ScoringContext::new(0)).unwrap()
    }

    #[test]
    fn test_stability_counts_hydrophobics() {
        let block = stability(1.0);
        assert!((score(block.as_ref(), "AAAA") - 1.0).abs() < 1e-12);
        assert!((score(block.as_ref(), "DDDD")).abs() < 1e-12);
        assert!((score(block.as_ref(), "AADD") - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_novelty_distance() {
        let block = novelty(vec!["AAAA".to_string(), "CCCC".to_string()], 1.0);
        // Identical to a baseline: zero novelty.
        assert!(score(block.as_ref(), "AAAA").abs() < 1e-12);
        // One substitution against the nearest baseline.
        assert!((score(block.as_ref(), "AAAC") - 0.25).abs() < 1e-12);
        // Length difference counts as mismatches.
        assert!((score(block.as_ref(), "AAAAAA") - 2.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_gc_content_band() {
        let block = gc_content(0.5, 0.1, 1.0);
        assert!((score(block.as_ref(), "GCAT") - 1.0).abs() < 1e-12);
        assert!((score(block.as_ref(), "GCGC") - 1.0 + 0.4).abs() < 1e-12);
        assert!(score(block.as_ref(), "GCGC") < 1.0);
    }

    #[test]
    fn test_custom_block() {
        let block = custom("starts_mk", 0.2, |c, _| {
            if c.tokens.starts_with("MK") { 1.0 } else { 0.5 }
        });
        assert_eq!(block.name(), "starts_mk");
        assert!((block.weight() - 0.2).abs() < 1e-12);
        assert!((score(block.as_ref(), "MKTA") - 1.0).abs() < 1e-12);
        assert!((score(block.as_ref(), "ATKM") - 0.5).abs() < 1e-12);
    }
}

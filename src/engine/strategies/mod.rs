//! Ask-tell search strategies.
//!
//! A strategy proposes candidates (`ask`), is told their scores (`tell`),
//! and adapts its internal sampling distribution between generations.
//! Available strategies:
//!
//! - `RandomStrategy`: uniform sampling, no adaptation
//! - `CemStrategy`: cross-entropy method over per-position symbol
//!   distributions
//! - `GaStrategy`: genetic algorithm with rank-based selection
//! - `CmaesStrategy`: separable CMA-ES over fixed-length sequences
//! - `CmaesVarlenStrategy`: separable CMA-ES over variable-length
//!   sequences via a length-coordinate genotype encoding

mod cem;
mod cmaes;
mod cmaes_varlen;
mod ga;
mod random;

pub use cem::CemStrategy;
pub use cmaes::CmaesStrategy;
pub use cmaes_varlen::{CmaesVarlenStrategy, decode_genotype};
pub use ga::GaStrategy;
pub use random::RandomStrategy;

use std::collections::HashSet;

use rand::prelude::*;

use super::StrategyError;
use crate::schema::{Candidate, ConfigError, EngineConfig, Method, SequenceSpace};

/// One scored candidate reported back to a strategy via `tell`.
#[derive(Debug, Clone)]
pub struct Evaluated {
    /// The candidate, as returned by the preceding `ask`.
    pub candidate: Candidate,
    /// Aggregate score.
    pub score: f64,
    /// Optional per-candidate metadata from the evaluation.
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Evaluated {
    /// Create a scored item without metadata.
    pub fn new(candidate: Candidate, score: f64) -> Self {
        Self {
            candidate,
            score,
            metadata: None,
        }
    }
}

/// Stateful ask-tell search policy.
///
/// `tell` expects candidates from the immediately preceding `ask` (a
/// subset is fine). A violating call is rejected with a `StrategyError`
/// and leaves the strategy state unchanged.
pub trait Strategy {
    /// Propose `n` candidates within the strategy's sequence space.
    fn ask(&mut self, n: usize) -> Result<Vec<Candidate>, StrategyError>;

    /// Report scores for previously asked candidates and update the
    /// sampling distribution.
    fn tell(&mut self, items: Vec<Evaluated>) -> Result<(), StrategyError>;

    /// Best candidate and score observed so far. `None` before any `tell`.
    /// The reported score never decreases; ties go to the most recent.
    fn best(&self) -> Option<(&Candidate, f64)>;

    /// Serializable snapshot of the strategy state. Never panics, even
    /// for a freshly constructed strategy.
    fn state(&self) -> serde_json::Value;
}

/// Build the strategy selected by the configuration.
pub fn strategy_from_config(config: &EngineConfig) -> Result<Box<dyn Strategy>, ConfigError> {
    config.validate()?;
    let seed = config.seed.unwrap_or_else(rand::random);
    let strategy: Box<dyn Strategy> = match config.method {
        Method::Random => Box::new(RandomStrategy::new(config.space.clone(), seed)?),
        Method::Cem => Box::new(CemStrategy::new(
            config.space.clone(),
            config.cem.clone(),
            seed,
        )?),
        Method::Ga => Box::new(GaStrategy::new(
            config.space.clone(),
            config.ga.clone(),
            seed,
        )?),
        Method::Cmaes => Box::new(CmaesStrategy::new(
            config.space.clone(),
            config.cmaes.sigma0,
            seed,
        )?),
        Method::CmaesVarlen => Box::new(CmaesVarlenStrategy::new(
            config.space.clone(),
            config.cmaes.sigma0,
            seed,
        )?),
    };
    Ok(strategy)
}

/// Tracks the best candidate across `tell` calls. Monotonic: the reported
/// score never decreases; ties are broken by the most recent observation.
#[derive(Debug, Default)]
pub(crate) struct BestTracker {
    best: Option<(Candidate, f64)>,
}

impl BestTracker {
    pub(crate) fn observe(&mut self, candidate: &Candidate, score: f64) {
        let improved = match &self.best {
            Some((_, current)) => score >= *current,
            None => true,
        };
        if improved {
            self.best = Some((candidate.clone(), score));
        }
    }

    pub(crate) fn get(&self) -> Option<(&Candidate, f64)> {
        self.best.as_ref().map(|(c, s)| (c, *s))
    }

    pub(crate) fn score(&self) -> Option<f64> {
        self.best.as_ref().map(|(_, s)| *s)
    }
}

/// Validate a `tell` batch against the ids handed out by the last `ask`
/// and the sequence space the candidates were drawn from. Called before
/// any state mutation so rejected calls have no effect.
pub(crate) fn check_told(
    space: &SequenceSpace,
    last_ask: &HashSet<u64>,
    items: &[Evaluated],
) -> Result<(), StrategyError> {
    if items.is_empty() {
        return Err(StrategyError::EmptyTell);
    }
    for item in items {
        if !last_ask.contains(&item.candidate.id) {
            return Err(StrategyError::UnknownCandidate {
                id: item.candidate.id,
            });
        }
        let len = item.candidate.len();
        let in_space = len >= space.min_len
            && len <= space.max_len
            && item
                .candidate
                .tokens
                .chars()
                .all(|c| space.alphabet.contains(&c));
        if !in_space {
            return Err(StrategyError::ShapeViolation {
                id: item.candidate.id,
            });
        }
    }
    Ok(())
}

/// Sort scored items descending by score.
pub(crate) fn rank_descending(items: &mut [Evaluated]) {
    items.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Draw a uniform random sequence from the space.
pub(crate) fn random_tokens(space: &SequenceSpace, rng: &mut StdRng) -> String {
    let len = rng.gen_range(space.min_len..=space.max_len);
    (0..len)
        .map(|_| space.alphabet[rng.gen_range(0..space.alphabet.len())])
        .collect()
}

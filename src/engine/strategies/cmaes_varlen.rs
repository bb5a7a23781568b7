//! CMA-ES over variable-length sequences.
//!
//! CMA-ES searches a fixed-dimension continuous space, so variable length
//! is encoded in the genotype itself: coordinate 0 controls the decoded
//! length and the remaining `max_len` coordinates each control one
//! potential symbol position. Coordinates beyond the realized length are
//! sampled and adapted but discarded at decode time.

use std::collections::{HashMap, HashSet};

use rand::prelude::*;
use serde_json::json;

use super::cmaes::{CmaesCore, bucket_symbol};
use super::{BestTracker, Evaluated, Strategy, check_told, rank_descending};
use crate::engine::StrategyError;
use crate::schema::{Candidate, ConfigError, SequenceSpace};

/// Decode a genotype of dimension `1 + max_len` into tokens.
///
/// Pure and deterministic: identical input vectors always yield identical
/// tokens. Coordinate 0 is clamped to `[-1, 1]` and mapped linearly onto
/// `[min_len, max_len]` (rounded to the nearest length); coordinates
/// `1..=length` are bucketed into the alphabet.
pub fn decode_genotype(space: &SequenceSpace, x: &[f64]) -> String {
    let span = (space.max_len - space.min_len) as f64;
    let unit = (x[0].clamp(-1.0, 1.0) + 1.0) / 2.0;
    let len = (space.min_len + (unit * span).round() as usize).min(space.max_len);
    x[1..=len]
        .iter()
        .map(|&v| bucket_symbol(space, v))
        .collect()
}

/// Variable-length CMA-ES strategy (separable covariance).
#[derive(Debug)]
pub struct CmaesVarlenStrategy {
    space: SequenceSpace,
    sigma0: f64,
    core: CmaesCore,
    rng: StdRng,
    /// Genotypes of the last asked batch, keyed by candidate id.
    genotypes: HashMap<u64, Vec<f64>>,
    next_id: u64,
    last_ask: HashSet<u64>,
    best: BestTracker,
}

impl CmaesVarlenStrategy {
    /// Create a variable-length CMA-ES strategy.
    ///
    /// Fails if the alphabet is empty, the length bounds are invalid
    /// (`1 <= min_len <= max_len` required) or `sigma0` is not positive.
    pub fn new(space: SequenceSpace, sigma0: f64, seed: u64) -> Result<Self, ConfigError> {
        space.validate()?;
        if !(sigma0 > 0.0) {
            return Err(ConfigError::InvalidSigma(sigma0));
        }
        let dim = 1 + space.max_len;
        Ok(Self {
            space,
            sigma0,
            core: CmaesCore::new(dim, sigma0),
            rng: StdRng::seed_from_u64(seed),
            genotypes: HashMap::new(),
            next_id: 0,
            last_ask: HashSet::new(),
            best: BestTracker::default(),
        })
    }

    /// The sequence space this strategy samples from.
    pub fn space(&self) -> &SequenceSpace {
        &self.space
    }
}

impl Strategy for CmaesVarlenStrategy {
    fn ask(&mut self, n: usize) -> Result<Vec<Candidate>, StrategyError> {
        if n == 0 {
            return Err(StrategyError::EmptyAsk);
        }
        self.genotypes.clear();
        let mut candidates = Vec::with_capacity(n);
        for _ in 0..n {
            let genotype = self.core.sample(&mut self.rng);
            let id = self.next_id;
            self.next_id += 1;
            candidates.push(Candidate::new(id, decode_genotype(&self.space, &genotype)));
            self.genotypes.insert(id, genotype);
        }
        self.last_ask = candidates.iter().map(|c| c.id).collect();
        Ok(candidates)
    }

    fn tell(&mut self, mut items: Vec<Evaluated>) -> Result<(), StrategyError> {
        check_told(&self.space, &self.last_ask, &items)?;
        rank_descending(&mut items);
        for item in &items {
            self.best.observe(&item.candidate, item.score);
        }
        let ranked: Vec<&Vec<f64>> = items
            .iter()
            .map(|item| &self.genotypes[&item.candidate.id])
            .collect();
        self.core.update(&ranked);
        Ok(())
    }

    fn best(&self) -> Option<(&Candidate, f64)> {
        self.best.get()
    }

    fn state(&self) -> serde_json::Value {
        json!({
            "kind": "cmaes-varlen",
            "generation": self.core.generation,
            "best_score": self.best.score(),
            "sigma": self.core.sigma(),
            "sigma0": self.sigma0,
            "mean": self.core.mean(),
            "cov": self.core.cov(),
            "min_len": self.space.min_len,
            "max_len": self.space.max_len,
            "dimension": 1 + self.space.max_len,
        })
    }
}

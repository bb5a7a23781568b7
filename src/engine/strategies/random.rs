//! Uniform random sampling strategy.

use std::collections::HashSet;

use rand::prelude::*;
use serde_json::json;

use super::{BestTracker, Evaluated, Strategy, check_told, random_tokens};
use crate::engine::StrategyError;
use crate::schema::{Candidate, ConfigError, SequenceSpace};

/// Draws candidates uniformly over the alphabet and length domain on every
/// `ask`. Scores are ignored for sampling but tracked for `best()`.
pub struct RandomStrategy {
    space: SequenceSpace,
    rng: StdRng,
    next_id: u64,
    last_ask: HashSet<u64>,
    best: BestTracker,
    generation: usize,
}

impl RandomStrategy {
    /// Create a random strategy over the given space.
    pub fn new(space: SequenceSpace, seed: u64) -> Result<Self, ConfigError> {
        space.validate()?;
        Ok(Self {
            space,
            rng: StdRng::seed_from_u64(seed),
            next_id: 0,
            last_ask: HashSet::new(),
            best: BestTracker::default(),
            generation: 0,
        })
    }
}

impl Strategy for RandomStrategy {
    fn ask(&mut self, n: usize) -> Result<Vec<Candidate>, StrategyError> {
        if n == 0 {
            return Err(StrategyError::EmptyAsk);
        }
        let candidates: Vec<Candidate> = (0..n)
            .map(|_| {
                let id = self.next_id;
                self.next_id += 1;
                Candidate::new(id, random_tokens(&self.space, &mut self.rng))
            })
            .collect();
        self.last_ask = candidates.iter().map(|c| c.id).collect();
        Ok(candidates)
    }

    fn tell(&mut self, items: Vec<Evaluated>) -> Result<(), StrategyError> {
        check_told(&self.space, &self.last_ask, &items)?;
        for item in &items {
            self.best.observe(&item.candidate, item.score);
        }
        self.generation += 1;
        Ok(())
    }

    fn best(&self) -> Option<(&Candidate, f64)> {
        self.best.get()
    }

    fn state(&self) -> serde_json::Value {
        json!({
            "kind": "random",
            "generation": self.generation,
            "best_score": self.best.score(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> RandomStrategy {
        RandomStrategy::new(SequenceSpace::new("ACGT", 4, 10).unwrap(), 42).unwrap()
    }

    #[test]
    fn test_ask_respects_space() {
        let mut s = strategy();
        let candidates = s.ask(32).unwrap();
        assert_eq!(candidates.len(), 32);
        for c in &candidates {
            assert!(c.len() >= 4 && c.len() <= 10);
            assert!(c.tokens.chars().all(|ch| "ACGT".contains(ch)));
        }
    }

    #[test]
    fn test_best_tracked_across_tells() {
        let mut s = strategy();
        assert!(s.best().is_none());

        let candidates = s.ask(4).unwrap();
        let items: Vec<Evaluated> = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| Evaluated::new(c.clone(), i as f64 * 0.1))
            .collect();
        s.tell(items).unwrap();
        assert!((s.best().unwrap().1 - 0.3).abs() < 1e-12);

        // A worse generation must not lower the best.
        let candidates = s.ask(2).unwrap();
        let items: Vec<Evaluated> = candidates
            .iter()
            .map(|c| Evaluated::new(c.clone(), 0.05))
            .collect();
        s.tell(items).unwrap();
        assert!((s.best().unwrap().1 - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_tell_rejects_stale_candidates() {
        let mut s = strategy();
        let old = s.ask(2).unwrap();
        let _ = s.ask(2).unwrap();
        let items = vec![Evaluated::new(old[0].clone(), 1.0)];
        assert!(s.tell(items).is_err());
        assert!(s.best().is_none());
    }

    #[test]
    fn test_state_before_any_tell() {
        let s = strategy();
        let state = s.state();
        assert!(state["best_score"].is_null());
        assert_eq!(state["generation"], 0);
    }
}

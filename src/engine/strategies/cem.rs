//! Cross-entropy method over per-position symbol distributions.

use std::collections::{HashMap, HashSet};

use rand::prelude::*;
use serde_json::json;

use super::{BestTracker, Evaluated, Strategy, check_told};
use crate::engine::StrategyError;
use crate::schema::{Candidate, CemParams, ConfigError, SequenceSpace};

/// Maintains one categorical distribution per sequence position (plus one
/// over lengths), samples candidates from them, and re-estimates the
/// distributions from the top-scoring fraction of the working pool.
///
/// Told candidates accumulate in the pool across generations instead of
/// replacing it; the pool is bounded by a rolling recency cap
/// (`CemParams::pool_cap`) so memory stays bounded.
pub struct CemStrategy {
    space: SequenceSpace,
    params: CemParams,
    rng: StdRng,
    symbol_index: HashMap<char, usize>,
    /// Per-position symbol probabilities, `max_len` rows.
    position_probs: Vec<Vec<f64>>,
    /// Probability of each length in `[min_len, max_len]`.
    length_probs: Vec<f64>,
    pool: Vec<(String, f64)>,
    next_id: u64,
    last_ask: HashSet<u64>,
    best: BestTracker,
    generation: usize,
}

impl CemStrategy {
    /// Create a CEM strategy with uniform initial distributions.
    pub fn new(space: SequenceSpace, params: CemParams, seed: u64) -> Result<Self, ConfigError> {
        space.validate()?;
        let k = space.symbol_count();
        let symbol_index = space
            .alphabet
            .iter()
            .enumerate()
            .map(|(i, c)| (*c, i))
            .collect();
        let position_probs = vec![vec![1.0 / k as f64; k]; space.max_len];
        let length_probs = vec![1.0 / space.length_span() as f64; space.length_span()];
        Ok(Self {
            space,
            params,
            rng: StdRng::seed_from_u64(seed),
            symbol_index,
            position_probs,
            length_probs,
            pool: Vec::new(),
            next_id: 0,
            last_ask: HashSet::new(),
            best: BestTracker::default(),
            generation: 0,
        })
    }

    fn sample_index(rng: &mut StdRng, probs: &[f64]) -> usize {
        let r: f64 = rng.gen_range(0.0..1.0);
        let mut cumulative = 0.0;
        for (i, p) in probs.iter().enumerate() {
            cumulative += p;
            if r < cumulative {
                return i;
            }
        }
        probs.len() - 1
    }

    fn sample_tokens(&mut self) -> String {
        let len_idx = Self::sample_index(&mut self.rng, &self.length_probs);
        let len = self.space.min_len + len_idx;
        (0..len)
            .map(|pos| {
                let idx = Self::sample_index(&mut self.rng, &self.position_probs[pos]);
                self.space.alphabet[idx]
            })
            .collect()
    }

    /// Re-estimate both distributions from the elite fraction of the pool.
    fn refit(&mut self) {
        let mut ranked: Vec<&(String, f64)> = self.pool.iter().collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let elite_n = ((self.pool.len() as f64 * self.params.elite_fraction).ceil() as usize)
            .clamp(1, self.pool.len());
        let elite = &ranked[..elite_n];

        let k = self.space.symbol_count();
        // Laplace-smoothed frequency counts.
        let mut symbol_counts = vec![vec![1.0; k]; self.space.max_len];
        let mut length_counts = vec![1.0; self.space.length_span()];
        for (tokens, _) in elite {
            let len = tokens.chars().count();
            length_counts[len - self.space.min_len] += 1.0;
            for (pos, symbol) in tokens.chars().enumerate() {
                symbol_counts[pos][self.symbol_index[&symbol]] += 1.0;
            }
        }

        let s = self.params.smoothing;
        for (pos, counts) in symbol_counts.iter().enumerate() {
            let total: f64 = counts.iter().sum();
            for (i, count) in counts.iter().enumerate() {
                let fresh = count / total;
                self.position_probs[pos][i] = s * self.position_probs[pos][i] + (1.0 - s) * fresh;
            }
        }
        let total: f64 = length_counts.iter().sum();
        for (i, count) in length_counts.iter().enumerate() {
            let fresh = count / total;
            self.length_probs[i] = s * self.length_probs[i] + (1.0 - s) * fresh;
        }
    }
}

impl Strategy for CemStrategy {
    fn ask(&mut self, n: usize) -> Result<Vec<Candidate>, StrategyError> {
        if n == 0 {
            return Err(StrategyError::EmptyAsk);
        }
        let candidates: Vec<Candidate> = (0..n)
            .map(|_| {
                let id = self.next_id;
                self.next_id += 1;
                let tokens = self.sample_tokens();
                Candidate::new(id, tokens)
            })
            .collect();
        self.last_ask = candidates.iter().map(|c| c.id).collect();
        Ok(candidates)
    }

    fn tell(&mut self, items: Vec<Evaluated>) -> Result<(), StrategyError> {
        check_told(&self.space, &self.last_ask, &items)?;
        for item in &items {
            self.best.observe(&item.candidate, item.score);
            self.pool
                .push((item.candidate.tokens.clone(), item.score));
        }
        // Rolling recency window on the accumulating pool.
        if self.pool.len() > self.params.pool_cap {
            let excess = self.pool.len() - self.params.pool_cap;
            self.pool.drain(..excess);
        }
        self.refit();
        self.generation += 1;
        Ok(())
    }

    fn best(&self) -> Option<(&Candidate, f64)> {
        self.best.get()
    }

    fn state(&self) -> serde_json::Value {
        json!({
            "kind": "cem",
            "generation": self.generation,
            "best_score": self.best.score(),
            "pool_size": self.pool.len(),
            "elite_fraction": self.params.elite_fraction,
            "smoothing": self.params.smoothing,
            "position_probs": &self.position_probs,
            "length_probs": &self.length_probs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> CemStrategy {
        CemStrategy::new(
            SequenceSpace::new("ACGT", 4, 8).unwrap(),
            CemParams::default(),
            42,
        )
        .unwrap()
    }

    fn tell_scored(s: &mut CemStrategy, candidates: &[Candidate], score: impl Fn(&Candidate) -> f64) {
        let items: Vec<Evaluated> = candidates
            .iter()
            .map(|c| Evaluated::new(c.clone(), score(c)))
            .collect();
        s.tell(items).unwrap();
    }

    #[test]
    fn test_ask_respects_space() {
        let mut s = strategy();
        for c in s.ask(50).unwrap() {
            assert!(c.len() >= 4 && c.len() <= 8);
            assert!(c.tokens.chars().all(|ch| "ACGT".contains(ch)));
        }
    }

    #[test]
    fn test_distribution_shifts_towards_elite() {
        let mut s = strategy();
        // Reward 'A' content; the per-position P(A) should rise.
        for _ in 0..10 {
            let candidates = s.ask(32).unwrap();
            tell_scored(&mut s, &candidates, |c| {
                c.tokens.chars().filter(|&ch| ch == 'A').count() as f64 / c.len() as f64
            });
        }
        let uniform = 1.0 / 4.0;
        let p_a_first = s.position_probs[0][0];
        assert!(
            p_a_first > uniform,
            "expected P(A) at position 0 above uniform, got {p_a_first}"
        );
    }

    #[test]
    fn test_state_includes_distributions() {
        let mut s = strategy();
        let state = s.state();
        // One row per position, one entry per admissible length.
        assert_eq!(state["position_probs"].as_array().unwrap().len(), 8);
        assert_eq!(state["length_probs"].as_array().unwrap().len(), 5);

        let candidates = s.ask(8).unwrap();
        tell_scored(&mut s, &candidates, |c| c.len() as f64);
        let state = s.state();
        assert_eq!(state["position_probs"][0].as_array().unwrap().len(), 4);
        assert!(state["best_score"].as_f64().is_some());
    }

    #[test]
    fn test_pool_accumulates_and_is_capped() {
        let mut s = CemStrategy::new(
            SequenceSpace::new("AC", 3, 5).unwrap(),
            CemParams {
                pool_cap: 20,
                ..Default::default()
            },
            1,
        )
        .unwrap();

        let candidates = s.ask(8).unwrap();
        tell_scored(&mut s, &candidates, |_| 0.5);
        assert_eq!(s.pool.len(), 8);

        let candidates = s.ask(8).unwrap();
        tell_scored(&mut s, &candidates, |_| 0.5);
        assert_eq!(s.pool.len(), 16);

        let candidates = s.ask(8).unwrap();
        tell_scored(&mut s, &candidates, |_| 0.5);
        assert_eq!(s.pool.len(), 20);
    }

    #[test]
    fn test_tell_rejects_out_of_space_tokens_without_mutation() {
        let mut s = CemStrategy::new(
            SequenceSpace::new("AC", 3, 5).unwrap(),
            CemParams::default(),
            42,
        )
        .unwrap();
        let candidates = s.ask(4).unwrap();
        let probs_before = s.position_probs.clone();

        // Known id, but tampered tokens far outside the space.
        let mut items: Vec<Evaluated> = candidates
            .iter()
            .map(|c| Evaluated::new(c.clone(), 0.5))
            .collect();
        items[2].candidate.tokens = "ZZZZZZZZZZ".to_string();

        assert!(matches!(
            s.tell(items),
            Err(StrategyError::ShapeViolation { .. })
        ));
        assert_eq!(s.pool.len(), 0);
        assert_eq!(s.position_probs, probs_before);
        assert!(s.best().is_none());
    }

    #[test]
    fn test_rejected_tell_leaves_state_unchanged() {
        let mut s = strategy();
        let _ = s.ask(4).unwrap();
        let probs_before = s.position_probs.clone();
        let foreign = vec![Evaluated::new(Candidate::new(999, "ACGT".to_string()), 1.0)];
        assert!(s.tell(foreign).is_err());
        assert_eq!(s.pool.len(), 0);
        assert_eq!(s.position_probs, probs_before);
        assert!(s.best().is_none());
    }
}

//! Genetic algorithm over token sequences.

use std::collections::HashSet;

use rand::prelude::*;
use serde_json::json;

use super::{BestTracker, Evaluated, Strategy, check_told, random_tokens, rank_descending};
use crate::engine::StrategyError;
use crate::schema::{Candidate, ConfigError, GaParams, SequenceSpace};

/// Genetic algorithm: the last told population is bred into the next
/// `ask` batch via elitism, rank-based selection, single-point crossover
/// and per-symbol mutation.
///
/// Selection is rank-based rather than fitness-proportional, so the
/// algorithm behaves the same under affine rescaling of scores.
pub struct GaStrategy {
    space: SequenceSpace,
    params: GaParams,
    rng: StdRng,
    /// Scored population from the last tell, sorted descending.
    population: Vec<(String, f64)>,
    next_id: u64,
    last_ask: HashSet<u64>,
    best: BestTracker,
    generation: usize,
}

impl GaStrategy {
    /// Create a GA strategy. The first `ask` draws a uniform random
    /// population; breeding starts once a population has been told.
    pub fn new(space: SequenceSpace, params: GaParams, seed: u64) -> Result<Self, ConfigError> {
        space.validate()?;
        params.validate()?;
        Ok(Self {
            space,
            params,
            rng: StdRng::seed_from_u64(seed),
            population: Vec::new(),
            next_id: 0,
            last_ask: HashSet::new(),
            best: BestTracker::default(),
            generation: 0,
        })
    }

    /// Rank-based parent selection over the descending-sorted population.
    fn select_index(&mut self) -> usize {
        let n = self.population.len();
        let total_rank: usize = n * (n + 1) / 2;
        let mut target = self.rng.gen_range(0..total_rank);
        for i in 0..n {
            let rank = n - i;
            if target < rank {
                return i;
            }
            target -= rank;
        }
        0
    }

    /// Single-point crossover with cut points constrained so the child
    /// length stays within the space bounds.
    fn crossover(&mut self, parent1: &str, parent2: &str) -> String {
        let len1 = parent1.chars().count();
        let len2 = parent2.chars().count();
        if len1 < 2 || len2 < 1 {
            return parent1.to_string();
        }
        let cut1 = self.rng.gen_range(1..len1);
        // Child is parent1[..cut1] + parent2[cut2..]; keep the suffix
        // length so that min_len <= cut1 + (len2 - cut2) <= max_len.
        let min_suffix = self.space.min_len.saturating_sub(cut1);
        let max_suffix = self.space.max_len - cut1;
        if min_suffix > len2 {
            return parent1.to_string();
        }
        let lo = len2.saturating_sub(max_suffix);
        let hi = len2 - min_suffix;
        if lo > hi {
            return parent1.to_string();
        }
        let cut2 = self.rng.gen_range(lo..=hi);
        parent1
            .chars()
            .take(cut1)
            .chain(parent2.chars().skip(cut2))
            .collect()
    }

    /// Per-symbol resample mutation.
    fn mutate(&mut self, tokens: &str) -> String {
        let rate = self.params.mutation_rate;
        tokens
            .chars()
            .map(|c| {
                if self.rng.gen_range(0.0..1.0) < rate {
                    self.space.alphabet[self.rng.gen_range(0..self.space.alphabet.len())]
                } else {
                    c
                }
            })
            .collect()
    }

    fn breed(&mut self) -> String {
        let idx1 = self.select_index();
        let idx2 = self.select_index();
        let parent1 = self.population[idx1].0.clone();
        let parent2 = self.population[idx2].0.clone();
        let child = if self.rng.gen_range(0.0..1.0) < self.params.crossover_rate {
            self.crossover(&parent1, &parent2)
        } else {
            parent1
        };
        self.mutate(&child)
    }

    fn fresh_candidate(&mut self, tokens: String) -> Candidate {
        let id = self.next_id;
        self.next_id += 1;
        Candidate::new(id, tokens)
    }
}

impl Strategy for GaStrategy {
    fn ask(&mut self, n: usize) -> Result<Vec<Candidate>, StrategyError> {
        if n == 0 {
            return Err(StrategyError::EmptyAsk);
        }
        let mut candidates = Vec::with_capacity(n);
        if self.population.is_empty() {
            for _ in 0..n {
                let tokens = random_tokens(&self.space, &mut self.rng);
                candidates.push(self.fresh_candidate(tokens));
            }
        } else {
            let elites = self.params.elitism.min(self.population.len()).min(n);
            for i in 0..elites {
                let tokens = self.population[i].0.clone();
                candidates.push(self.fresh_candidate(tokens));
            }
            while candidates.len() < n {
                let tokens = self.breed();
                candidates.push(self.fresh_candidate(tokens));
            }
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
        self.population = items
            .into_iter()
            .map(|item| (item.candidate.tokens, item.score))
            .collect();
        self.generation += 1;
        Ok(())
    }

    fn best(&self) -> Option<(&Candidate, f64)> {
        self.best.get()
    }

    fn state(&self) -> serde_json::Value {
        json!({
            "kind": "ga",
            "generation": self.generation,
            "best_score": self.best.score(),
            "population_size": self.population.len(),
            "crossover_rate": self.params.crossover_rate,
            "mutation_rate": self.params.mutation_rate,
            "elitism": self.params.elitism,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> GaStrategy {
        GaStrategy::new(
            SequenceSpace::new("ACGT", 4, 12).unwrap(),
            GaParams::default(),
            42,
        )
        .unwrap()
    }

    fn tell_scored(s: &mut GaStrategy, candidates: &[Candidate], score: impl Fn(&Candidate) -> f64) {
        let items: Vec<Evaluated> = candidates
            .iter()
            .map(|c| Evaluated::new(c.clone(), score(c)))
            .collect();
        s.tell(items).unwrap();
    }

    #[test]
    fn test_new_rejects_invalid_rates() {
        let space = SequenceSpace::new("ACGT", 4, 12).unwrap();
        let params = GaParams {
            mutation_rate: 1.5,
            ..Default::default()
        };
        assert!(GaStrategy::new(space, params, 42).is_err());
    }

    #[test]
    fn test_offspring_stay_in_space() {
        let mut s = strategy();
        let candidates = s.ask(16).unwrap();
        tell_scored(&mut s, &candidates, |c| c.len() as f64);
        for _ in 0..5 {
            let next = s.ask(16).unwrap();
            for c in &next {
                assert!(c.len() >= 4 && c.len() <= 12, "length {} out of bounds", c.len());
                assert!(c.tokens.chars().all(|ch| "ACGT".contains(ch)));
            }
            tell_scored(&mut s, &next, |c| c.len() as f64);
        }
    }

    #[test]
    fn test_elites_survive() {
        let mut s = strategy();
        let candidates = s.ask(8).unwrap();
        tell_scored(&mut s, &candidates, |c| {
            c.tokens.chars().filter(|&ch| ch == 'G').count() as f64
        });
        let best_tokens = s.population[0].0.clone();
        let next = s.ask(8).unwrap();
        assert_eq!(next[0].tokens, best_tokens);
    }

    #[test]
    fn test_improvement_under_length_pressure() {
        let mut s = strategy();
        let mut first_best = None;
        let mut last_best = 0.0;
        for _ in 0..10 {
            let candidates = s.ask(24).unwrap();
            tell_scored(&mut s, &candidates, |c| c.len() as f64 / 12.0);
            last_best = s.best().unwrap().1;
            first_best.get_or_insert(last_best);
        }
        assert!(last_best >= first_best.unwrap());
    }

    #[test]
    fn test_tell_rejects_out_of_space_tokens() {
        let mut s = strategy();
        let candidates = s.ask(6).unwrap();

        // Known id, but tokens longer than the space allows; accepting
        // them would poison the breeding population.
        let mut items: Vec<Evaluated> = candidates
            .iter()
            .map(|c| Evaluated::new(c.clone(), 0.5))
            .collect();
        items[0].candidate.tokens = "ACGTACGTACGTACGT".to_string();

        assert!(matches!(
            s.tell(items),
            Err(StrategyError::ShapeViolation { .. })
        ));
        assert!(s.population.is_empty());
        assert!(s.best().is_none());
    }

    #[test]
    fn test_tell_rejects_unknown_ids() {
        let mut s = strategy();
        let _ = s.ask(4).unwrap();
        let foreign = vec![Evaluated::new(Candidate::new(77, "ACGT".to_string()), 1.0)];
        assert!(s.tell(foreign).is_err());
        assert!(s.population.is_empty());
    }
}

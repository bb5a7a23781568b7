//! Separable (diagonal-covariance) CMA-ES core and the fixed-length
//! strategy built on it.

use std::collections::{HashMap, HashSet};

use rand::prelude::*;
use rand_distr::StandardNormal;
use serde_json::json;

use super::{BestTracker, Evaluated, Strategy, check_told, rank_descending};
use crate::engine::StrategyError;
use crate::schema::{Candidate, ConfigError, SequenceSpace};

/// Diagonal-covariance CMA-ES sampler and update rules.
///
/// Tracks the distribution mean, global step size, diagonal covariance
/// and both evolution paths. Selection weights are recomputed per `update`
/// from the told batch size, so callers may ask for and tell arbitrary
/// batch sizes.
#[derive(Debug)]
pub(crate) struct CmaesCore {
    dim: usize,
    mean: Vec<f64>,
    sigma: f64,
    /// Diagonal of the covariance matrix.
    cov: Vec<f64>,
    p_sigma: Vec<f64>,
    p_c: Vec<f64>,
    pub(crate) generation: usize,
}

impl CmaesCore {
    /// Identity-covariance distribution centered at the origin, which
    /// decodes to the midpoint of the search space.
    pub(crate) fn new(dim: usize, sigma0: f64) -> Self {
        Self {
            dim,
            mean: vec![0.0; dim],
            sigma: sigma0,
            cov: vec![1.0; dim],
            p_sigma: vec![0.0; dim],
            p_c: vec![0.0; dim],
            generation: 0,
        }
    }

    pub(crate) fn sigma(&self) -> f64 {
        self.sigma
    }

    pub(crate) fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub(crate) fn cov(&self) -> &[f64] {
        &self.cov
    }

    /// Draw one genotype from the current distribution.
    pub(crate) fn sample(&self, rng: &mut StdRng) -> Vec<f64> {
        (0..self.dim)
            .map(|i| {
                let z: f64 = rng.sample(StandardNormal);
                self.mean[i] + self.sigma * self.cov[i].sqrt() * z
            })
            .collect()
    }

    /// Apply the mean, path, covariance and step-size updates given told
    /// genotypes ranked best-first.
    pub(crate) fn update(&mut self, ranked: &[&Vec<f64>]) {
        let n = self.dim as f64;
        let lambda = ranked.len();
        let mu = (lambda / 2).max(1);

        // Log-rank recombination weights over the top mu genotypes.
        let mut weights: Vec<f64> = (0..mu)
            .map(|i| (mu as f64 + 0.5).ln() - ((i + 1) as f64).ln())
            .collect();
        let weight_sum: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= weight_sum;
        }
        let mu_eff = 1.0 / weights.iter().map(|w| w * w).sum::<f64>();

        let c_sigma = (mu_eff + 2.0) / (n + mu_eff + 5.0);
        let d_sigma =
            1.0 + 2.0 * (((mu_eff - 1.0) / (n + 1.0)).sqrt() - 1.0).max(0.0) + c_sigma;
        let c_c = (4.0 + mu_eff / n) / (n + 4.0 + 2.0 * mu_eff / n);
        let c_1 = 2.0 / ((n + 1.3).powi(2) + mu_eff);
        let c_mu = (1.0 - c_1)
            .min(2.0 * (mu_eff - 2.0 + 1.0 / mu_eff) / ((n + 2.0).powi(2) + mu_eff))
            .max(0.0);
        let chi_n = n.sqrt() * (1.0 - 1.0 / (4.0 * n) + 1.0 / (21.0 * n * n));

        let old_mean = std::mem::take(&mut self.mean);
        let mut new_mean = vec![0.0; self.dim];
        for (w, x) in weights.iter().zip(ranked) {
            for i in 0..self.dim {
                new_mean[i] += w * x[i];
            }
        }

        // Step-size path uses the covariance-normalized mean shift.
        let cs_factor = (c_sigma * (2.0 - c_sigma) * mu_eff).sqrt();
        for i in 0..self.dim {
            let shift =
                (new_mean[i] - old_mean[i]) / (self.sigma * self.cov[i].sqrt().max(1e-12));
            self.p_sigma[i] = (1.0 - c_sigma) * self.p_sigma[i] + cs_factor * shift;
        }
        let ps_norm = self.p_sigma.iter().map(|v| v * v).sum::<f64>().sqrt();

        self.generation += 1;
        let decay = (1.0 - (1.0 - c_sigma).powi(2 * self.generation as i32)).sqrt();
        let h_sigma = ps_norm / decay.max(1e-12) / chi_n < 1.4 + 2.0 / (n + 1.0);

        let cc_factor = (c_c * (2.0 - c_c) * mu_eff).sqrt();
        for i in 0..self.dim {
            let y = (new_mean[i] - old_mean[i]) / self.sigma;
            self.p_c[i] =
                (1.0 - c_c) * self.p_c[i] + if h_sigma { cc_factor * y } else { 0.0 };
        }

        // Rank-one and rank-mu updates, diagonal form.
        let delta_h = if h_sigma { 0.0 } else { c_c * (2.0 - c_c) };
        for i in 0..self.dim {
            let mut rank_mu = 0.0;
            for (w, x) in weights.iter().zip(ranked) {
                let y = (x[i] - old_mean[i]) / self.sigma;
                rank_mu += w * y * y;
            }
            self.cov[i] = ((1.0 - c_1 - c_mu) * self.cov[i]
                + c_1 * (self.p_c[i] * self.p_c[i] + delta_h * self.cov[i])
                + c_mu * rank_mu)
                .max(1e-12);
        }

        self.sigma *= ((c_sigma / d_sigma) * (ps_norm / chi_n - 1.0)).exp();
        self.mean = new_mean;
    }
}

/// Map a genotype coordinate to an alphabet index via monotonic bucketing
/// of the clamped range into equal bins.
pub(crate) fn bucket_symbol(space: &SequenceSpace, x: f64) -> char {
    let k = space.symbol_count();
    let unit = (x.clamp(-1.0, 1.0) + 1.0) / 2.0;
    let idx = ((unit * k as f64) as usize).min(k - 1);
    space.alphabet[idx]
}

/// CMA-ES over sequences of fixed length (the space's `max_len`), one
/// genotype coordinate per position.
pub struct CmaesStrategy {
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

impl CmaesStrategy {
    /// Create a fixed-length CMA-ES strategy.
    pub fn new(space: SequenceSpace, sigma0: f64, seed: u64) -> Result<Self, ConfigError> {
        space.validate()?;
        if !(sigma0 > 0.0) {
            return Err(ConfigError::InvalidSigma(sigma0));
        }
        let dim = space.max_len;
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

    fn decode(&self, x: &[f64]) -> String {
        x.iter().map(|&v| bucket_symbol(&self.space, v)).collect()
    }
}

impl Strategy for CmaesStrategy {
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
            candidates.push(Candidate::new(id, self.decode(&genotype)));
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
            "kind": "cmaes",
            "generation": self.core.generation,
            "best_score": self.best.score(),
            "sigma": self.core.sigma(),
            "sigma0": self.sigma0,
            "mean": self.core.mean(),
            "cov": self.core.cov(),
            "length": self.space.max_len,
        })
    }
}

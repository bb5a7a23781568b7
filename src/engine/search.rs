//! The generation loop driving a strategy against an executor.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};

use super::EngineError;
use super::executor::Executor;
use super::strategies::{Evaluated, Strategy};
use crate::schema::{Candidate, ConfigError, EngineConfig, Metrics, Results};

/// Engine lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    /// Constructed, not yet run.
    Initialized,
    /// Generation loop in progress.
    Running,
    /// Loop exhausted all iterations (or was cancelled) and produced results.
    Converged,
    /// An ask/evaluate/tell error aborted the run.
    Failed,
}

/// Orchestrates ask -> evaluate -> tell across generations and records
/// per-generation metrics.
///
/// The loop itself is strictly sequential: generation `g+1` never asks
/// before generation `g`'s tell has been applied. Parallelism happens
/// only inside the executor.
pub struct Engine {
    config: EngineConfig,
    strategy: Box<dyn Strategy>,
    executor: Box<dyn Executor>,
    history: Vec<Metrics>,
    evaluated: Vec<(Candidate, f64)>,
    phase: EnginePhase,
    cancelled: Arc<AtomicBool>,
}

impl Engine {
    /// Create an engine. Validates the configuration.
    pub fn new(
        config: EngineConfig,
        strategy: Box<dyn Strategy>,
        executor: Box<dyn Executor>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            strategy,
            executor,
            history: Vec::new(),
            evaluated: Vec::new(),
            phase: EnginePhase::Initialized,
            cancelled: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Handle for cancelling the run from another thread. Cancellation is
    /// checked between generations; already-recorded history stays valid.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// Metrics recorded so far. Remains inspectable after a failed run.
    pub fn history(&self) -> &[Metrics] {
        &self.history
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run the generation loop to completion and build results.
    ///
    /// Any ask, evaluation or tell error aborts the run; no default score
    /// is ever substituted for a failed evaluation.
    pub fn run(&mut self) -> Result<Results, EngineError> {
        self.phase = EnginePhase::Running;
        info!(
            "starting {} run: {} iterations, population {}",
            self.config.method, self.config.iterations, self.config.population_size
        );

        for generation in 0..self.config.iterations {
            if self.cancelled.load(Ordering::Relaxed) {
                info!("run cancelled after {generation} generations");
                break;
            }
            self.step(generation)?;
        }

        self.phase = EnginePhase::Converged;
        let results = self.results();
        info!(
            "run complete: best score {:?}",
            results.best.as_ref().map(|(_, s)| *s)
        );
        Ok(results)
    }

    fn step(&mut self, generation: usize) -> Result<(), EngineError> {
        let candidates = self
            .strategy
            .ask(self.config.population_size)
            .map_err(|e| self.fail(e))?;

        let scores = self
            .executor
            .evaluate(&candidates, generation)
            .map_err(|e| self.fail(e))?;

        let population_size = candidates.len();
        let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;

        self.evaluated
            .extend(candidates.iter().cloned().zip(scores.iter().copied()));

        let items: Vec<Evaluated> = candidates
            .into_iter()
            .zip(scores)
            .map(|(candidate, score)| Evaluated::new(candidate, score))
            .collect();
        self.strategy.tell(items).map_err(|e| self.fail(e))?;

        self.history.push(Metrics {
            generation,
            best,
            mean,
            population_size,
        });
        debug!("generation {generation}: best={best:.4} mean={mean:.4}");
        Ok(())
    }

    fn fail<E: Into<EngineError>>(&mut self, error: E) -> EngineError {
        self.phase = EnginePhase::Failed;
        error.into()
    }

    fn results(&self) -> Results {
        let mut ranking = self.evaluated.clone();
        ranking.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let scores: Vec<f64> = ranking.iter().map(|(_, s)| *s).collect();

        let best = self.strategy.best().map(|(c, s)| (c.clone(), s));

        let mut summary = BTreeMap::new();
        summary.insert("generations".to_string(), self.history.len() as f64);
        summary.insert("total_evals".to_string(), self.evaluated.len() as f64);
        if let Some((_, score)) = &best {
            summary.insert("best_score".to_string(), *score);
        }

        Results {
            history: self.history.clone(),
            best,
            ranking,
            scores,
            summary,
        }
    }
}

impl EnginePhase {
    /// True once the run has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EnginePhase::Converged | EnginePhase::Failed)
    }
}

//! Batch execution of candidate evaluations.

use rayon::prelude::*;

use super::EvaluationError;
use super::evaluator::RewardAggregator;
use crate::schema::{Candidate, ScoringContext};

/// Runs the evaluator over a batch of candidates.
///
/// Implementations must return one score per input candidate, positionally
/// aligned with the input order regardless of execution order.
pub trait Executor: Send + Sync {
    /// Score every candidate in the batch for the given engine iteration.
    fn evaluate(
        &self,
        candidates: &[Candidate],
        iteration: usize,
    ) -> Result<Vec<f64>, EvaluationError>;
}

/// Sequential, in-order executor.
pub struct LocalExecutor {
    evaluator: RewardAggregator,
}

impl LocalExecutor {
    /// Create an executor scoring candidates one at a time.
    pub fn new(evaluator: RewardAggregator) -> Self {
        Self { evaluator }
    }
}

impl Executor for LocalExecutor {
    fn evaluate(
        &self,
        candidates: &[Candidate],
        iteration: usize,
    ) -> Result<Vec<f64>, EvaluationError> {
        candidates
            .iter()
            .map(|candidate| {
                let context = ScoringContext::new(iteration);
                self.evaluator.evaluate(candidate, &context)
            })
            .collect()
    }
}

/// Concurrent executor backed by the rayon worker pool.
///
/// Evaluations are independent and share no mutable state; the score
/// vector is reassembled in input order.
pub struct ParallelExecutor {
    evaluator: RewardAggregator,
}

impl ParallelExecutor {
    /// Create an executor scoring candidates across the rayon pool.
    pub fn new(evaluator: RewardAggregator) -> Self {
        Self { evaluator }
    }
}

impl Executor for ParallelExecutor {
    fn evaluate(
        &self,
        candidates: &[Candidate],
        iteration: usize,
    ) -> Result<Vec<f64>, EvaluationError> {
        candidates
            .par_iter()
            .map(|candidate| {
                let context = ScoringContext::new(iteration);
                self.evaluator.evaluate(candidate, &context)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards;

    fn batch(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate::new(i as u64, "ACGT".repeat(i % 5 + 1)))
            .collect()
    }

    fn length_evaluator() -> RewardAggregator {
        RewardAggregator::new(vec![rewards::custom("length", 1.0, |c, _| {
            c.len() as f64 / 20.0
        })])
    }

    #[test]
    fn test_sequential_preserves_order() {
        let executor = LocalExecutor::new(length_evaluator());
        let candidates = batch(8);
        let scores = executor.evaluate(&candidates, 0).unwrap();
        assert_eq!(scores.len(), candidates.len());
        for (candidate, score) in candidates.iter().zip(&scores) {
            assert!((score - candidate.len() as f64 / 20.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let candidates = batch(64);
        let sequential = LocalExecutor::new(length_evaluator())
            .evaluate(&candidates, 3)
            .unwrap();
        let parallel = ParallelExecutor::new(length_evaluator())
            .evaluate(&candidates, 3)
            .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_parallel_propagates_errors() {
        let evaluator = RewardAggregator::new(vec![rewards::custom("bad", 1.0, |c, _| {
            if c.id == 7 { f64::INFINITY } else { 0.5 }
        })]);
        let executor = ParallelExecutor::new(evaluator);
        assert!(executor.evaluate(&batch(16), 0).is_err());
    }
}

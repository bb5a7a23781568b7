//! Reward aggregation: weighted sum over pluggable scoring components.

use super::EvaluationError;
use crate::schema::{Candidate, ScoringContext};

/// A scoring component. Implementations return a raw scalar; the
/// aggregator applies the component's weight.
pub trait Reward: Send + Sync {
    /// Component name, used in error reporting and manifests.
    fn name(&self) -> &str;

    /// Multiplicative weight applied to the raw score.
    fn weight(&self) -> f64;

    /// Raw score for the given candidate.
    fn score(&self, candidate: &Candidate, context: &ScoringContext)
    -> Result<f64, EvaluationError>;
}

/// Combines reward blocks into one scalar per candidate:
/// `sum(weight_i * score_i)`.
///
/// Block order has no effect on the aggregate beyond floating-point
/// summation order, but it fixes reporting order.
pub struct RewardAggregator {
    blocks: Vec<Box<dyn Reward>>,
}

impl RewardAggregator {
    /// Create an aggregator from a list of reward blocks.
    pub fn new(blocks: Vec<Box<dyn Reward>>) -> Self {
        Self { blocks }
    }

    /// The configured blocks, in reporting order.
    pub fn blocks(&self) -> &[Box<dyn Reward>] {
        &self.blocks
    }

    /// Weighted aggregate score for a candidate.
    ///
    /// A failing component propagates its error; no default score is ever
    /// substituted.
    pub fn evaluate(
        &self,
        candidate: &Candidate,
        context: &ScoringContext,
    ) -> Result<f64, EvaluationError> {
        let mut total = 0.0;
        for block in &self.blocks {
            let raw = block.score(candidate, context)?;
            if !raw.is_finite() {
                return Err(EvaluationError::NonFinite {
                    name: block.name().to_string(),
                });
            }
            total += block.weight() * raw;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewards;

    struct FailingReward;

    impl Reward for FailingReward {
        fn name(&self) -> &str {
            "failing"
        }
        fn weight(&self) -> f64 {
            1.0
        }
        fn score(&self, _: &Candidate, _: &ScoringContext) -> Result<f64, EvaluationError> {
            Err(EvaluationError::Component {
                name: "failing".to_string(),
                message: "model unavailable".to_string(),
            })
        }
    }

    #[test]
    fn test_weighted_sum() {
        let aggregator = RewardAggregator::new(vec![
            rewards::custom("a", 1.0, |_, _| 0.8),
            rewards::custom("b", 0.5, |_, _| 0.4),
        ]);
        let candidate = Candidate::new(0, "ACGT".to_string());
        let score = aggregator
            .evaluate(&candidate, &ScoringContext::new(0))
            .unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_component_error_propagates() {
        let aggregator = RewardAggregator::new(vec![
            rewards::custom("ok", 1.0, |_, _| 0.5),
            Box::new(FailingReward),
        ]);
        let candidate = Candidate::new(0, "ACGT".to_string());
        let err = aggregator
            .evaluate(&candidate, &ScoringContext::new(0))
            .unwrap_err();
        assert!(matches!(err, EvaluationError::Component { .. }));
    }

    #[test]
    fn test_non_finite_score_rejected() {
        let aggregator =
            RewardAggregator::new(vec![rewards::custom("nan", 1.0, |_, _| f64::NAN)]);
        let candidate = Candidate::new(0, "ACGT".to_string());
        let err = aggregator
            .evaluate(&candidate, &ScoringContext::new(0))
            .unwrap_err();
        assert!(matches!(err, EvaluationError::NonFinite { .. }));
    }
}

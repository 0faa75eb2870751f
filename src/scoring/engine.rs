//! Weighted factor engine.
//!
//! Composes scoring factors into one weighted sum. The multi-factor score
//! of the hybrid scorer is this engine configured with the four
//! component factors and [`FactorWeights`].

use std::sync::Arc;

use super::factors::{Feasibility, Financial, Strategic, TimeToValue};
use super::{clamp_score, FactorScore, ScoringContext, ScoringFactor};
use crate::config::FactorWeights;
use crate::models::Project;

#[derive(Clone)]
struct WeightedFactor {
    factor: Arc<dyn ScoringFactor>,
    weight: f64,
}

/// A composable weighted scoring engine.
///
/// # Example
/// ```
/// use u_roadmap::models::{Project, Quarter};
/// use u_roadmap::scoring::{factors, FactorEngine, ScoringContext};
///
/// let engine = FactorEngine::new()
///     .with_weighted_factor(factors::Financial, 0.5)
///     .with_weighted_factor(factors::Roi, 0.5);
/// let project = Project::new("A").with_value(2_000_000.0).with_roi(100.0);
/// let score = engine.score(&project, &ScoringContext::at_quarter(Quarter::Q1));
/// assert!((score - 35.0).abs() < 1e-10);
/// ```
#[derive(Clone, Default)]
pub struct FactorEngine {
    factors: Vec<WeightedFactor>,
}

impl FactorEngine {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// The four-component multi-factor engine.
    pub fn multi_factor(weights: &FactorWeights) -> Self {
        Self::new()
            .with_weighted_factor(Financial, weights.financial)
            .with_weighted_factor(Strategic, weights.strategic)
            .with_weighted_factor(Feasibility, weights.feasibility)
            .with_weighted_factor(TimeToValue, weights.time_to_value)
    }

    /// Adds a factor with weight 1.0.
    pub fn with_factor<F: ScoringFactor + 'static>(self, factor: F) -> Self {
        self.with_weighted_factor(factor, 1.0)
    }

    /// Adds a weighted factor.
    pub fn with_weighted_factor<F: ScoringFactor + 'static>(mut self, factor: F, weight: f64) -> Self {
        self.factors.push(WeightedFactor {
            factor: Arc::new(factor),
            weight,
        });
        self
    }

    /// Number of factors.
    pub fn len(&self) -> usize {
        self.factors.len()
    }

    /// Whether no factor is configured.
    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }

    /// Weighted sum of all factor scores, clamped to [0, 100].
    pub fn score(&self, project: &Project, context: &ScoringContext) -> FactorScore {
        let total: f64 = self
            .factors
            .iter()
            .map(|wf| wf.factor.evaluate(project, context) * wf.weight)
            .sum();
        clamp_score(total)
    }

    /// Unweighted score of each factor, in insertion order.
    pub fn breakdown(&self, project: &Project, context: &ScoringContext) -> Vec<(&'static str, FactorScore)> {
        self.factors
            .iter()
            .map(|wf| (wf.factor.name(), wf.factor.evaluate(project, context)))
            .collect()
    }
}

impl std::fmt::Debug for FactorEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactorEngine")
            .field(
                "factors",
                &self
                    .factors
                    .iter()
                    .map(|wf| format!("{}(w={})", wf.factor.name(), wf.weight))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Phase, Quarter, StrategicDriver, StrategicPillar};
    use crate::scoring::factors::Roi;

    fn sample() -> Project {
        Project::new("P1")
            .with_value(2_000_000.0)
            .with_pillar(StrategicPillar::Productivity)
            .with_driver(StrategicDriver::Growth)
            .with_phase(Phase::new("Pilot"))
            .with_effort(60.0)
    }

    #[test]
    fn test_multi_factor_weighted_sum() {
        let engine = FactorEngine::multi_factor(&FactorWeights::default());
        let ctx = ScoringContext::at_quarter(Quarter::Q1);
        // 50×.30 + 40×.25 + 80×.25 + 80×.20
        assert!((engine.score(&sample(), &ctx) - 61.0).abs() < 1e-10);
    }

    #[test]
    fn test_breakdown_order() {
        let engine = FactorEngine::multi_factor(&FactorWeights::default());
        let ctx = ScoringContext::at_quarter(Quarter::Q1);
        let names: Vec<&str> = engine.breakdown(&sample(), &ctx).iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["financial", "strategic", "feasibility", "time_to_value"]);
    }

    #[test]
    fn test_empty_engine_scores_zero() {
        let engine = FactorEngine::new();
        assert!(engine.is_empty());
        let ctx = ScoringContext::at_quarter(Quarter::Q1);
        assert!((engine.score(&sample(), &ctx) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_score_clamped() {
        let engine = FactorEngine::new().with_weighted_factor(Roi, 3.0);
        let ctx = ScoringContext::at_quarter(Quarter::Q1);
        let p = Project::new("A").with_roi(400.0);
        assert!((engine.score(&p, &ctx) - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_debug_lists_weights() {
        let engine = FactorEngine::new().with_factor(Roi);
        assert_eq!(engine.len(), 1);
        assert!(format!("{engine:?}").contains("roi(w=1)"));
    }
}

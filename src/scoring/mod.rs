//! Hybrid priority scoring.
//!
//! Converts each project's raw attributes into a single 0–100 priority
//! score. Four factors (financial, strategic, feasibility, time-to-value)
//! are blended into a multi-factor score, which is then blended with an
//! ROI score using quarter-dependent weights: ROI counts for more in
//! Q3–Q4, once forecasts have matured.
//!
//! # Usage
//!
//! ```
//! use u_roadmap::config::ScoringConfig;
//! use u_roadmap::models::{Project, Quarter};
//! use u_roadmap::scoring::{HybridScorer, ScoringContext};
//!
//! let projects = vec![Project::new("A").with_value(4_000_000.0).with_roi(250.0)];
//! let context = ScoringContext::at_quarter(Quarter::Q1);
//! let scores = HybridScorer::new(ScoringConfig::default()).score_all(&projects, &context);
//! assert_eq!(scores[0].rank, 1);
//! assert!((scores[0].financial_score - 100.0).abs() < 1e-10);
//! ```

mod context;
mod engine;
pub mod factors;
mod hybrid;

pub use context::ScoringContext;
pub use engine::FactorEngine;
pub use hybrid::{rank_scores, HybridScorer, ScoreRecord};

use crate::models::Project;
use std::fmt::Debug;

/// Score returned by a factor, in [0, 100].
///
/// Higher scores = higher priority.
pub type FactorScore = f64;

/// A single scoring dimension.
///
/// # Score Convention
/// **Higher score = higher priority.** Implementations clamp to [0, 100].
pub trait ScoringFactor: Send + Sync + Debug {
    /// Factor name (e.g., "financial").
    fn name(&self) -> &'static str;

    /// Evaluates a project under the given context.
    fn evaluate(&self, project: &Project, context: &ScoringContext) -> FactorScore;

    /// Factor description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Clamps a raw score to [0, 100], mapping NaN to 0.
#[inline]
pub(crate) fn clamp_score(raw: f64) -> FactorScore {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 100.0)
    }
}

//! Hybrid scorer: multi-factor blend plus quarter-weighted ROI.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::factors::{Feasibility, Financial, Roi, Strategic, TimeToValue};
use super::{clamp_score, FactorEngine, ScoringContext, ScoringFactor};
use crate::config::ScoringConfig;
use crate::models::{Project, Quarter};

/// Per-project score breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub project_id: String,
    pub financial_score: f64,
    pub strategic_score: f64,
    pub feasibility_score: f64,
    pub time_to_value_score: f64,
    /// Weighted blend of the four components.
    pub multi_factor_score: f64,
    pub roi_score: f64,
    /// Blend of multi-factor and ROI for `quarter`.
    pub final_score: f64,
    /// 1-based position by descending final score; 0 until ranked.
    pub rank: usize,
    /// Quarter whose blend weights produced `final_score`.
    pub quarter: Quarter,
}

/// Scores projects for a quarter.
#[derive(Debug, Clone)]
pub struct HybridScorer {
    config: ScoringConfig,
    engine: FactorEngine,
}

impl HybridScorer {
    /// Creates a scorer from configuration.
    pub fn new(config: ScoringConfig) -> Self {
        let engine = FactorEngine::multi_factor(&config.factor_weights);
        Self { config, engine }
    }

    /// Scoring configuration.
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores one project. The returned record is unranked (`rank == 0`).
    pub fn score(&self, project: &Project, context: &ScoringContext) -> ScoreRecord {
        let multi_factor_score = self.engine.score(project, context);
        let roi_score = Roi.evaluate(project, context);
        let blend = self.config.blend_for(context.quarter);
        let final_score = clamp_score(blend.multi_factor * multi_factor_score + blend.roi * roi_score);

        ScoreRecord {
            project_id: project.id.clone(),
            financial_score: Financial.evaluate(project, context),
            strategic_score: Strategic.evaluate(project, context),
            feasibility_score: Feasibility.evaluate(project, context),
            time_to_value_score: TimeToValue.evaluate(project, context),
            multi_factor_score,
            roi_score,
            final_score,
            rank: 0,
            quarter: context.quarter,
        }
    }

    /// Scores and ranks every project.
    ///
    /// Duplicate ids are scored once (first occurrence).
    pub fn score_all(&self, projects: &[Project], context: &ScoringContext) -> Vec<ScoreRecord> {
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(projects.len());
        for project in projects {
            if !seen.insert(project.id.as_str()) {
                warn!(project = %project.id, "duplicate project id, scoring first occurrence only");
                continue;
            }
            let record = self.score(project, context);
            debug!(
                project = %record.project_id,
                multi_factor = record.multi_factor_score,
                roi = record.roi_score,
                final_score = record.final_score,
                "scored project"
            );
            records.push(record);
        }
        rank_scores(&mut records);
        records
    }
}

/// Sorts records by descending final score and assigns 1-based ranks.
///
/// The sort is stable, so equal scores keep their input order and still
/// receive distinct consecutive ranks.
pub fn rank_scores(records: &mut [ScoreRecord]) {
    records.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (i, record) in records.iter_mut().enumerate() {
        record.rank = i + 1;
    }
}

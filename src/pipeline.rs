//! Run orchestration.
//!
//! A run is a strictly ordered batch over immutable inputs:
//!
//! ```text
//! validate → graph → score → schedule → progress
//! ```
//!
//! Only unreadable inputs are fatal. Validation findings, graph anomalies
//! and tier-3 failures are carried in the output.

use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

use crate::config::RoadmapConfig;
use crate::error::{Result, RoadmapError};
use crate::graph::{build_dependency_graph, DependencyGraph};
use crate::models::{MetricsSnapshot, Project, Quarter, RoadmapSchedule};
use crate::progress::{ProgressReport, ProgressTracker};
use crate::scheduler::{QuarterScheduler, ScheduleKpi, ScheduleRequest};
use crate::scoring::{HybridScorer, ScoreRecord, ScoringContext};
use crate::validation::{validate_projects, ValidationError};

/// Reads a JSON array of project records.
pub fn load_projects(path: &Path) -> Result<Vec<Project>> {
    parse_projects(&read(path)?)
}

/// Reads a JSON metrics snapshot.
pub fn load_metrics(path: &Path) -> Result<MetricsSnapshot> {
    parse_metrics(&read(path)?)
}

/// Decodes a JSON array of project records.
pub fn parse_projects(json: &str) -> Result<Vec<Project>> {
    serde_json::from_str(json).map_err(|e| RoadmapError::parse("projects", e))
}

/// Decodes a JSON metrics snapshot.
pub fn parse_metrics(json: &str) -> Result<MetricsSnapshot> {
    serde_json::from_str(json).map_err(|e| RoadmapError::parse("metrics snapshot", e))
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| RoadmapError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Combined result of one run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    pub current_quarter: Quarter,
    pub anomalies: Vec<ValidationError>,
    pub graph: DependencyGraph,
    pub topological_order: Vec<String>,
    /// Ranked, best first.
    pub scores: Vec<ScoreRecord>,
    pub schedule: RoadmapSchedule,
    pub kpi: ScheduleKpi,
    /// Empty after [`Pipeline::plan`].
    pub progress: Vec<ProgressReport>,
}

/// Graph, scoring, scheduling and progress over one portfolio.
#[derive(Debug)]
pub struct Pipeline {
    config: RoadmapConfig,
    tracker: ProgressTracker,
}

impl Pipeline {
    /// Creates a pipeline with an offline tracker.
    pub fn new(config: RoadmapConfig) -> Self {
        let tracker = ProgressTracker::new(config.clone());
        Self { config, tracker }
    }

    /// Creates a pipeline whose tracker uses the repository API when a
    /// token is available.
    pub fn from_environment(config: RoadmapConfig) -> Self {
        let tracker = ProgressTracker::from_environment(config.clone());
        Self { config, tracker }
    }

    /// Replaces the progress tracker.
    pub fn with_tracker(mut self, tracker: ProgressTracker) -> Self {
        self.tracker = tracker.with_current_quarter(self.config.current_quarter);
        self
    }

    /// Overrides the current quarter for scoring and progress.
    pub fn with_current_quarter(mut self, quarter: Quarter) -> Self {
        self.config.current_quarter = quarter;
        self.tracker = self.tracker.with_current_quarter(quarter);
        self
    }

    pub fn config(&self) -> &RoadmapConfig {
        &self.config
    }

    /// Runs every stage up to and including scheduling.
    pub fn plan(&self, projects: &[Project], metrics: &MetricsSnapshot) -> PipelineOutput {
        let anomalies = match validate_projects(projects) {
            Ok(()) => Vec::new(),
            Err(errors) => {
                for e in &errors {
                    warn!(kind = ?e.kind, "{}", e.message);
                }
                errors
            }
        };

        let graph = build_dependency_graph(projects, metrics, &self.config.promotion);
        let topological_order = graph.topological_order();

        let context = ScoringContext::from_graph(&graph, self.config.current_quarter, &self.config.scoring)
            .with_effort(self.config.effort.clone());
        let scores = HybridScorer::new(self.config.scoring.clone()).score_all(projects, &context);

        let schedule = QuarterScheduler::from_config(&self.config)
            .schedule(&ScheduleRequest::new(projects, &scores, &graph));
        let kpi = ScheduleKpi::calculate(&schedule);

        info!(
            projects = projects.len(),
            anomalies = anomalies.len(),
            cycles = graph.cycles.len(),
            scheduled = kpi.scheduled_count,
            deferred = kpi.deferred_count,
            "plan complete"
        );

        PipelineOutput {
            current_quarter: self.config.current_quarter,
            anomalies,
            graph,
            topological_order,
            scores,
            schedule,
            kpi,
            progress: Vec::new(),
        }
    }

    /// Runs the full pipeline including progress tracking.
    pub async fn run(&self, projects: &[Project], metrics: &MetricsSnapshot) -> PipelineOutput {
        let mut output = self.plan(projects, metrics);
        output.progress = self
            .tracker
            .track(projects, &output.graph, &output.schedule, metrics)
            .await;
        output
    }
}

//! Per-project progress tracking.
//!
//! Tiers 1 and 2 are computed synchronously. Tier-3 fetches for distinct
//! projects run concurrently, bounded by `max_concurrency`, each under its
//! own timeout. A failed or timed-out fetch degrades that project's tier 3
//! to unavailable; it never fails the run.

use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::delivery::{self, BlockerScope};
use super::{
    activity, analyze_phases, analyze_signals, fuse, velocity_from, ActivityCounts, GitHubClient,
    ProgressReport, RepositoryActivitySource, Tier3Result,
};
use crate::config::RoadmapConfig;
use crate::error::RoadmapError;
use crate::graph::DependencyGraph;
use crate::models::{MetricsSnapshot, Project, ProjectStatus, Quarter, RoadmapSchedule};

/// Builds progress reports for a portfolio.
///
/// Without a repository source the tracker is offline and every tier 3 is
/// unavailable.
pub struct ProgressTracker {
    config: RoadmapConfig,
    current: Quarter,
    today: NaiveDate,
    source: Option<Arc<dyn RepositoryActivitySource>>,
}

impl ProgressTracker {
    /// Creates an offline tracker evaluated at the configured quarter.
    pub fn new(config: RoadmapConfig) -> Self {
        Self {
            current: config.current_quarter,
            config,
            today: Utc::now().date_naive(),
            source: None,
        }
    }

    /// Creates a tracker with a GitHub source when repository tracking is
    /// enabled and the token variable is set; offline otherwise.
    pub fn from_environment(config: RoadmapConfig) -> Self {
        let repo = &config.progress.repository;
        if !repo.enabled {
            info!("repository tracking disabled");
            return Self::new(config);
        }
        let Some(token) = repo.token() else {
            info!(token_env = %repo.token_env, "no repository token, tier 3 disabled");
            return Self::new(config);
        };
        match GitHubClient::new(repo, token) {
            Ok(client) => Self::new(config).with_source(Arc::new(client)),
            Err(e) => {
                warn!(error = %e, "repository client unavailable, tier 3 disabled");
                Self::new(config)
            }
        }
    }

    /// Sets the repository activity source.
    pub fn with_source(mut self, source: Arc<dyn RepositoryActivitySource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Overrides the quarter progress is evaluated at.
    pub fn with_current_quarter(mut self, quarter: Quarter) -> Self {
        self.current = quarter;
        self
    }

    /// Overrides the date used to measure elapsed weeks.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Whether tier 3 can be fetched.
    pub fn is_online(&self) -> bool {
        self.source.is_some()
    }

    /// Quarter progress is evaluated at.
    pub fn current_quarter(&self) -> Quarter {
        self.current
    }

    /// Tracks every project (first occurrence per id), in input order.
    pub async fn track(
        &self,
        projects: &[Project],
        graph: &DependencyGraph,
        schedule: &RoadmapSchedule,
        metrics: &MetricsSnapshot,
    ) -> Vec<ProgressReport> {
        let mut seen = HashSet::new();
        let unique: Vec<&Project> = projects
            .iter()
            .filter(|p| seen.insert(p.id.as_str()))
            .collect();

        let mut tier3 = self.fetch_tier3(&unique, schedule).await;

        let statuses: HashMap<&str, ProjectStatus> =
            unique.iter().map(|p| (p.id.as_str(), p.status)).collect();
        let scope = BlockerScope {
            graph,
            schedule,
            statuses: &statuses,
            current: self.current,
        };

        let reports: Vec<ProgressReport> = unique
            .iter()
            .map(|p| self.report(p, &scope, metrics, tier3.remove(&p.id)))
            .collect();

        info!(
            projects = reports.len(),
            with_repository = reports.iter().filter(|r| r.tier3.is_some()).count(),
            "progress tracked"
        );
        reports
    }

    fn report(
        &self,
        project: &Project,
        scope: &BlockerScope<'_>,
        metrics: &MetricsSnapshot,
        tier3: Option<Tier3Result>,
    ) -> ProgressReport {
        let planned_quarter = scope.schedule.quarter_of(&project.id);
        let tier1 = analyze_phases(project, self.current);
        let tier2 = analyze_signals(self.config.progress.signals.get(&project.id), metrics);
        let overall = fuse(&tier1, &tier2, tier3.as_ref(), &self.config.progress);
        let assessment = delivery::assess(
            planned_quarter,
            self.current,
            overall,
            self.config.effort_for(project),
        );
        let blockers = delivery::collect_blockers(project, scope, &tier1, tier3.as_ref());

        debug!(
            project = %project.id,
            tier1 = tier1.progress_pct,
            tier2 = tier2.progress_pct,
            tier3 = ?tier3.as_ref().map(|t| t.progress_pct),
            overall,
            status = ?assessment.status,
            "progress fused"
        );

        ProgressReport {
            project_id: project.id.clone(),
            velocity: velocity_from(tier3.as_ref()),
            tier1,
            tier2,
            tier3,
            overall_progress_pct: overall,
            delivery_status: assessment.status,
            planned_quarter,
            expected_progress_pct: assessment.expected_pct,
            variance: assessment.variance,
            blockers,
        }
    }

    /// Fetches and scores tier 3 for every eligible project.
    async fn fetch_tier3(&self, projects: &[&Project], schedule: &RoadmapSchedule) -> HashMap<String, Tier3Result> {
        let Some(source) = &self.source else {
            return HashMap::new();
        };
        let settings = &self.config.progress.repository;

        let jobs: Vec<(String, String, NaiveDate)> = projects
            .iter()
            .filter_map(|p| {
                let scheduled = schedule.quarter_of(&p.id);
                if !activity::is_due_for_tracking(p, scheduled, self.current) {
                    return None;
                }
                let repository = self.config.repository_for(p)?;
                let since = activity::activity_since(p, scheduled, self.config.planning_year)?;
                Some((p.id.clone(), repository.to_string(), since))
            })
            .collect();
        if jobs.is_empty() {
            return HashMap::new();
        }
        debug!(jobs = jobs.len(), "fetching repository activity");

        let budget = Duration::from_secs(settings.timeout_secs.max(1));
        let fetched: Vec<(String, Option<ActivityCounts>, NaiveDate)> = stream::iter(jobs)
            .map(|(id, repository, since)| {
                let source = Arc::clone(source);
                async move {
                    let counts = match tokio::time::timeout(budget, source.fetch_activity(&repository, since)).await {
                        Ok(Ok(counts)) => Some(counts),
                        Ok(Err(e)) => {
                            warn!(project = %id, error = %e, "repository fetch failed, tier 3 unavailable");
                            None
                        }
                        Err(_) => {
                            let e = RoadmapError::Timeout {
                                repository: repository.clone(),
                                seconds: budget.as_secs(),
                            };
                            warn!(project = %id, error = %e, "repository fetch timed out, tier 3 unavailable");
                            None
                        }
                    };
                    (id, counts, since)
                }
            })
            .buffer_unordered(settings.max_concurrency.max(1))
            .collect()
            .await;

        fetched
            .into_iter()
            .filter_map(|(id, counts, since)| {
                let weeks = (self.today - since).num_days() as f64 / 7.0;
                counts.map(|c| (id, activity::score_activity(c, weeks)))
            })
            .collect()
    }
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker")
            .field("current", &self.current)
            .field("today", &self.today)
            .field("online", &self.is_online())
            .finish()
    }
}

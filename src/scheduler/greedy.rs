//! Greedy quarter scheduler.
//!
//! # Algorithm
//!
//! 1. Seed the scheduled set with the pre-committed whitelist, placed in
//!    its quarter and consuming the configured share of capacity.
//! 2. For each quarter in chronological order, walk pending projects in
//!    descending score order:
//!    - skip if any blocking dependency is not yet scheduled;
//!    - place if its effort fits the remaining capacity;
//!    - otherwise leave it pending and move on down the list.
//! 3. Every project still pending is deferred with the first unmet
//!    dependency, or insufficient capacity.
//!
//! The scheduled set is threaded by value through each quarter pass.
//!
//! # Complexity
//! O(q * n * d) where q=quarters, n=projects, d=blocking dependencies/project.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::config::{CommittedPlan, EffortConfig, RoadmapConfig};
use crate::graph::DependencyGraph;
use crate::models::{
    CapacityModel, DeferralReason, DeferredProject, Project, QuarterAllocation, QuarterCapacity,
    RoadmapSchedule,
};
use crate::scoring::ScoreRecord;

/// Input container for scheduling.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleRequest<'a> {
    /// Project records.
    pub projects: &'a [Project],
    /// Score records; order of placement follows descending final score.
    pub scores: &'a [ScoreRecord],
    /// Classified dependency graph.
    pub graph: &'a DependencyGraph,
}

impl<'a> ScheduleRequest<'a> {
    /// Creates a new schedule request.
    pub fn new(projects: &'a [Project], scores: &'a [ScoreRecord], graph: &'a DependencyGraph) -> Self {
        Self {
            projects,
            scores,
            graph,
        }
    }
}

/// Greedy, score-ordered quarter scheduler.
///
/// # Example
///
/// ```
/// use u_roadmap::graph::GraphBuilder;
/// use u_roadmap::models::{CapacityModel, Project, Quarter};
/// use u_roadmap::scheduler::{QuarterScheduler, ScheduleRequest};
///
/// let projects = vec![Project::new("A").with_effort(40.0)];
/// let graph = GraphBuilder::new(&projects).build();
/// let scheduler = QuarterScheduler::new(CapacityModel::uniform(50.0, 0.0));
/// let schedule = scheduler.schedule(&ScheduleRequest::new(&projects, &[], &graph));
/// assert_eq!(schedule.quarter_of("A"), Some(Quarter::Q1));
/// ```
#[derive(Debug, Clone)]
pub struct QuarterScheduler {
    capacity: CapacityModel,
    committed: CommittedPlan,
    effort: EffortConfig,
}

impl QuarterScheduler {
    /// Creates a scheduler without a committed whitelist.
    pub fn new(capacity: CapacityModel) -> Self {
        Self {
            capacity,
            committed: CommittedPlan::default(),
            effort: EffortConfig::default(),
        }
    }

    /// Creates a scheduler from the roadmap configuration.
    pub fn from_config(config: &RoadmapConfig) -> Self {
        Self::new(config.capacity_model())
            .with_committed(config.committed.clone())
            .with_effort(config.effort.clone())
    }

    /// Sets the pre-committed whitelist.
    pub fn with_committed(mut self, committed: CommittedPlan) -> Self {
        self.committed = committed;
        self
    }

    /// Sets the effort table.
    pub fn with_effort(mut self, effort: EffortConfig) -> Self {
        self.effort = effort;
        self
    }

    /// Schedules projects into quarters.
    pub fn schedule(&self, request: &ScheduleRequest<'_>) -> RoadmapSchedule {
        let by_id = index_projects(request.projects);
        let order = placement_order(request.projects, request.scores);

        let committed_quarter = self
            .committed
            .quarter
            .or_else(|| self.capacity.quarters().first().map(|c| c.quarter));
        let committed_ids = match committed_quarter {
            Some(q) if self.capacity.get(q).is_some() => self.known_committed(&by_id),
            _ => {
                if !self.committed.project_ids.is_empty() {
                    warn!(
                        quarter = ?committed_quarter,
                        "committed quarter has no capacity entry, scheduling whitelist by score"
                    );
                }
                Vec::new()
            }
        };
        let mut committed_pending = !committed_ids.is_empty();
        let mut scheduled: HashSet<String> = committed_ids.iter().cloned().collect();

        let mut pending: Vec<&Project> = order
            .into_iter()
            .filter(|p| !scheduled.contains(&p.id))
            .collect();

        let mut schedule = RoadmapSchedule::new();
        for entry in self.capacity.quarters() {
            let mut allocation = QuarterAllocation::new(entry.quarter, entry.total());
            if committed_pending && Some(entry.quarter) == committed_quarter {
                committed_pending = false;
                let days = self.committed.consumed_days.unwrap_or(allocation.capacity);
                allocation.commit(committed_ids.clone(), days);
                debug!(
                    quarter = %entry.quarter,
                    committed = committed_ids.len(),
                    days = allocation.allocated_days,
                    "placed committed projects"
                );
            }

            let (allocation, still_pending, next) = self.run_quarter(entry, allocation, pending, scheduled, request.graph);
            pending = still_pending;
            scheduled = next;

            info!(
                quarter = %allocation.quarter,
                scheduled = allocation.scheduled_ids.len(),
                allocated = allocation.allocated_days,
                buffer = allocation.buffer_days,
                "quarter scheduled"
            );
            schedule.quarters.push(allocation);
        }

        schedule.deferred = pending
            .into_iter()
            .map(|p| {
                let reason = match request.graph.first_unmet_dependency(&p.id, &scheduled) {
                    Some(dep) => DeferralReason::UnmetDependency(dep.to_string()),
                    None => DeferralReason::InsufficientCapacity,
                };
                debug!(project = %p.id, %reason, "deferred project");
                DeferredProject {
                    project_id: p.id.clone(),
                    reason,
                }
            })
            .collect();

        if !schedule.deferred.is_empty() {
            info!(deferred = schedule.deferred.len(), "projects deferred");
        }
        schedule
    }

    /// One forward pass over `pending` for a quarter.
    ///
    /// Returns the filled allocation, projects still pending (in order) and
    /// the updated scheduled set.
    fn run_quarter<'p>(
        &self,
        entry: &QuarterCapacity,
        mut allocation: QuarterAllocation,
        pending: Vec<&'p Project>,
        mut scheduled: HashSet<String>,
        graph: &DependencyGraph,
    ) -> (QuarterAllocation, Vec<&'p Project>, HashSet<String>) {
        let mut remaining = Vec::with_capacity(pending.len());

        for project in pending {
            if let Some(dep) = graph.first_unmet_dependency(&project.id, &scheduled) {
                debug!(quarter = %entry.quarter, project = %project.id, dependency = dep, "dependency not yet scheduled");
                remaining.push(project);
                continue;
            }

            let effort = self.effort.days_for(project).max(0.0);
            if allocation.allocate(project.id.clone(), effort) {
                scheduled.insert(project.id.clone());
            } else {
                debug!(
                    quarter = %entry.quarter,
                    project = %project.id,
                    effort,
                    remaining = allocation.remaining(),
                    "does not fit"
                );
                remaining.push(project);
            }
        }

        (allocation, remaining, scheduled)
    }

    fn known_committed(&self, by_id: &HashMap<&str, &Project>) -> Vec<String> {
        let mut seen = HashSet::new();
        self.committed
            .project_ids
            .iter()
            .filter(|id| {
                if !by_id.contains_key(id.as_str()) {
                    warn!(project = %id, "committed project not found, ignoring");
                    return false;
                }
                seen.insert(id.as_str())
            })
            .cloned()
            .collect()
    }
}

/// First record per id.
fn index_projects(projects: &[Project]) -> HashMap<&str, &Project> {
    let mut by_id = HashMap::new();
    for p in projects {
        by_id.entry(p.id.as_str()).or_insert(p);
    }
    by_id
}

/// Projects in descending score order.
///
/// Scored projects come first (stable on ties); unscored projects follow in
/// input order. Each id appears once.
fn placement_order<'a>(projects: &'a [Project], scores: &[ScoreRecord]) -> Vec<&'a Project> {
    let by_id = index_projects(projects);

    let mut ranked: Vec<&ScoreRecord> = scores.iter().collect();
    ranked.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut seen = HashSet::new();
    let mut order = Vec::with_capacity(by_id.len());
    for record in ranked {
        if let Some(&p) = by_id.get(record.project_id.as_str()) {
            if seen.insert(p.id.as_str()) {
                order.push(p);
            }
        }
    }
    for p in projects {
        if seen.insert(p.id.as_str()) {
            order.push(p);
        }
    }
    order
}

impl Default for QuarterScheduler {
    fn default() -> Self {
        Self::new(CapacityModel::default())
    }
}

//! Delivery health: expected progress, status, velocity and blockers.
//!
//! # Status thresholds
//!
//! Variance is `actual − expected` in percentage points.
//!
//! | Variance | Status |
//! |----------|--------|
//! | > +20 | ahead |
//! | > −10 | on-track |
//! | > −30 | behind |
//! | otherwise | at-risk |
//!
//! A project planned for a later quarter, or not placed at all, is not yet
//! due and is always on-track.

use std::collections::HashMap;

use super::{DeliveryStatus, Tier1Result, Tier3Result, Velocity};
use crate::graph::DependencyGraph;
use crate::models::{Project, ProjectStatus, Quarter, RoadmapSchedule};
use crate::scoring::factors::DAYS_PER_QUARTER;

/// Open issues above which a backlog counts as a blocker.
const ISSUE_BACKLOG_THRESHOLD: usize = 20;

/// Outcome of the delivery assessment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryAssessment {
    pub status: DeliveryStatus,
    pub expected_pct: Option<f64>,
    pub variance: Option<f64>,
}

/// Progress expected by `current` for a project planned in `planned`.
///
/// Elapsed quarters (inclusive) over the project's duration in quarters,
/// `max(1, ceil(effort / 60))`, capped at 100. Zero before `planned`.
pub fn expected_progress(planned: Quarter, current: Quarter, effort_days: f64) -> f64 {
    let elapsed = planned.span_to(current) as f64;
    let effort = if effort_days.is_finite() {
        effort_days.max(0.0)
    } else {
        0.0
    };
    let duration = (effort / DAYS_PER_QUARTER).ceil().max(1.0);
    (elapsed / duration * 100.0).min(100.0)
}

/// Classifies a variance in percentage points.
pub fn classify_variance(variance: f64) -> DeliveryStatus {
    if variance > 20.0 {
        DeliveryStatus::Ahead
    } else if variance > -10.0 {
        DeliveryStatus::OnTrack
    } else if variance > -30.0 {
        DeliveryStatus::Behind
    } else {
        DeliveryStatus::AtRisk
    }
}

/// Assesses delivery for a project with fused progress `actual`.
pub fn assess(planned: Option<Quarter>, current: Quarter, actual: f64, effort_days: f64) -> DeliveryAssessment {
    match planned {
        Some(q) if q <= current => {
            let expected = expected_progress(q, current, effort_days);
            let variance = actual - expected;
            DeliveryAssessment {
                status: classify_variance(variance),
                expected_pct: Some(expected),
                variance: Some(variance),
            }
        }
        _ => DeliveryAssessment {
            status: DeliveryStatus::OnTrack,
            expected_pct: None,
            variance: None,
        },
    }
}

/// Qualitative velocity from tier-3 commits per week.
pub fn velocity_from(tier3: Option<&Tier3Result>) -> Velocity {
    let Some(t3) = tier3 else {
        return Velocity::Unknown;
    };
    let rate = t3.commits_per_week;
    if rate >= 5.0 {
        Velocity::High
    } else if rate >= 2.0 {
        Velocity::Moderate
    } else if rate > 0.0 {
        Velocity::Low
    } else {
        Velocity::Stalled
    }
}

/// Inputs shared by blocker detection across projects.
#[derive(Debug, Clone, Copy)]
pub struct BlockerScope<'a> {
    pub graph: &'a DependencyGraph,
    pub schedule: &'a RoadmapSchedule,
    pub statuses: &'a HashMap<&'a str, ProjectStatus>,
    pub current: Quarter,
}

/// Human-readable blockers for a project.
///
/// Reports deferred or on-hold blocking dependencies, the project's own
/// hold or deferral, phases past their quarter but incomplete, and a large
/// open-issue backlog.
pub fn collect_blockers(
    project: &Project,
    scope: &BlockerScope<'_>,
    tier1: &Tier1Result,
    tier3: Option<&Tier3Result>,
) -> Vec<String> {
    let mut blockers = Vec::new();

    if project.status == ProjectStatus::OnHold {
        blockers.push("project is on hold".to_string());
    }
    if let Some(deferral) = scope.schedule.deferral(&project.id) {
        blockers.push(format!("not scheduled: {}", deferral.reason));
    }

    for dep in scope.graph.blocked_by(&project.id) {
        if scope.schedule.is_deferred(dep) {
            blockers.push(format!("blocking dependency '{dep}' is deferred"));
        } else if scope.statuses.get(dep.as_str()) == Some(&ProjectStatus::OnHold) {
            blockers.push(format!("blocking dependency '{dep}' is on hold"));
        }
    }

    for phase in &tier1.phases {
        if let Some(q) = phase.quarter {
            if q < scope.current && !phase.completed {
                blockers.push(format!("phase '{}' planned for {q} is incomplete", phase.name));
            }
        }
    }

    if let Some(t3) = tier3 {
        let counts = &t3.activity_counts;
        if counts.open_issues > ISSUE_BACKLOG_THRESHOLD && counts.open_issues > counts.closed_issues {
            blockers.push(format!("open-issue backlog ({} open)", counts.open_issues));
        }
    }

    blockers
}

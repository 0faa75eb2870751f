//! Schedule (solution) model.
//!
//! A roadmap schedule assigns projects to quarters. Each quarter records
//! which projects were pre-committed, which were placed by the greedy
//! pass, and how much of its capacity remains as buffer. Projects that
//! were never placed are listed as deferred with a reason.
//!
//! # Invariant
//! For every quarter, `allocated_days <= capacity` and
//! `buffer_days = capacity - allocated_days >= 0`. The scheduler only
//! records an allocation after the fit check succeeds.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Quarter;

/// A complete roadmap schedule.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoadmapSchedule {
    /// Per-quarter allocations in chronological order.
    pub quarters: Vec<QuarterAllocation>,
    /// Projects never assigned to any quarter.
    pub deferred: Vec<DeferredProject>,
}

/// Allocation state of one quarter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarterAllocation {
    /// Quarter.
    pub quarter: Quarter,
    /// Pre-committed projects placed by policy, in configured order.
    pub committed_ids: Vec<String>,
    /// Projects placed by the greedy pass, in placement order.
    pub scheduled_ids: Vec<String>,
    /// Total schedulable days.
    pub capacity: f64,
    /// Days consumed by committed and scheduled projects.
    pub allocated_days: f64,
    /// Unused capacity.
    pub buffer_days: f64,
}

impl QuarterAllocation {
    /// Creates an empty allocation with the full capacity as buffer.
    pub fn new(quarter: Quarter, capacity: f64) -> Self {
        let capacity = capacity.max(0.0);
        Self {
            quarter,
            committed_ids: Vec::new(),
            scheduled_ids: Vec::new(),
            capacity,
            allocated_days: 0.0,
            buffer_days: capacity,
        }
    }

    /// Remaining capacity.
    #[inline]
    pub fn remaining(&self) -> f64 {
        self.buffer_days
    }

    /// Whether `days` fits in the remaining capacity.
    #[inline]
    pub fn fits(&self, days: f64) -> bool {
        days <= self.buffer_days
    }

    /// Records a greedy allocation. Returns `false` (and changes nothing)
    /// if it does not fit.
    pub fn allocate(&mut self, project_id: impl Into<String>, days: f64) -> bool {
        if !self.fits(days) {
            return false;
        }
        self.scheduled_ids.push(project_id.into());
        self.consume(days);
        true
    }

    /// Records committed projects consuming `days` (clamped to remaining capacity).
    pub fn commit(&mut self, project_ids: Vec<String>, days: f64) {
        self.committed_ids.extend(project_ids);
        self.consume(days.clamp(0.0, self.buffer_days));
    }

    fn consume(&mut self, days: f64) {
        self.allocated_days += days;
        self.buffer_days = (self.capacity - self.allocated_days).max(0.0);
    }

    /// Utilization (allocated / capacity). `None` when capacity is zero.
    pub fn utilization(&self) -> Option<f64> {
        if self.capacity <= 0.0 {
            None
        } else {
            Some(self.allocated_days / self.capacity)
        }
    }

    /// All project ids placed in this quarter (committed first).
    pub fn project_ids(&self) -> impl Iterator<Item = &str> {
        self.committed_ids
            .iter()
            .chain(self.scheduled_ids.iter())
            .map(|s| s.as_str())
    }
}

/// A project that could not be placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredProject {
    /// Project id.
    pub project_id: String,
    /// Why it was not placed.
    pub reason: DeferralReason,
}

/// Why a project was deferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "dependency", rename_all = "snake_case")]
pub enum DeferralReason {
    /// A blocking dependency was never scheduled.
    UnmetDependency(String),
    /// Dependencies were satisfiable but no quarter had room.
    InsufficientCapacity,
}

impl fmt::Display for DeferralReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeferralReason::UnmetDependency(dep) => write!(f, "blocked by unscheduled dependency '{dep}'"),
            DeferralReason::InsufficientCapacity => write!(f, "insufficient capacity"),
        }
    }
}

impl RoadmapSchedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Quarter a project was placed in, if any.
    pub fn quarter_of(&self, project_id: &str) -> Option<Quarter> {
        self.quarters
            .iter()
            .find(|q| q.project_ids().any(|id| id == project_id))
            .map(|q| q.quarter)
    }

    /// Allocation for a quarter.
    pub fn allocation(&self, quarter: Quarter) -> Option<&QuarterAllocation> {
        self.quarters.iter().find(|q| q.quarter == quarter)
    }

    /// Deferral entry for a project.
    pub fn deferral(&self, project_id: &str) -> Option<&DeferredProject> {
        self.deferred.iter().find(|d| d.project_id == project_id)
    }

    /// Whether a project was deferred.
    pub fn is_deferred(&self, project_id: &str) -> bool {
        self.deferral(project_id).is_some()
    }

    /// Number of projects placed (committed + scheduled).
    pub fn placed_count(&self) -> usize {
        self.quarters.iter().map(|q| q.project_ids().count()).sum()
    }

    /// `(quarter, project_id)` for every placement, chronologically.
    pub fn placements(&self) -> impl Iterator<Item = (Quarter, &str)> {
        self.quarters
            .iter()
            .flat_map(|q| q.project_ids().map(move |id| (q.quarter, id)))
    }

    /// Whether every quarter honors its capacity.
    pub fn within_capacity(&self) -> bool {
        self.quarters
            .iter()
            .all(|q| q.allocated_days <= q.capacity + 1e-9 && q.buffer_days >= 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schedule() -> RoadmapSchedule {
        let mut q1 = QuarterAllocation::new(Quarter::Q1, 100.0);
        q1.commit(vec!["C1".into()], 100.0);
        let mut q2 = QuarterAllocation::new(Quarter::Q2, 100.0);
        assert!(q2.allocate("P1", 60.0));
        RoadmapSchedule {
            quarters: vec![q1, q2],
            deferred: vec![DeferredProject {
                project_id: "P9".into(),
                reason: DeferralReason::UnmetDependency("P8".into()),
            }],
        }
    }

    #[test]
    fn test_allocate_respects_capacity() {
        let mut q = QuarterAllocation::new(Quarter::Q2, 100.0);
        assert!(q.allocate("A", 60.0));
        assert!(!q.allocate("B", 50.0));
        assert!(q.allocate("C", 40.0));
        assert_eq!(q.scheduled_ids, vec!["A", "C"]);
        assert!((q.allocated_days - 100.0).abs() < 1e-10);
        assert!((q.buffer_days - 0.0).abs() < 1e-10);
        assert!((q.utilization().unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_commit_clamps_to_capacity() {
        let mut q = QuarterAllocation::new(Quarter::Q1, 80.0);
        q.commit(vec!["X".into(), "Y".into()], 500.0);
        assert!((q.allocated_days - 80.0).abs() < 1e-10);
        assert!((q.buffer_days - 0.0).abs() < 1e-10);
        assert_eq!(q.project_ids().collect::<Vec<_>>(), vec!["X", "Y"]);
    }

    #[test]
    fn test_queries() {
        let s = sample_schedule();
        assert_eq!(s.quarter_of("C1"), Some(Quarter::Q1));
        assert_eq!(s.quarter_of("P1"), Some(Quarter::Q2));
        assert_eq!(s.quarter_of("P9"), None);
        assert!(s.is_deferred("P9"));
        assert_eq!(s.placed_count(), 2);
        assert!(s.within_capacity());
    }

    #[test]
    fn test_deferral_reason_display() {
        assert_eq!(
            DeferralReason::UnmetDependency("P8".into()).to_string(),
            "blocked by unscheduled dependency 'P8'"
        );
        assert_eq!(
            DeferralReason::InsufficientCapacity.to_string(),
            "insufficient capacity"
        );
    }

    #[test]
    fn test_zero_capacity_utilization() {
        let q = QuarterAllocation::new(Quarter::Q4, 0.0);
        assert!(q.utilization().is_none());
        assert!(!q.fits(1.0));
        assert!(q.fits(0.0));
    }
}

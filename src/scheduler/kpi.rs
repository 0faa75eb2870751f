//! Schedule quality metrics (KPIs).
//!
//! Computes capacity-use indicators from a completed roadmap schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total Capacity | Sum of quarter capacities (days) |
//! | Total Allocated | Sum of allocated days |
//! | Total Buffer | Sum of unused days |
//! | Avg Utilization | Mean allocated/capacity over quarters with capacity |
//! | Scheduled Rate | Placed / (placed + deferred) |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{Quarter, RoadmapSchedule};

/// Schedule performance indicators.
///
/// All capacity values are in engineering days.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleKpi {
    /// Sum of quarter capacities.
    pub total_capacity_days: f64,
    /// Sum of allocated days (committed + scheduled).
    pub total_allocated_days: f64,
    /// Sum of buffer days.
    pub total_buffer_days: f64,
    /// Per-quarter utilization (0.0..1.0); quarters without capacity are omitted.
    pub utilization_by_quarter: BTreeMap<Quarter, f64>,
    /// Average utilization over quarters with capacity (0.0..1.0).
    pub avg_utilization: f64,
    /// Projects placed in some quarter.
    pub scheduled_count: usize,
    /// Projects deferred.
    pub deferred_count: usize,
    /// Fraction of projects placed (0.0..1.0).
    pub scheduled_rate: f64,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule.
    pub fn calculate(schedule: &RoadmapSchedule) -> Self {
        let total_capacity_days: f64 = schedule.quarters.iter().map(|q| q.capacity).sum();
        let total_allocated_days: f64 = schedule.quarters.iter().map(|q| q.allocated_days).sum();
        let total_buffer_days: f64 = schedule.quarters.iter().map(|q| q.buffer_days).sum();

        let utilization_by_quarter: BTreeMap<Quarter, f64> = schedule
            .quarters
            .iter()
            .filter_map(|q| q.utilization().map(|u| (q.quarter, u)))
            .collect();
        let avg_utilization = if utilization_by_quarter.is_empty() {
            0.0
        } else {
            let sum: f64 = utilization_by_quarter.values().sum();
            sum / utilization_by_quarter.len() as f64
        };

        let scheduled_count = schedule.placed_count();
        let deferred_count = schedule.deferred.len();
        let total = scheduled_count + deferred_count;
        // Nothing to place → nothing missed
        let scheduled_rate = if total == 0 {
            1.0
        } else {
            scheduled_count as f64 / total as f64
        };

        Self {
            total_capacity_days,
            total_allocated_days,
            total_buffer_days,
            utilization_by_quarter,
            avg_utilization,
            scheduled_count,
            deferred_count,
            scheduled_rate,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, min_utilization: f64, min_scheduled_rate: f64) -> bool {
        self.avg_utilization >= min_utilization && self.scheduled_rate >= min_scheduled_rate
    }
}

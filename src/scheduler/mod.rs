//! Quarter capacity scheduling and KPI evaluation.
//!
//! Assigns scored projects to fixed-capacity quarters, honoring blocking
//! dependencies.
//!
//! # Algorithm
//!
//! [`QuarterScheduler`] is a greedy, score-ordered, single forward pass per
//! quarter. A configured whitelist of pre-committed projects is placed
//! first. It is not an optimal bin-packer: a project skipped for capacity
//! is not revisited within the same quarter.
//!
//! # KPI
//!
//! [`ScheduleKpi`] summarizes capacity use: allocated and buffer days,
//! per-quarter utilization and the share of projects placed.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Martello & Toth (1990), "Knapsack Problems", Ch. 8: Bin-packing heuristics

mod greedy;
mod kpi;

pub use greedy::{QuarterScheduler, ScheduleRequest};
pub use kpi::ScheduleKpi;

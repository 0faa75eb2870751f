//! Portfolio roadmap engine.
//!
//! Turns a set of proposed initiatives into a ranked, capacity-feasible
//! quarter plan and re-estimates delivery progress from three independent
//! evidence sources.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Project`, `Quarter`, `CapacityModel`,
//!   `MetricsSnapshot`, `RoadmapSchedule`
//! - **`validation`**: Input integrity checks (duplicate IDs, unknown dependencies)
//! - **`graph`**: Dependency graph with edge promotion, cycle detection and
//!   blocking sets
//! - **`scoring`**: Weighted factor engine and hybrid (multi-factor + ROI) scorer
//! - **`scheduler`**: Greedy quarter scheduler and schedule KPIs
//! - **`progress`**: Phase, signal and repository tiers fused into one estimate
//! - **`pipeline`**: Strictly ordered run over one portfolio
//! - **`config`**: TOML policy tables
//!
//! # Pipeline
//!
//! ```text
//! projects + metrics
//!   → graph (promotion, cycles, blocked_by)
//!   → scores (ranked)
//!   → schedule (committed + greedy, deferrals)
//!   → progress (tier 1 + tier 2 + tier 3 → fused, delivery status)
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Kahn (1962), "Topological sorting of large networks"

pub mod config;
pub mod error;
pub mod graph;
pub mod models;
pub mod pipeline;
pub mod progress;
pub mod scheduler;
pub mod scoring;
pub mod validation;

pub use error::{Result, RoadmapError};

//! Roadmap domain models.
//!
//! Provides the core data types for representing a project portfolio and
//! its quarter plan. Records are immutable per run; everything downstream
//! (graph, scores, schedule, progress) refers to projects by id.
//!
//! # Domain Mappings
//!
//! | u-roadmap | Scheduling analogue |
//! |-----------|---------------------|
//! | Project | Task/Job |
//! | Phase | Activity |
//! | QuarterCapacity | Resource capacity over a horizon bucket |
//! | RoadmapSchedule | Schedule |

mod capacity;
mod metrics;
mod project;
mod quarter;
mod schedule;

pub use capacity::{CapacityModel, QuarterCapacity};
pub use metrics::MetricsSnapshot;
pub use project::{
    DeclaredDependency, DependencyKind, Phase, Project, ProjectStatus, StrategicDriver,
    StrategicPillar, DEFAULT_EFFORT_DAYS,
};
pub use quarter::Quarter;
pub use schedule::{DeferralReason, DeferredProject, QuarterAllocation, RoadmapSchedule};

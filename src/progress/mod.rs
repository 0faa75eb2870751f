//! Multi-tier progress tracking.
//!
//! Each project's execution progress is estimated from three independent,
//! imperfect sources and fused into one confidence-weighted number.
//!
//! # Tiers
//!
//! | Tier | Evidence | Module |
//! |------|----------|--------|
//! | 1 | Declared phases (structured, tabular, free text) | [`phases`] |
//! | 2 | Behavioral metrics against per-project targets | [`signals`] |
//! | 3 | Repository activity (commits, PRs, issues, releases, roadmap file) | [`activity`], [`github`] |
//!
//! Tiers 1 and 2 are pure functions of the inputs. Tier 3 is fetched over
//! the network and may be unavailable; an unavailable tier carries no
//! weight in [`fusion`] rather than counting as zero.
//!
//! # Delivery status
//!
//! [`delivery`] compares fused progress against the progress expected at
//! the current quarter and classifies the variance.

pub mod activity;
pub mod delivery;
pub mod fusion;
pub mod github;
pub mod phases;
pub mod signals;
mod tracker;

pub use activity::{parse_checklist, score_activity};
pub use delivery::{classify_variance, expected_progress, velocity_from};
pub use fusion::fuse;
pub use github::{GitHubClient, RepositoryActivitySource};
pub use phases::analyze_phases;
pub use signals::{analyze_signals, SignalFormula};
pub use tracker::ProgressTracker;

use serde::{Deserialize, Serialize};

use crate::models::Quarter;

/// How much a tier's evidence can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    None,
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Whether the tier contributes to fusion.
    #[inline]
    pub fn is_available(self) -> bool {
        self != Confidence::None
    }

    /// Confidence from the number of independent readings (≥3 high).
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => Confidence::None,
            1 => Confidence::Low,
            2 => Confidence::Medium,
            _ => Confidence::High,
        }
    }
}

/// Where a tier-1 phase was found.
///
/// Variant order is merge priority: earlier wins on conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseSource {
    Structured,
    Tabular,
    FreeText,
}

/// A phase after merging all tier-1 sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedPhase {
    pub name: String,
    /// Quarter the phase is planned for, if any hint names one.
    pub quarter: Option<Quarter>,
    pub completed: bool,
    pub source: PhaseSource,
}

/// Tier 1: declared-phase completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier1Result {
    pub progress_pct: f64,
    pub completed_phases: usize,
    pub total_phases: usize,
    pub confidence: Confidence,
    /// Completed count vs. phases due by the current quarter; `None`
    /// without timeline hints.
    pub on_track: Option<bool>,
    pub phases: Vec<TrackedPhase>,
}

impl Tier1Result {
    /// A result with no phases found.
    pub fn empty() -> Self {
        Self {
            progress_pct: 0.0,
            completed_phases: 0,
            total_phases: 0,
            confidence: Confidence::None,
            on_track: None,
            phases: Vec::new(),
        }
    }
}

/// One tier-2 metric compared with its target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalReading {
    pub metric: String,
    pub actual: f64,
    pub target: f64,
    /// `actual / target × 100`, uncapped.
    pub attainment_pct: f64,
}

/// Tier 2: behavioral signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier2Result {
    pub progress_pct: f64,
    pub formula: SignalFormula,
    pub signals: Vec<SignalReading>,
    pub confidence: Confidence,
}

/// Completion of a markdown checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChecklistProgress {
    pub done: usize,
    pub total: usize,
}

impl ChecklistProgress {
    /// `done / total × 100`; `None` for an empty checklist.
    pub fn ratio_pct(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.done as f64 / self.total as f64 * 100.0)
        }
    }
}

/// Raw repository activity since a project's start date.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCounts {
    pub commits: usize,
    pub merged_prs: usize,
    pub open_prs: usize,
    pub open_issues: usize,
    pub closed_issues: usize,
    pub releases: usize,
    /// Roadmap checklist, when the repository has one.
    pub roadmap: Option<ChecklistProgress>,
}

/// How the tier-3 percentage was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityBasis {
    /// Roadmap checklist ratio.
    Roadmap,
    /// Weighted activity composite.
    Composite,
}

/// Tier 3: repository activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier3Result {
    pub progress_pct: f64,
    pub activity_counts: ActivityCounts,
    pub commits_per_week: f64,
    pub basis: ActivityBasis,
    pub confidence: Confidence,
}

/// Qualitative delivery health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryStatus {
    OnTrack,
    Ahead,
    Behind,
    AtRisk,
}

/// Qualitative commit velocity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Velocity {
    High,
    Moderate,
    Low,
    Stalled,
    Unknown,
}

/// Fused progress report for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub project_id: String,
    pub tier1: Tier1Result,
    pub tier2: Tier2Result,
    /// `None` when the repository was not consulted or the fetch failed.
    pub tier3: Option<Tier3Result>,
    pub overall_progress_pct: f64,
    pub delivery_status: DeliveryStatus,
    /// Quarter the project was scheduled in; `None` if deferred.
    pub planned_quarter: Option<Quarter>,
    /// Progress expected by the current quarter; `None` when not yet due.
    pub expected_progress_pct: Option<f64>,
    /// `overall − expected`; `None` when not yet due.
    pub variance: Option<f64>,
    pub blockers: Vec<String>,
    pub velocity: Velocity,
}

//! Project (initiative) record.
//!
//! A project is a proposed initiative with financial and strategic
//! attributes, declared dependencies on other projects, and an ordered
//! list of delivery phases. Records are read once per run and never
//! mutated; derived structures refer to them by `id`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Effort assumed when a record carries no estimate (person-days).
pub const DEFAULT_EFFORT_DAYS: f64 = 60.0;

/// A proposed initiative.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Estimated value (currency units). `None` = unknown.
    #[serde(default)]
    pub value: Option<f64>,
    /// Forecast ROI in percent. `None` = unknown.
    #[serde(default)]
    pub roi_percent: Option<f64>,
    /// Estimated effort in person-days.
    #[serde(default = "default_effort")]
    pub effort_days: f64,
    /// Dependencies on other projects, as declared by the source document.
    #[serde(default)]
    pub declared_dependencies: Vec<DeclaredDependency>,
    /// Strategic pillars this project supports.
    #[serde(default)]
    pub strategic_pillars: BTreeSet<StrategicPillar>,
    /// Business drivers this project serves.
    #[serde(default)]
    pub strategic_drivers: BTreeSet<StrategicDriver>,
    /// Delivery phases in order.
    #[serde(default)]
    pub phases: Vec<Phase>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: ProjectStatus,
    /// Named champion, if one has been assigned.
    #[serde(default)]
    pub champion: Option<String>,
    /// Project start date, used as the lower bound for repository activity.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// External repository reference (`owner/repo`).
    #[serde(default)]
    pub repository: Option<String>,
    /// Raw narrative text from the source document (phase headings, checklists).
    #[serde(default)]
    pub narrative: Option<String>,
}

fn default_effort() -> f64 {
    DEFAULT_EFFORT_DAYS
}

/// A dependency as declared in the input record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredDependency {
    /// Referenced project id (may not exist in the project set).
    pub target_id: String,
    /// Declared strength; undeclared dependencies are advisory.
    #[serde(default)]
    pub kind: DependencyKind,
    /// Free-text note attached to the dependency.
    #[serde(default)]
    pub note: Option<String>,
}

impl DeclaredDependency {
    /// Creates a dependency of the given kind.
    pub fn new(target_id: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            target_id: target_id.into(),
            kind,
            note: None,
        }
    }

    /// Creates a blocking dependency.
    pub fn hard(target_id: impl Into<String>) -> Self {
        Self::new(target_id, DependencyKind::Hard)
    }

    /// Creates an advisory dependency.
    pub fn soft(target_id: impl Into<String>) -> Self {
        Self::new(target_id, DependencyKind::Soft)
    }

    /// Attaches a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Dependency strength.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DependencyKind {
    /// Prerequisite: must be scheduled before the dependent project.
    Hard,
    /// Advisory relationship; does not block scheduling.
    #[default]
    Soft,
}

/// Strategic pillar tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategicPillar {
    Productivity,
    CustomerExperience,
    Innovation,
    OperationalExcellence,
    Talent,
    Governance,
}

/// Business driver tags. Only some carry a strategic bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategicDriver {
    Growth,
    Retention,
    Innovation,
    Efficiency,
    Compliance,
    CostReduction,
}

/// A delivery phase as recorded in the structured source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    /// Phase name (e.g. "Pilot", "Rollout").
    pub name: String,
    /// Free-form timing hint (e.g. "Q2 2025").
    #[serde(default)]
    pub timeline_hint: Option<String>,
    /// Whether the phase has been completed.
    #[serde(default)]
    pub completed: bool,
}

impl Phase {
    /// Creates an incomplete phase with no timing hint.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            timeline_hint: None,
            completed: false,
        }
    }

    /// Sets the timing hint.
    pub fn with_timeline(mut self, hint: impl Into<String>) -> Self {
        self.timeline_hint = Some(hint.into());
        self
    }

    /// Marks the phase completed.
    pub fn completed(mut self) -> Self {
        self.completed = true;
        self
    }
}

/// Project lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Proposed,
    InProgress,
    Committed,
    Completed,
    OnHold,
}

impl ProjectStatus {
    /// Whether work is actively underway.
    pub fn is_active(self) -> bool {
        matches!(self, ProjectStatus::InProgress | ProjectStatus::Committed)
    }
}

impl Project {
    /// Creates a project with the given id and default attributes.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            value: None,
            roi_percent: None,
            effort_days: DEFAULT_EFFORT_DAYS,
            declared_dependencies: Vec::new(),
            strategic_pillars: BTreeSet::new(),
            strategic_drivers: BTreeSet::new(),
            phases: Vec::new(),
            status: ProjectStatus::Proposed,
            champion: None,
            start_date: None,
            repository: None,
            narrative: None,
        }
    }

    /// Sets the project name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the estimated value.
    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    /// Sets the forecast ROI (percent).
    pub fn with_roi(mut self, roi_percent: f64) -> Self {
        self.roi_percent = Some(roi_percent);
        self
    }

    /// Sets the effort estimate (person-days).
    pub fn with_effort(mut self, days: f64) -> Self {
        self.effort_days = days;
        self
    }

    /// Adds a declared dependency.
    pub fn with_dependency(mut self, dependency: DeclaredDependency) -> Self {
        self.declared_dependencies.push(dependency);
        self
    }

    /// Adds a strategic pillar.
    pub fn with_pillar(mut self, pillar: StrategicPillar) -> Self {
        self.strategic_pillars.insert(pillar);
        self
    }

    /// Adds a strategic driver.
    pub fn with_driver(mut self, driver: StrategicDriver) -> Self {
        self.strategic_drivers.insert(driver);
        self
    }

    /// Appends a phase.
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phases.push(phase);
        self
    }

    /// Sets the lifecycle status.
    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    /// Names the project champion.
    pub fn with_champion(mut self, champion: impl Into<String>) -> Self {
        self.champion = Some(champion.into());
        self
    }

    /// Sets the start date.
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Sets the external repository reference.
    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    /// Sets the raw narrative text.
    pub fn with_narrative(mut self, narrative: impl Into<String>) -> Self {
        self.narrative = Some(narrative.into());
        self
    }

    /// Value expressed in millions (0 when unknown).
    pub fn value_in_millions(&self) -> f64 {
        self.value.map(|v| v / 1_000_000.0).unwrap_or(0.0)
    }

    /// Ids of declared HARD dependencies, in declaration order.
    pub fn hard_dependency_ids(&self) -> impl Iterator<Item = &str> {
        self.declared_dependencies
            .iter()
            .filter(|d| d.kind == DependencyKind::Hard)
            .map(|d| d.target_id.as_str())
    }
}

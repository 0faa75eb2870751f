//! Roadmap configuration loading.
//!
//! Loads configuration from `./u-roadmap.toml` (or `U_ROADMAP_CONFIG` env).
//! Every policy table the engine consults lives here: quarter capacity,
//! the pre-committed whitelist, effort overrides, scoring weights,
//! promotion thresholds, tier-2 signal targets and the repository mapping.
//! All fields default, so an empty file is a valid configuration.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, RoadmapError};
use crate::models::{CapacityModel, Project, Quarter, QuarterCapacity, DEFAULT_EFFORT_DAYS};
use crate::progress::SignalFormula;

/// Root configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct RoadmapConfig {
    /// Quarter the run is evaluated in.
    #[serde(default = "default_current_quarter")]
    pub current_quarter: Quarter,

    /// Calendar year the four quarters belong to.
    #[serde(default = "default_planning_year")]
    pub planning_year: i32,

    /// Per-quarter capacity table.
    #[serde(default = "default_capacity")]
    pub capacity: Vec<QuarterCapacity>,

    /// Pre-committed projects that bypass scoring.
    #[serde(default)]
    pub committed: CommittedPlan,

    /// Effort estimates.
    #[serde(default)]
    pub effort: EffortConfig,

    /// Hybrid scoring weights and keyword lists.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// SOFT → HARD promotion thresholds.
    #[serde(default)]
    pub promotion: PromotionConfig,

    /// Progress tracking settings.
    #[serde(default)]
    pub progress: ProgressConfig,
}

fn default_current_quarter() -> Quarter {
    Quarter::Q1
}

fn default_planning_year() -> i32 {
    2025
}

fn default_capacity() -> Vec<QuarterCapacity> {
    CapacityModel::default().quarters().to_vec()
}

impl Default for RoadmapConfig {
    fn default() -> Self {
        Self {
            current_quarter: default_current_quarter(),
            planning_year: default_planning_year(),
            capacity: default_capacity(),
            committed: CommittedPlan::default(),
            effort: EffortConfig::default(),
            scoring: ScoringConfig::default(),
            promotion: PromotionConfig::default(),
            progress: ProgressConfig::default(),
        }
    }
}

/// Pre-committed whitelist.
///
/// Listed projects are placed in `quarter` before the greedy pass and
/// consume `consumed_days` of its capacity (the whole quarter when unset).
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CommittedPlan {
    /// Quarter the whitelist occupies. Defaults to the first capacity quarter.
    #[serde(default)]
    pub quarter: Option<Quarter>,
    /// Project ids in placement order.
    #[serde(default)]
    pub project_ids: Vec<String>,
    /// Capacity consumed. `None` = the entire quarter.
    #[serde(default)]
    pub consumed_days: Option<f64>,
}

/// Effort table.
#[derive(Debug, Deserialize, Clone)]
pub struct EffortConfig {
    /// Effort used when neither override nor record supplies one.
    #[serde(default = "default_effort_days")]
    pub default_days: f64,
    /// Project-specific estimates (project id → days).
    #[serde(default)]
    pub overrides: BTreeMap<String, f64>,
}

fn default_effort_days() -> f64 {
    DEFAULT_EFFORT_DAYS
}

impl EffortConfig {
    /// Effort estimate for a project: override, else record, else default.
    pub fn days_for(&self, project: &Project) -> f64 {
        if let Some(days) = self.overrides.get(&project.id) {
            return *days;
        }
        if project.effort_days.is_finite() && project.effort_days > 0.0 {
            project.effort_days
        } else {
            self.default_days
        }
    }
}

impl Default for EffortConfig {
    fn default() -> Self {
        Self {
            default_days: default_effort_days(),
            overrides: BTreeMap::new(),
        }
    }
}

/// Weights of the four multi-factor components.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct FactorWeights {
    #[serde(default = "default_financial_weight")]
    pub financial: f64,
    #[serde(default = "default_strategic_weight")]
    pub strategic: f64,
    #[serde(default = "default_feasibility_weight")]
    pub feasibility: f64,
    #[serde(default = "default_time_to_value_weight")]
    pub time_to_value: f64,
}

fn default_financial_weight() -> f64 {
    0.30
}
fn default_strategic_weight() -> f64 {
    0.25
}
fn default_feasibility_weight() -> f64 {
    0.25
}
fn default_time_to_value_weight() -> f64 {
    0.20
}

impl Default for FactorWeights {
    fn default() -> Self {
        Self {
            financial: default_financial_weight(),
            strategic: default_strategic_weight(),
            feasibility: default_feasibility_weight(),
            time_to_value: default_time_to_value_weight(),
        }
    }
}

/// Blend of multi-factor score and ROI score.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    pub multi_factor: f64,
    pub roi: f64,
}

impl BlendWeights {
    pub const EARLY: BlendWeights = BlendWeights {
        multi_factor: 0.7,
        roi: 0.3,
    };
    pub const LATE: BlendWeights = BlendWeights {
        multi_factor: 0.6,
        roi: 0.4,
    };
}

/// Scoring configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ScoringConfig {
    /// Multi-factor component weights.
    #[serde(default)]
    pub factor_weights: FactorWeights,
    /// Blend used in Q1–Q2.
    #[serde(default = "default_early_weights")]
    pub early_weights: BlendWeights,
    /// Blend used in Q3–Q4, when ROI forecasts have matured.
    #[serde(default = "default_late_weights")]
    pub late_weights: BlendWeights,
    /// Phase-name fragments marking an exploratory stage.
    #[serde(default = "default_pilot_keywords")]
    pub pilot_keywords: Vec<String>,
    /// Dependency fragments marking an external vendor.
    #[serde(default = "default_vendor_keywords")]
    pub vendor_keywords: Vec<String>,
}

fn default_early_weights() -> BlendWeights {
    BlendWeights::EARLY
}

fn default_late_weights() -> BlendWeights {
    BlendWeights::LATE
}

fn default_pilot_keywords() -> Vec<String> {
    ["pilot", "poc", "proof of concept", "prototype", "exploration", "exploratory", "discovery", "experiment", "mvp"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_vendor_keywords() -> Vec<String> {
    ["vendor", "external", "third-party", "third party", "supplier", "contractor"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            factor_weights: FactorWeights::default(),
            early_weights: default_early_weights(),
            late_weights: default_late_weights(),
            pilot_keywords: default_pilot_keywords(),
            vendor_keywords: default_vendor_keywords(),
        }
    }
}

impl ScoringConfig {
    /// Blend weights for the given quarter.
    pub fn blend_for(&self, quarter: Quarter) -> BlendWeights {
        if quarter.is_early() {
            self.early_weights
        } else {
            self.late_weights
        }
    }
}

/// Thresholds that upgrade SOFT edges to HARD.
#[derive(Debug, Deserialize, Clone)]
pub struct PromotionConfig {
    /// Promote when any productivity multiplier exceeds this.
    #[serde(default = "default_productivity_threshold")]
    pub productivity_threshold: f64,
    /// Promote when any engagement multiplier exceeds this.
    #[serde(default = "default_engagement_threshold")]
    pub engagement_threshold: f64,
    /// Promote when the perceived-value gap between `value_gap_tools` exceeds this.
    #[serde(default = "default_value_gap_threshold")]
    pub value_gap_threshold: f64,
    /// Promote when the adoption rate of `adoption_tool` exceeds this (percent).
    #[serde(default = "default_adoption_threshold")]
    pub adoption_threshold: f64,
    /// The two tools compared for the perceived-value gap. Empty disables the trigger.
    #[serde(default = "default_value_gap_tools")]
    pub value_gap_tools: Vec<String>,
    /// Tool whose adoption rate is checked.
    #[serde(default = "default_adoption_tool")]
    pub adoption_tool: Option<String>,
    /// Restricts promotion to edges targeting these ids. Empty = all edges.
    #[serde(default)]
    pub scope: Vec<String>,
}

fn default_productivity_threshold() -> f64 {
    10.0
}
fn default_engagement_threshold() -> f64 {
    4.0
}
fn default_value_gap_threshold() -> f64 {
    30.0
}
fn default_adoption_threshold() -> f64 {
    80.0
}
fn default_value_gap_tools() -> Vec<String> {
    vec!["claude".to_string(), "copilot".to_string()]
}
fn default_adoption_tool() -> Option<String> {
    Some("claude".to_string())
}

impl Default for PromotionConfig {
    fn default() -> Self {
        Self {
            productivity_threshold: default_productivity_threshold(),
            engagement_threshold: default_engagement_threshold(),
            value_gap_threshold: default_value_gap_threshold(),
            adoption_threshold: default_adoption_threshold(),
            value_gap_tools: default_value_gap_tools(),
            adoption_tool: default_adoption_tool(),
            scope: Vec::new(),
        }
    }
}

/// Tier weights used by progress fusion.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub tier1: f64,
    pub tier2: f64,
    #[serde(default)]
    pub tier3: f64,
}

impl FusionWeights {
    pub const THREE_TIER: FusionWeights = FusionWeights {
        tier1: 0.4,
        tier2: 0.3,
        tier3: 0.3,
    };
    pub const TWO_TIER: FusionWeights = FusionWeights {
        tier1: 0.5,
        tier2: 0.5,
        tier3: 0.0,
    };

    fn is_valid(&self) -> bool {
        let all = [self.tier1, self.tier2, self.tier3];
        all.iter().all(|w| *w >= 0.0) && all.iter().sum::<f64>() > 0.0
    }
}

/// Tier-2 target table for one project.
#[derive(Debug, Deserialize, Clone)]
pub struct SignalTable {
    /// Aggregation formula.
    #[serde(default)]
    pub formula: SignalFormula,
    /// Metric key (see `MetricsSnapshot::lookup`) → target value.
    #[serde(default)]
    pub targets: BTreeMap<String, f64>,
}

/// Repository-hosting API settings for tier 3.
#[derive(Debug, Deserialize, Clone)]
pub struct RepositoryConfig {
    /// Master switch for tier 3.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Environment variable holding the access token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    /// Per-project fetch budget.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Concurrent project fetches.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Pages (of 100 items) fetched per listing.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Roadmap checklist file looked up in each repository.
    #[serde(default = "default_roadmap_path")]
    pub roadmap_path: Option<String>,
    /// Project id → `owner/repo`. Overrides the record's own reference.
    #[serde(default)]
    pub mapping: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}
fn default_api_base() -> String {
    "https://api.github.com".to_string()
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_max_concurrency() -> usize {
    4
}
fn default_max_pages() -> u32 {
    3
}
fn default_roadmap_path() -> Option<String> {
    Some("ROADMAP.md".to_string())
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            api_base: default_api_base(),
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
            max_concurrency: default_max_concurrency(),
            max_pages: default_max_pages(),
            roadmap_path: default_roadmap_path(),
            mapping: BTreeMap::new(),
        }
    }
}

impl RepositoryConfig {
    /// Reads the access token from the configured environment variable.
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
    }
}

/// Progress tracking configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ProgressConfig {
    /// Weights when all three tiers may contribute.
    #[serde(default = "default_fusion_weights")]
    pub weights: FusionWeights,
    /// Weights when tier 3 is unavailable.
    #[serde(default = "default_fallback_weights")]
    pub fallback_weights: FusionWeights,
    /// Tier-2 target tables by project id.
    #[serde(default)]
    pub signals: BTreeMap<String, SignalTable>,
    /// Tier-3 repository settings.
    #[serde(default)]
    pub repository: RepositoryConfig,
}

fn default_fusion_weights() -> FusionWeights {
    FusionWeights::THREE_TIER
}

fn default_fallback_weights() -> FusionWeights {
    FusionWeights::TWO_TIER
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            weights: default_fusion_weights(),
            fallback_weights: default_fallback_weights(),
            signals: BTreeMap::new(),
            repository: RepositoryConfig::default(),
        }
    }
}

impl RoadmapConfig {
    /// Environment variable for config path override.
    pub const ENV_CONFIG_PATH: &'static str = "U_ROADMAP_CONFIG";

    /// Default config filename.
    pub const DEFAULT_CONFIG_FILENAME: &'static str = "u-roadmap.toml";

    /// Load configuration from file.
    ///
    /// Resolution order:
    /// 1. `U_ROADMAP_CONFIG` environment variable
    /// 2. `./u-roadmap.toml`
    ///
    /// If the config file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let path = Self::resolve_config_path();

        if !path.exists() {
            tracing::info!(
                path = %path.display(),
                "roadmap config not found, using defaults"
            );
            return Ok(Self::default());
        }

        Self::load_from_path(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            RoadmapError::config_with_source(
                format!("failed to read config at {}", path.display()),
                e,
            )
        })?;

        Self::parse(&contents)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(contents: &str) -> Result<Self> {
        let cfg: RoadmapConfig = toml::from_str(contents)
            .map_err(|e| RoadmapError::config_with_source("failed to parse config", e))?;

        cfg.validate()?;
        Ok(cfg)
    }

    fn resolve_config_path() -> PathBuf {
        if let Ok(path) = std::env::var(Self::ENV_CONFIG_PATH) {
            return PathBuf::from(path);
        }
        PathBuf::from(Self::DEFAULT_CONFIG_FILENAME)
    }

    /// Checks internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.capacity.is_empty() {
            return Err(RoadmapError::config("capacity table is empty"));
        }
        if let Some(q) = self
            .capacity
            .iter()
            .find(|q| q.core_days < 0.0 || q.champion_days < 0.0 || q.total() < 0.0)
        {
            return Err(RoadmapError::config(format!(
                "negative capacity for {}",
                q.quarter
            )));
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(q) = self.capacity.iter().find(|q| !seen.insert(q.quarter)) {
            return Err(RoadmapError::config(format!(
                "capacity table lists {} more than once",
                q.quarter
            )));
        }
        if let Some(q) = self.committed.quarter {
            if !seen.contains(&q) {
                return Err(RoadmapError::config(format!(
                    "committed quarter {q} has no capacity entry"
                )));
            }
        }
        if matches!(self.committed.consumed_days, Some(d) if d < 0.0) {
            return Err(RoadmapError::config("committed.consumed_days is negative"));
        }
        for (name, blend) in [
            ("early_weights", self.scoring.early_weights),
            ("late_weights", self.scoring.late_weights),
        ] {
            let in_range = |w: f64| (0.0..=1.0).contains(&w);
            if !in_range(blend.multi_factor) || !in_range(blend.roi) {
                return Err(RoadmapError::config(format!(
                    "scoring.{name} must be within [0, 1]"
                )));
            }
        }
        if !self.progress.weights.is_valid() || !self.progress.fallback_weights.is_valid() {
            return Err(RoadmapError::config(
                "fusion weights must be non-negative with a positive sum",
            ));
        }
        if self.progress.repository.max_concurrency == 0 {
            return Err(RoadmapError::config(
                "progress.repository.max_concurrency must be at least 1",
            ));
        }
        if !self.promotion.value_gap_tools.is_empty() && self.promotion.value_gap_tools.len() != 2 {
            return Err(RoadmapError::config(
                "promotion.value_gap_tools must name exactly two tools",
            ));
        }
        Ok(())
    }

    /// Capacity table as a model.
    pub fn capacity_model(&self) -> CapacityModel {
        CapacityModel::new(self.capacity.clone())
    }

    /// Effort estimate for a project.
    pub fn effort_for(&self, project: &Project) -> f64 {
        self.effort.days_for(project)
    }

    /// Repository reference for a project: configured mapping, else the record's own.
    pub fn repository_for<'a>(&'a self, project: &'a Project) -> Option<&'a str> {
        self.progress
            .repository
            .mapping
            .get(&project.id)
            .map(|s| s.as_str())
            .or(project.repository.as_deref())
    }
}

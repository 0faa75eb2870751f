//! External metrics snapshot.
//!
//! Adoption, productivity, engagement and perceived-value figures per
//! tool, plus free-form usage signals. The snapshot feeds dependency
//! promotion and tier-2 progress signals.
//!
//! # Lookup Namespaces
//!
//! | Key | Source map |
//! |-----|-----------|
//! | `adoption.<tool>` | `adoption_rates` (percent) |
//! | `productivity.<tool>` | `productivity_multipliers` (×) |
//! | `engagement.<tool>` | `engagement_multipliers` (×) |
//! | `perceived_value.<tool>` | `perceived_value` (0-100) |
//! | anything else | `signals` |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named metric figures captured at one point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    /// Adoption rate per tool (percent of eligible users).
    #[serde(default)]
    pub adoption_rates: BTreeMap<String, f64>,
    /// Productivity multiplier per tool.
    #[serde(default)]
    pub productivity_multipliers: BTreeMap<String, f64>,
    /// Engagement multiplier per tool.
    #[serde(default)]
    pub engagement_multipliers: BTreeMap<String, f64>,
    /// Perceived-value score per tool (0-100).
    #[serde(default)]
    pub perceived_value: BTreeMap<String, f64>,
    /// Other usage signals by name.
    #[serde(default)]
    pub signals: BTreeMap<String, f64>,
}

impl MetricsSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an adoption rate.
    pub fn with_adoption(mut self, tool: impl Into<String>, pct: f64) -> Self {
        self.adoption_rates.insert(tool.into(), pct);
        self
    }

    /// Sets a productivity multiplier.
    pub fn with_productivity(mut self, tool: impl Into<String>, multiplier: f64) -> Self {
        self.productivity_multipliers.insert(tool.into(), multiplier);
        self
    }

    /// Sets an engagement multiplier.
    pub fn with_engagement(mut self, tool: impl Into<String>, multiplier: f64) -> Self {
        self.engagement_multipliers.insert(tool.into(), multiplier);
        self
    }

    /// Sets a perceived-value score.
    pub fn with_perceived_value(mut self, tool: impl Into<String>, score: f64) -> Self {
        self.perceived_value.insert(tool.into(), score);
        self
    }

    /// Sets a free-form signal.
    pub fn with_signal(mut self, name: impl Into<String>, value: f64) -> Self {
        self.signals.insert(name.into(), value);
        self
    }

    /// Looks up a metric by namespaced key (see module docs).
    pub fn lookup(&self, key: &str) -> Option<f64> {
        let (namespace, name) = match key.split_once('.') {
            Some(parts) => parts,
            None => return self.signals.get(key).copied(),
        };
        let map = match namespace {
            "adoption" => &self.adoption_rates,
            "productivity" => &self.productivity_multipliers,
            "engagement" => &self.engagement_multipliers,
            "perceived_value" => &self.perceived_value,
            _ => return self.signals.get(key).copied(),
        };
        map.get(name).copied()
    }

    /// Largest productivity multiplier across tools.
    pub fn max_productivity(&self) -> Option<f64> {
        max_value(&self.productivity_multipliers)
    }

    /// Largest engagement multiplier across tools.
    pub fn max_engagement(&self) -> Option<f64> {
        max_value(&self.engagement_multipliers)
    }

    /// Absolute perceived-value gap between two tools, if both are known.
    pub fn perceived_value_gap(&self, a: &str, b: &str) -> Option<f64> {
        let va = self.perceived_value.get(a)?;
        let vb = self.perceived_value.get(b)?;
        Some((va - vb).abs())
    }
}

fn max_value(map: &BTreeMap<String, f64>) -> Option<f64> {
    map.values()
        .copied()
        .max_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
}

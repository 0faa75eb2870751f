//! Quarter capacity model.
//!
//! Capacity is a configuration table, not derived data: each quarter has a
//! fixed number of engineering days from the core team and from champions.

use serde::{Deserialize, Serialize};

use super::Quarter;

/// Schedulable engineering days for one quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterCapacity {
    /// Quarter this capacity applies to.
    pub quarter: Quarter,
    /// Core-team days.
    #[serde(default)]
    pub core_days: f64,
    /// Champion (embedded expert) days.
    #[serde(default)]
    pub champion_days: f64,
    /// Total schedulable days. Defaults to core + champion.
    #[serde(default)]
    pub total_days: Option<f64>,
}

impl QuarterCapacity {
    /// Creates a capacity entry; total = core + champion.
    pub fn new(quarter: Quarter, core_days: f64, champion_days: f64) -> Self {
        Self {
            quarter,
            core_days,
            champion_days,
            total_days: None,
        }
    }

    /// Overrides the total.
    pub fn with_total(mut self, total_days: f64) -> Self {
        self.total_days = Some(total_days);
        self
    }

    /// Total schedulable days.
    pub fn total(&self) -> f64 {
        self.total_days
            .unwrap_or(self.core_days + self.champion_days)
    }
}

/// Ordered per-quarter capacity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityModel {
    quarters: Vec<QuarterCapacity>,
}

impl CapacityModel {
    /// Creates a model from entries; entries are sorted chronologically.
    pub fn new(mut quarters: Vec<QuarterCapacity>) -> Self {
        quarters.sort_by_key(|q| q.quarter);
        Self { quarters }
    }

    /// Uniform capacity for all four quarters.
    pub fn uniform(core_days: f64, champion_days: f64) -> Self {
        Self::new(
            Quarter::ALL
                .iter()
                .map(|&q| QuarterCapacity::new(q, core_days, champion_days))
                .collect(),
        )
    }

    /// Entries in chronological order.
    pub fn quarters(&self) -> &[QuarterCapacity] {
        &self.quarters
    }

    /// Capacity entry for a quarter.
    pub fn get(&self, quarter: Quarter) -> Option<&QuarterCapacity> {
        self.quarters.iter().find(|q| q.quarter == quarter)
    }

    /// Total days across all quarters.
    pub fn total_days(&self) -> f64 {
        self.quarters.iter().map(|q| q.total()).sum()
    }

    /// Whether the table has no quarters.
    pub fn is_empty(&self) -> bool {
        self.quarters.is_empty()
    }
}

impl Default for CapacityModel {
    fn default() -> Self {
        Self::uniform(120.0, 60.0)
    }
}

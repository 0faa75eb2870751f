//! Tier 2: behavioral signals.
//!
//! A per-project target table maps metric keys (resolved through
//! [`MetricsSnapshot::lookup`]) to target values. Each present metric
//! yields an attainment ratio; the table's [`SignalFormula`] aggregates
//! them.
//!
//! | Formula | Per-metric cap | Aggregate cap |
//! |---------|----------------|---------------|
//! | adoption | 100% | none |
//! | usage | 150% | 100% |
//!
//! Readings keep the uncapped attainment for display.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Confidence, SignalReading, Tier2Result};
use crate::config::SignalTable;
use crate::models::MetricsSnapshot;

/// Aggregation formula for a target table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalFormula {
    /// Ratios capped at 100%, averaged.
    #[default]
    Adoption,
    /// Ratios capped at 150%, averaged, aggregate capped at 100%.
    Usage,
}

type Aggregator = fn(&[SignalReading]) -> f64;

impl SignalFormula {
    /// Aggregates readings into a progress percentage in [0, 100].
    pub fn aggregate(self, readings: &[SignalReading]) -> f64 {
        let aggregator: Aggregator = match self {
            SignalFormula::Adoption => adoption,
            SignalFormula::Usage => usage,
        };
        if readings.is_empty() {
            0.0
        } else {
            aggregator(readings)
        }
    }
}

fn adoption(readings: &[SignalReading]) -> f64 {
    mean_capped(readings, 100.0)
}

fn usage(readings: &[SignalReading]) -> f64 {
    mean_capped(readings, 150.0).min(100.0)
}

fn mean_capped(readings: &[SignalReading], cap: f64) -> f64 {
    let sum: f64 = readings.iter().map(|r| r.attainment_pct.min(cap)).sum();
    sum / readings.len() as f64
}

/// Analyzes tier 2 for one project.
///
/// Metrics missing from the snapshot, and targets that are not positive,
/// are skipped. No table or no present metric yields confidence `none`.
pub fn analyze_signals(table: Option<&SignalTable>, metrics: &MetricsSnapshot) -> Tier2Result {
    let Some(table) = table else {
        return Tier2Result {
            progress_pct: 0.0,
            formula: SignalFormula::default(),
            signals: Vec::new(),
            confidence: Confidence::None,
        };
    };

    let signals: Vec<SignalReading> = table
        .targets
        .iter()
        .filter_map(|(metric, &target)| {
            if !(target.is_finite() && target > 0.0) {
                debug!(metric = %metric, target, "skipping non-positive target");
                return None;
            }
            let actual = metrics.lookup(metric).filter(|v| v.is_finite())?;
            Some(SignalReading {
                metric: metric.clone(),
                actual,
                target,
                attainment_pct: (actual / target * 100.0).max(0.0),
            })
        })
        .collect();

    Tier2Result {
        progress_pct: table.formula.aggregate(&signals),
        formula: table.formula,
        confidence: Confidence::from_count(signals.len()),
        signals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn table(formula: SignalFormula, targets: &[(&str, f64)]) -> SignalTable {
        SignalTable {
            formula,
            targets: targets
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn metrics() -> MetricsSnapshot {
        MetricsSnapshot::new()
            .with_adoption("claude", 60.0)
            .with_signal("weekly_prompts", 900.0)
            .with_signal("active_teams", 3.0)
    }

    #[test]
    fn test_adoption_caps_each_ratio() {
        let t = table(
            SignalFormula::Adoption,
            &[("adoption.claude", 80.0), ("weekly_prompts", 600.0)],
        );
        let r = analyze_signals(Some(&t), &metrics());
        // min(75, 100) and min(150, 100)
        assert!((r.progress_pct - 87.5).abs() < 1e-10);
        assert_eq!(r.confidence, Confidence::Medium);
        let prompts = r.signals.iter().find(|s| s.metric == "weekly_prompts").unwrap();
        assert!((prompts.attainment_pct - 150.0).abs() < 1e-10);
    }

    #[test]
    fn test_usage_caps_aggregate() {
        let t = table(
            SignalFormula::Usage,
            &[("weekly_prompts", 300.0), ("active_teams", 2.0), ("adoption.claude", 40.0)],
        );
        let r = analyze_signals(Some(&t), &metrics());
        // ratios 300%, 150%, 150% → capped 150 each → mean 150 → 100
        assert!((r.progress_pct - 100.0).abs() < 1e-10);
        assert_eq!(r.confidence, Confidence::High);
    }

    #[test]
    fn test_usage_below_cap() {
        let t = table(SignalFormula::Usage, &[("weekly_prompts", 1800.0), ("active_teams", 2.0)]);
        let r = analyze_signals(Some(&t), &metrics());
        // 50% and 150% → mean 100
        assert!((r.progress_pct - 100.0).abs() < 1e-10);

        let t = table(SignalFormula::Usage, &[("weekly_prompts", 1800.0), ("active_teams", 6.0)]);
        let r = analyze_signals(Some(&t), &metrics());
        assert!((r.progress_pct - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_missing_metrics_skipped() {
        let t = table(
            SignalFormula::Adoption,
            &[("adoption.copilot", 50.0), ("weekly_prompts", 0.0), ("active_teams", 6.0)],
        );
        let r = analyze_signals(Some(&t), &metrics());
        assert_eq!(r.signals.len(), 1);
        assert_eq!(r.confidence, Confidence::Low);
        assert!((r.progress_pct - 50.0).abs() < 1e-10);
    }

    #[test]
    fn test_no_table() {
        let r = analyze_signals(None, &metrics());
        assert_eq!(r.confidence, Confidence::None);
        assert!((r.progress_pct - 0.0).abs() < 1e-10);
    }
}

//! SOFT → HARD dependency promotion.
//!
//! External adoption metrics can show that an advisory relationship has
//! become critical in practice. When any configured threshold is crossed,
//! explicit SOFT edges (optionally restricted to a target scope) become
//! HARD with origin [`EdgeOrigin::Promoted`].
//!
//! # Triggers
//!
//! | Trigger | Condition (defaults) |
//! |---------|----------------------|
//! | Productivity | any productivity multiplier > 10× |
//! | Engagement | any engagement multiplier > 4× |
//! | ValueGap | perceived-value gap between the two named tools > 30 |
//! | Adoption | adoption rate of the named tool > 80% |
//!
//! Promotion is monotonic: HARD edges are never touched, so running it
//! twice yields the same graph.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{DependencyGraph, EdgeOrigin};
use crate::config::PromotionConfig;
use crate::models::{DependencyKind, MetricsSnapshot};

/// A promotion condition that fired, with the observed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "trigger", rename_all = "snake_case")]
pub enum PromotionTrigger {
    Productivity { multiplier: f64 },
    Engagement { multiplier: f64 },
    ValueGap { tools: (String, String), gap: f64 },
    Adoption { tool: String, rate: f64 },
}

/// Evaluates every trigger against the snapshot.
pub fn evaluate_triggers(metrics: &MetricsSnapshot, config: &PromotionConfig) -> Vec<PromotionTrigger> {
    let mut fired = Vec::new();

    if let Some(m) = metrics.max_productivity() {
        if m > config.productivity_threshold {
            fired.push(PromotionTrigger::Productivity { multiplier: m });
        }
    }

    if let Some(m) = metrics.max_engagement() {
        if m > config.engagement_threshold {
            fired.push(PromotionTrigger::Engagement { multiplier: m });
        }
    }

    if config.value_gap_tools.is_empty() {
        warn!("promotion.value_gap_tools is empty, value-gap trigger disabled");
    }
    if config.adoption_tool.is_none() {
        warn!("promotion.adoption_tool is unset, adoption trigger disabled");
    }

    if let [a, b] = config.value_gap_tools.as_slice() {
        if let Some(gap) = metrics.perceived_value_gap(a, b) {
            if gap > config.value_gap_threshold {
                fired.push(PromotionTrigger::ValueGap {
                    tools: (a.clone(), b.clone()),
                    gap,
                });
            }
        }
    }

    if let Some(tool) = &config.adoption_tool {
        if let Some(&rate) = metrics.adoption_rates.get(tool) {
            if rate > config.adoption_threshold {
                fired.push(PromotionTrigger::Adoption {
                    tool: tool.clone(),
                    rate,
                });
            }
        }
    }

    fired
}

/// Promotes eligible explicit SOFT edges when any trigger fired.
///
/// Returns the number of edges promoted. `blocked_by` is not refreshed
/// here; the builder does that once after promotion.
pub fn promote_edges(
    graph: &mut DependencyGraph,
    triggers: &[PromotionTrigger],
    config: &PromotionConfig,
) -> usize {
    if triggers.is_empty() {
        return 0;
    }

    let mut promoted = 0;
    for node in graph.nodes_mut() {
        for edge in node.depends_on.iter_mut() {
            if edge.kind != DependencyKind::Soft || edge.origin != EdgeOrigin::Explicit {
                continue;
            }
            if !config.scope.is_empty() && !config.scope.iter().any(|s| s == &edge.target) {
                continue;
            }
            edge.kind = DependencyKind::Hard;
            edge.origin = EdgeOrigin::Promoted;
            promoted += 1;
            debug!(source = %node.id, target = %edge.target, "promoted edge");
        }
    }
    promoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::models::{DeclaredDependency, Project};

    fn projects() -> Vec<Project> {
        vec![
            Project::new("A"),
            Project::new("B").with_dependency(DeclaredDependency::soft("A")),
            Project::new("C")
                .with_dependency(DeclaredDependency::hard("A"))
                .with_dependency(DeclaredDependency::soft("B")),
        ]
    }

    fn promoting_metrics() -> MetricsSnapshot {
        MetricsSnapshot::new().with_engagement("claude", 5.0)
    }

    #[test]
    fn test_no_trigger_below_thresholds() {
        let metrics = MetricsSnapshot::new()
            .with_productivity("claude", 10.0)
            .with_engagement("claude", 4.0)
            .with_adoption("claude", 80.0);
        let config = PromotionConfig::default();
        assert!(evaluate_triggers(&metrics, &config).is_empty());
    }

    #[test]
    fn test_each_trigger_fires() {
        let config = PromotionConfig::default();

        let metrics = MetricsSnapshot::new()
            .with_productivity("claude", 11.0)
            .with_engagement("claude", 4.5)
            .with_perceived_value("claude", 85.0)
            .with_perceived_value("copilot", 50.0)
            .with_adoption("claude", 81.0);

        let fired = evaluate_triggers(&metrics, &config);
        assert_eq!(fired.len(), 4);
        assert!(matches!(fired[2], PromotionTrigger::ValueGap { gap, .. } if (gap - 35.0).abs() < 1e-10));
    }

    #[test]
    fn test_named_tool_triggers_promote_under_defaults() {
        let projects = projects();
        let config = PromotionConfig::default();

        let adoption = MetricsSnapshot::new().with_adoption("claude", 95.0);
        let g = GraphBuilder::new(&projects)
            .with_promotion(&adoption, &config)
            .build();
        assert!(matches!(g.promotion_triggers[..], [PromotionTrigger::Adoption { .. }]));
        assert_eq!(g.blocked_by("B"), &["A".to_string()]);

        let value_gap = MetricsSnapshot::new()
            .with_perceived_value("claude", 90.0)
            .with_perceived_value("copilot", 40.0);
        let g = GraphBuilder::new(&projects)
            .with_promotion(&value_gap, &config)
            .build();
        assert!(matches!(g.promotion_triggers[..], [PromotionTrigger::ValueGap { .. }]));
        assert_eq!(g.blocked_by("B"), &["A".to_string()]);
    }

    #[test]
    fn test_disabled_named_tool_triggers() {
        let mut config = PromotionConfig::default();
        config.value_gap_tools.clear();
        config.adoption_tool = None;
        let metrics = MetricsSnapshot::new()
            .with_adoption("claude", 95.0)
            .with_perceived_value("claude", 90.0)
            .with_perceived_value("copilot", 40.0);
        assert!(evaluate_triggers(&metrics, &config).is_empty());
    }

    #[test]
    fn test_promotion_upgrades_soft_only() {
        let projects = projects();
        let mut g = GraphBuilder::new(&projects).build();
        let config = PromotionConfig::default();
        let triggers = evaluate_triggers(&promoting_metrics(), &config);

        let n = promote_edges(&mut g, &triggers, &config);
        assert_eq!(n, 2);

        let c = g.node("C").unwrap();
        assert_eq!(c.depends_on[0].origin, EdgeOrigin::Explicit);
        assert_eq!(c.depends_on[0].kind, DependencyKind::Hard);
        assert_eq!(c.depends_on[1].origin, EdgeOrigin::Promoted);
    }

    #[test]
    fn test_promotion_idempotent() {
        let projects = projects();
        let metrics = promoting_metrics();
        let config = PromotionConfig::default();

        let once = GraphBuilder::new(&projects)
            .with_promotion(&metrics, &config)
            .build();
        let mut twice = once.clone();
        let triggers = evaluate_triggers(&metrics, &config);
        assert_eq!(promote_edges(&mut twice, &triggers, &config), 0);
        twice.refresh_blocking();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_promotion_scope() {
        let projects = projects();
        let mut config = PromotionConfig::default();
        config.scope = vec!["B".into()];
        let g = GraphBuilder::new(&projects)
            .with_promotion(&promoting_metrics(), &config)
            .build();

        assert!(g.blocked_by("B").is_empty());
        assert_eq!(g.blocked_by("C"), &["A".to_string(), "B".to_string()]);
    }
}

//! Scoring context for factor evaluation.

use std::collections::HashMap;

use crate::config::{EffortConfig, ScoringConfig};
use crate::graph::DependencyGraph;
use crate::models::{Project, Quarter};

/// Run-level state passed to scoring factors.
///
/// Carries the quarter being scored for, each project's blocking closure
/// from the dependency graph, the effort table shared with the scheduler,
/// and the keyword lists used by the feasibility factor.
#[derive(Debug, Clone)]
pub struct ScoringContext {
    /// Quarter whose weighting regime applies.
    pub quarter: Quarter,
    /// Blocking dependencies per project (project_id → HARD targets).
    pub blocked_by: HashMap<String, Vec<String>>,
    /// Effort table (overrides and default estimate).
    pub effort: EffortConfig,
    /// Phase-name fragments marking an exploratory stage (lowercase).
    pub pilot_keywords: Vec<String>,
    /// Dependency fragments marking an external vendor (lowercase).
    pub vendor_keywords: Vec<String>,
}

impl ScoringContext {
    /// Creates a context for the given quarter with default keyword lists.
    pub fn at_quarter(quarter: Quarter) -> Self {
        let defaults = ScoringConfig::default();
        Self {
            quarter,
            blocked_by: HashMap::new(),
            effort: EffortConfig::default(),
            pilot_keywords: defaults.pilot_keywords,
            vendor_keywords: defaults.vendor_keywords,
        }
    }

    /// Builds a context from the classified graph and scoring configuration.
    pub fn from_graph(graph: &DependencyGraph, quarter: Quarter, config: &ScoringConfig) -> Self {
        let blocked_by = graph
            .nodes()
            .filter(|n| !n.blocked_by.is_empty())
            .map(|n| (n.id.clone(), n.blocked_by.clone()))
            .collect();
        Self {
            quarter,
            blocked_by,
            effort: EffortConfig::default(),
            pilot_keywords: lowercase(&config.pilot_keywords),
            vendor_keywords: lowercase(&config.vendor_keywords),
        }
    }

    /// Sets the blocking dependencies of a project.
    pub fn with_blocking(mut self, project_id: impl Into<String>, deps: Vec<String>) -> Self {
        self.blocked_by.insert(project_id.into(), deps);
        self
    }

    /// Sets the effort table.
    pub fn with_effort(mut self, effort: EffortConfig) -> Self {
        self.effort = effort;
        self
    }

    /// Adds effort overrides.
    pub fn with_effort_overrides<I, K>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        self.effort
            .overrides
            .extend(overrides.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Whether the project has any blocking dependency.
    pub fn is_blocked(&self, project_id: &str) -> bool {
        self.blocked_by
            .get(project_id)
            .is_some_and(|deps| !deps.is_empty())
    }

    /// Effort used for scoring; same rule as scheduling and delivery.
    pub fn effort_days(&self, project: &Project) -> f64 {
        self.effort.days_for(project)
    }
}

fn lowercase(words: &[String]) -> Vec<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::models::DeclaredDependency;

    #[test]
    fn test_from_graph_captures_blocking() {
        let projects = vec![
            Project::new("A"),
            Project::new("B").with_dependency(DeclaredDependency::hard("A")),
        ];
        let graph = GraphBuilder::new(&projects).build();
        let ctx = ScoringContext::from_graph(&graph, Quarter::Q2, &ScoringConfig::default());

        assert!(ctx.is_blocked("B"));
        assert!(!ctx.is_blocked("A"));
        assert!(!ctx.is_blocked("missing"));
        assert_eq!(ctx.quarter, Quarter::Q2);
    }

    #[test]
    fn test_effort_overrides() {
        let ctx = ScoringContext::at_quarter(Quarter::Q1).with_effort_overrides([("A", 200.0)]);
        assert!((ctx.effort_days(&Project::new("A").with_effort(10.0)) - 200.0).abs() < 1e-10);
        assert!((ctx.effort_days(&Project::new("B").with_effort(10.0)) - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_missing_effort_uses_default() {
        let effort = EffortConfig {
            default_days: 130.0,
            ..EffortConfig::default()
        };
        let ctx = ScoringContext::at_quarter(Quarter::Q1).with_effort(effort);
        assert!((ctx.effort_days(&Project::new("Z").with_effort(0.0)) - 130.0).abs() < 1e-10);
        assert!((ctx.effort_days(&Project::new("N").with_effort(f64::NAN)) - 130.0).abs() < 1e-10);
    }
}

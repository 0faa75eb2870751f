//! Dependency graph construction.

use tracing::{debug, info, warn};

use super::{cycles, promotion, DependencyEdge, DependencyGraph, DroppedDependency};
use crate::config::PromotionConfig;
use crate::models::{DependencyKind, MetricsSnapshot, Project};

/// Builds a [`DependencyGraph`] from project records.
///
/// # Example
/// ```
/// use u_roadmap::graph::GraphBuilder;
/// use u_roadmap::models::{DeclaredDependency, Project};
///
/// let projects = vec![
///     Project::new("A"),
///     Project::new("B").with_dependency(DeclaredDependency::hard("A")),
/// ];
/// let graph = GraphBuilder::new(&projects).build();
/// assert_eq!(graph.blocked_by("B"), &["A".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct GraphBuilder<'a> {
    projects: &'a [Project],
    promotion: Option<(&'a MetricsSnapshot, &'a PromotionConfig)>,
}

impl<'a> GraphBuilder<'a> {
    /// Creates a builder over the given records.
    pub fn new(projects: &'a [Project]) -> Self {
        Self {
            projects,
            promotion: None,
        }
    }

    /// Enables SOFT → HARD promotion against a metrics snapshot.
    pub fn with_promotion(mut self, metrics: &'a MetricsSnapshot, config: &'a PromotionConfig) -> Self {
        self.promotion = Some((metrics, config));
        self
    }

    /// Builds the graph.
    ///
    /// # Algorithm
    /// 1. Create one node per project (first occurrence of a duplicate id wins).
    /// 2. Add explicit edges for declared dependencies with known targets.
    /// 3. Apply promotion if configured.
    /// 4. Derive `blocked_by` and detect cycles.
    pub fn build(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::default();

        for project in self.projects {
            if !graph.insert_node(&project.id) {
                warn!(project = %project.id, "duplicate project id, keeping first occurrence");
            }
        }

        let mut seen = std::collections::HashSet::new();
        for project in self.projects {
            // Only the first record for an id contributes edges.
            if !seen.insert(project.id.as_str()) {
                continue;
            }
            for dep in &project.declared_dependencies {
                if !graph.contains(&dep.target_id) {
                    warn!(
                        project = %project.id,
                        target = %dep.target_id,
                        "dropping dependency on unknown project"
                    );
                    graph.dropped.push(DroppedDependency {
                        source: project.id.clone(),
                        target: dep.target_id.clone(),
                    });
                    continue;
                }
                add_edge(&mut graph, &project.id, &dep.target_id, dep.kind);
            }
        }

        if let Some((metrics, config)) = self.promotion {
            let triggers = promotion::evaluate_triggers(metrics, config);
            let promoted = promotion::promote_edges(&mut graph, &triggers, config);
            if promoted > 0 {
                info!(promoted, "promoted advisory dependencies to blocking");
            }
            graph.promotion_triggers = triggers;
        }

        graph.refresh_blocking();
        graph.cycles = cycles::detect_cycles(&graph);
        for cycle in &graph.cycles {
            warn!(cycle = %cycle, "dependency cycle detected");
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            blocking = graph.blocking_edge_count(),
            cycles = graph.cycles.len(),
            dropped = graph.dropped.len(),
            "dependency graph built"
        );

        graph
    }
}

/// Adds `source → target`, merging with an existing edge to the same target.
///
/// A repeated declaration never weakens an edge: HARD wins over SOFT.
fn add_edge(graph: &mut DependencyGraph, source: &str, target: &str, kind: DependencyKind) {
    let Some(node) = graph.node_mut(source) else {
        return;
    };
    if let Some(existing) = node.depends_on.iter_mut().find(|e| e.target == target) {
        if kind == DependencyKind::Hard {
            existing.kind = DependencyKind::Hard;
        }
        debug!(source, target, "merged duplicate dependency declaration");
        return;
    }
    node.depends_on.push(DependencyEdge::explicit(target, kind));

    if let Some(enabler) = graph.node_mut(target) {
        if !enabler.enablers.iter().any(|e| e == source) {
            enabler.enablers.push(source.to_string());
        }
    }
    debug!(source, target, ?kind, "added dependency edge");
}

/// Builds the classified graph with promotion against `metrics`.
pub fn build_dependency_graph(
    projects: &[Project],
    metrics: &MetricsSnapshot,
    config: &PromotionConfig,
) -> DependencyGraph {
    GraphBuilder::new(projects)
        .with_promotion(metrics, config)
        .build()
}

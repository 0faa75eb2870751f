//! Project dependency graph.
//!
//! One node per project, with classified forward edges (`depends_on`),
//! reverse edges (`enablers`) and the derived blocking closure
//! (`blocked_by`, the HARD subset of `depends_on`).
//!
//! # Construction
//!
//! 1. [`GraphBuilder`] adds explicit edges for every declared dependency
//!    whose target exists; unknown targets are dropped and recorded.
//! 2. [`promotion`] upgrades SOFT edges to HARD when external metrics cross
//!    configured thresholds. Promotion never demotes and is idempotent.
//! 3. [`cycles`] reports every cycle found by DFS. Cycles are flagged,
//!    never broken.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22

mod builder;
pub mod cycles;
pub mod promotion;

pub use builder::{build_dependency_graph, GraphBuilder};
pub use cycles::{detect_cycles, Cycle};
pub use promotion::{evaluate_triggers, promote_edges, PromotionTrigger};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use crate::models::DependencyKind;

/// How an edge acquired its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeOrigin {
    /// Kind as declared in the input record.
    Explicit,
    /// Upgraded from SOFT to HARD by a promotion trigger.
    Promoted,
}

/// A classified dependency edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Project this edge points to.
    pub target: String,
    /// Current kind.
    pub kind: DependencyKind,
    /// Whether the kind was declared or promoted.
    pub origin: EdgeOrigin,
}

impl DependencyEdge {
    /// Creates an explicit edge.
    pub fn explicit(target: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            target: target.into(),
            kind,
            origin: EdgeOrigin::Explicit,
        }
    }

    /// Whether this edge blocks scheduling.
    #[inline]
    pub fn is_blocking(&self) -> bool {
        self.kind == DependencyKind::Hard
    }
}

/// A graph node keyed by project id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphNode {
    /// Project id.
    pub id: String,
    /// Forward edges, in declaration order.
    pub depends_on: Vec<DependencyEdge>,
    /// Projects that depend on this one.
    pub enablers: Vec<String>,
    /// Targets of HARD edges in `depends_on`.
    pub blocked_by: Vec<String>,
}

impl GraphNode {
    fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Recomputes `blocked_by` from `depends_on`.
    fn refresh_blocking(&mut self) {
        self.blocked_by = self
            .depends_on
            .iter()
            .filter(|e| e.is_blocking())
            .map(|e| e.target.clone())
            .collect();
    }

    /// Whether the node has no blocking dependencies.
    pub fn is_unblocked(&self) -> bool {
        self.blocked_by.is_empty()
    }
}

/// A declared dependency that was dropped during construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedDependency {
    /// Project that declared the dependency.
    pub source: String,
    /// Unknown target id.
    pub target: String,
}

/// Classified dependency graph with anomaly reports.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DependencyGraph {
    /// Node ids in input order.
    order: Vec<String>,
    /// Nodes by id.
    nodes: BTreeMap<String, GraphNode>,
    /// Cycles detected after classification.
    pub cycles: Vec<Cycle>,
    /// Declared dependencies whose target does not exist.
    pub dropped: Vec<DroppedDependency>,
    /// Triggers that fired during promotion.
    pub promotion_triggers: Vec<PromotionTrigger>,
}

impl DependencyGraph {
    /// Node for a project.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    /// Whether a project is in the graph.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in input order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Node ids in input order.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Number of forward edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.depends_on.len()).sum()
    }

    /// Number of HARD edges.
    pub fn blocking_edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.blocked_by.len()).sum()
    }

    /// Blocking closure of a project (empty for unknown ids).
    pub fn blocked_by(&self, id: &str) -> &[String] {
        self.nodes
            .get(id)
            .map(|n| n.blocked_by.as_slice())
            .unwrap_or(&[])
    }

    /// Whether every blocking dependency of `id` is in `scheduled`.
    pub fn dependencies_satisfied(&self, id: &str, scheduled: &HashSet<String>) -> bool {
        self.first_unmet_dependency(id, scheduled).is_none()
    }

    /// First blocking dependency of `id` not contained in `scheduled`.
    pub fn first_unmet_dependency<'a>(
        &'a self,
        id: &str,
        scheduled: &HashSet<String>,
    ) -> Option<&'a str> {
        self.blocked_by(id)
            .iter()
            .find(|dep| !scheduled.contains(dep.as_str()))
            .map(|s| s.as_str())
    }

    /// Whether the graph contains any cycle.
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    /// Whether a project lies on a detected cycle.
    pub fn in_cycle(&self, id: &str) -> bool {
        self.cycles.iter().any(|c| c.contains(id))
    }

    /// Blocking-dependency order: prerequisites before dependents.
    ///
    /// Kahn's algorithm over HARD edges. Nodes that cannot be ordered
    /// (cycle members and anything blocked behind them) are omitted.
    /// Ties keep input order.
    pub fn topological_order(&self) -> Vec<String> {
        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

        for node in self.nodes() {
            in_degree.entry(node.id.as_str()).or_insert(0);
            for dep in &node.blocked_by {
                *in_degree.entry(node.id.as_str()).or_insert(0) += 1;
                dependents
                    .entry(dep.as_str())
                    .or_default()
                    .push(node.id.as_str());
            }
        }

        let mut queue: VecDeque<&str> = self
            .order
            .iter()
            .map(|s| s.as_str())
            .filter(|id| in_degree.get(id).copied() == Some(0))
            .collect();
        let mut ordered = Vec::with_capacity(self.order.len());

        while let Some(id) = queue.pop_front() {
            ordered.push(id.to_string());
            if let Some(next) = dependents.get(id) {
                for &dependent in next {
                    if let Some(deg) = in_degree.get_mut(dependent) {
                        *deg -= 1;
                        if *deg == 0 {
                            queue.push_back(dependent);
                        }
                    }
                }
            }
        }

        ordered
    }

    fn insert_node(&mut self, id: &str) -> bool {
        if self.nodes.contains_key(id) {
            return false;
        }
        self.order.push(id.to_string());
        self.nodes.insert(id.to_string(), GraphNode::new(id));
        true
    }

    fn node_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
        self.nodes.get_mut(id)
    }

    fn nodes_mut(&mut self) -> impl Iterator<Item = &mut GraphNode> {
        self.nodes.values_mut()
    }

    fn refresh_blocking(&mut self) {
        for node in self.nodes.values_mut() {
            node.refresh_blocking();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DeclaredDependency, Project};

    fn chain() -> DependencyGraph {
        // C → B → A (HARD), D → A (SOFT)
        let projects = vec![
            Project::new("A"),
            Project::new("B").with_dependency(DeclaredDependency::hard("A")),
            Project::new("C").with_dependency(DeclaredDependency::hard("B")),
            Project::new("D").with_dependency(DeclaredDependency::soft("A")),
        ];
        GraphBuilder::new(&projects).build()
    }

    #[test]
    fn test_blocked_by_is_hard_subset() {
        let g = chain();
        assert_eq!(g.blocked_by("B"), &["A".to_string()]);
        assert!(g.blocked_by("D").is_empty());
        assert!(g.node("D").unwrap().is_unblocked());
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.blocking_edge_count(), 2);
    }

    #[test]
    fn test_dependencies_satisfied() {
        let g = chain();
        let mut scheduled = HashSet::new();
        assert!(!g.dependencies_satisfied("B", &scheduled));
        assert_eq!(g.first_unmet_dependency("C", &scheduled), Some("B"));
        scheduled.insert("A".to_string());
        assert!(g.dependencies_satisfied("B", &scheduled));
        assert!(g.dependencies_satisfied("D", &scheduled));
    }

    #[test]
    fn test_topological_order() {
        let g = chain();
        let order = g.topological_order();
        let pos = |id: &str| order.iter().position(|x| x == id).unwrap();
        assert_eq!(order.len(), 4);
        assert!(pos("A") < pos("B"));
        assert!(pos("B") < pos("C"));
    }

    #[test]
    fn test_topological_order_skips_cycles() {
        let projects = vec![
            Project::new("A").with_dependency(DeclaredDependency::hard("B")),
            Project::new("B").with_dependency(DeclaredDependency::hard("A")),
            Project::new("C"),
        ];
        let g = GraphBuilder::new(&projects).build();
        assert_eq!(g.topological_order(), vec!["C".to_string()]);
    }
}

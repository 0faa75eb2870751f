//! Cycle detection over the dependency graph.
//!
//! # Algorithm
//! DFS with an explicit recursion stack. A back-edge to a node currently
//! on the stack yields a cycle: the stack segment from that node to the
//! top. Search continues after each hit, so independent cycles are all
//! reported. A self-loop is a one-node cycle.
//!
//! Cycles are normalized to start at their smallest id, so the same
//! cycle reached from different entry points is reported once.
//!
//! # Reference
//! Cormen et al. (2009), "Introduction to Algorithms", Ch. 22.3

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::DependencyGraph;

/// A dependency cycle, listed from its first node around to the node
/// that closes back on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cycle {
    /// Member ids in edge order; the last depends on the first.
    pub nodes: Vec<String>,
}

impl Cycle {
    fn normalized(mut nodes: Vec<String>) -> Self {
        if let Some(min_pos) = nodes
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(i, _)| i)
        {
            nodes.rotate_left(min_pos);
        }
        Self { nodes }
    }

    /// Number of projects on the cycle.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the cycle is empty (never produced by detection).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` lies on the cycle.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }

    /// Whether this is a project depending on itself.
    pub fn is_self_loop(&self) -> bool {
        self.nodes.len() == 1
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            write!(f, "{node} -> ")?;
        }
        match self.nodes.first() {
            Some(first) => write!(f, "{first}"),
            None => Ok(()),
        }
    }
}

/// Detects all cycles reachable through `depends_on` edges (any kind).
pub fn detect_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    let adj: HashMap<&str, Vec<&str>> = graph
        .nodes()
        .map(|n| {
            (
                n.id.as_str(),
                n.depends_on.iter().map(|e| e.target.as_str()).collect(),
            )
        })
        .collect();

    let mut visited = HashSet::new();
    let mut stack = Vec::new();
    let mut on_stack = HashSet::new();
    let mut found = Vec::new();
    let mut seen = HashSet::new();

    for id in graph.ids() {
        if !visited.contains(id.as_str()) {
            dfs(
                id.as_str(),
                &adj,
                &mut visited,
                &mut stack,
                &mut on_stack,
                &mut found,
                &mut seen,
            );
        }
    }

    found
}

fn dfs<'a>(
    node: &'a str,
    adj: &HashMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    stack: &mut Vec<&'a str>,
    on_stack: &mut HashSet<&'a str>,
    found: &mut Vec<Cycle>,
    seen: &mut HashSet<Cycle>,
) {
    visited.insert(node);
    stack.push(node);
    on_stack.insert(node);

    if let Some(neighbors) = adj.get(node) {
        for &next in neighbors {
            if on_stack.contains(next) {
                // Back edge → cycle
                if let Some(start) = stack.iter().position(|&n| n == next) {
                    let cycle = Cycle::normalized(stack[start..].iter().map(|s| s.to_string()).collect());
                    if seen.insert(cycle.clone()) {
                        found.push(cycle);
                    }
                }
            } else if !visited.contains(next) {
                dfs(next, adj, visited, stack, on_stack, found, seen);
            }
        }
    }

    stack.pop();
    on_stack.remove(node);
}

//! Must-dependency graph used to reject unorderable declarations.
//!
//! Only "must" edges constrain build order, so only they are checked for
//! cycles. Should-dependencies may freely reference each other.

use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

use crate::core::BemdepsError;

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is currently being visited (in the DFS stack).
    Gray,
    /// Node has been fully visited.
    Black,
}

/// Directed graph of entity keys; an edge `a -> b` means `a` must follow `b`.
#[derive(Debug, Default)]
pub struct MustGraph {
    graph: DiGraph<String, ()>,
    node_map: HashMap<String, NodeIndex>,
}

impl MustGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, key: &str) -> NodeIndex {
        if let Some(&index) = self.node_map.get(key) {
            index
        } else {
            let index = self.graph.add_node(key.to_string());
            self.node_map.insert(key.to_string(), index);
            index
        }
    }

    /// Record that `from` must be built after `to`.
    pub fn add_dependency(&mut self, from: &str, to: &str) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Detect cycles using DFS with colors.
    ///
    /// # Errors
    ///
    /// Returns [`BemdepsError::CircularDependency`] with the cycle path.
    pub fn detect_cycles(&self) -> Result<(), BemdepsError> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|node| (node, Color::White)).collect();

        for node in self.graph.node_indices() {
            if matches!(colors.get(&node), Some(Color::White))
                && let Some(cycle) = self.find_cycle_from(node, &mut colors)
            {
                let chain = cycle
                    .iter()
                    .map(|&idx| self.graph[idx].as_str())
                    .collect::<Vec<_>>()
                    .join(" → ");
                return Err(BemdepsError::CircularDependency {
                    chain,
                });
            }
        }

        Ok(())
    }

    /// Returns `Some(cycle_path)` if a cycle is reachable from `start`.
    ///
    /// The DFS keeps its own stack of neighbor iterators, so long must-chains
    /// do not recurse.
    fn find_cycle_from(&self, start: NodeIndex, colors: &mut HashMap<NodeIndex, Color>) -> Option<Vec<NodeIndex>> {
        colors.insert(start, Color::Gray);
        let mut path = vec![start];
        let mut stack = vec![self.graph.neighbors(start)];

        while let Some(neighbors) = stack.last_mut() {
            match neighbors.next() {
                Some(next) => match colors.get(&next) {
                    Some(Color::Gray) => {
                        let cycle_start = path.iter().position(|&n| n == next).unwrap_or(0);
                        let mut cycle = path[cycle_start..].to_vec();
                        cycle.push(next);
                        return Some(cycle);
                    }
                    Some(Color::White) => {
                        colors.insert(next, Color::Gray);
                        path.push(next);
                        stack.push(self.graph.neighbors(next));
                    }
                    _ => {}
                },
                None => {
                    stack.pop();
                    if let Some(done) = path.pop() {
                        colors.insert(done, Color::Black);
                    }
                }
            }
        }

        None
    }
}

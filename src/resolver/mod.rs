//! Dependency resolution for BEM declarations.
//!
//! Resolution is split into a per-entity step and a whole-graph step:
//!
//! - A [`DepsSource`] answers "what does this entity depend on?" for a single
//!   [`DeclRef`]. [`DeclaredDeps`] reads static `deps.yaml` files;
//!   [`ModulesDeps`] wraps any source and adds the dependencies declared inline
//!   by `modules.define()` calls in the entity's source files.
//! - [`DepsResolver`] owns the working set. [`DepsResolver::add_decls`] expands
//!   seed declarations transitively through a source, and
//!   [`DepsResolver::resolve`] walks the collected graph into one flat,
//!   deduplicated, deterministically ordered list.
//!
//! [`ModulesDepsResolver`] bundles the two for the common case.
//!
//! # Ordering
//!
//! Seeds are walked in declaration order. For each entity not yet emitted, its
//! must-dependencies are emitted first, then the entity, then its
//! should-dependencies. Must-dependency cycles are rejected up front.
//!
//! A should-edge can lead back into an entity whose walk is still open. The
//! walk order is therefore only a preference: the output is a topological
//! order of the must-edges, with ties broken by walk position, so every
//! must-dependency precedes its dependent.
//!
//! # Example
//!
//! ```rust,no_run
//! use bemdeps_cli::decl::DeclRef;
//! use bemdeps_cli::levels::FsLevels;
//! use bemdeps_cli::resolver::{DeclaredDeps, ModulesDeps, ModulesDepsResolver};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let levels = Arc::new(FsLevels::scan(&["common.blocks"])?);
//! let base = DeclaredDeps::new(levels.clone());
//! let modules = ModulesDeps::new(base, levels, ["vanilla.js", "js"])?;
//!
//! let mut resolver = ModulesDepsResolver::new(modules);
//! resolver.add_decls(vec![DeclRef::block("page")]).await?;
//! for decl in resolver.resolve()? {
//!     println!("{decl}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod declared;
pub mod dependency_graph;
pub mod modules_deps;

pub use declared::DeclaredDeps;
pub use dependency_graph::MustGraph;
pub use modules_deps::{ModulesDeps, ModulesDepsResolver};

use anyhow::{Context, Result};
use futures::future::try_join_all;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use tracing::{debug, trace};

use crate::decl::{DeclRef, DependencySet};

/// Per-entity dependency lookup.
#[allow(async_fn_in_trait)]
pub trait DepsSource {
    /// Dependencies of a single entity.
    async fn get_deps(&self, decl: &DeclRef) -> Result<DependencySet>;
}

/// A node of the working set: an entity and its looked-up dependencies.
#[derive(Debug, Clone)]
struct DeclNode {
    decl: DeclRef,
    deps: DependencySet,
}

/// Working set of declarations and the graph walk over them.
#[derive(Debug, Default)]
pub struct DepsResolver {
    /// Seed keys in the order they were added
    seeds: Vec<String>,
    /// Every expanded entity, by key
    nodes: HashMap<String, DeclNode>,
}

impl DepsResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities expanded so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when nothing has been added yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dependencies recorded for an entity, if it has been expanded.
    pub fn deps_of(&self, decl: &DeclRef) -> Option<&DependencySet> {
        self.nodes.get(&decl.key()).map(|node| &node.deps)
    }

    /// Seed the working set and expand it transitively through `source`.
    ///
    /// Entities are expanded breadth-first. All entities of one frontier are
    /// looked up concurrently, but their results are merged in frontier order,
    /// so the outcome does not depend on I/O timing. Any lookup failure aborts
    /// the whole pass.
    pub async fn add_decls<S: DepsSource>(&mut self, source: &S, decls: Vec<DeclRef>) -> Result<()> {
        let mut queued: HashSet<String> = HashSet::new();
        let mut frontier = Vec::new();

        for decl in decls {
            let key = decl.key();
            if !self.seeds.contains(&key) {
                self.seeds.push(key.clone());
            }
            if !self.nodes.contains_key(&key) && queued.insert(key) {
                frontier.push(decl);
            }
        }

        let mut round = 0usize;
        while !frontier.is_empty() {
            round += 1;
            debug!("Expanding {} declaration(s) in round {}", frontier.len(), round);

            let lookups = frontier.iter().map(|decl| async move {
                source
                    .get_deps(decl)
                    .await
                    .with_context(|| format!("Failed to get dependencies of '{decl}'"))
            });
            let results = try_join_all(lookups).await?;

            let mut next = Vec::new();
            for (decl, deps) in frontier.into_iter().zip(results) {
                for dep in deps.iter() {
                    let key = dep.key();
                    if !self.nodes.contains_key(&key) && queued.insert(key) {
                        next.push(dep.clone());
                    }
                }
                trace!("{}: {} must, {} should", decl, deps.must.len(), deps.should.len());
                self.nodes.insert(
                    decl.key(),
                    DeclNode {
                        decl,
                        deps,
                    },
                );
            }
            frontier = next;
        }

        Ok(())
    }

    /// Produce the final ordered list of entities.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::core::BemdepsError::CircularDependency`] when
    /// must-dependencies form a cycle.
    pub fn resolve(&self) -> Result<Vec<DeclRef>> {
        let mut must_graph = MustGraph::new();
        let mut keys: Vec<&String> = self.nodes.keys().collect();
        keys.sort();
        for key in keys {
            let node = &self.nodes[key];
            for dep in &node.deps.must {
                let dep_key = dep.key();
                if &dep_key != key {
                    must_graph.add_dependency(key, &dep_key);
                }
            }
        }
        must_graph.detect_cycles()?;

        let walk = self.walk_order();
        let result = self.order_must_first(&walk);

        debug!("Resolved {} entities from {} declarations", result.len(), self.seeds.len());
        Ok(result)
    }

    /// Preferred order: seeds in turn, each preceded by its must-dependencies
    /// and followed by its should-dependencies. Iterative, so deep chains do
    /// not grow the call stack.
    ///
    /// A node reached again while still open is skipped, so this order alone
    /// may put an entity ahead of a must-dependency.
    fn walk_order(&self) -> Vec<&str> {
        enum Step<'a> {
            Enter(String),
            Emit(&'a str),
        }

        let mut visited: HashSet<&str> = HashSet::new();
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<Step<'_>> = self.seeds.iter().rev().map(|key| Step::Enter(key.clone())).collect();

        while let Some(step) = stack.pop() {
            match step {
                Step::Emit(key) => order.push(key),
                Step::Enter(key) => {
                    let Some((key, node)) = self.nodes.get_key_value(&key) else {
                        continue;
                    };
                    if !visited.insert(key.as_str()) {
                        continue;
                    }
                    stack.extend(node.deps.should.iter().rev().map(|dep| Step::Enter(dep.key())));
                    stack.push(Step::Emit(key.as_str()));
                    stack.extend(node.deps.must.iter().rev().map(|dep| Step::Enter(dep.key())));
                }
            }
        }

        order
    }

    /// Topological order over must-edges, picking the earliest entity of
    /// `walk` among those whose must-dependencies are all emitted. When `walk`
    /// already respects every must-edge it is returned unchanged.
    fn order_must_first(&self, walk: &[&str]) -> Vec<DeclRef> {
        let position: HashMap<&str, usize> = walk.iter().enumerate().map(|(i, key)| (*key, i)).collect();
        let mut pending = vec![0usize; walk.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); walk.len()];

        for (i, key) in walk.iter().enumerate() {
            let mut seen = HashSet::new();
            for dep in &self.nodes[*key].deps.must {
                if let Some(&j) = position.get(dep.key().as_str())
                    && j != i
                    && seen.insert(j)
                {
                    pending[i] += 1;
                    dependents[j].push(i);
                }
            }
        }

        let mut ready: BinaryHeap<Reverse<usize>> =
            pending.iter().enumerate().filter(|(_, count)| **count == 0).map(|(i, _)| Reverse(i)).collect();
        let mut result = Vec::with_capacity(walk.len());

        while let Some(Reverse(i)) = ready.pop() {
            result.push(self.nodes[walk[i]].decl.clone());
            for &dependent in &dependents[i] {
                pending[dependent] -= 1;
                if pending[dependent] == 0 {
                    ready.push(Reverse(dependent));
                }
            }
        }

        result
    }
}

//! Dependency source that follows `modules.define()` declarations.
//!
//! [`ModulesDeps`] asks a base [`DepsSource`] for an entity's declared
//! dependencies, then reads the entity's source files (those with a
//! recognized suffix, in level listing order) and appends every inline
//! dependency whose key is not yet among the should-dependencies. Must
//! dependencies from the base are never touched.
//!
//! Because discovered entities are expanded through the same source when the
//! graph walk reaches them, inline dependencies are followed transitively.

use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::constants::DEFAULT_KEYWORD;
use crate::core::{BemdepsError, FileOps};
use crate::decl::{DeclRef, DependencySet};
use crate::levels::{LevelFile, LevelIndex};
use crate::modules::InlineExtractor;
use crate::resolver::{DepsResolver, DepsSource};

/// A base dependency source augmented with inline `modules.define()` deps.
pub struct ModulesDeps<L, B> {
    base: B,
    levels: Arc<L>,
    suffixes: HashSet<String>,
    extractor: InlineExtractor,
}

impl<L: LevelIndex, B: DepsSource> ModulesDeps<L, B> {
    /// Wrap `base`, scanning files whose suffix is one of `suffixes`.
    ///
    /// # Errors
    ///
    /// Fails only if the default registration pattern cannot be compiled.
    pub fn new<I, S>(base: B, levels: Arc<L>, suffixes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_keyword(base, levels, suffixes, DEFAULT_KEYWORD)
    }

    /// Like [`ModulesDeps::new`], with a custom registration keyword.
    pub fn with_keyword<I, S>(base: B, levels: Arc<L>, suffixes: I, keyword: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            base,
            levels,
            suffixes: suffixes.into_iter().map(Into::into).collect(),
            extractor: InlineExtractor::new(keyword)?,
        })
    }

    /// Source files of `decl` with a recognized suffix, in listing order.
    pub fn source_files(&self, decl: &DeclRef) -> Vec<LevelFile> {
        self.levels
            .entity_files(decl)
            .into_iter()
            .filter(|file| self.suffixes.contains(&file.suffix))
            .collect()
    }

    /// The wrapped base source.
    pub fn base(&self) -> &B {
        &self.base
    }
}

impl<L: LevelIndex, B: DepsSource> DepsSource for ModulesDeps<L, B> {
    async fn get_deps(&self, decl: &DeclRef) -> Result<DependencySet> {
        let mut result = self.base.get_deps(decl).await?;

        let files = self.source_files(decl);
        if files.is_empty() {
            return Ok(result);
        }

        let mut should_index = result.should_keys();
        let before = result.should.len();

        for file in &files {
            let content = FileOps::read_with_context(
                &file.path,
                "extracting inline dependencies",
                "ModulesDeps",
            )
            .await
            .map_err(|e| BemdepsError::DiscoveryFailed {
                path: file.path.display().to_string(),
                reason: e.source.to_string(),
            })?;

            for dep in self.extractor.extract(&content) {
                if should_index.insert(dep.key()) {
                    trace!("{} declares {} in {}", decl, dep, file.path.display());
                    result.should.push(dep);
                }
            }
        }

        let discovered = result.should.len() - before;
        if discovered > 0 {
            debug!("{}: {} inline dependencies from {} file(s)", decl, discovered, files.len());
        }
        Ok(result)
    }
}

/// Resolver over a [`ModulesDeps`] source.
///
/// Holds the working declaration set; [`add_decls`](Self::add_decls) expands
/// seeds through the augmented source and [`resolve`](Self::resolve) returns
/// the final ordered list.
pub struct ModulesDepsResolver<L, B> {
    source: ModulesDeps<L, B>,
    graph: DepsResolver,
}

impl<L: LevelIndex, B: DepsSource> ModulesDepsResolver<L, B> {
    /// Create a resolver with an empty working set.
    pub fn new(source: ModulesDeps<L, B>) -> Self {
        Self {
            source,
            graph: DepsResolver::new(),
        }
    }

    /// Seed the working set and expand it, including inline dependencies.
    pub async fn add_decls(&mut self, decls: Vec<DeclRef>) -> Result<()> {
        self.graph.add_decls(&self.source, decls).await
    }

    /// Final flat, deduplicated, ordered list.
    pub fn resolve(&self) -> Result<Vec<DeclRef>> {
        self.graph.resolve()
    }

    /// Dependencies recorded for an entity after [`add_decls`](Self::add_decls).
    pub fn deps_of(&self, decl: &DeclRef) -> Option<&DependencySet> {
        self.graph.deps_of(decl)
    }

    /// The augmenting source.
    pub fn source(&self) -> &ModulesDeps<L, B> {
        &self.source
    }
}

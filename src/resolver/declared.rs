//! Static dependency declarations read from `deps.yaml` files.
//!
//! Each entity may have one `deps.yaml` per level. A file holds one object or
//! a list of objects:
//!
//! ```yaml
//! mustDeps:
//!   - i-bem
//! shouldDeps:
//!   - elems: [control, text]
//!   - block: popup
//!     mods: { theme: normal }
//! noDeps:
//!   - block: jquery
//! ```
//!
//! Files are merged in level order; `noDeps` entries are removed from both
//! lists after merging.

use anyhow::Result;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::constants::DEFAULT_DEPS_SUFFIXES;
use crate::core::{BemdepsError, FileOps};
use crate::decl::{DeclRef, DepEntry, DependencySet, dedup_by_key};
use crate::levels::{LevelFile, LevelIndex};
use crate::resolver::DepsSource;

/// One object of a `deps.yaml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DepsSpec {
    /// Dependencies built before the entity
    #[serde(default)]
    pub must_deps: Vec<DepEntry>,
    /// Dependencies included without ordering constraints
    #[serde(default)]
    pub should_deps: Vec<DepEntry>,
    /// Dependencies excluded even if declared elsewhere
    #[serde(default)]
    pub no_deps: Vec<DepEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DepsDocument {
    One(DepsSpec),
    Many(Vec<DepsSpec>),
}

/// Parse the content of a `deps.yaml` file. An empty document has no deps.
pub fn parse_deps_file(content: &str) -> Result<Vec<DepsSpec>, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(match serde_yaml::from_str::<DepsDocument>(content)? {
        DepsDocument::One(spec) => vec![spec],
        DepsDocument::Many(specs) => specs,
    })
}

/// [`DepsSource`] backed by `deps.yaml` files from a level index.
pub struct DeclaredDeps<L> {
    levels: Arc<L>,
    suffixes: Vec<String>,
}

impl<L: LevelIndex> DeclaredDeps<L> {
    /// Read deps from files with the default suffixes (`deps.yaml`, `deps.yml`).
    pub fn new(levels: Arc<L>) -> Self {
        Self::with_suffixes(levels, DEFAULT_DEPS_SUFFIXES.iter().copied())
    }

    /// Read deps from files with the given suffixes.
    pub fn with_suffixes<I, S>(levels: Arc<L>, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            levels,
            suffixes: suffixes.into_iter().map(Into::into).collect(),
        }
    }

    fn deps_files(&self, decl: &DeclRef) -> Vec<LevelFile> {
        self.levels
            .entity_files(decl)
            .into_iter()
            .filter(|file| self.suffixes.iter().any(|s| *s == file.suffix))
            .collect()
    }
}

impl<L: LevelIndex> DepsSource for DeclaredDeps<L> {
    async fn get_deps(&self, decl: &DeclRef) -> Result<DependencySet> {
        let mut result = DependencySet::new();
        let mut excluded: HashSet<String> = HashSet::new();

        for file in self.deps_files(decl) {
            let content =
                FileOps::read_with_context(&file.path, "reading declared dependencies", "DeclaredDeps")
                    .await?;
            let specs = parse_deps_file(&content).map_err(|e| BemdepsError::DepsFileParseError {
                file: file.path.display().to_string(),
                reason: e.to_string(),
            })?;

            for spec in specs {
                result.must.extend(spec.must_deps.iter().flat_map(|e| e.expand(Some(decl))));
                result.should.extend(spec.should_deps.iter().flat_map(|e| e.expand(Some(decl))));
                excluded.extend(spec.no_deps.iter().flat_map(|e| e.expand(Some(decl))).map(|d| d.key()));
            }
        }

        if !excluded.is_empty() {
            result.must.retain(|d| !excluded.contains(&d.key()));
            result.should.retain(|d| !excluded.contains(&d.key()));
        }
        dedup_by_key(&mut result.must);
        dedup_by_key(&mut result.should);

        if !result.must.is_empty() || !result.should.is_empty() {
            debug!(
                "{} declares {} must and {} should dependencies",
                decl,
                result.must.len(),
                result.should.len()
            );
        }
        Ok(result)
    }
}

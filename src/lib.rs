//! bemdeps - BEM dependency resolution that follows `modules.define()`.
//!
//! A bundle declares the BEM entities it needs (blocks, elements, modifier
//! values). Each entity may state its dependencies in two places:
//!
//! - static `deps.yaml` files next to its sources (`mustDeps`, `shouldDeps`,
//!   `noDeps`)
//! - inline, as the dependency list of a `modules.define()` call in its
//!   JavaScript sources
//!
//! The resolver merges both, follows discovered entities transitively, and
//! produces one flat, ordered, deduplicated list where every must-dependency
//! precedes its dependent.
//!
//! # Modules
//!
//! - [`decl`] - entity references, dependency sets, compact tokens
//! - [`levels`] - ordered level directories and the files of each entity
//! - [`modules`] - `modules.define()` extraction and module system prepending
//! - [`resolver`] - declared deps, inline augmentation, graph walk
//! - [`manifest`] - the bundle's declarations file
//! - [`output`] - the resolved `?.deps.js` artifact
//! - [`config`] - `bemdeps.toml` project configuration
//! - [`core`] - error types and user-facing error rendering
//! - [`cli`] - the `bemdeps` command line
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
//! let levels = Arc::new(FsLevels::scan(&["common.blocks", "desktop.blocks"])?);
//! let source = ModulesDeps::new(DeclaredDeps::new(levels.clone()), levels, ["vanilla.js", "js"])?;
//!
//! let mut resolver = ModulesDepsResolver::new(source);
//! resolver.add_decls(vec![DeclRef::block("page")]).await?;
//! for decl in resolver.resolve()? {
//!     println!("{decl}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod decl;
pub mod levels;
pub mod manifest;
pub mod modules;
pub mod output;
pub mod resolver;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

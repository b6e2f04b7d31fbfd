//! Test utilities for bemdeps
//!
//! Helpers shared by unit and integration tests: once-only logging setup and
//! a builder for on-disk level trees.
//!
//! # Example
//!
//! ```rust,no_run
//! use bemdeps_cli::test_utils::LevelsFixture;
//!
//! let fixture = LevelsFixture::new()
//!     .unwrap()
//!     .source("common.blocks", "page", "js", "modules.define('page', ['header'], f);")
//!     .deps("common.blocks", "header", "mustDeps: [i-bem]\n");
//!
//! assert!(fixture.level("common.blocks").join("page/page.js").exists());
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::decl::{DeclRef, parse_token};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=bemdeps_cli=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// Relative path of an entity's file inside a level, following the
/// `block/__elem/_mod/block__elem_mod_val.suffix` layout.
pub fn entity_file_path(entity: &DeclRef, suffix: &str) -> PathBuf {
    let mut path = PathBuf::from(&entity.name);
    if let Some(elem) = &entity.elem {
        path.push(format!("__{elem}"));
    }
    if let Some(name) = entity.mod_name() {
        path.push(format!("_{name}"));
    }
    path.push(format!("{}.{}", entity.key(), suffix));
    path
}

/// A temporary project with level directories populated on demand.
///
/// Entities are given as compact tokens (`button`, `button__text`,
/// `popup_theme_dark`). The temp directory is removed on drop.
pub struct LevelsFixture {
    temp: TempDir,
}

impl LevelsFixture {
    /// Create an empty project directory.
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            temp: TempDir::new()?,
        })
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Absolute path of a level directory (created if missing).
    pub fn level(&self, level: &str) -> PathBuf {
        let dir = self.root().join(level);
        fs::create_dir_all(&dir).unwrap_or_else(|e| panic!("create {}: {e}", dir.display()));
        dir
    }

    /// Write an arbitrary file relative to the project root.
    pub fn file(self, relative: &str, content: &str) -> Self {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create {}: {e}", parent.display()));
        }
        fs::write(&path, content).unwrap_or_else(|e| panic!("write {}: {e}", path.display()));
        self
    }

    /// Write a source file of `entity` with the given suffix.
    pub fn source(self, level: &str, entity: &str, suffix: &str, content: &str) -> Self {
        let relative = Path::new(level).join(entity_file_path(&parse_token(entity), suffix));
        self.file(&relative.to_string_lossy(), content)
    }

    /// Write the `deps.yaml` of `entity`.
    pub fn deps(self, level: &str, entity: &str, yaml: &str) -> Self {
        self.source(level, entity, "deps.yaml", yaml)
    }

    /// Write a JSON declarations file into `node` listing `blocks`.
    pub fn bemdecl(self, node: &str, blocks: &[&str]) -> Self {
        let node_name = Path::new(node)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let blocks: Vec<_> = blocks.iter().map(|name| serde_json::json!({ "name": name })).collect();
        let content = serde_json::json!({ "blocks": blocks }).to_string();
        self.file(&format!("{node}/{node_name}.bemdecl.json"), &content)
    }
}

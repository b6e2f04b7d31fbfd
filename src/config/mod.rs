//! Project configuration (`bemdeps.toml`).
//!
//! Every field is optional; a missing file behaves like an empty one.
//!
//! ```toml
//! levels = ["common.blocks", "desktop.blocks"]
//! source_suffixes = ["vanilla.js", "js"]
//! deps_suffixes = ["deps.yaml"]
//! keyword = "modules.define"
//! module_system = "node_modules/ym/modules.js"
//!
//! [targets]
//! bemdecl = "?.bemdecl.json"
//! levels = "?.levels"
//! deps = "?.deps.js"
//! ```
//!
//! Relative level and module-system paths are resolved against the directory
//! holding the config file. In target masks a `?` stands for the node name,
//! i.e. the name of the bundle directory being built.
//!
//! # Lookup order
//!
//! 1. The path given with `--config`
//! 2. The `BEMDEPS_CONFIG` environment variable
//! 3. `bemdeps.toml` in the node directory or the nearest ancestor
//! 4. Built-in defaults

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{
    CONFIG_ENV_VAR, CONFIG_FILE_NAME, DEFAULT_BEMDECL_TARGET, DEFAULT_DEPS_SUFFIXES,
    DEFAULT_DEPS_TARGET, DEFAULT_KEYWORD, DEFAULT_LEVELS_TARGET, DEFAULT_SOURCE_SUFFIXES,
};
use crate::core::BemdepsError;
use crate::core::file_error::{FileOperation, FileResultExt};

/// Resolver settings for one project.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Ordered level directories
    pub levels: Vec<PathBuf>,
    /// Suffixes of source files scanned for inline dependencies
    pub source_suffixes: Vec<String>,
    /// Suffixes of static dependency files
    pub deps_suffixes: Vec<String>,
    /// Registration call whose dependency list is extracted
    pub keyword: String,
    /// Module system runtime that must be present before extraction
    pub module_system: Option<PathBuf>,
    /// Input and output file masks
    pub targets: Targets,
    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Target masks, `?` being replaced by the node name.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Targets {
    /// Declarations file
    pub bemdecl: String,
    /// Levels listing file
    pub levels: String,
    /// Resolved dependency list
    pub deps: String,
}

impl Default for Targets {
    fn default() -> Self {
        Self {
            bemdecl: DEFAULT_BEMDECL_TARGET.to_string(),
            levels: DEFAULT_LEVELS_TARGET.to_string(),
            deps: DEFAULT_DEPS_TARGET.to_string(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            levels: Vec::new(),
            source_suffixes: DEFAULT_SOURCE_SUFFIXES.iter().map(ToString::to_string).collect(),
            deps_suffixes: DEFAULT_DEPS_SUFFIXES.iter().map(ToString::to_string).collect(),
            keyword: DEFAULT_KEYWORD.to_string(),
            module_system: None,
            targets: Targets::default(),
            base_dir: PathBuf::from("."),
        }
    }
}

impl BuildConfig {
    /// Parse a config file. Relative paths become relative to its directory.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_file_context(
            FileOperation::Read,
            path,
            "reading project configuration",
            "config",
        )?;

        let mut config: Self = toml::from_str(&content)
            .map_err(|e| BemdepsError::ConfigError {
                message: format!("{}: {}", path.display(), e.message()),
            })
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.base_dir =
            path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        config.validate()?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Find and load the configuration that applies to `node_dir`.
    ///
    /// `explicit` (from `--config`) must exist; the environment variable and
    /// directory search are only consulted without it. When nothing is found
    /// the defaults apply, with paths relative to `node_dir`.
    pub fn discover(node_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
            && !path.is_empty()
        {
            return Self::load(Path::new(&path));
        }

        for dir in node_dir.ancestors() {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }

        debug!("No {} found, using defaults", CONFIG_FILE_NAME);
        Ok(Self {
            base_dir: node_dir.to_path_buf(),
            ..Self::default()
        })
    }

    fn validate(&self) -> Result<(), BemdepsError> {
        if self.keyword.trim().is_empty() {
            return Err(BemdepsError::ConfigError {
                message: "keyword must not be empty".to_string(),
            });
        }
        for (field, mask) in [
            ("targets.bemdecl", &self.targets.bemdecl),
            ("targets.levels", &self.targets.levels),
            ("targets.deps", &self.targets.deps),
        ] {
            if mask.is_empty() {
                return Err(BemdepsError::ConfigError {
                    message: format!("{field} must not be empty"),
                });
            }
        }
        Ok(())
    }

    /// Path of a target inside `node_dir`, with `?` replaced by the node name.
    pub fn target_path(&self, node_dir: &Path, mask: &str) -> Result<PathBuf> {
        Ok(node_dir.join(unmask(mask, &node_name(node_dir)?)))
    }

    /// Module system path resolved against the config directory.
    pub fn module_system_path(&self) -> Option<PathBuf> {
        self.module_system.as_ref().map(|path| self.base_dir.join(path))
    }

    /// The ordered level directories for `node_dir`.
    ///
    /// Configured levels win; otherwise the levels listing file of the node
    /// is read. Having neither is a configuration error.
    pub fn resolve_levels(&self, node_dir: &Path) -> Result<Vec<PathBuf>> {
        if !self.levels.is_empty() {
            return Ok(self.levels.iter().map(|level| self.base_dir.join(level)).collect());
        }

        let listing = self.target_path(node_dir, &self.targets.levels)?;
        if !listing.is_file() {
            return Err(BemdepsError::ConfigError {
                message: format!(
                    "no levels configured and no levels listing at {}",
                    listing.display()
                ),
            }
            .into());
        }

        let content = std::fs::read_to_string(&listing).with_file_context(
            FileOperation::Read,
            &listing,
            "reading levels listing",
            "config",
        )?;
        let levels = parse_levels_listing(&content, node_dir);
        debug!("{} lists {} levels", listing.display(), levels.len());
        Ok(levels)
    }
}

/// Replace every `?` in a target mask with `node_name`.
pub fn unmask(mask: &str, node_name: &str) -> String {
    mask.replace('?', node_name)
}

/// Name of a node directory, resolving `.` and friends first.
pub fn node_name(node_dir: &Path) -> Result<String> {
    if let Some(name) = node_dir.file_name().and_then(|n| n.to_str()) {
        return Ok(name.to_string());
    }
    let canonical = node_dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve node directory: {}", node_dir.display()))?;
    canonical
        .file_name()
        .and_then(|n| n.to_str())
        .map(ToString::to_string)
        .ok_or_else(|| {
            BemdepsError::ConfigError {
                message: format!("cannot derive a node name from {}", node_dir.display()),
            }
            .into()
        })
}

/// One level per line; blank lines and `#` comments are ignored. Relative
/// entries are taken relative to `base`.
pub fn parse_levels_listing(content: &str, base: &Path) -> Vec<PathBuf> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| base.join(line))
        .collect()
}

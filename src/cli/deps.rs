//! Resolve a bundle's declarations into the `?.deps.js` artifact.
//!
//! The node directory holds the declarations file (`?.bemdecl.json` by
//! default); the result is written next to it. Level directories come from
//! `--level`, the project config, or the node's levels listing, in that order.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::decl::DeclRef;
use crate::levels::FsLevels;
use crate::manifest::BemDecl;
use crate::modules::ensure_module_system;
use crate::output::write_deps_js;
use crate::resolver::{DeclaredDeps, ModulesDeps, ModulesDepsResolver};

/// Arguments of `bemdeps deps`.
#[derive(Args, Debug)]
pub struct DepsCommand {
    /// Bundle directory containing the declarations file
    #[arg(default_value = ".")]
    node_dir: PathBuf,

    /// Level directory to scan (repeatable, in priority order)
    #[arg(short, long = "level", value_name = "DIR")]
    levels: Vec<PathBuf>,

    /// Source suffix scanned for modules.define() (repeatable)
    #[arg(short, long = "suffix", value_name = "SUFFIX")]
    suffixes: Vec<String>,

    /// Declarations file to read instead of the configured target
    #[arg(long, value_name = "FILE")]
    bemdecl: Option<PathBuf>,

    /// Where to write the resolved list instead of the configured target
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

/// What a `deps` run produced.
#[derive(Debug)]
pub struct DepsOutcome {
    /// The resolved, ordered list
    pub deps: Vec<DeclRef>,
    /// Where it was written
    pub output: PathBuf,
}

impl DepsCommand {
    /// Resolve, write the artifact, and print a summary unless `quiet`.
    pub async fn execute(self, config_path: Option<&Path>, quiet: bool) -> Result<()> {
        let outcome = self.run(config_path).await?;
        if !quiet {
            println!(
                "{} Resolved {} dependencies into {}",
                "✓".green(),
                outcome.deps.len(),
                outcome.output.display()
            );
        }
        Ok(())
    }

    async fn run(&self, config_path: Option<&Path>) -> Result<DepsOutcome> {
        let node_dir = self.node_dir.as_path();
        if !node_dir.is_dir() {
            return Err(anyhow::anyhow!("Node directory {} not found", node_dir.display()));
        }

        let mut config = BuildConfig::discover(node_dir, config_path)?;
        if !self.suffixes.is_empty() {
            config.source_suffixes.clone_from(&self.suffixes);
        }

        let level_dirs = if self.levels.is_empty() {
            config.resolve_levels(node_dir)?
        } else {
            self.levels.clone()
        };
        debug!("Levels: {:?}", level_dirs);

        if let Some(runtime) = config.module_system_path() {
            ensure_module_system(&runtime).await?;
        }

        let bemdecl = match &self.bemdecl {
            Some(path) => path.clone(),
            None => config.target_path(node_dir, &config.targets.bemdecl)?,
        };
        let decls = BemDecl::load(&bemdecl)?.to_decls();
        info!("{} declares {} entities", bemdecl.display(), decls.len());

        let levels = Arc::new(FsLevels::scan(&level_dirs)?);
        let base = DeclaredDeps::with_suffixes(levels.clone(), config.deps_suffixes.iter().cloned());
        let source = ModulesDeps::with_keyword(
            base,
            levels,
            config.source_suffixes.iter().cloned(),
            &config.keyword,
        )?;

        let mut resolver = ModulesDepsResolver::new(source);
        resolver
            .add_decls(decls)
            .await
            .with_context(|| format!("Failed to resolve dependencies of {}", bemdecl.display()))?;
        let deps = resolver.resolve()?;

        let output = match &self.output {
            Some(path) => path.clone(),
            None => config.target_path(node_dir, &config.targets.deps)?,
        };
        write_deps_js(&output, &deps)?;

        Ok(DepsOutcome {
            deps,
            output,
        })
    }
}

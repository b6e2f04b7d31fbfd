//! Prepend the module system runtime to a built file.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::config::BuildConfig;
use crate::constants::DEFAULT_MODULE_SYSTEM_PATH;
use crate::core::FileOps;
use crate::modules::prepend_module_system;
use crate::utils::fs::safe_write;

/// Arguments of `bemdeps prepend`.
#[derive(Args, Debug)]
pub struct PrependCommand {
    /// File the runtime is prepended to
    #[arg(long, value_name = "FILE")]
    source: PathBuf,

    /// Output file (defaults to overwriting the source)
    #[arg(long, value_name = "FILE")]
    target: Option<PathBuf>,

    /// Module system runtime (defaults to the configured one, then node_modules/ym/modules.js)
    #[arg(long, value_name = "PATH")]
    module_system: Option<PathBuf>,
}

impl PrependCommand {
    /// Write `runtime + source` to the target.
    pub async fn execute(self, config_path: Option<&Path>, quiet: bool) -> Result<()> {
        let runtime = match &self.module_system {
            Some(path) => path.clone(),
            None => BuildConfig::discover(Path::new("."), config_path)?
                .module_system_path()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODULE_SYSTEM_PATH)),
        };

        let source = FileOps::read_with_context(&self.source, "prepending module system", "prepend")
            .await?;
        let output = prepend_module_system(&runtime, &source).await?;

        let target = self.target.as_ref().unwrap_or(&self.source);
        safe_write(target, &output)
            .with_context(|| format!("Failed to write {}", target.display()))?;

        if !quiet {
            println!("{} Prepended {} to {}", "✓".green(), runtime.display(), target.display());
        }
        Ok(())
    }
}

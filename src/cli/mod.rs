//! Command-line interface for bemdeps.
//!
//! # Commands
//!
//! - `deps` - resolve a bundle's declarations into an ordered dependency list
//! - `extract` - show the inline `modules.define()` dependencies of source files
//! - `prepend` - put the module system runtime in front of a built file
//!
//! # Global Options
//!
//! - `--verbose` - debug output on stderr
//! - `--quiet` - errors only
//! - `--config` - path to a `bemdeps.toml` to use instead of discovery
//!
//! # Example
//!
//! ```bash
//! # Resolve bundles/index/index.bemdecl.json into bundles/index/index.deps.js
//! bemdeps deps bundles/index
//!
//! # What does this file pull in?
//! bemdeps extract common.blocks/button/button.js --format json
//!
//! # Ship a bundle with the module system in front
//! bemdeps prepend --source bundles/index/_index.js
//! ```

mod deps;
mod extract;
mod prepend;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub log_level: String,

    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
}

#[derive(Parser)]
#[command(
    name = "bemdeps",
    about = "BEM dependency resolver that follows modules.define() declarations",
    version,
    long_about = "bemdeps resolves a bundle's BEM declarations into an ordered dependency list, \
                  combining deps.yaml files with dependencies declared inline via modules.define()."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a bemdeps.toml configuration file
    #[arg(short, long, global = true, env = "BEMDEPS_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a bundle's declarations into an ordered dependency list
    Deps(deps::DepsCommand),

    /// Print the inline dependencies declared in source files
    Extract(extract::ExtractCommand),

    /// Prepend the module system runtime to a file
    Prepend(prepend::PrependCommand),
}

impl Cli {
    /// Derive the global settings from the parsed flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug".to_string()
        } else if self.quiet {
            "error".to_string()
        } else {
            "warn,bemdeps_cli=info".to_string()
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Run the selected command with already derived settings.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let config_path = config.config_path.as_deref();
        match self.command {
            Commands::Deps(cmd) => cmd.execute(config_path, self.quiet).await,
            Commands::Extract(cmd) => cmd.execute(config_path).await,
            Commands::Prepend(cmd) => cmd.execute(config_path, self.quiet).await,
        }
    }
}

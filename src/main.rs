//! bemdeps CLI entry point
//!
//! Parses arguments, installs the log subscriber, runs the command and renders
//! failures with context and suggestions.
//!
//! - `deps` - resolve a bundle into its ordered dependency list
//! - `extract` - print inline `modules.define()` dependencies
//! - `prepend` - prepend the module system runtime to a file

use anyhow::Result;
use bemdeps_cli::cli;
use bemdeps_cli::core::error::user_friendly_error;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    let config = cli.build_config();

    // RUST_LOG wins over the verbosity flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(&config.log_level)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute_with_config(config).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}

//! Shared helpers for the integration suite.

#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use bemdeps_cli::decl::DeclRef;
use bemdeps_cli::levels::FsLevels;
use bemdeps_cli::resolver::{DeclaredDeps, ModulesDeps, ModulesDepsResolver};
use bemdeps_cli::test_utils::LevelsFixture;
use std::sync::Arc;

pub type Resolver = ModulesDepsResolver<FsLevels, DeclaredDeps<FsLevels>>;

/// Build a resolver over the given levels of a fixture with default suffixes.
pub fn resolver(fixture: &LevelsFixture, levels: &[&str]) -> Result<Resolver> {
    let dirs: Vec<_> = levels.iter().map(|level| fixture.level(level)).collect();
    let index = Arc::new(FsLevels::scan(&dirs)?);
    let source = ModulesDeps::new(DeclaredDeps::new(index.clone()), index, ["vanilla.js", "js"])?;
    Ok(ModulesDepsResolver::new(source))
}

/// Resolve `seeds` (compact tokens) and return the keys of the result.
pub async fn resolve_keys(fixture: &LevelsFixture, levels: &[&str], seeds: &[&str]) -> Result<Vec<String>> {
    let mut resolver = resolver(fixture, levels)?;
    resolver
        .add_decls(seeds.iter().map(|s| bemdeps_cli::decl::parse_token(s)).collect())
        .await?;
    Ok(resolver.resolve()?.iter().map(DeclRef::key).collect())
}

/// The `bemdeps` binary, run from `dir` with a clean environment.
pub fn bemdeps(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("bemdeps").expect("bemdeps binary is built");
    cmd.current_dir(dir).env_remove("RUST_LOG").env_remove("BEMDEPS_CONFIG");
    cmd
}

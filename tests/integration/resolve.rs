//! Resolution over on-disk level trees.

use crate::common::{resolve_keys, resolver};
use anyhow::Result;
use bemdeps_cli::core::BemdepsError;
use bemdeps_cli::decl::DeclRef;
use bemdeps_cli::resolver::DepsSource;
use bemdeps_cli::test_utils::{LevelsFixture, init_test_logging};

#[tokio::test]
async fn test_inline_deps_of_a_block_in_order() -> Result<()> {
    init_test_logging(None);

    let fixture = LevelsFixture::new()?.source(
        "blocks",
        "A",
        "js",
        "modules.define('A', ['B', 'C__x'], function(provide, B, C) { provide({}); });",
    );

    let resolver = resolver(&fixture, &["blocks"])?;
    let deps = resolver.source().get_deps(&DeclRef::block("A")).await?;

    assert!(deps.must.is_empty());
    assert_eq!(deps.should, vec![DeclRef::block("B"), DeclRef::elem("C", "x")]);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_discovery_across_files() -> Result<()> {
    let fixture = LevelsFixture::new()?
        .source("common.blocks", "A", "vanilla.js", "modules.define('A', ['B'], f);")
        .source("desktop.blocks", "A", "js", "modules.define('A', [\"B\", \"C\"], f);");

    let resolver = resolver(&fixture, &["common.blocks", "desktop.blocks"])?;
    let deps = resolver.source().get_deps(&DeclRef::block("A")).await?;

    let keys: Vec<_> = deps.should.iter().map(DeclRef::key).collect();
    assert_eq!(keys, ["B", "C"]);
    Ok(())
}

#[tokio::test]
async fn test_no_source_files_keeps_base_result() -> Result<()> {
    let fixture = LevelsFixture::new()?
        .deps("blocks", "A", "mustDeps: [i-bem]\nshouldDeps: [B]\n")
        .source("blocks", "A", "css", "modules.define('A', ['X'], f);");

    let resolver = resolver(&fixture, &["blocks"])?;
    let augmented = resolver.source().get_deps(&DeclRef::block("A")).await?;
    let base = resolver.source().base().get_deps(&DeclRef::block("A")).await?;

    assert_eq!(augmented, base);
    Ok(())
}

#[tokio::test]
async fn test_full_bundle_order() -> Result<()> {
    let fixture = LevelsFixture::new()?
        .source("blocks", "page", "js", "modules.define('page', ['header', 'footer'], f);")
        .deps("blocks", "header", "mustDeps: [i-bem]\nshouldDeps:\n  - elems: [logo]\n")
        .source("blocks", "header__logo", "js", "modules.define('header__logo', ['link'], f);")
        .source("blocks", "footer", "js", "modules.define('footer', ['link', 'page'], f);")
        .deps("blocks", "i-bem", "mustDeps: [jquery]\n");

    let keys = resolve_keys(&fixture, &["blocks"], &["page"]).await?;
    assert_eq!(keys, ["page", "jquery", "i-bem", "header", "header__logo", "link", "footer"]);
    Ok(())
}

#[tokio::test]
async fn test_resolution_is_idempotent() -> Result<()> {
    let fixture = LevelsFixture::new()?
        .source("blocks", "a", "js", "modules.define('a', ['b', 'c', 'd_m_v'], f);")
        .source("blocks", "b", "js", "modules.define('b', ['d', 'a'], f);")
        .source("blocks", "c", "vanilla.js", "modules.define('c', ['e__f'], f);")
        .deps("blocks", "d", "mustDeps: [e]\n");

    let first = resolve_keys(&fixture, &["blocks"], &["a", "c"]).await?;
    let second = resolve_keys(&fixture, &["blocks"], &["a", "c"]).await?;

    assert_eq!(first, second);
    assert_eq!(first, ["a", "b", "e", "d", "c", "e__f", "d_m_v"]);
    Ok(())
}

#[tokio::test]
async fn test_must_dep_precedes_entity_reached_by_inline_dep() -> Result<()> {
    let fixture = LevelsFixture::new()?
        .deps("blocks", "a", "mustDeps: [b]\n")
        .source("blocks", "b", "js", "modules.define('b', ['c'], f);")
        .deps("blocks", "c", "mustDeps: [a]\n");

    let keys = resolve_keys(&fixture, &["blocks"], &["a"]).await?;
    assert_eq!(keys, ["b", "a", "c"]);
    Ok(())
}

#[tokio::test]
async fn test_malformed_tokens_are_skipped() -> Result<()> {
    let fixture = LevelsFixture::new()?.source(
        "blocks",
        "a",
        "js",
        "modules.define('a', ['b', '', '__e', 'c'], f);",
    );

    let keys = resolve_keys(&fixture, &["blocks"], &["a"]).await?;
    assert_eq!(keys, ["a", "b", "c"]);
    Ok(())
}

#[tokio::test]
async fn test_must_cycle_is_rejected() -> Result<()> {
    let fixture = LevelsFixture::new()?
        .deps("blocks", "a", "mustDeps: [b]\n")
        .deps("blocks", "b", "mustDeps: [a]\n");

    let err = resolve_keys(&fixture, &["blocks"], &["a"]).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BemdepsError>(),
        Some(BemdepsError::CircularDependency { .. })
    ));
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_unreadable_file_fails_whole_resolution() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let fixture = LevelsFixture::new()?
        .source("blocks", "a", "js", "modules.define('a', ['b'], f);")
        .source("blocks", "b", "js", "modules.define('b', [], f);");
    let unreadable = fixture.level("blocks").join("b/b.js");
    std::fs::set_permissions(&unreadable, std::fs::Permissions::from_mode(0o000))?;

    // Root ignores permission bits; nothing to test there
    if std::fs::read_to_string(&unreadable).is_ok() {
        return Ok(());
    }

    let mut resolver = resolver(&fixture, &["blocks"])?;
    let err = resolver.add_decls(vec![DeclRef::block("a")]).await.unwrap_err();

    match err.downcast_ref::<BemdepsError>() {
        Some(BemdepsError::DiscoveryFailed {
            path,
            ..
        }) => assert!(path.ends_with("b.js")),
        other => panic!("expected DiscoveryFailed, got {other:?}"),
    }
    Ok(())
}

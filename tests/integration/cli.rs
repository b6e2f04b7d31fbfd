//! The `bemdeps` binary end to end.

use crate::common::bemdeps;
use anyhow::Result;
use bemdeps_cli::decl::DeclRef;
use bemdeps_cli::output::read_deps_js;
use bemdeps_cli::test_utils::LevelsFixture;
use predicates::prelude::*;

fn project() -> Result<LevelsFixture> {
    Ok(LevelsFixture::new()?
        .file("bemdeps.toml", "levels = [\"common.blocks\"]\n")
        .source("common.blocks", "page", "js", "modules.define('page', ['header'], f);")
        .deps("common.blocks", "header", "mustDeps: [i-bem]\n")
        .bemdecl("bundles/index", &["page"]))
}

#[test]
fn test_deps_writes_artifact() -> Result<()> {
    let fixture = project()?;

    bemdeps(fixture.root())
        .args(["deps", "bundles/index"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Resolved 3 dependencies"));

    let deps = read_deps_js(&fixture.root().join("bundles/index/index.deps.js"))?;
    let keys: Vec<_> = deps.iter().map(DeclRef::key).collect();
    assert_eq!(keys, ["page", "i-bem", "header"]);
    Ok(())
}

#[test]
fn test_deps_quiet_prints_nothing() -> Result<()> {
    let fixture = project()?;

    bemdeps(fixture.root())
        .args(["--quiet", "deps", "bundles/index"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    Ok(())
}

#[test]
fn test_deps_uses_levels_listing() -> Result<()> {
    let fixture = LevelsFixture::new()?
        .source("blocks", "a", "vanilla.js", "modules.define('a', ['b'], f);")
        .file("bundles/index/index.levels", "# levels of this bundle\n../../blocks\n")
        .bemdecl("bundles/index", &["a"]);

    bemdeps(fixture.root()).args(["deps", "bundles/index"]).assert().success();

    let deps = read_deps_js(&fixture.root().join("bundles/index/index.deps.js"))?;
    assert_eq!(deps, [DeclRef::block("a"), DeclRef::block("b")]);
    Ok(())
}

#[test]
fn test_deps_without_levels_fails() -> Result<()> {
    let fixture = LevelsFixture::new()?.bemdecl("bundles/index", &["a"]);

    bemdeps(fixture.root())
        .args(["deps", "bundles/index"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no levels configured"));
    Ok(())
}

#[test]
fn test_deps_missing_module_system() -> Result<()> {
    let fixture = project()?.file(
        "bemdeps.toml",
        "levels = [\"common.blocks\"]\nmodule_system = \"node_modules/ym/modules.js\"\n",
    );

    bemdeps(fixture.root())
        .args(["deps", "bundles/index"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("npm install ym"));

    assert!(!fixture.root().join("bundles/index/index.deps.js").exists());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_deps_unreadable_source_reports_path() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let fixture = project()?.source("common.blocks", "header", "js", "modules.define('header', [], f);");
    let unreadable = fixture.root().join("common.blocks/header/header.js");
    std::fs::set_permissions(&unreadable, std::fs::Permissions::from_mode(0o000))?;
    if std::fs::read_to_string(&unreadable).is_ok() {
        return Ok(());
    }

    bemdeps(fixture.root())
        .args(["deps", "bundles/index"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("header.js"));
    assert!(!fixture.root().join("bundles/index/index.deps.js").exists());
    Ok(())
}

#[test]
fn test_extract_text_and_json() -> Result<()> {
    let fixture = LevelsFixture::new()?.file(
        "button.js",
        "modules.define(\n    'button',\n    ['i-bem__dom', \"popup_theme_dark\"],\n    function() {});",
    );

    bemdeps(fixture.root())
        .args(["extract", "button.js"])
        .assert()
        .success()
        .stdout("i-bem__dom\npopup_theme_dark\n");

    bemdeps(fixture.root())
        .args(["extract", "button.js", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"elem\": \"dom\"").and(predicate::str::contains("\"val\": \"dark\"")));
    Ok(())
}

#[test]
fn test_extract_missing_file() -> Result<()> {
    let fixture = LevelsFixture::new()?;

    bemdeps(fixture.root())
        .args(["extract", "absent.js"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("absent.js"));
    Ok(())
}

#[test]
fn test_prepend_in_place() -> Result<()> {
    let fixture = LevelsFixture::new()?
        .file("node_modules/ym/modules.js", "var modules = {};\n")
        .file("bundles/index/_index.js", "modules.define('page', [], f);\n");

    bemdeps(fixture.root())
        .args(["prepend", "--source", "bundles/index/_index.js"])
        .assert()
        .success();

    let content = std::fs::read_to_string(fixture.root().join("bundles/index/_index.js"))?;
    assert_eq!(content, "var modules = {};\nmodules.define('page', [], f);\n");
    Ok(())
}

#[test]
fn test_prepend_without_module_system() -> Result<()> {
    let fixture = LevelsFixture::new()?.file("_index.js", "body");

    bemdeps(fixture.root())
        .args(["prepend", "--source", "_index.js", "--target", "index.js"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Module system was not found"));

    assert!(!fixture.root().join("index.js").exists());
    Ok(())
}

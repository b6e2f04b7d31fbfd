//! Global constants used throughout the codebase.
//!
//! Default option values for the resolver and the naming conventions of the
//! BEM file system layout live here so they are discoverable in one place.

/// Separator between a block and its element (`block__elem`).
pub const ELEM_DELIMITER: &str = "__";

/// Separator between an entity and its modifier name or value (`block_mod_val`).
pub const MOD_DELIMITER: char = '_';

/// Registration call whose dependency list is mined from source files.
pub const DEFAULT_KEYWORD: &str = "modules.define";

/// Source suffixes scanned for inline dependencies: pre-expansion form first,
/// then the final form.
pub const DEFAULT_SOURCE_SUFFIXES: &[&str] = &["vanilla.js", "js"];

/// Suffixes of the static per-component dependency files.
pub const DEFAULT_DEPS_SUFFIXES: &[&str] = &["deps.yaml", "deps.yml"];

/// Target mask of the declarations file. `?` is replaced by the node name.
pub const DEFAULT_BEMDECL_TARGET: &str = "?.bemdecl.json";

/// Target mask of the levels listing file.
pub const DEFAULT_LEVELS_TARGET: &str = "?.levels";

/// Target mask of the resolved dependency list.
pub const DEFAULT_DEPS_TARGET: &str = "?.deps.js";

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "bemdeps.toml";

/// Default location of the module system runtime used by `prepend`.
pub const DEFAULT_MODULE_SYSTEM_PATH: &str = "node_modules/ym/modules.js";

/// Environment variable that overrides the configuration file path.
pub const CONFIG_ENV_VAR: &str = "BEMDEPS_CONFIG";

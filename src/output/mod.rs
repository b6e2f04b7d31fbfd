//! The resolved dependency list artifact (`?.deps.js`).
//!
//! ```js
//! exports.deps = [
//!     {
//!         "block": "page"
//!     },
//!     {
//!         "block": "button",
//!         "elem": "text"
//!     }
//! ];
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::path::Path;
use tracing::debug;

use crate::core::BemdepsError;
use crate::core::file_error::{FileOperation, FileResultExt};
use crate::decl::DeclRef;
use crate::utils::fs::safe_write;

const PREFIX: &str = "exports.deps = ";

/// Render the artifact text for a resolved list.
pub fn render_deps_js(deps: &[DeclRef]) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    deps.serialize(&mut serializer).context("Failed to serialize dependency list")?;

    let json = String::from_utf8(buf).context("Serialized dependency list is not UTF-8")?;
    Ok(format!("{PREFIX}{json};\n"))
}

/// Write the artifact for `deps` to `path`, replacing it atomically.
pub fn write_deps_js(path: &Path, deps: &[DeclRef]) -> Result<()> {
    let content = render_deps_js(deps)?;
    safe_write(path, &content)
        .with_context(|| format!("Failed to write dependency list: {}", path.display()))?;
    debug!("Wrote {} entries to {}", deps.len(), path.display());
    Ok(())
}

/// Parse artifact text back into references.
pub fn parse_deps_js(content: &str) -> Result<Vec<DeclRef>, String> {
    let body = content
        .trim()
        .strip_prefix("module.exports.deps")
        .or_else(|| content.trim().strip_prefix("exports.deps"))
        .ok_or_else(|| "missing `exports.deps =` assignment".to_string())?;
    let body = body
        .trim_start()
        .strip_prefix('=')
        .ok_or_else(|| "missing `=` after `exports.deps`".to_string())?;
    let body = body.trim().trim_end_matches(';');

    serde_json::from_str(body).map_err(|e| e.to_string())
}

/// Load a previously written artifact.
pub fn read_deps_js(path: &Path) -> Result<Vec<DeclRef>> {
    let content = std::fs::read_to_string(path).with_file_context(
        FileOperation::Read,
        path,
        "reading resolved dependency list",
        "output",
    )?;

    parse_deps_js(&content)
        .map_err(|reason| BemdepsError::ManifestParseError {
            file: path.display().to_string(),
            reason,
        })
        .with_context(|| format!("Failed to read dependency list: {}", path.display()))
}

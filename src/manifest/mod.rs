//! Declarations file (bemdecl): which entities a bundle needs.
//!
//! ```json
//! {
//!   "blocks": [
//!     { "name": "page" },
//!     { "name": "button",
//!       "mods": [{ "name": "theme", "vals": [{ "name": "normal" }] }],
//!       "elems": [{ "name": "text", "mods": [{ "name": "size", "vals": [{ "name": "s" }] }] }] }
//!   ],
//!   "deps": [{ "block": "i-bem", "elem": "dom" }]
//! }
//! ```
//!
//! The same structure is accepted as YAML, or as a CommonJS module of the
//! form `exports.blocks = [...];` / `exports.deps = [...];` or
//! `module.exports = {...};` whose values are strict JSON. The module is not
//! evaluated, so JavaScript literal syntax is not supported. Missing sections
//! simply contribute nothing, but a `.js` file without any recognized
//! assignment is an error.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;

use crate::core::file_error::{FileOperation, FileResultExt};
use crate::core::BemdepsError;
use crate::decl::{DeclRef, DepEntry};

/// `module.exports = { ... }` holding the whole declaration.
static EXPORTS_OBJECT: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*module\.exports\s*=\s*(\{.*\})\s*;?\s*$"));

/// One `exports.blocks = ...` or `exports.deps = ...` assignment, up to the
/// next assignment or the end of the file.
static EXPORTS_ASSIGNMENT: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"(?s)(?:module\.)?exports\.(blocks|deps)\s*=\s*(.*?)\s*;?\s*(?:$|(?:module\.)?exports\.)")
});

/// Parsed declarations file.
///
/// In the `.js` form every assigned value must be strict JSON: quoted keys,
/// double-quoted strings, no trailing commas or comments. JavaScript object
/// literals such as `{ name: 'page' }` are rejected with
/// [`BemdepsError::ManifestParseError`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BemDecl {
    /// Declared blocks
    #[serde(default)]
    pub blocks: Option<Vec<BlockDecl>>,
    /// Explicit, already normalized dependency list
    #[serde(default)]
    pub deps: Option<Vec<DepEntry>>,
}

/// A declared block with its modifiers and elements.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockDecl {
    /// Block name
    pub name: String,
    /// Block modifiers
    #[serde(default)]
    pub mods: Option<Vec<ModDecl>>,
    /// Block elements
    #[serde(default)]
    pub elems: Option<Vec<ElemDecl>>,
}

/// A declared element with its modifiers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElemDecl {
    /// Element name
    pub name: String,
    /// Element modifiers
    #[serde(default)]
    pub mods: Option<Vec<ModDecl>>,
}

/// A declared modifier and its values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModDecl {
    /// Modifier name
    pub name: String,
    /// Modifier values
    #[serde(default)]
    pub vals: Option<Vec<ValDecl>>,
}

/// A declared modifier value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValDecl {
    /// Value name
    pub name: String,
}

impl BemDecl {
    /// Load a declarations file, picking the format from its extension.
    ///
    /// Always reads the file from disk; nothing is cached between calls.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_file_context(
            FileOperation::Read,
            path,
            "reading declarations file",
            "manifest",
        )?;

        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let parsed = if file_name.ends_with(".json") {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else if file_name.ends_with(".yaml") || file_name.ends_with(".yml") {
            Self::from_yaml(&content).map_err(|e| e.to_string())
        } else if file_name.ends_with(".js") {
            Self::from_commonjs(&content)
        } else {
            Err(format!("unsupported declarations format: {file_name}"))
        };

        parsed
            .map_err(|reason| BemdepsError::ManifestParseError {
                file: path.display().to_string(),
                reason,
            })
            .with_context(|| format!("Failed to load declarations from {}", path.display()))
    }

    fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    /// Parse `module.exports = <json object>` or a sequence of
    /// `exports.blocks = <json>` / `exports.deps = <json>` assignments.
    ///
    /// Trailing semicolons are optional. A file with none of these forms is
    /// an error rather than an empty declaration.
    fn from_commonjs(content: &str) -> Result<Self, String> {
        let object = EXPORTS_OBJECT.as_ref().map_err(|e| e.to_string())?;
        if let Some(value) = object.captures(content).and_then(|caps| caps.get(1)) {
            return serde_json::from_str(value.as_str())
                .map_err(|e| format!("module.exports is not a JSON object: {e}"));
        }

        let assignment = EXPORTS_ASSIGNMENT.as_ref().map_err(|e| e.to_string())?;
        let mut decl = Self::default();
        let mut found = false;
        let mut rest = content;
        while let Some(caps) = assignment.captures(rest) {
            let (Some(name), Some(value)) = (caps.get(1), caps.get(2)) else {
                break;
            };
            match name.as_str() {
                "blocks" => {
                    decl.blocks = Some(serde_json::from_str(value.as_str()).map_err(|e| {
                        format!("exports.blocks is not a JSON value: {e}")
                    })?);
                }
                _ => {
                    decl.deps = Some(serde_json::from_str(value.as_str()).map_err(|e| {
                        format!("exports.deps is not a JSON value: {e}")
                    })?);
                }
            }
            found = true;
            // The match consumed the next `exports.` prefix, so resume right after the value
            rest = &rest[value.end()..];
        }

        if !found {
            return Err("no module.exports, exports.blocks or exports.deps assignment found".to_string());
        }
        Ok(decl)
    }

    /// Flatten the declarations into entity references.
    ///
    /// Order: each block, its modifier values, then each of its elements
    /// followed by the element's modifier values; finally the `deps` entries.
    pub fn to_decls(&self) -> Vec<DeclRef> {
        let mut decls = Vec::new();

        for block in self.blocks.iter().flatten() {
            let block_ref = DeclRef::block(&block.name);
            decls.push(block_ref.clone());
            push_mod_vals(&mut decls, &block_ref, block.mods.as_deref());

            for elem in block.elems.iter().flatten() {
                let elem_ref = DeclRef::elem(&block.name, &elem.name);
                decls.push(elem_ref.clone());
                push_mod_vals(&mut decls, &elem_ref, elem.mods.as_deref());
            }
        }

        for entry in self.deps.iter().flatten() {
            decls.extend(entry.expand(None));
        }

        decls
    }
}

fn push_mod_vals(decls: &mut Vec<DeclRef>, entity: &DeclRef, mods: Option<&[ModDecl]>) {
    for modifier in mods.into_iter().flatten() {
        for val in modifier.vals.iter().flatten() {
            decls.push(entity.clone().with_mod(&modifier.name, &val.name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn keys(decls: &[DeclRef]) -> Vec<String> {
        decls.iter().map(DeclRef::key).collect()
    }

    const DECL_JSON: &str = r#"{
        "blocks": [
            { "name": "page" },
            { "name": "button",
              "mods": [{ "name": "theme", "vals": [{ "name": "normal" }, { "name": "action" }] },
                       { "name": "disabled" }],
              "elems": [{ "name": "text",
                          "mods": [{ "name": "size", "vals": [{ "name": "s" }] }] },
                        { "name": "icon" }] }
        ],
        "deps": [{ "block": "i-bem", "elem": "dom" }, "jquery"]
    }"#;

    #[test]
    fn test_normalization_order() {
        let decl: BemDecl = serde_json::from_str(DECL_JSON).unwrap();
        assert_eq!(
            keys(&decl.to_decls()),
            [
                "page",
                "button",
                "button_theme_normal",
                "button_theme_action",
                "button__text",
                "button__text_size_s",
                "button__icon",
                "i-bem__dom",
                "jquery",
            ]
        );
    }

    #[test]
    fn test_missing_sections_are_empty() {
        let decl: BemDecl = serde_json::from_str("{}").unwrap();
        assert!(decl.to_decls().is_empty());

        let decl: BemDecl = serde_json::from_str(r#"{"deps": [{"block": "b"}]}"#).unwrap();
        assert_eq!(keys(&decl.to_decls()), ["b"]);
    }

    #[test]
    fn test_load_formats() {
        let temp = TempDir::new().unwrap();

        let json = temp.path().join("index.bemdecl.json");
        std::fs::write(&json, DECL_JSON).unwrap();
        assert_eq!(BemDecl::load(&json).unwrap().to_decls().len(), 9);

        let yaml = temp.path().join("index.bemdecl.yaml");
        std::fs::write(&yaml, "blocks:\n  - name: page\n    elems:\n      - name: head\n").unwrap();
        assert_eq!(keys(&BemDecl::load(&yaml).unwrap().to_decls()), ["page", "page__head"]);

        let js = temp.path().join("index.bemdecl.js");
        std::fs::write(
            &js,
            "exports.blocks = [{\"name\": \"page\"}];\nexports.deps = [{\"block\": \"b\", \"mod\": \"m\"}];\n",
        )
        .unwrap();
        assert_eq!(keys(&BemDecl::load(&js).unwrap().to_decls()), ["page", "b_m"]);
    }

    #[test]
    fn test_load_commonjs_variants() {
        assert!(EXPORTS_OBJECT.is_ok() && EXPORTS_ASSIGNMENT.is_ok());
        let temp = TempDir::new().unwrap();
        let js = temp.path().join("index.bemdecl.js");

        std::fs::write(&js, "exports.blocks = [{\"name\": \"page\"}]\n").unwrap();
        assert_eq!(keys(&BemDecl::load(&js).unwrap().to_decls()), ["page"]);

        std::fs::write(&js, "exports.blocks = [{\"name\": \"a\"}]\nmodule.exports.deps = [\"b\"]").unwrap();
        assert_eq!(keys(&BemDecl::load(&js).unwrap().to_decls()), ["a", "b"]);

        std::fs::write(&js, "module.exports = {\"blocks\": [{\"name\": \"page\"}]};\n").unwrap();
        assert_eq!(keys(&BemDecl::load(&js).unwrap().to_decls()), ["page"]);
    }

    #[test]
    fn test_load_commonjs_without_assignment_fails() {
        let temp = TempDir::new().unwrap();
        let js = temp.path().join("index.bemdecl.js");

        for content in ["var blocks = [{\"name\": \"page\"}];\n", "", "module.exports = { blocks: [{ name: 'page' }] };"] {
            std::fs::write(&js, content).unwrap();
            let err = BemDecl::load(&js).unwrap_err();
            assert!(
                matches!(err.downcast_ref::<BemdepsError>(), Some(BemdepsError::ManifestParseError { .. })),
                "{content:?} should not load"
            );
        }
    }

    #[test]
    fn test_load_rejects_garbage() {
        let temp = TempDir::new().unwrap();
        let json = temp.path().join("index.bemdecl.json");
        std::fs::write(&json, "{ not json").unwrap();

        let err = BemDecl::load(&json).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BemdepsError>(),
            Some(BemdepsError::ManifestParseError { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = BemDecl::load(&temp.path().join("absent.bemdecl.json")).unwrap_err();
        assert!(err.to_string().contains("File operation failed"));
    }
}

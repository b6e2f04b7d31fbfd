//! Declaration model: references to BEM entities and their dependency sets.
//!
//! A [`DeclRef`] names a block, a block modifier, an element, or an element
//! modifier. Its [`DeclRef::key`] is the only identity used for deduplication
//! anywhere in the resolver, so two references are the same entity iff their
//! keys are equal.
//!
//! # Key format
//!
//! ```text
//! block                   b
//! block + modifier        b_mod_val    (b_mod for a boolean modifier)
//! element                 b__elem
//! element + modifier      b__elem_mod_val
//! ```
//!
//! Identifiers are assumed not to contain the `_`/`__` separators, which is
//! the BEM naming rule; under that rule the key is injective.

pub mod entry;
pub mod token;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::constants::{ELEM_DELIMITER, MOD_DELIMITER};

pub use entry::DepEntry;
pub use token::parse_token;

/// A modifier applied to a block or element.
///
/// An empty `value` denotes a boolean (presence-only) modifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Modifier {
    /// Modifier name
    pub name: String,
    /// Modifier value, empty for boolean modifiers
    pub value: String,
}

impl Modifier {
    /// Create a modifier with a value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Create a boolean modifier.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, "")
    }

    /// True when the modifier carries no value.
    pub fn is_boolean(&self) -> bool {
        self.value.is_empty()
    }
}

/// Reference to a BEM entity.
///
/// Serialized in the `deps.js` shape: `{ "block", "elem"?, "mod"?, "val"? }`.
/// Deserialization also accepts the `name`/`modName`/`modVal` spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawDecl", into = "RawDecl")]
pub struct DeclRef {
    /// Block name
    pub name: String,
    /// Element name; `None` means the block itself
    pub elem: Option<String>,
    /// Modifier of the block or element
    pub modifier: Option<Modifier>,
}

impl DeclRef {
    /// Reference to a block.
    pub fn block(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elem: None,
            modifier: None,
        }
    }

    /// Reference to an element of a block.
    pub fn elem(name: impl Into<String>, elem: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elem: Some(elem.into()),
            modifier: None,
        }
    }

    /// Same entity with a modifier value attached.
    #[must_use]
    pub fn with_mod(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.modifier = Some(Modifier::new(name, value));
        self
    }

    /// Modifier name, if any.
    pub fn mod_name(&self) -> Option<&str> {
        self.modifier.as_ref().map(|m| m.name.as_str())
    }

    /// Modifier value, if a modifier is set (empty for boolean modifiers).
    pub fn mod_val(&self) -> Option<&str> {
        self.modifier.as_ref().map(|m| m.value.as_str())
    }

    /// Canonical deduplication key.
    ///
    /// `name` + `__elem` + `_modName` + `_modVal`, each part present only when
    /// set; a boolean modifier contributes `_modName` alone.
    pub fn key(&self) -> String {
        let mut key = self.name.clone();
        if let Some(elem) = &self.elem {
            key.push_str(ELEM_DELIMITER);
            key.push_str(elem);
        }
        if let Some(modifier) = &self.modifier {
            key.push(MOD_DELIMITER);
            key.push_str(&modifier.name);
            if !modifier.is_boolean() {
                key.push(MOD_DELIMITER);
                key.push_str(&modifier.value);
            }
        }
        key
    }
}

impl fmt::Display for DeclRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Wire shape of a [`DeclRef`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawDecl {
    #[serde(alias = "name")]
    block: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    elem: Option<String>,
    #[serde(rename = "mod", alias = "modName", default, skip_serializing_if = "Option::is_none")]
    modifier: Option<String>,
    #[serde(alias = "modVal", default, skip_serializing_if = "Option::is_none")]
    val: Option<String>,
}

impl From<RawDecl> for DeclRef {
    fn from(raw: RawDecl) -> Self {
        let modifier = raw
            .modifier
            .filter(|name| !name.is_empty())
            .map(|name| Modifier::new(name, raw.val.unwrap_or_default()));
        Self {
            name: raw.block,
            elem: raw.elem.filter(|elem| !elem.is_empty()),
            modifier,
        }
    }
}

impl From<DeclRef> for RawDecl {
    fn from(decl: DeclRef) -> Self {
        let (modifier, val) = match decl.modifier {
            Some(m) if m.is_boolean() => (Some(m.name), None),
            Some(m) => (Some(m.name), Some(m.value)),
            None => (None, None),
        };
        Self {
            block: decl.name,
            elem: decl.elem,
            modifier,
            val,
        }
    }
}

/// Dependencies of one entity.
///
/// `must` entries are emitted strictly before the entity, `should` entries
/// only need to be included. Both lists keep first-discovered order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencySet {
    /// Dependencies that must precede the entity
    pub must: Vec<DeclRef>,
    /// Dependencies that only need to be present
    pub should: Vec<DeclRef>,
}

impl DependencySet {
    /// Empty dependency set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the `should` keys, used to deduplicate appended references.
    pub fn should_keys(&self) -> HashSet<String> {
        self.should.iter().map(DeclRef::key).collect()
    }

    /// Both lists in order, must first.
    pub fn iter(&self) -> impl Iterator<Item = &DeclRef> {
        self.must.iter().chain(self.should.iter())
    }
}

/// Drop later duplicates (by key), keeping the first occurrence in place.
pub fn dedup_by_key(decls: &mut Vec<DeclRef>) {
    let mut seen = HashSet::new();
    decls.retain(|decl| seen.insert(decl.key()));
}

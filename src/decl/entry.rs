//! Dependency entries as written in `deps.yaml` files and in the `deps`
//! section of a declarations file.
//!
//! An entry is either a compact token string or an object:
//!
//! ```yaml
//! - i-bem                       # token
//! - block: popup                # block
//! - elem: inner                 # element of the owning block
//! - elems: [head, body]         # several elements
//! - block: button
//!   mods: { theme: [normal, action], disabled: true }
//! - block: link
//!   mod: pseudo
//!   val: yes
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::decl::{DeclRef, Modifier, parse_token};

/// One dependency entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DepEntry {
    /// Compact token, e.g. `button__icon_size_s`
    Token(String),
    /// Structured entry
    Object(DepObject),
}

/// Structured dependency entry.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepObject {
    /// Block name; defaults to the owning block
    #[serde(default, alias = "name")]
    pub block: Option<String>,
    /// Single element
    #[serde(default)]
    pub elem: Option<String>,
    /// Several elements of the block
    #[serde(default)]
    pub elems: Option<Vec<String>>,
    /// Single modifier name, used with `val`
    #[serde(default, rename = "mod", alias = "modName")]
    pub modifier: Option<String>,
    /// Single modifier value
    #[serde(default, alias = "modVal")]
    pub val: Option<ModValue>,
    /// Modifier map
    #[serde(default)]
    pub mods: Option<BTreeMap<String, ModValues>>,
}

/// A modifier value: a string, or `true` for a boolean modifier.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ModValue {
    /// Boolean modifier when `true`
    Flag(bool),
    /// Named value
    Value(String),
}

impl ModValue {
    fn into_value(self) -> Option<String> {
        match self {
            ModValue::Flag(true) => Some(String::new()),
            ModValue::Flag(false) => None,
            ModValue::Value(value) => Some(value),
        }
    }
}

/// Values of one modifier in a `mods` map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ModValues {
    /// A single value or flag
    One(ModValue),
    /// Several values
    Many(Vec<String>),
}

impl DepEntry {
    /// Expand the entry into references, relative to an owning entity.
    ///
    /// Returns an empty list for a malformed entry (no resolvable block name).
    pub fn expand(&self, owner: Option<&DeclRef>) -> Vec<DeclRef> {
        match self {
            DepEntry::Token(token) => {
                let decl = parse_token(token.trim());
                if decl.name.is_empty() {
                    tracing::debug!("Skipping malformed dependency token '{}'", token);
                    Vec::new()
                } else {
                    vec![decl]
                }
            }
            DepEntry::Object(object) => object.expand(owner),
        }
    }
}

impl DepObject {
    fn expand(&self, owner: Option<&DeclRef>) -> Vec<DeclRef> {
        let Some(block) =
            self.block.clone().or_else(|| owner.map(|o| o.name.clone())).filter(|b| !b.is_empty())
        else {
            tracing::debug!("Skipping dependency entry without a block: {:?}", self);
            return Vec::new();
        };

        if let Some(elems) = &self.elems {
            return elems.iter().map(|elem| DeclRef::elem(block.clone(), elem.clone())).collect();
        }

        // Element inherits from the owner only for block-less, elems-less entries
        let elem = match (&self.elem, &self.block) {
            (Some(elem), _) => Some(elem.clone()),
            (None, None) => owner.and_then(|o| o.elem.clone()),
            (None, Some(_)) => None,
        };
        let entity = DeclRef {
            name: block,
            elem,
            modifier: None,
        };

        if let Some(mod_name) = &self.modifier {
            let value = self.val.clone().and_then(ModValue::into_value).unwrap_or_default();
            return vec![DeclRef {
                modifier: Some(Modifier::new(mod_name.clone(), value)),
                ..entity
            }];
        }

        let mut result = vec![entity.clone()];
        if let Some(mods) = &self.mods {
            for (mod_name, values) in mods {
                let values = match values {
                    ModValues::One(value) => value.clone().into_value().into_iter().collect(),
                    ModValues::Many(values) => values.clone(),
                };
                for value in values {
                    result.push(DeclRef {
                        modifier: Some(Modifier::new(mod_name.clone(), value)),
                        ..entity.clone()
                    });
                }
            }
        }
        result
    }
}

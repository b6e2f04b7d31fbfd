//! Compact dependency tokens (`block`, `block_mod_val`, `block__elem`,
//! `block__elem_mod_val`).
//!
//! Parsing rule:
//! 1. With `__`, the part before it is the block; the part after it is split on
//!    `_` into the element followed by modifier name and value.
//! 2. Without `__`, the whole token is split on `_` into block, modifier name
//!    and value.
//!
//! A modifier without a value is boolean. Segments past the value are ignored,
//! and empty element or modifier names are treated as absent.

use crate::constants::{ELEM_DELIMITER, MOD_DELIMITER};
use crate::decl::{DeclRef, Modifier};

/// Decompose a compact token into a [`DeclRef`].
///
/// Never fails; a degenerate token yields a reference with an empty block
/// name, which callers treat as malformed.
///
/// # Examples
///
/// ```
/// use bemdeps_cli::decl::parse_token;
///
/// let decl = parse_token("C__x_mod_val");
/// assert_eq!(decl.name, "C");
/// assert_eq!(decl.elem.as_deref(), Some("x"));
/// assert_eq!(decl.mod_name(), Some("mod"));
/// assert_eq!(decl.mod_val(), Some("val"));
/// ```
pub fn parse_token(token: &str) -> DeclRef {
    let (name, elem, mod_parts): (&str, Option<&str>, Vec<&str>) =
        if token.contains(ELEM_DELIMITER) {
            let mut block_elem = token.split(ELEM_DELIMITER);
            let name = block_elem.next().unwrap_or_default();
            let mut elem_parts = block_elem.next().unwrap_or_default().split(MOD_DELIMITER);
            let elem = elem_parts.next();
            (name, elem, elem_parts.collect())
        } else {
            let mut block_parts = token.split(MOD_DELIMITER);
            let name = block_parts.next().unwrap_or_default();
            (name, None, block_parts.collect())
        };

    let modifier = match mod_parts.as_slice() {
        [] => None,
        [mod_name, rest @ ..] if !mod_name.is_empty() => {
            Some(Modifier::new(*mod_name, rest.first().copied().unwrap_or_default()))
        }
        _ => None,
    };

    DeclRef {
        name: name.to_string(),
        elem: elem.filter(|e| !e.is_empty()).map(str::to_string),
        modifier,
    }
}

/// Trim whitespace and one layer of surrounding `'`/`"` quotes.
pub fn strip_quotes(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix(['\'', '"']).unwrap_or(trimmed);
    trimmed.strip_suffix(['\'', '"']).unwrap_or(trimmed)
}

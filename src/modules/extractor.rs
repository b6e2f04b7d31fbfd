//! Inline dependency extraction from `modules.define()` calls.
//!
//! Source files register themselves with the module system like this:
//!
//! ```js
//! modules.define('button', ['i-bem__dom', 'popup_visible', "jquery"], function(provide, BEMDOM) {
//!     ...
//! });
//! ```
//!
//! The dependency list of the first such call is turned into [`DeclRef`]s using
//! the compact token rules. This is a single-pattern scan, not a parser of the
//! host language: only the first registration is considered, and the list ends
//! at the first `]`.

use regex::Regex;
use std::sync::LazyLock;

use crate::constants::DEFAULT_KEYWORD;
use crate::core::BemdepsError;
use crate::decl::DeclRef;
use crate::decl::token::{parse_token, strip_quotes};

/// Scanner for one registration keyword.
#[derive(Debug, Clone)]
pub struct InlineExtractor {
    keyword: String,
    pattern: Regex,
}

impl InlineExtractor {
    /// Build an extractor for `<keyword>('<id>', [<deps>]`.
    ///
    /// # Errors
    ///
    /// Returns [`BemdepsError::InvalidPattern`] if the resulting pattern does
    /// not compile (e.g. an absurdly long keyword).
    pub fn new(keyword: &str) -> Result<Self, BemdepsError> {
        let source = format!(
            r#"{}\(\s*['"][^"']+["']\s*,\s*\[([^\]]+)\]"#,
            regex::escape(keyword)
        );
        let pattern = Regex::new(&source).map_err(|e| BemdepsError::InvalidPattern {
            pattern: keyword.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            keyword: keyword.to_string(),
            pattern,
        })
    }

    /// The registration keyword this extractor looks for.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Extract the declared dependencies of the first registration call.
    ///
    /// Returns an empty list when there is no registration call or its list is
    /// empty. Tokens without a block name are dropped.
    pub fn extract(&self, content: &str) -> Vec<DeclRef> {
        let Some(list) = self.pattern.captures(content).and_then(|caps| caps.get(1)) else {
            return Vec::new();
        };

        list.as_str()
            .split(',')
            .map(|raw| parse_token(strip_quotes(raw)))
            .filter(|decl| {
                if decl.name.is_empty() {
                    tracing::debug!("Skipping malformed inline dependency in {}", self.keyword);
                    false
                } else {
                    true
                }
            })
            .collect()
    }
}

/// Extractor for the default keyword, compiled on first use.
static DEFAULT_EXTRACTOR: LazyLock<Result<InlineExtractor, BemdepsError>> =
    LazyLock::new(|| InlineExtractor::new(DEFAULT_KEYWORD));

/// Extract inline dependencies using the default `modules.define` keyword.
///
/// # Examples
///
/// ```
/// use bemdeps_cli::modules::extract_dependencies;
///
/// let deps = extract_dependencies("modules.define('a', ['B', 'C__x'], function() {});");
/// let keys: Vec<String> = deps.iter().map(|d| d.key()).collect();
/// assert_eq!(keys, ["B", "C__x"]);
/// ```
pub fn extract_dependencies(content: &str) -> Vec<DeclRef> {
    DEFAULT_EXTRACTOR.as_ref().map(|e| e.extract(content)).unwrap_or_default()
}

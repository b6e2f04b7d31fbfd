//! Error handling for bemdeps
//!
//! This module provides the error types and user-friendly error reporting for the
//! resolver. The error system follows two principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`BemdepsError`] - Enumerated error types for all failure cases
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Error Categories
//!
//! - **Discovery**: [`BemdepsError::DiscoveryFailed`] when a candidate source file
//!   cannot be read while mining inline dependencies. Always fatal.
//! - **Module system**: [`BemdepsError::ModuleSystemNotFound`] when the runtime
//!   backing `modules.define()` is not installed. Always fatal.
//! - **Configuration**: [`BemdepsError::ConfigError`], [`BemdepsError::LevelNotFound`],
//!   [`BemdepsError::ManifestParseError`], [`BemdepsError::DepsFileParseError`]
//! - **Resolution**: [`BemdepsError::CircularDependency`]
//!
//! Malformed tokens inside an inline declaration and absent manifest sections
//! are not errors at all; they are absorbed where they are detected.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bemdeps_cli::core::{BemdepsError, ErrorContext, user_friendly_error};
//!
//! fn check_runtime() -> Result<(), BemdepsError> {
//!     Err(BemdepsError::ModuleSystemNotFound {
//!         path: "node_modules/ym/modules.js".to_string(),
//!     })
//! }
//!
//! if let Err(e) = check_runtime() {
//!     let ctx = user_friendly_error(anyhow::Error::from(e));
//!     ctx.display(); // Shows colored error with suggestions
//! }
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::core::file_error::FileOperationError;

/// The main error type for bemdeps operations
///
/// Each variant carries enough context (file path, chain of references) to
/// diagnose the failure without re-running in a debug mode.
#[derive(Error, Debug, Clone)]
pub enum BemdepsError {
    /// A candidate source file could not be read during inline extraction
    ///
    /// Discovery is all-or-nothing: one unreadable file aborts the whole
    /// resolution pass rather than producing a partial dependency list.
    #[error("Failed to discover dependencies: cannot read {path}")]
    DiscoveryFailed {
        /// Path of the unreadable source file
        path: String,
        /// The underlying reason reported by the file system
        reason: String,
    },

    /// The module system runtime is not installed
    ///
    /// Without the runtime the `modules.define()` convention cannot be trusted,
    /// so this is reported before any extraction happens.
    #[error("Module system was not found at {path}")]
    ModuleSystemNotFound {
        /// Expected location of the runtime file
        path: String,
    },

    /// Declarations file (bemdecl) could not be parsed
    #[error("Invalid declarations file {file}: {reason}")]
    ManifestParseError {
        /// Path to the declarations file
        file: String,
        /// Parser error message
        reason: String,
    },

    /// Static dependency file (deps.yaml) could not be parsed
    #[error("Invalid dependency file {file}: {reason}")]
    DepsFileParseError {
        /// Path to the dependency file
        file: String,
        /// Parser error message
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// A configured level directory does not exist
    #[error("Level directory not found: {path}")]
    LevelNotFound {
        /// The missing level directory
        path: String,
    },

    /// Must-dependencies form a cycle and cannot be ordered
    #[error("Circular must-dependency detected: {chain}")]
    CircularDependency {
        /// Human-readable cycle, e.g. `a → b → a`
        chain: String,
    },

    /// The registration keyword produced an invalid pattern
    #[error("Invalid registration pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The keyword that was used to build the pattern
        pattern: String,
        /// Regex compiler error
        reason: String,
    },

    /// Catch-all for errors that don't fit the categories above
    #[error("{message}")]
    Other {
        /// The error message
        message: String,
    },
}

/// Error context wrapper that provides user-friendly error information
///
/// Printed by the CLI with the error in red, details in yellow and the
/// suggestion in green.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: BemdepsError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: BemdepsError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with contextual suggestions.
///
/// Typed errors anywhere in the `anyhow` chain are recognized, so callers can
/// freely wrap them with `.context(...)`.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    for cause in error.chain() {
        if let Some(bemdeps_error) = cause.downcast_ref::<BemdepsError>() {
            return create_error_context(bemdeps_error.clone());
        }

        if let Some(file_error) = cause.downcast_ref::<FileOperationError>() {
            return ErrorContext::new(BemdepsError::Other {
                message: file_error.to_string(),
            })
            .with_details(file_error.user_message());
        }
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(BemdepsError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check file ownership and permissions of the level directories");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(BemdepsError::Other {
                    message: error.to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(BemdepsError::Other {
        message,
    })
}

fn create_error_context(error: BemdepsError) -> ErrorContext {
    match &error {
        BemdepsError::ModuleSystemNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Please install `ym` npm module: npm install ym")
            .with_details("modules.define() declarations need the ym module system at runtime"),
        BemdepsError::DiscoveryFailed {
            reason,
            ..
        } => {
            let details = format!("{reason}. No partial dependency list was written");
            ErrorContext::new(error)
                .with_details(details)
                .with_suggestion("Check that the file exists and is readable, then rebuild")
        }
        BemdepsError::LevelNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Fix the `levels` list in bemdeps.toml or the ?.levels listing file"),
        BemdepsError::ManifestParseError {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Declarations must be JSON, YAML, or `exports.blocks = [...];` with a JSON value",
        ),
        BemdepsError::DepsFileParseError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check mustDeps/shouldDeps/noDeps entries in the YAML file"),
        BemdepsError::CircularDependency {
            ..
        } => ErrorContext::new(error)
            .with_details("Must-dependencies have to be built strictly before their dependents")
            .with_suggestion("Turn one edge of the cycle into a shouldDeps entry"),
        BemdepsError::InvalidPattern {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Use a plain identifier such as `modules.define` as the keyword"),
        _ => ErrorContext::new(error),
    }
}

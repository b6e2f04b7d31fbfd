//! Core types and error handling.
//!
//! - [`error`] - [`BemdepsError`], [`ErrorContext`] and [`user_friendly_error`]
//! - [`file_error`] - file operations that always carry path and purpose

pub mod error;
pub mod file_error;

pub use error::{BemdepsError, ErrorContext, user_friendly_error};
pub use file_error::{FileOperation, FileOperationError, FileOps, FileResultExt};

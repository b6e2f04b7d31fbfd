//! Support for the `modules.define()` module system convention.
//!
//! - [`extractor`] - mines dependency lists out of registration calls
//! - [`prepend`] - checks for and prepends the module system runtime

pub mod extractor;
pub mod prepend;

pub use extractor::{InlineExtractor, extract_dependencies};
pub use prepend::{ensure_module_system, prepend_module_system};

//! Integration test suite for bemdeps
//!
//! End-to-end checks of the library resolver over real level trees and of
//! the `bemdeps` binary.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **resolve**: ordering, deduplication and failure behavior of resolution
//! - **cli**: the `deps`, `extract` and `prepend` commands

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod resolve;

//! Shared helpers that are not specific to BEM resolution.

pub mod fs;

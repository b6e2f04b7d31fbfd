//! Level index: maps a BEM entity to its files across ordered level directories.
//!
//! The resolver only talks to the [`LevelIndex`] trait. [`FsLevels`] is the
//! file-system implementation that scans level directories once up front.
//!
//! # File naming
//!
//! A file belongs to the entity encoded in its name before the first `.`;
//! everything after that dot is its suffix:
//!
//! ```text
//! common.blocks/button/button.js                 button            js
//! common.blocks/button/button.deps.yaml          button            deps.yaml
//! common.blocks/button/_theme/button_theme_dark.vanilla.js
//!                                                button_theme_dark vanilla.js
//! common.blocks/button/__icon/button__icon.js    button__icon      js
//! ```

mod fs_levels;

pub use fs_levels::FsLevels;

use std::path::PathBuf;

use crate::decl::DeclRef;

/// A file found in a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Suffix after the first dot of the file name, e.g. `vanilla.js`
    pub suffix: String,
    /// Position of the owning level in the configured level list
    pub level: usize,
}

/// Read-only view over the files of all levels.
///
/// Every listing is in stable order: level order first, then the order in
/// which files were found inside a level.
pub trait LevelIndex: Send + Sync {
    /// All files with the given suffix.
    fn files_by_suffix(&self, suffix: &str) -> Vec<LevelFile>;

    /// Files of a block, or of one of its modifier values.
    fn block_files(&self, name: &str, mod_name: Option<&str>, mod_val: Option<&str>)
    -> Vec<LevelFile>;

    /// Files of an element, or of one of its modifier values.
    fn elem_files(
        &self,
        name: &str,
        elem: &str,
        mod_name: Option<&str>,
        mod_val: Option<&str>,
    ) -> Vec<LevelFile>;

    /// Files of the entity a reference points at: element-scoped when `elem`
    /// is set, block-scoped otherwise, with the modifier passed through.
    fn entity_files(&self, decl: &DeclRef) -> Vec<LevelFile> {
        match &decl.elem {
            Some(elem) => self.elem_files(&decl.name, elem, decl.mod_name(), decl.mod_val()),
            None => self.block_files(&decl.name, decl.mod_name(), decl.mod_val()),
        }
    }
}

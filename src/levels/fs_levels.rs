use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

use crate::core::BemdepsError;
use crate::core::file_error::{FileOperation, FileOperationContext, FileOperationError};
use crate::decl::{DeclRef, Modifier, parse_token};
use crate::levels::{LevelFile, LevelIndex};

/// Level index backed by a one-time scan of the level directories.
#[derive(Debug, Default)]
pub struct FsLevels {
    /// Every file in listing order
    files: Vec<LevelFile>,
    /// Entity key -> positions in `files`
    by_entity: HashMap<String, Vec<usize>>,
}

impl FsLevels {
    /// Scan the given level directories in order.
    ///
    /// # Errors
    ///
    /// Returns [`BemdepsError::LevelNotFound`] when a level directory does not
    /// exist, or a [`FileOperationError`] naming the directory that could not
    /// be listed.
    pub fn scan<P: AsRef<Path>>(levels: &[P]) -> Result<Self> {
        let mut index = Self::default();

        for (level, dir) in levels.iter().enumerate() {
            let dir = dir.as_ref();
            if !dir.is_dir() {
                return Err(BemdepsError::LevelNotFound {
                    path: dir.display().to_string(),
                }
                .into());
            }

            let before = index.files.len();
            for entry in WalkDir::new(dir).sort_by_file_name() {
                let entry = entry.map_err(|err| {
                    let path = err.path().unwrap_or(dir).to_path_buf();
                    let context =
                        FileOperationContext::new(FileOperation::Scan, path, "indexing level files", "FsLevels")
                            .with_related_path(dir);
                    FileOperationError::new(context, err.into())
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }

                let Some(file_name) = entry.file_name().to_str() else {
                    continue;
                };
                let Some((entity, suffix)) = file_name.split_once('.') else {
                    continue;
                };
                if entity.is_empty() {
                    continue;
                }

                index.push(
                    parse_token(entity),
                    LevelFile {
                        path: entry.path().to_path_buf(),
                        suffix: suffix.to_string(),
                        level,
                    },
                );
            }

            debug!("Level {} contributed {} files", dir.display(), index.files.len() - before);
        }

        Ok(index)
    }

    fn push(&mut self, entity: DeclRef, file: LevelFile) {
        let position = self.files.len();
        self.files.push(file);
        self.by_entity.entry(entity.key()).or_default().push(position);
    }

    fn files_of(&self, entity: &DeclRef) -> Vec<LevelFile> {
        self.by_entity
            .get(&entity.key())
            .map(|positions| positions.iter().map(|&i| self.files[i].clone()).collect())
            .unwrap_or_default()
    }
}

fn with_modifier(mut entity: DeclRef, mod_name: Option<&str>, mod_val: Option<&str>) -> DeclRef {
    entity.modifier = mod_name
        .filter(|name| !name.is_empty())
        .map(|name| Modifier::new(name, mod_val.unwrap_or_default()));
    entity
}

impl LevelIndex for FsLevels {
    fn files_by_suffix(&self, suffix: &str) -> Vec<LevelFile> {
        self.files.iter().filter(|file| file.suffix == suffix).cloned().collect()
    }

    fn block_files(
        &self,
        name: &str,
        mod_name: Option<&str>,
        mod_val: Option<&str>,
    ) -> Vec<LevelFile> {
        self.files_of(&with_modifier(DeclRef::block(name), mod_name, mod_val))
    }

    fn elem_files(
        &self,
        name: &str,
        elem: &str,
        mod_name: Option<&str>,
        mod_val: Option<&str>,
    ) -> Vec<LevelFile> {
        self.files_of(&with_modifier(DeclRef::elem(name, elem), mod_name, mod_val))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn names(files: &[LevelFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_block_files_across_levels() {
        let temp = TempDir::new().unwrap();
        let common = temp.path().join("common.blocks");
        let desktop = temp.path().join("desktop.blocks");
        touch(&common, "button/button.js");
        touch(&common, "button/button.deps.yaml");
        touch(&desktop, "button/button.vanilla.js");

        let levels = FsLevels::scan(&[&common, &desktop]).unwrap();
        let files = levels.block_files("button", None, None);

        assert_eq!(names(&files), ["button.deps.yaml", "button.js", "button.vanilla.js"]);
        assert_eq!(files[0].suffix, "deps.yaml");
        assert_eq!(files[2].level, 1);
    }

    #[test]
    fn test_modifier_and_element_files() {
        let temp = TempDir::new().unwrap();
        let level = temp.path().join("blocks");
        touch(&level, "popup/_visible/popup_visible.js");
        touch(&level, "popup/_theme/popup_theme_dark.js");
        touch(&level, "popup/__tail/popup__tail.js");
        touch(&level, "popup/__tail/_side/popup__tail_side_left.js");

        let levels = FsLevels::scan(&[&level]).unwrap();

        assert_eq!(names(&levels.block_files("popup", Some("visible"), None)), ["popup_visible.js"]);
        assert_eq!(
            names(&levels.block_files("popup", Some("visible"), Some(""))),
            ["popup_visible.js"]
        );
        assert_eq!(
            names(&levels.block_files("popup", Some("theme"), Some("dark"))),
            ["popup_theme_dark.js"]
        );
        assert_eq!(names(&levels.elem_files("popup", "tail", None, None)), ["popup__tail.js"]);
        assert_eq!(
            names(&levels.elem_files("popup", "tail", Some("side"), Some("left"))),
            ["popup__tail_side_left.js"]
        );
        assert!(levels.block_files("popup", None, None).is_empty());
    }

    #[test]
    fn test_files_by_suffix_and_dotfiles() {
        let temp = TempDir::new().unwrap();
        let level = temp.path().join("blocks");
        touch(&level, "a/a.js");
        touch(&level, "a/a.vanilla.js");
        touch(&level, "b/b.js");
        touch(&level, ".gitignore");

        let levels = FsLevels::scan(&[&level]).unwrap();
        assert_eq!(names(&levels.files_by_suffix("js")), ["a.js", "b.js"]);
        assert_eq!(names(&levels.files_by_suffix("vanilla.js")), ["a.vanilla.js"]);
        assert!(levels.files_by_suffix("gitignore").is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unlistable_directory_names_scan_and_level() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let level = temp.path().join("blocks");
        touch(&level, "a/a.js");
        let locked = level.join("a");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let err = FsLevels::scan(&[&level]).unwrap_err();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let file_error = err.downcast_ref::<FileOperationError>().unwrap();
        assert_eq!(file_error.operation, FileOperation::Scan);
        assert_eq!(file_error.file_path, locked);
        assert_eq!(file_error.related_paths, [level]);
        assert!(file_error.user_message().contains("Failed scanning file"));
    }

    #[test]
    fn test_missing_level_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = FsLevels::scan(&[temp.path().join("absent")]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BemdepsError>(),
            Some(BemdepsError::LevelNotFound { .. })
        ));
    }
}

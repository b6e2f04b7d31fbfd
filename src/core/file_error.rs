//! Structured file system error handling
//!
//! Captures context (path, purpose, caller) at the operation site instead of
//! parsing error messages later.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Context information for file operations.
#[derive(Debug, Clone)]
pub struct FileOperationContext {
    /// The type of file operation being performed
    pub operation: FileOperation,
    /// The path to the file being operated on
    pub file_path: PathBuf,
    /// Description of why this operation is being performed
    pub purpose: String,
    /// The module or function that initiated this operation
    pub caller: String,
    /// Level directories or node directory the file belongs to
    pub related_paths: Vec<PathBuf>,
}

/// Types of file operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOperation {
    /// Reading file contents
    Read,
    /// Writing file contents
    Write,
    /// Creating directories
    CreateDir,
    /// Walking a level directory
    Scan,
}

impl std::fmt::Display for FileOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileOperation::Read => write!(f, "reading"),
            FileOperation::Write => write!(f, "writing"),
            FileOperation::CreateDir => write!(f, "creating directory"),
            FileOperation::Scan => write!(f, "scanning"),
        }
    }
}

impl FileOperationContext {
    /// Create a new file operation context.
    pub fn new(
        operation: FileOperation,
        file_path: impl Into<PathBuf>,
        purpose: impl Into<String>,
        caller: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            file_path: file_path.into(),
            purpose: purpose.into(),
            caller: caller.into(),
            related_paths: Vec::new(),
        }
    }

    /// Add a related path for additional context.
    pub fn with_related_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.related_paths.push(path.into());
        self
    }
}

/// Enhanced file operation error with rich context.
#[derive(Error, Debug)]
#[error("File operation failed: {operation} {}", file_path.display())]
pub struct FileOperationError {
    /// The type of file operation that failed
    pub operation: FileOperation,
    /// The path to the file that caused the error
    pub file_path: PathBuf,
    /// Description of the operation's purpose
    pub purpose: String,
    /// The module or function that initiated the operation
    pub caller: String,
    /// The underlying I/O error
    #[source]
    pub source: std::io::Error,
    /// Related paths for context
    pub related_paths: Vec<PathBuf>,
}

impl FileOperationError {
    /// Create a new file operation error from context and an I/O error.
    pub fn new(context: FileOperationContext, source: std::io::Error) -> Self {
        Self {
            operation: context.operation,
            file_path: context.file_path,
            purpose: context.purpose,
            caller: context.caller,
            source,
            related_paths: context.related_paths,
        }
    }

    /// Build a multi-line message suitable for the CLI `details` line.
    pub fn user_message(&self) -> String {
        let mut message = format!(
            "Failed {} file '{}' for {} ({})",
            self.operation,
            self.file_path.display(),
            self.purpose,
            self.caller
        );

        match self.source.kind() {
            std::io::ErrorKind::NotFound => {
                message.push_str("\n\nThe file does not exist at the specified path.");

                let suffix = file_suffix(&self.file_path);
                if suffix.is_some_and(|s| s.ends_with("js")) {
                    message.push_str(
                        "\n\nThe file was listed by a level scan; it may have been removed \
                        while the build was running.",
                    );
                }
            }
            std::io::ErrorKind::PermissionDenied => {
                message.push_str(&format!(
                    "\n\nPermission denied. Check file/directory permissions for: {}",
                    self.file_path.display()
                ));
            }
            std::io::ErrorKind::InvalidData => {
                message.push_str("\n\nThe file contains invalid data or encoding.");
                message.push_str("\nEnsure the file contains valid UTF-8 text.");
            }
            _ => {
                message.push_str(&format!("\n\nError details: {}", self.source));
            }
        }

        if !self.related_paths.is_empty() {
            message.push_str("\n\nRelated paths:");
            for path in &self.related_paths {
                message.push_str(&format!("\n  - {}", path.display()));
            }
        }

        message
    }
}

/// Suffix after the first dot of the file name (`a.deps.yaml` -> `deps.yaml`).
fn file_suffix(path: &Path) -> Option<&str> {
    path.file_name()?.to_str()?.split_once('.').map(|(_, suffix)| suffix)
}

/// Extension trait for adding file operation context to I/O results.
pub trait FileResultExt<T> {
    /// Attach file context to an I/O error.
    fn with_file_context(
        self,
        operation: FileOperation,
        file_path: impl Into<PathBuf>,
        purpose: impl Into<String>,
        caller: impl Into<String>,
    ) -> Result<T, FileOperationError>;
}

impl<T> FileResultExt<T> for Result<T, std::io::Error> {
    fn with_file_context(
        self,
        operation: FileOperation,
        file_path: impl Into<PathBuf>,
        purpose: impl Into<String>,
        caller: impl Into<String>,
    ) -> Result<T, FileOperationError> {
        self.map_err(|io_error| {
            let context = FileOperationContext::new(operation, file_path, purpose, caller);
            FileOperationError::new(context, io_error)
        })
    }
}

/// Async file reads that always carry context.
pub struct FileOps;

impl FileOps {
    /// Read a UTF-8 file, attaching path, purpose and caller on failure.
    pub async fn read_with_context(
        path: &Path,
        purpose: &str,
        caller: &str,
    ) -> Result<String, FileOperationError> {
        tokio::fs::read_to_string(path).await.with_file_context(
            FileOperation::Read,
            path,
            purpose,
            caller,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_file_operation_error_user_message() {
        let io_error = Error::new(ErrorKind::NotFound, "file not found");
        let context = FileOperationContext::new(
            FileOperation::Read,
            "blocks/button/button.js",
            "extracting inline dependencies",
            "ModulesDeps",
        )
        .with_related_path("/project/blocks");

        let file_error = FileOperationError::new(context, io_error);
        let message = file_error.user_message();

        assert!(message.contains("Failed reading file"));
        assert!(message.contains("blocks/button/button.js"));
        assert!(message.contains("extracting inline dependencies"));
        assert!(message.contains("does not exist"));
        assert!(message.contains("level scan"));
        assert!(message.contains("Related paths"));
    }

    #[test]
    fn test_file_result_ext() {
        let io_error = Error::new(ErrorKind::PermissionDenied, "access denied");
        let result: Result<String, std::io::Error> = Err(io_error);

        let error = result
            .with_file_context(FileOperation::Write, "/tmp/out.deps.js", "writing deps", "output")
            .unwrap_err();

        assert_eq!(error.operation, FileOperation::Write);
        assert_eq!(error.purpose, "writing deps");
        assert!(error.user_message().contains("Permission denied"));
    }

    #[test]
    fn test_file_suffix_uses_first_dot() {
        assert_eq!(file_suffix(Path::new("a/b.deps.yaml")), Some("deps.yaml"));
        assert_eq!(file_suffix(Path::new("a/README")), None);
    }

    #[tokio::test]
    async fn test_read_with_context_missing_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("nope.js");

        let err = FileOps::read_with_context(&missing, "testing", "tests").await.unwrap_err();
        assert_eq!(err.source.kind(), ErrorKind::NotFound);
        assert_eq!(err.file_path, missing);
    }
}

//! Prepending the module system runtime to a built bundle.

use std::path::Path;

use crate::core::BemdepsError;

/// Check that the module system runtime is installed.
///
/// # Errors
///
/// Returns [`BemdepsError::ModuleSystemNotFound`] if `runtime` is not a file.
pub async fn ensure_module_system(runtime: &Path) -> Result<(), BemdepsError> {
    match tokio::fs::metadata(runtime).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(BemdepsError::ModuleSystemNotFound {
            path: runtime.display().to_string(),
        }),
    }
}

/// Return the module system runtime followed by `source`.
///
/// # Errors
///
/// Returns [`BemdepsError::ModuleSystemNotFound`] if the runtime cannot be read.
pub async fn prepend_module_system(runtime: &Path, source: &str) -> Result<String, BemdepsError> {
    let mut output = tokio::fs::read_to_string(runtime).await.map_err(|e| {
        tracing::debug!("Module system read failed for {}: {}", runtime.display(), e);
        BemdepsError::ModuleSystemNotFound {
            path: runtime.display().to_string(),
        }
    })?;
    output.push_str(source);
    Ok(output)
}

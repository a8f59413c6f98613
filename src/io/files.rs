//! Output directory setup and all-or-nothing file writes.

use std::io;
use std::path::Path;

use tempfile::Builder;

use crate::error::AppError;

/// Create `dir` if needed and prove that files can be created inside it.
pub fn prepare_output_dir(dir: &Path) -> Result<(), AppError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        AppError::new(2, format!("Failed to create output directory '{}': {e}", dir.display()))
    })?;
    tempfile::tempfile_in(dir).map_err(|e| {
        AppError::new(2, format!("Output directory '{}' is not writable: {e}", dir.display()))
    })?;
    Ok(())
}

/// Write `path` atomically.
///
/// `write` receives a temporary path in the same directory (with the same
/// extension, since some encoders pick the format from it). The temp file is
/// renamed onto `path` only when `write` succeeds; otherwise it is removed and
/// `path` is left untouched.
pub fn write_atomically<E, F>(path: &Path, write: F) -> Result<(), E>
where
    E: From<io::Error>,
    F: FnOnce(&Path) -> Result<(), E>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let suffix = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let temp = Builder::new()
        .prefix(".ads-viz-")
        .suffix(&suffix)
        .tempfile_in(dir)?
        .into_temp_path();

    write(&*temp)?;
    temp.persist(path).map_err(|e| E::from(e.error))?;
    Ok(())
}

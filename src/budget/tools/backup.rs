use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::info;

use crate::budget::tools::error::{Result, ToolError};

/// Copies the workbook to `<stem>_backup_YYYYMMDD_HHMMSS.<ext>` next to it
/// and returns the path of the copy.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    let backup_path = backup_path(path, Local::now().naive_local());
    fs::copy(path, &backup_path)?;
    info!(backup = %backup_path.display(), "workbook backed up");
    Ok(backup_path)
}

/// Path of the backup taken at `timestamp`.
pub fn backup_path(path: &Path, timestamp: NaiveDateTime) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{stem}_backup_{}", timestamp.format("%Y%m%d_%H%M%S"));
    if let Some(ext) = path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    path.with_file_name(name)
}

use crate::constants::{BACKUP_SUFFIX, BACKUP_TIMESTAMP_FORMAT};
use crate::error::{Result, TinyError};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Copies the directory tree at `source` to a sibling `<name>_backup`.
///
/// If that name is taken a timestamp is appended instead of overwriting.
///
/// # Returns
/// * `Ok(PathBuf)` - Where the copy was written
/// * `Err(TinyError)` - If `source` is not a directory or copying fails
pub fn backup_directory(source: &Path) -> Result<PathBuf> {
    if !source.is_dir() {
        return Err(TinyError::BackupSourceNotDirectory(source.to_path_buf()));
    }

    let source = source.canonicalize()?;
    let target = backup_target(&source)?;
    copy_tree(&source, &target)?;
    Ok(target)
}

fn backup_target(source: &Path) -> Result<PathBuf> {
    let name = source
        .file_name()
        .ok_or_else(|| TinyError::BackupSourceNotDirectory(source.to_path_buf()))?
        .to_string_lossy();
    let parent = source
        .parent()
        .ok_or_else(|| TinyError::BackupSourceNotDirectory(source.to_path_buf()))?;

    let plain = parent.join(format!("{}{}", name, BACKUP_SUFFIX));
    if !plain.exists() {
        return Ok(plain);
    }

    let stamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT);
    Ok(parent.join(format!("{}{}_{}", name, BACKUP_SUFFIX, stamp)))
}

fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| TinyError::BackupSourceNotDirectory(entry.path().to_path_buf()))?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &destination)?;
        }
    }
    Ok(())
}

//! Snapshot directory helpers.
//!
//! Snapshots are flat directories: every source unit is a direct child.

use std::fs as std_fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::IoError;

/// Create a directory and its parents if missing.
///
/// # Errors
/// `NotADirectory` when a file occupies the path, `System` otherwise.
pub fn ensure_dir<P: AsRef<Path>>(dir: P) -> Result<(), IoError> {
    let dir = dir.as_ref();
    if dir.exists() && !dir.is_dir() {
        return Err(IoError::NotADirectory(dir.display().to_string()));
    }
    std_fs::create_dir_all(dir).map_err(|e| IoError::system(dir, e))
}

/// List the regular files directly inside `dir`, sorted by file name.
///
/// When `extensions` is non-empty only files whose extension matches one of
/// them exactly are returned (legacy trees use upper-case extensions, and
/// `foo.for` is deliberately not `foo.FOR`).
///
/// # Errors
/// `NotFound` / `NotADirectory` for a bad `dir`, `System` on walk failures.
pub fn list_files<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> Result<Vec<PathBuf>, IoError> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Err(IoError::NotFound(dir.display().to_string()));
    }
    if !dir.is_dir() {
        return Err(IoError::NotADirectory(dir.display().to_string()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            IoError::system(&path, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let matches = extensions.is_empty()
            || path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.contains(&ext));
        if matches {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Copy every regular file directly inside `src` into `dest`.
///
/// Returns the destination paths, sorted.
///
/// # Errors
/// Propagates listing and copy failures.
pub fn copy_files_into<P: AsRef<Path>, Q: AsRef<Path>>(
    src: P,
    dest: Q,
) -> Result<Vec<PathBuf>, IoError> {
    let dest = dest.as_ref();
    ensure_dir(dest)?;
    let mut copied = Vec::new();
    for path in list_files(src, &[])? {
        let Some(name) = path.file_name() else {
            continue;
        };
        let target = dest.join(name);
        std_fs::copy(&path, &target).map_err(|e| IoError::system(&path, e))?;
        copied.push(target);
    }
    Ok(copied)
}

/// Recursively remove a directory. A missing directory is not an error.
///
/// # Errors
/// Returns `IoError::System` when removal fails.
pub fn remove_dir<P: AsRef<Path>>(dir: P) -> Result<(), IoError> {
    let dir = dir.as_ref();
    match std_fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(IoError::system(dir, e)),
    }
}

//! Filesystem helpers shared by extraction, packing and editing.

use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Creates `dir` and any missing parents.
///
/// Succeeds if `dir` already is a directory; fails with
/// [`Error::FileConflict`] if a non-directory occupies the path or any of its
/// ancestors.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if dir.exists() {
        return Err(Error::FileConflict {
            path: dir.to_path_buf(),
        });
    }
    if let Some(parent) = dir.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    match fs::create_dir(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Creates the parent directory of `path` if it has one.
pub fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir(parent),
        _ => Ok(()),
    }
}

/// Removes a file or a whole directory tree.
pub fn remove_path(path: &Path) -> Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(())
}

/// Copies a single file to `to`, replacing whatever file is there.
///
/// Fails with [`Error::FileConflict`] if `to` is a directory.
pub fn copy_file_over(from: &Path, to: &Path) -> Result<()> {
    if to.is_dir() {
        return Err(Error::FileConflict {
            path: to.to_path_buf(),
        });
    }
    fs::copy(from, to)?;
    Ok(())
}

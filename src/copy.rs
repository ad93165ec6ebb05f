//! Recursive copy of directory trees into and out of a working directory.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::entry_path::is_exploded_name;
use crate::fs::{copy_file_over, ensure_dir};
use crate::{Error, Result};

/// Copies the directory tree at `source` onto `target`.
///
/// The walk is top-down and sorted by file name. Directories are created as
/// needed and files overwrite whatever file is already at their destination.
/// Symbolic links are followed. Exploded archive directories below `source`
/// are not copied.
///
/// Returns the destination paths that did not exist before the copy, in walk
/// order. `target` itself is never included: whoever chose the destination
/// registers it. A failure aborts the walk and leaves whatever was already
/// copied in place.
pub fn copy_tree(source: &Path, target: &Path) -> Result<Vec<PathBuf>> {
    let mut created = Vec::new();

    let walk = WalkDir::new(source)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_exploded_dir(e));
    for entry in walk {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let dest = target.join(relative);
        let existed = dest.exists();

        if entry.file_type().is_dir() {
            ensure_dir(&dest)?;
        } else {
            copy_file_over(entry.path(), &dest)?;
        }

        if !existed && entry.depth() > 0 {
            created.push(dest);
        }
    }

    Ok(created)
}

/// Checks that no path below `source` uses the exploded-archive suffix.
///
/// Such a tree would be taken for exploded archives when the working
/// directory is packed. The error names the first offending path relative to
/// `source`.
pub fn check_importable(source: &Path) -> Result<()> {
    for entry in WalkDir::new(source).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        if entry.depth() == 0 {
            continue;
        }
        if entry.file_name().to_str().is_some_and(is_exploded_name) {
            let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
            return Err(Error::ReservedName {
                path: relative.to_string_lossy().replace('\\', "/"),
            });
        }
    }
    Ok(())
}

fn is_exploded_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name().to_str().is_some_and(is_exploded_name)
}

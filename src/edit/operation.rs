//! Ledger bookkeeping for the operations on a working copy.

use std::fs;
use std::path::PathBuf;

use crate::entry_path::{EntryName, canonical_name, exploded_path};
use crate::fs::{ensure_parent, remove_path};
use crate::ledger::EntryLedger;
use crate::{Error, Result};

/// The kind of access an operation makes to a resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    /// Look at the path; nothing changes.
    Read,
    /// Create or replace the path.
    Write,
    /// Remove the path.
    Delete,
}

impl FileOperation {
    /// Returns whether this operation can change the archive.
    pub fn mutates(self) -> bool {
        matches!(self, Self::Write | Self::Delete)
    }

    /// Returns the operation type as a string.
    pub fn operation_type(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Delete => "delete",
        }
    }

    /// Performs the bookkeeping for this operation on `target`.
    ///
    /// - `Read` does nothing.
    /// - `Write` creates parent directories and registers the path if it does
    ///   not exist yet. The caller writes the content afterwards. A directory
    ///   at the path is a [`Error::FileConflict`] and changes nothing.
    /// - `Delete` removes the path and its ledger lines if it exists.
    ///
    /// Returns whether the archive changed.
    pub fn apply(self, target: &ResolvedPath) -> Result<bool> {
        match self {
            Self::Read => Ok(false),
            Self::Write => {
                if target.file.is_dir() {
                    return Err(Error::FileConflict {
                        path: target.file.clone(),
                    });
                }
                ensure_parent(&target.file)?;
                target.discard_exploded()?;
                if !target.exists() {
                    target.register()?;
                }
                Ok(true)
            }
            Self::Delete => {
                if !target.exists() {
                    return Ok(false);
                }
                let name = EntryName::canonical(&target.archive_root, &target.file);
                target.discard_exploded()?;
                remove_path(&target.file)?;
                if let Some(name) = name {
                    target.ledger().remove_subtree(&name)?;
                }
                Ok(true)
            }
        }
    }
}

/// A request path resolved to a location inside a working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// The file or directory the request addresses.
    pub file: PathBuf,
    /// The working directory whose ledger records `file`: the top-level one,
    /// or the innermost exploded nested archive.
    pub archive_root: PathBuf,
}

impl ResolvedPath {
    /// Returns true if something exists at the resolved location.
    pub fn exists(&self) -> bool {
        fs::symlink_metadata(&self.file).is_ok()
    }

    /// Returns the ledger that records this path.
    pub fn ledger(&self) -> EntryLedger {
        EntryLedger::at(&self.archive_root)
    }

    /// Appends the current canonical name of this path to its ledger.
    pub fn register(&self) -> Result<()> {
        self.ledger()
            .append(&canonical_name(&self.archive_root, &self.file))
    }

    /// Removes an exploded copy of this path, if one exists.
    ///
    /// Replacing or deleting a nested archive supersedes any edits made
    /// through its exploded directory.
    pub(crate) fn discard_exploded(&self) -> Result<()> {
        let exploded = exploded_path(&self.file);
        if exploded.is_dir() {
            fs::remove_dir_all(&exploded)?;
            log::debug!("Discarded {}", exploded.display());
        }
        Ok(())
    }
}

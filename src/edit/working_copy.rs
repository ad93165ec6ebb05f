//! Editable materialization of an archive.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::charset::Charset;
use crate::copy::{check_importable, copy_tree};
use crate::entry_path::{NestedPath, exploded_path, join_under, normalize_request};
use crate::fs::{copy_file_over, ensure_parent};
use crate::ledger::EntryLedger;
use crate::pack::{PackOptions, pack};
use crate::unpack::unpack;
use crate::{Error, Result};

use super::id::IdGenerator;
use super::operation::{FileOperation, ResolvedPath};

/// Default limit on the number of nested archives a single path may chain.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 16;

/// Options for opening working copies.
///
/// # Example
///
/// ```rust
/// use jarup::EditOptions;
///
/// let options = EditOptions::new()
///     .temp_root("/var/tmp/jarup")
///     .max_nesting_depth(4)
///     .compression_level(Some(9));
/// assert_eq!(options.nesting_limit(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOptions {
    temp_root: Option<PathBuf>,
    max_nesting_depth: usize,
    compression_level: Option<i64>,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            temp_root: None,
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            compression_level: None,
        }
    }
}

impl EditOptions {
    /// Creates options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the directory working directories are created under.
    ///
    /// Defaults to `jarup` inside the system temporary directory.
    pub fn temp_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(dir.into());
        self
    }

    /// Sets how many nested archives one path may chain.
    pub fn max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Sets the deflate level used when repacking.
    pub fn compression_level(mut self, level: Option<i64>) -> Self {
        self.compression_level = level;
        self
    }

    /// Returns the directory working directories are created under.
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_root
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("jarup"))
    }

    /// Returns the nesting limit.
    pub fn nesting_limit(&self) -> usize {
        self.max_nesting_depth
    }

    fn pack_options(&self) -> PackOptions {
        PackOptions {
            compression_level: self.compression_level,
        }
    }
}

/// Opens working copies.
///
/// The factory owns the identifier generator that keeps working directory
/// names unique, so one factory should serve the whole process.
#[derive(Debug, Default)]
pub struct WorkingCopyFactory {
    options: EditOptions,
    ids: IdGenerator,
}

impl WorkingCopyFactory {
    /// Creates a factory with the given options.
    pub fn new(options: EditOptions) -> Self {
        Self {
            options,
            ids: IdGenerator::new(),
        }
    }

    /// Creates a factory with the given options and identifier generator.
    pub fn with_ids(options: EditOptions, ids: IdGenerator) -> Self {
        Self { options, ids }
    }

    /// Returns the options working copies are opened with.
    pub fn options(&self) -> &EditOptions {
        &self.options
    }

    /// Extracts `archive` into a fresh working directory.
    ///
    /// # Errors
    ///
    /// Fails if the archive cannot be read; no working directory is left
    /// behind in that case.
    pub fn prepare_for(&self, archive: impl AsRef<Path>) -> Result<WorkingCopy> {
        let archive = archive.as_ref().to_path_buf();
        let file_name = archive.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("archive path has no file name: {}", archive.display()),
            )
        })?;

        let session = self.options.temp_dir().join(self.ids.next_id());
        let root = session.join(file_name);

        if let Err(e) = unpack(&archive, &root) {
            remove_tree(&session);
            return Err(e);
        }
        log::debug!(
            "Working copy of {} at {}",
            archive.display(),
            root.display()
        );

        Ok(WorkingCopy {
            archive,
            session,
            root,
            dirty: false,
            closed: false,
            max_nesting_depth: self.options.max_nesting_depth,
            pack_options: self.options.pack_options(),
        })
    }

    /// Opens a working copy of `archive`, runs `f` on it and closes it.
    ///
    /// The copy is closed whether or not `f` succeeds, so changes made before
    /// a failure are still written back. An error from `f` takes precedence;
    /// a close failure after it is only logged.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use jarup::{Charset, WorkingCopyFactory};
    ///
    /// let factory = WorkingCopyFactory::default();
    /// factory.edit("app.jar", |copy| {
    ///     copy.write("config/app.properties", Charset::Iso8859_1, "debug=true\n")?;
    ///     Ok(())
    /// })?;
    /// # Ok::<(), jarup::Error>(())
    /// ```
    pub fn edit<T>(
        &self,
        archive: impl AsRef<Path>,
        f: impl FnOnce(&mut WorkingCopy) -> Result<T>,
    ) -> Result<T> {
        let mut copy = self.prepare_for(archive)?;
        let result = f(&mut copy);
        let closed = copy.close();
        match result {
            Ok(value) => closed.map(|()| value),
            Err(e) => {
                if let Err(close_err) = closed {
                    log::error!("Failed to close working copy: {}", close_err);
                }
                Err(e)
            }
        }
    }
}

/// A live, editable materialization of one archive.
///
/// Paths passed to the operations are entry paths inside the archive and may
/// reach into nested archives with the `:/` marker (see
/// [`entry_path`](crate::entry_path)). Nested archives are extracted the first
/// time a path reaches into them.
///
/// Changes stay in the working directory until [`close`](Self::close), which
/// repacks the archive if anything changed and always removes the working
/// directory. A copy dropped without being closed discards its changes.
#[derive(Debug)]
pub struct WorkingCopy {
    archive: PathBuf,
    session: PathBuf,
    root: PathBuf,
    dirty: bool,
    closed: bool,
    max_nesting_depth: usize,
    pack_options: PackOptions,
}

impl WorkingCopy {
    /// Returns the archive this copy was made from.
    pub fn archive_path(&self) -> &Path {
        &self.archive
    }

    /// Returns the top-level working directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns true if the archive will be rewritten on close.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Lists the top-level entries in archive order.
    pub fn entries(&self) -> Result<Vec<String>> {
        EntryLedger::at(&self.root).entries()
    }

    /// Reads the entry at `path` as text.
    pub fn read(&mut self, path: &str, charset: Charset) -> Result<String> {
        let bytes = self.read_bytes(path)?;
        charset.decode(bytes, path)
    }

    /// Reads the raw content of the entry at `path`.
    pub fn read_bytes(&mut self, path: &str) -> Result<Vec<u8>> {
        let (target, _) = self.resolve(path, FileOperation::Read)?;
        fs::read(&target.file).map_err(|e| not_found_as_entry(e, path))
    }

    /// Writes `content` to the entry at `path`, creating it if needed.
    pub fn write(&mut self, path: &str, charset: Charset, content: &str) -> Result<&mut Self> {
        let bytes = charset.encode(content)?;
        self.write_bytes(path, &bytes)
    }

    /// Writes raw `content` to the entry at `path`, creating it if needed.
    pub fn write_bytes(&mut self, path: &str, content: &[u8]) -> Result<&mut Self> {
        let (target, _) = self.resolve(path, FileOperation::Write)?;
        fs::write(&target.file, content)?;
        Ok(self)
    }

    /// Copies an external file or directory tree into the archive at `dest`.
    ///
    /// Existing entries are overwritten. Every path the copy creates is
    /// registered exactly once, `dest` included. A tree holding a name with
    /// the exploded-archive suffix is refused with [`Error::ReservedName`]
    /// before anything is copied.
    pub fn copy_into(&mut self, source: impl AsRef<Path>, dest: &str) -> Result<&mut Self> {
        let source = source.as_ref();
        let source_is_dir = fs::metadata(source)?.is_dir();
        if source_is_dir {
            check_importable(source)?;
        }

        let (target, _) = self.resolve(dest, FileOperation::Read)?;
        let existed = target.exists();
        ensure_parent(&target.file)?;
        target.discard_exploded()?;
        self.dirty = true;

        if source_is_dir {
            let created = copy_tree(source, &target.file)?;
            if !existed {
                target.register()?;
            }
            for file in created {
                let nested = ResolvedPath {
                    file,
                    archive_root: target.archive_root.clone(),
                };
                nested.register()?;
            }
        } else {
            copy_file_over(source, &target.file)?;
            if !existed {
                target.register()?;
            }
        }
        Ok(self)
    }

    /// Copies the entry at `source` out of the archive to `dest`.
    ///
    /// This only reads the archive: the copy is not marked dirty. A directory
    /// entry is copied with everything beneath it, except the working trees
    /// of nested archives opened during this edit.
    pub fn copy_out(&mut self, source: &str, dest: impl AsRef<Path>) -> Result<&mut Self> {
        let dest = dest.as_ref();
        let (target, _) = self.resolve(source, FileOperation::Read)?;
        let metadata =
            fs::metadata(&target.file).map_err(|e| not_found_as_entry(e, source))?;

        ensure_parent(dest)?;
        if metadata.is_dir() {
            copy_tree(&target.file, dest)?;
        } else {
            copy_file_over(&target.file, dest)?;
        }
        Ok(self)
    }

    /// Deletes the entry at `path`.
    ///
    /// Returns true if something was deleted. Deleting a missing entry is a
    /// no-op that leaves the copy clean.
    pub fn delete(&mut self, path: &str) -> Result<bool> {
        let (_, changed) = self.resolve(path, FileOperation::Delete)?;
        Ok(changed)
    }

    /// Repacks the archive if anything changed, then removes the working
    /// directory.
    ///
    /// The working directory is removed even if repacking fails; the repack
    /// error is returned and a cleanup failure is only logged.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        let packed = if self.dirty {
            pack(&self.root, &self.archive, &self.pack_options).map(|result| {
                log::debug!(
                    "Rewrote {} with {} entries",
                    self.archive.display(),
                    result.entries()
                );
            })
        } else {
            log::debug!("{} unchanged", self.archive.display());
            Ok(())
        };
        remove_tree(&self.session);
        packed
    }

    /// Resolves `path` to a location in a working directory, exploding nested
    /// archives along the way, and applies `operation` to it.
    ///
    /// Returns the resolved location and whether the archive changed.
    fn resolve(&mut self, path: &str, operation: FileOperation) -> Result<(ResolvedPath, bool)> {
        let nested = NestedPath::parse(path);
        if nested.depth() > self.max_nesting_depth {
            return Err(Error::NestingTooDeep {
                path: path.to_string(),
                limit: self.max_nesting_depth,
            });
        }

        let mut archive_root = self.root.clone();
        for archive in &nested.archives {
            let nested_archive = join_under(&archive_root, &normalize_request(archive)?)?;
            let exploded = exploded_path(&nested_archive);
            if !exploded.is_dir() {
                if !nested_archive.is_file() {
                    return Err(Error::EntryNotFound {
                        path: path.to_string(),
                    });
                }
                if let Err(e) = unpack(&nested_archive, &exploded) {
                    remove_tree(&exploded);
                    return Err(e);
                }
                log::debug!("Exploded {}", nested_archive.display());
            }
            archive_root = exploded;
        }

        let file = join_under(&archive_root, &normalize_request(nested.entry)?)?;
        let target = ResolvedPath { file, archive_root };
        let changed = operation.apply(&target)?;
        if changed {
            log::debug!("{} {}", operation.operation_type(), path);
            self.dirty = true;
        }
        Ok((target, changed))
    }
}

impl Drop for WorkingCopy {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if self.dirty {
            log::warn!(
                "Working copy of {} dropped without close; changes discarded",
                self.archive.display()
            );
        }
        remove_tree(&self.session);
    }
}

fn not_found_as_entry(e: io::Error, path: &str) -> Error {
    if e.kind() == io::ErrorKind::NotFound {
        Error::EntryNotFound {
            path: path.to_string(),
        }
    } else {
        Error::Io(e)
    }
}

/// Removes a temporary tree, logging instead of failing.
fn remove_tree(dir: &Path) {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove {}: {}", dir.display(), e),
    }
}

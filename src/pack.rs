//! Packing a working directory back into an archive.
//!
//! Packing happens in two passes:
//!
//! 1. **Collapse**: every exploded nested archive below the source directory
//!    (a directory named `<archive>.$`) is packed into `<archive>` and removed,
//!    innermost first, so nested edits are part of the tree before it is
//!    written.
//! 2. **Write**: the ledger is replayed in order and each listed path becomes
//!    one archive entry.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::entry_path::{EntryName, collapsed_path, join_under};
use crate::ledger::EntryLedger;
use crate::timestamp::mtime_of;
use crate::{COPY_BUFFER_SIZE, Error, Result};

/// Options for packing a working directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackOptions {
    /// Deflate level for non-empty files; `None` uses the library default.
    pub compression_level: Option<i64>,
}

/// Result of packing a working directory.
#[must_use = "pack result should be checked to verify the expected entries were written"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackResult {
    /// Number of file entries written.
    pub files: usize,
    /// Number of directory entries written.
    pub directories: usize,
    /// Number of nested archives collapsed before writing.
    pub collapsed: usize,
    /// Total uncompressed bytes written.
    pub bytes: u64,
}

impl PackResult {
    /// Returns the number of entries in the written archive.
    pub fn entries(&self) -> usize {
        self.files + self.directories
    }
}

/// Packs `source` into a new archive at `destination`, replacing any file
/// already there.
///
/// Exploded nested archives are collapsed first (and removed from `source`),
/// then the entries listed in the ledger of `source` are written in order.
pub fn pack(source: &Path, destination: &Path, options: &PackOptions) -> Result<PackResult> {
    let mut result = PackResult::default();

    for exploded in find_exploded(source)? {
        let Some(archive) = collapsed_path(&exploded) else {
            continue;
        };
        let nested = pack(&exploded, &archive, options)?;
        result.collapsed += nested.collapsed + 1;
        fs::remove_dir_all(&exploded)?;
        log::debug!("Collapsed {} into {}", exploded.display(), archive.display());
    }

    // Every listed path is checked before the destination is truncated.
    let entries = listed_entries(source)?;

    let out = BufWriter::new(File::create(destination)?);
    let mut writer = ZipWriter::new(out);

    for (entry_name, path, metadata) in &entries {
        let modified = mtime_of(metadata);

        if metadata.is_dir() {
            let stored = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Stored)
                .last_modified_time(modified);
            writer.add_directory(entry_name.as_str(), stored)?;
            result.directories += 1;
        } else if metadata.len() == 0 {
            // Empty files are stored, never deflated.
            let stored = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Stored)
                .last_modified_time(modified);
            writer.start_file(entry_name.as_str(), stored)?;
            result.files += 1;
        } else {
            let deflated = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(options.compression_level)
                .last_modified_time(modified)
                .large_file(metadata.len() >= u64::from(u32::MAX));
            writer.start_file(entry_name.as_str(), deflated)?;
            let mut input = BufReader::with_capacity(COPY_BUFFER_SIZE, File::open(path)?);
            result.bytes += io::copy(&mut input, &mut writer)?;
            result.files += 1;
        }
    }

    let mut out = writer.finish()?;
    out.flush()?;

    log::debug!(
        "Packed {} ({} entries) into {}",
        source.display(),
        result.entries(),
        destination.display()
    );
    Ok(result)
}

/// Resolves the ledger of `source` to the entries to write, in order.
///
/// Duplicate names are skipped with a warning. A listed path that no longer
/// exists is [`Error::LedgerOutOfSync`].
fn listed_entries(source: &Path) -> Result<Vec<(EntryName, PathBuf, fs::Metadata)>> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();

    for name in EntryLedger::at(source).entries()? {
        let path = join_under(source, name.trim_end_matches('/'))?;
        let Some(entry_name) = EntryName::canonical(source, &path) else {
            continue;
        };
        if !seen.insert(entry_name.clone()) {
            log::warn!("Ledger of {} lists '{}' twice", source.display(), entry_name);
            continue;
        }
        let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::LedgerOutOfSync { name },
            _ => Error::Io(e),
        })?;
        entries.push((entry_name, path, metadata));
    }
    Ok(entries)
}

/// Lists the outermost exploded directories below `source`.
///
/// The walk does not descend into exploded directories; the nested pack of
/// each one takes care of anything exploded inside it.
fn find_exploded(source: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut walker = WalkDir::new(source)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if collapsed_path(entry.path()).is_some() {
            found.push(entry.path().to_path_buf());
            walker.skip_current_dir();
        }
    }
    Ok(found)
}

//! Extraction of an archive into a working directory.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Component, Path};

use zip::ZipArchive;

use crate::entry_path::is_exploded_name;
use crate::fs::{ensure_dir, ensure_parent};
use crate::ledger::{EntryLedger, LEDGER_FILE_NAME};
use crate::timestamp::apply_mtime;
use crate::{COPY_BUFFER_SIZE, Error, Result};

/// Result of extracting an archive.
#[must_use = "unpack result should be checked to verify the expected entries were extracted"]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnpackResult {
    /// Number of file entries written.
    pub files: usize,
    /// Number of directory entries created.
    pub directories: usize,
    /// Total uncompressed bytes written.
    pub bytes: u64,
}

impl UnpackResult {
    /// Returns the number of entries recorded in the ledger.
    pub fn entries(&self) -> usize {
        self.files + self.directories
    }
}

/// Extracts every entry of `archive_path` into `destination`.
///
/// Entries are extracted in the order they are stored in the archive and
/// their names, as stored, are recorded in a new ledger for `destination`.
/// File contents are written verbatim and modification times are preserved.
///
/// # Errors
///
/// Fails with [`Error::FileConflict`] if a non-directory occupies
/// `destination`, [`Error::UnsafeEntryName`] if an entry would land outside
/// `destination` or on a reserved name, and [`Error::Zip`] if the archive is
/// unreadable.
pub fn unpack(archive_path: &Path, destination: &Path) -> Result<UnpackResult> {
    ensure_dir(destination)?;

    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    let mut ledger = EntryLedger::create(destination)?;
    let mut result = UnpackResult::default();

    // Directory times are applied last; creating children would reset them.
    let mut directory_times = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();
        let relative = entry
            .enclosed_name()
            .filter(|p| !is_reserved(p))
            .ok_or_else(|| Error::UnsafeEntryName { name: name.clone() })?;

        ledger.push(&name)?;
        let target = destination.join(&relative);

        if entry.is_dir() {
            ensure_dir(&target)?;
            directory_times.push((target, entry.last_modified()));
            result.directories += 1;
        } else {
            ensure_parent(&target)?;
            {
                let mut out = BufWriter::with_capacity(COPY_BUFFER_SIZE, File::create(&target)?);
                result.bytes += io::copy(&mut entry, &mut out)?;
                out.flush()?;
            }
            apply_mtime(&target, entry.last_modified());
            result.files += 1;
        }
    }
    ledger.finish()?;

    for (dir, time) in directory_times.into_iter().rev() {
        apply_mtime(&dir, time);
    }

    log::debug!(
        "Unpacked {} ({} entries) into {}",
        archive_path.display(),
        result.entries(),
        destination.display()
    );
    Ok(result)
}

/// Returns true if extracting to `relative` would clobber the ledger or be
/// mistaken for an exploded nested archive.
fn is_reserved(relative: &Path) -> bool {
    if relative == Path::new(LEDGER_FILE_NAME) {
        return true;
    }
    relative.components().any(|c| match c {
        Component::Normal(s) => s.to_str().is_some_and(is_exploded_name),
        _ => false,
    })
}

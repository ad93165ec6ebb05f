//! Ordered record of the entries a working directory will be packed into.
//!
//! Each working directory carries a sidecar file, [`LEDGER_FILE_NAME`], at its
//! root. It holds one entry name per line (UTF-8, `\n`-terminated) in the
//! order the entries appear in the archive: original order first, new entries
//! appended, removed entries dropped in place. The sidecar itself is never an
//! entry.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::entry_path::{EntryName, lexical_name};
use crate::{Error, Result};

/// File name of the ledger sidecar inside every working directory.
pub const LEDGER_FILE_NAME: &str = "___jarup___entries";

/// Handle on the ledger of one working directory.
#[derive(Debug, Clone)]
pub struct EntryLedger {
    root: PathBuf,
    path: PathBuf,
}

impl EntryLedger {
    /// Returns the ledger of the working directory at `root`.
    pub fn at(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let path = root.join(LEDGER_FILE_NAME);
        Self { root, path }
    }

    /// Creates (or truncates) the ledger file and returns a writer for
    /// filling it in archive order.
    pub fn create(root: impl AsRef<Path>) -> Result<LedgerWriter> {
        let ledger = Self::at(root);
        let file = File::create(&ledger.path)?;
        Ok(LedgerWriter {
            out: BufWriter::new(file),
        })
    }

    /// Returns the path of the sidecar file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the working directory this ledger describes.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads all entry names in order.
    pub fn entries(&self) -> Result<Vec<String>> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut names = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let name = line.trim();
            if !name.is_empty() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    /// Returns true if `name` is listed.
    ///
    /// Lines are compared in lexical form, so `./a.txt` matches `a.txt`.
    pub fn contains(&self, name: &str) -> Result<bool> {
        let target = lexical_name(name);
        Ok(self.entries()?.iter().any(|n| lexical_name(n) == target))
    }

    /// Appends `name` to the end of the ledger.
    ///
    /// The caller must only append names that are not already listed.
    pub fn append(&self, name: &str) -> Result<()> {
        let mut out = OpenOptions::new().append(true).open(&self.path)?;
        writeln!(out, "{}", name)?;
        log::debug!("ledger {}: + {}", self.root.display(), name);
        Ok(())
    }

    /// Removes the lines naming `name`, keeping the order of the others.
    ///
    /// Returns true if a line was removed.
    pub fn remove(&self, name: &EntryName) -> Result<bool> {
        let target = name.as_str();
        let removed = self.rewrite(|line| line == target)?;
        Ok(removed > 0)
    }

    /// Removes `name` and, if it is a directory, every entry beneath it.
    ///
    /// Returns the number of lines removed.
    pub fn remove_subtree(&self, name: &EntryName) -> Result<usize> {
        self.rewrite(|line| name.covers(line))
    }

    /// Rewrites the ledger without the lines matching `drop`.
    ///
    /// `drop` sees each line in lexical form. The new content goes to a
    /// temporary file in the same directory which then replaces the ledger,
    /// so a failure never leaves it truncated.
    fn rewrite(&self, drop: impl Fn(&str) -> bool) -> Result<usize> {
        let mut temp = tempfile::Builder::new()
            .prefix(".ledger")
            .tempfile_in(&self.root)?;

        let mut removed = 0;
        {
            let reader = BufReader::new(File::open(&self.path)?);
            let mut out = BufWriter::new(temp.as_file_mut());
            for line in reader.lines() {
                let line = line?;
                let current = line.trim();
                if current.is_empty() {
                    continue;
                }
                if drop(&lexical_name(current)) {
                    removed += 1;
                    log::debug!("ledger {}: - {}", self.root.display(), current);
                    continue;
                }
                writeln!(out, "{}", current)?;
            }
            out.flush()?;
        }

        replace_with(temp, &self.path)?;
        Ok(removed)
    }
}

/// Moves a rewritten ledger over `to`.
fn replace_with(temp: NamedTempFile, to: &Path) -> Result<()> {
    let from = temp.path().to_path_buf();
    temp.persist(to).map_err(|e| Error::LedgerRewrite {
        from,
        to: to.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

/// Sequential writer used while a ledger is first populated.
pub struct LedgerWriter {
    out: BufWriter<File>,
}

impl LedgerWriter {
    /// Records the next entry name.
    pub fn push(&mut self, name: &str) -> Result<()> {
        writeln!(self.out, "{}", name)?;
        Ok(())
    }

    /// Flushes the ledger to disk.
    pub fn finish(mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

//! Error types for working-copy operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when materializing, editing and repacking an archive, along
//! with a convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. Nothing is
//! retried and nothing is swallowed: every failure aborts the current
//! operation and propagates to the caller.
//!
//! ```rust,no_run
//! use jarup::{Charset, Error, WorkingCopyFactory};
//!
//! fn print_manifest(jar: &str) -> jarup::Result<()> {
//!     let factory = WorkingCopyFactory::default();
//!     factory.edit(jar, |copy| {
//!         match copy.read("META-INF/MANIFEST.MF", Charset::Utf8) {
//!             Ok(text) => print!("{}", text),
//!             Err(Error::EntryNotFound { path }) => eprintln!("no {} in {}", path, jar),
//!             Err(e) => return Err(e),
//!         }
//!         Ok(())
//!     })
//! }
//! ```

use std::io;
use std::path::PathBuf;

/// The main error type for working-copy operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | Input | [`EntryNotFound`][Self::EntryNotFound], [`InvalidEntryPath`][Self::InvalidEntryPath], [`ReservedName`][Self::ReservedName], [`NestingTooDeep`][Self::NestingTooDeep], [`UnknownCharset`][Self::UnknownCharset] | Bad path or argument |
/// | Filesystem | [`Io`][Self::Io], [`Walk`][Self::Walk], [`FileConflict`][Self::FileConflict] | Disk state |
/// | Ledger | [`LedgerRewrite`][Self::LedgerRewrite], [`LedgerOutOfSync`][Self::LedgerOutOfSync] | Entry log out of step with the tree |
/// | Archive | [`Zip`][Self::Zip], [`UnsafeEntryName`][Self::UnsafeEntryName] | Corrupt or hostile archive |
/// | Text | [`Decode`][Self::Decode], [`Unmappable`][Self::Unmappable] | Content does not fit the charset |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive could not be read or written.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Traversing a directory tree failed.
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// The requested entry does not exist in the working copy.
    #[error("Entry not found: {path}")]
    EntryNotFound {
        /// The path as requested by the caller.
        path: String,
    },

    /// The requested path cannot address an entry.
    #[error("Invalid entry path '{path}': {reason}")]
    InvalidEntryPath {
        /// The path as requested by the caller.
        path: String,
        /// Why the path was rejected.
        reason: &'static str,
    },

    /// The requested path uses a name reserved for working-copy bookkeeping.
    ///
    /// Entry paths may not name the ledger file, and no component may end
    /// with the exploded-archive suffix.
    #[error("Reserved name in entry path: {path}")]
    ReservedName {
        /// The path as requested by the caller.
        path: String,
    },

    /// The path chains more nested archives than allowed.
    #[error("Too many nested archives in '{path}' (limit is {limit})")]
    NestingTooDeep {
        /// The path as requested by the caller.
        path: String,
        /// The configured nesting limit.
        limit: usize,
    },

    /// A directory was required where a non-directory already exists, or a
    /// file where a directory exists.
    #[error("Can't create {}: an entry of another kind already exists", path.display())]
    FileConflict {
        /// The conflicting path.
        path: PathBuf,
    },

    /// Replacing the ledger with its rewritten copy failed.
    ///
    /// The ledger is left untouched when this happens, but the filesystem
    /// change that triggered the rewrite has already been made.
    #[error("Could not move temporary entries file <{}> to <{}>: {source}", from.display(), to.display())]
    LedgerRewrite {
        /// The temporary file holding the rewritten ledger.
        from: PathBuf,
        /// The ledger file.
        to: PathBuf,
        /// The underlying rename failure.
        #[source]
        source: io::Error,
    },

    /// The ledger names an entry that no longer exists on disk.
    #[error("Ledger lists '{name}' but it is missing from the working directory")]
    LedgerOutOfSync {
        /// The ledger line.
        name: String,
    },

    /// An archive entry name would escape the extraction directory.
    #[error("Unsafe entry name in archive: {name}")]
    UnsafeEntryName {
        /// The raw name stored in the archive.
        name: String,
    },

    /// The charset name is not supported.
    #[error("Unknown charset: {0}")]
    UnknownCharset(String),

    /// Entry content is not valid in the requested charset.
    #[error("Content of '{path}' is not valid {charset}")]
    Decode {
        /// The path as requested by the caller.
        path: String,
        /// The charset used for decoding.
        charset: &'static str,
    },

    /// Text contains a character the requested charset cannot encode.
    #[error("Character {ch:?} cannot be encoded as {charset}")]
    Unmappable {
        /// The charset used for encoding.
        charset: &'static str,
        /// The first offending character.
        ch: char,
    },
}

impl Error {
    /// Returns true if the error was caused by the caller's input rather than
    /// by the state of the archive or the filesystem.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::EntryNotFound { .. }
                | Self::InvalidEntryPath { .. }
                | Self::ReservedName { .. }
                | Self::NestingTooDeep { .. }
                | Self::UnknownCharset(_)
        )
    }
}

/// A specialized Result type for working-copy operations.
pub type Result<T> = std::result::Result<T, Error>;

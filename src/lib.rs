//! # jarup
//!
//! In-place editing of zip and jar archives, including archives nested inside
//! other archives.
//!
//! An archive is extracted into a temporary working directory, edited there
//! by path, and packed back on close with its original entry order intact.
//! Archives that were only read are never rewritten.
//!
//! ## Quick Start
//!
//! ### Reading an Entry
//!
//! ```rust,no_run
//! use jarup::{Charset, Result, WorkingCopyFactory};
//!
//! fn main() -> Result<()> {
//!     let factory = WorkingCopyFactory::default();
//!     let manifest = factory.edit("app.jar", |copy| {
//!         copy.read("META-INF/MANIFEST.MF", Charset::Utf8)
//!     })?;
//!     print!("{}", manifest);
//!     Ok(())
//! }
//! ```
//!
//! ### Editing a Nested Archive
//!
//! Path segments separated by `:/` step into nested archives. Each segment is
//! resolved inside the archive named by the segment before it.
//!
//! ```rust,no_run
//! use jarup::{Charset, Result, WorkingCopyFactory};
//!
//! fn main() -> Result<()> {
//!     let factory = WorkingCopyFactory::default();
//!     let mut copy = factory.prepare_for("app.ear")?;
//!
//!     copy.write(
//!         "web.war:/WEB-INF/lib/core.jar:/core.properties",
//!         Charset::Iso8859_1,
//!         "cache=off\n",
//!     )?;
//!     copy.delete("web.war:/WEB-INF/classes/Debug.class")?;
//!
//!     // core.jar, then web.war, then app.ear are repacked
//!     copy.close()?;
//!     Ok(())
//! }
//! ```
//!
//! ### Copying Trees In and Out
//!
//! ```rust,no_run
//! use jarup::{Result, WorkingCopyFactory};
//!
//! fn main() -> Result<()> {
//!     let factory = WorkingCopyFactory::default();
//!     factory.edit("app.jar", |copy| {
//!         copy.copy_into("target/classes/com", "com")?;
//!         copy.copy_out("META-INF", "/tmp/meta")?;
//!         Ok(())
//!     })
//! }
//! ```
//!
//! ## Working Directory Layout
//!
//! | Path | Contents |
//! |------|----------|
//! | `<temp>/<id>/<archive>/` | Extracted top-level archive |
//! | `<temp>/<id>/<archive>/___jarup___entries` | Entry names in archive order |
//! | `<dir>/<nested>.jar.$/` | Extracted nested archive, next to its file |
//!
//! ## Timestamps
//!
//! Zip entries carry MS-DOS date-times, which have no time zone. Most zip
//! tools read them as local time; jarup reads and writes them as UTC. Fields
//! of untouched entries survive a repack unchanged, but on a machine that is
//! not on UTC the extracted files show times shifted by the local offset, and
//! entries added through a working copy are stamped with UTC wall-clock
//! fields. See [`timestamp`].
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: extraction, packing and ledger
//! updates at `debug`, skipped duplicates and cleanup failures at `warn`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Default buffer size for file copies (64 KiB).
pub(crate) const COPY_BUFFER_SIZE: usize = 64 * 1024;

pub mod charset;
pub mod copy;
pub mod edit;
pub mod entry_path;
pub mod error;
pub mod fs;
pub mod ledger;
pub mod pack;
pub mod timestamp;
pub mod unpack;

pub use charset::Charset;
pub use entry_path::{EXPLODED_SUFFIX, EntryName, MARKER, NestedPath};
pub use error::{Error, Result};
pub use ledger::{EntryLedger, LEDGER_FILE_NAME};

// Re-export packing API
pub use pack::{PackOptions, PackResult, pack};
pub use unpack::{UnpackResult, unpack};

// Re-export edit API
pub use edit::{
    DEFAULT_MAX_NESTING_DEPTH, EditOptions, FileOperation, IdGenerator, ResolvedPath, WorkingCopy,
    WorkingCopyFactory,
};

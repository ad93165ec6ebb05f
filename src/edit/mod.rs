//! Editing archives through a working copy.
//!
//! A [`WorkingCopy`] extracts an archive into a temporary directory and lets
//! callers read, write, copy and delete entries there by path, including
//! entries of archives nested inside the archive. Closing the copy writes the
//! archive back, but only if something changed.
//!
//! # Example
//!
//! ```rust,no_run
//! use jarup::{Charset, WorkingCopyFactory};
//!
//! let factory = WorkingCopyFactory::default();
//! let mut copy = factory.prepare_for("app.war")?;
//!
//! // Read an entry of a jar inside the war
//! let manifest = copy.read("WEB-INF/lib/core.jar:/META-INF/MANIFEST.MF", Charset::Utf8)?;
//! println!("{}", manifest);
//!
//! // Change a nested entry and drop another one
//! copy.write("WEB-INF/lib/core.jar:/app.properties", Charset::Iso8859_1, "mode=prod\n")?;
//! copy.delete("WEB-INF/web-test.xml")?;
//!
//! // Repack core.jar, then app.war
//! copy.close()?;
//! # Ok::<(), jarup::Error>(())
//! ```
//!
//! # Implementation Notes
//!
//! The working copy works by:
//! 1. Extracting the archive and recording its entry order in a ledger
//! 2. Extracting a nested archive next to it (`core.jar` into `core.jar.$`)
//!    the first time a path reaches into it
//! 3. Updating the ledger of the innermost archive on every create or delete
//! 4. On close, packing every exploded directory back into its archive file,
//!    innermost first, then packing the top-level tree in ledger order

mod id;
mod operation;
mod working_copy;

pub use id::IdGenerator;
pub use operation::{FileOperation, ResolvedPath};
pub use working_copy::{
    DEFAULT_MAX_NESTING_DEPTH, EditOptions, WorkingCopy, WorkingCopyFactory,
};

//! Exit codes for the CLI tool.

use jarup::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Archive format error
pub const BAD_ARCHIVE: i32 = 3;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Invalid command line arguments or entry path
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    FatalError,
    BadArchive,
    IoError,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::IoError => IO_ERROR,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts a jarup error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    if error.is_input_error() {
        return ExitCode::BadArgs;
    }
    match error {
        Error::Io(_) | Error::Walk(_) => ExitCode::IoError,
        Error::Zip(_) | Error::UnsafeEntryName { .. } => ExitCode::BadArchive,
        Error::FileConflict { .. }
        | Error::LedgerRewrite { .. }
        | Error::LedgerOutOfSync { .. } => ExitCode::FatalError,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}

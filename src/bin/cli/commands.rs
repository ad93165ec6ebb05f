//! Command implementations for the CLI tool.

use std::io::{self, Read, Write};
use std::path::Path;

use jarup::{Charset, Result, WorkingCopyFactory};

use crate::exit_codes::{ExitCode, error_to_exit_code};

/// Cat command implementation
pub fn cat(
    factory: &WorkingCopyFactory,
    archive: &Path,
    path: &str,
    to: Option<&Path>,
    encoding: Option<Charset>,
) -> ExitCode {
    let charset = encoding.unwrap_or_else(|| Charset::default_for(path));
    run(factory, archive, |copy| {
        match to {
            Some(dest) => {
                copy.copy_out(path, dest)?;
            }
            None => {
                let text = copy.read(path, charset)?;
                let mut stdout = io::stdout().lock();
                stdout.write_all(text.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    })
}

/// Cp command implementation
pub fn cp(factory: &WorkingCopyFactory, archive: &Path, source: &Path, path: &str) -> ExitCode {
    run(factory, archive, |copy| {
        copy.copy_into(source, path)?;
        Ok(())
    })
}

/// Put command implementation
pub fn put(
    factory: &WorkingCopyFactory,
    archive: &Path,
    path: &str,
    encoding: Option<Charset>,
) -> ExitCode {
    let charset = encoding.unwrap_or_else(|| Charset::default_for(path));

    // Read input before touching the archive so a bad stream changes nothing
    let mut text = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut text) {
        eprintln!("Error reading standard input: {}", e);
        return ExitCode::IoError;
    }

    run(factory, archive, |copy| {
        copy.write(path, charset, &text)?;
        Ok(())
    })
}

/// Rm command implementation
pub fn rm(factory: &WorkingCopyFactory, archive: &Path, path: &str) -> ExitCode {
    run(factory, archive, |copy| {
        if !copy.delete(path)? {
            log::info!("{} not found in {}", path, archive.display());
        }
        Ok(())
    })
}

/// Ls command implementation
pub fn ls(factory: &WorkingCopyFactory, archive: &Path) -> ExitCode {
    run(factory, archive, |copy| {
        let mut stdout = io::stdout().lock();
        for name in copy.entries()? {
            writeln!(stdout, "{}", name)?;
        }
        Ok(())
    })
}

/// Runs `f` against a working copy of `archive` and maps the outcome to an
/// exit code.
fn run(
    factory: &WorkingCopyFactory,
    archive: &Path,
    f: impl FnOnce(&mut jarup::WorkingCopy) -> Result<()>,
) -> ExitCode {
    match factory.edit(archive, f) {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            eprintln!("Error: {}", e);
            error_to_exit_code(&e)
        }
    }
}

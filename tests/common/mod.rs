//! Shared test utilities for integration tests.
//!
//! Fixture archives are built with the `zip` crate directly so that tests
//! check the working copy against an independent writer and reader.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use jarup::{EditOptions, WorkingCopyFactory};

/// One fixture entry: a file with content, or a directory when `None`.
pub type Fixture<'a> = (&'a str, Option<&'a [u8]>);

/// Builds an in-memory zip archive with entries in the given order.
///
/// Entry names ending in `/` with no content become directory entries.
pub fn create_zip(entries: &[Fixture<'_>]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in entries {
        match data {
            Some(data) => {
                writer.start_file(*name, options).expect("start file");
                writer.write_all(data).expect("write entry");
            }
            None => {
                writer.add_directory(*name, options).expect("add directory");
            }
        }
    }
    writer.finish().expect("finish archive").into_inner()
}

/// Writes a fixture archive to `dir/name` and returns its path.
pub fn write_zip(dir: &Path, name: &str, entries: &[Fixture<'_>]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, create_zip(entries)).expect("write archive");
    path
}

/// Returns the entry names of an archive file, in stored order.
pub fn entry_names(archive: &Path) -> Vec<String> {
    entry_names_of(&fs::read(archive).expect("read archive"))
}

/// Returns the entry names of in-memory archive bytes, in stored order.
pub fn entry_names_of(bytes: &[u8]) -> Vec<String> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("open archive");
    (0..archive.len())
        .map(|i| archive.by_index(i).expect("entry").name().to_string())
        .collect()
}

/// Reads one entry of an archive file.
pub fn read_entry(archive: &Path, name: &str) -> Vec<u8> {
    read_entry_of(&fs::read(archive).expect("read archive"), name)
}

/// Reads one entry of in-memory archive bytes.
pub fn read_entry_of(bytes: &[u8], name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("open archive");
    let mut entry = archive.by_name(name).expect("entry present");
    let mut data = Vec::new();
    entry.read_to_end(&mut data).expect("read entry");
    data
}

/// Returns the compression method of one entry of an archive file.
pub fn entry_method(archive: &Path, name: &str) -> CompressionMethod {
    let mut archive =
        ZipArchive::new(fs::File::open(archive).expect("open file")).expect("open archive");
    archive.by_name(name).expect("entry present").compression()
}

/// A temp directory holding fixtures and a factory whose working copies live
/// in `<temp>/work`.
pub struct Workspace {
    pub temp: TempDir,
    pub factory: WorkingCopyFactory,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let factory = WorkingCopyFactory::new(EditOptions::new().temp_root(temp.path().join("work")));
        Self { temp, factory }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Writes a fixture archive into the workspace.
    pub fn archive(&self, name: &str, entries: &[Fixture<'_>]) -> PathBuf {
        write_zip(self.path(), name, entries)
    }

    /// Returns true if no working directory is left under the temp root.
    pub fn work_is_clean(&self) -> bool {
        match fs::read_dir(self.path().join("work")) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => true,
        }
    }
}

//! Entry names and nested-path syntax.
//!
//! A request path addresses one entry of the working copy. It may reach into
//! archives stored inside the archive by separating the nested archive's path
//! from the path inside it with [`MARKER`]:
//!
//! ```text
//! WEB-INF/lib/core.jar:/META-INF/MANIFEST.MF
//! lib/outer.jar:/lib/inner.jar:/config.properties
//! ```
//!
//! Entry names, as recorded in the ledger and written to the archive, are
//! relative, forward-slash separated, and carry a trailing slash exactly when
//! they name a directory.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use crate::ledger::LEDGER_FILE_NAME;
use crate::{Error, Result};

/// Separates a nested archive's path from the path inside it.
pub const MARKER: &str = ":/";

/// Suffix appended to a nested archive's file name to name its exploded
/// sibling directory.
pub const EXPLODED_SUFFIX: &str = ".$";

/// Maximum length for request paths (in bytes).
const MAX_PATH_LENGTH: usize = 32768;

/// A canonical entry name.
///
/// Never empty and never `.`; directories end with `/`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryName(String);

impl EntryName {
    /// Computes the entry name of `path`, which must live under `root`.
    ///
    /// Returns `None` for `root` itself (or anything that normalizes to an
    /// empty or `.` name), since such paths never form an archive entry.
    pub fn canonical(root: &Path, path: &Path) -> Option<Self> {
        let name = canonical_name(root, path);
        match name.as_str() {
            "" | "." | "./" => None,
            _ => Some(Self(name)),
        }
    }

    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this name denotes a directory.
    pub fn is_directory(&self) -> bool {
        self.0.ends_with('/')
    }

    /// Returns true if `other` is this entry or lies beneath it.
    ///
    /// Only directory names have descendants; a trailing slash on `other`
    /// is ignored when comparing against a file name.
    pub fn covers(&self, other: &str) -> bool {
        if self.is_directory() {
            other.starts_with(self.as_str()) || other == self.0.trim_end_matches('/')
        } else {
            other.trim_end_matches('/') == self.0
        }
    }

    /// Consumes the name and returns the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for EntryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Computes the entry name for `path` relative to `root`.
///
/// Separators are normalized to `/` and a trailing slash is added if `path`
/// is currently a directory. The root itself maps to the empty string.
pub fn canonical_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut name = relative.to_string_lossy().into_owned();
    if std::path::MAIN_SEPARATOR != '/' {
        name = name.replace(std::path::MAIN_SEPARATOR, "/");
    }
    if !name.is_empty() && !name.ends_with('/') && path.is_dir() {
        name.push('/');
    }
    name
}

/// A request path split at its markers.
///
/// `archives` holds the path of each nested archive, outermost first, each
/// relative to the directory the previous one was exploded into. `entry` is
/// the path inside the innermost archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedPath<'a> {
    /// Nested archive paths, outermost first.
    pub archives: Vec<&'a str>,
    /// The path inside the innermost archive.
    pub entry: &'a str,
}

impl<'a> NestedPath<'a> {
    /// Splits `path` at every marker that is followed by more path.
    ///
    /// A trailing marker with nothing after it does not address a nested
    /// archive and is left in `entry` unchanged.
    ///
    /// # Example
    ///
    /// ```
    /// use jarup::entry_path::NestedPath;
    ///
    /// let nested = NestedPath::parse("lib/a.jar:/lib/b.jar:/x.txt");
    /// assert_eq!(nested.archives, vec!["lib/a.jar", "lib/b.jar"]);
    /// assert_eq!(nested.entry, "x.txt");
    ///
    /// let plain = NestedPath::parse("a.jar:/");
    /// assert!(plain.archives.is_empty());
    /// assert_eq!(plain.entry, "a.jar:/");
    /// ```
    pub fn parse(path: &'a str) -> Self {
        let mut archives = Vec::new();
        let mut rest = path;
        while let Some(pos) = rest.find(MARKER) {
            let after = &rest[pos + MARKER.len()..];
            if after.is_empty() {
                break;
            }
            archives.push(&rest[..pos]);
            rest = after;
        }
        Self {
            archives,
            entry: rest,
        }
    }

    /// Returns the number of nested archives addressed.
    pub fn depth(&self) -> usize {
        self.archives.len()
    }
}

/// Validates one request path segment and normalizes it to a relative,
/// slash-separated path without empty or `.` components.
///
/// Leading slashes are dropped. Empty paths, NUL bytes, `..` components,
/// the ledger file name and exploded-archive directory names are rejected.
pub fn normalize_request(path: &str) -> Result<String> {
    let invalid = |reason| Error::InvalidEntryPath {
        path: path.to_string(),
        reason,
    };

    if path.contains('\0') {
        return Err(invalid("contains NUL byte"));
    }
    if path.len() > MAX_PATH_LENGTH {
        return Err(invalid("path exceeds maximum length"));
    }

    let mut parts = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => continue,
            ".." => return Err(invalid("'..' segment not allowed")),
            s => parts.push(s),
        }
    }

    if parts.is_empty() {
        return Err(invalid("empty path"));
    }
    if parts[0] == LEDGER_FILE_NAME || parts.iter().any(|p| is_exploded_name(p)) {
        return Err(Error::ReservedName {
            path: path.to_string(),
        });
    }

    Ok(parts.join("/"))
}

/// Returns the lexical form of a stored entry name: empty and `.`
/// components dropped, trailing slash kept.
///
/// Archives may store `./a.txt` or `dir//b.txt`; both name the same file as
/// their canonical counterparts.
pub(crate) fn lexical_name(name: &str) -> String {
    let mut normalized = name
        .split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect::<Vec<_>>()
        .join("/");
    if name.ends_with('/') && !normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}

/// Returns the exploded sibling directory for a nested archive file.
pub fn exploded_path(archive: &Path) -> PathBuf {
    let mut name = archive
        .file_name()
        .map(OsStr::to_os_string)
        .unwrap_or_default();
    name.push(EXPLODED_SUFFIX);
    archive.with_file_name(name)
}

/// Returns the archive file an exploded directory collapses into, or `None`
/// if `dir` does not follow the exploded naming convention.
pub fn collapsed_path(dir: &Path) -> Option<PathBuf> {
    let name = dir.file_name()?.to_str()?;
    let stem = name.strip_suffix(EXPLODED_SUFFIX)?;
    if stem.is_empty() {
        return None;
    }
    Some(dir.with_file_name(OsString::from(stem)))
}

/// Returns true if `name` follows the exploded-directory naming convention.
pub fn is_exploded_name(name: &str) -> bool {
    name.len() > EXPLODED_SUFFIX.len() && name.ends_with(EXPLODED_SUFFIX)
}

/// Joins a relative entry path onto `root`, refusing anything that would not
/// stay beneath it. `.` components are dropped.
pub(crate) fn join_under(root: &Path, relative: &str) -> Result<PathBuf> {
    let mut joined = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::CurDir => {}
            _ => {
                return Err(Error::InvalidEntryPath {
                    path: relative.to_string(),
                    reason: "path escapes the working directory",
                });
            }
        }
    }
    Ok(joined)
}

//! Fuzz target for nested request path parsing and normalization.
//!
//! Every marker-separated segment of an arbitrary string is normalized the
//! way a working copy resolves it. The goal is to find panics, or accepted
//! segments that could leave the working directory.
//!
//! Run with: cargo +nightly fuzz run nested_path
//!
//! Key properties being tested:
//! - Parsing never panics, including on multi-byte input around markers
//! - Accepted segments have no `..`, empty or `.` components
//! - Accepted segments are not absolute and contain no NUL bytes
//! - Normalization is idempotent

#![no_main]

use jarup::entry_path::{NestedPath, normalize_request};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(path) = std::str::from_utf8(data) else {
        return;
    };

    let nested = NestedPath::parse(path);
    assert_eq!(nested.depth(), nested.archives.len());

    for segment in nested.archives.iter().copied().chain([nested.entry]) {
        let Ok(normalized) = normalize_request(segment) else {
            continue;
        };

        assert!(
            !normalized.starts_with('/'),
            "Absolute path accepted: {:?}",
            normalized
        );
        assert!(
            !normalized.contains('\0'),
            "NUL byte in normalized path: {:?}",
            normalized
        );
        assert!(
            normalized
                .split(['/', '\\'])
                .all(|c| !c.is_empty() && c != "." && c != ".."),
            "Bad component in normalized path: {:?}",
            normalized
        );
        assert_eq!(
            normalize_request(&normalized).ok().as_deref(),
            Some(normalized.as_str()),
            "Normalization is not idempotent for {:?}",
            segment
        );
    }
});

//! Copying external files and trees into and out of a working copy.

mod common;

use std::fs;
use std::path::Path;

use jarup::{Error, LEDGER_FILE_NAME};

use common::{Workspace, create_zip, entry_names, entry_names_of, read_entry, read_entry_of};

fn external_tree(root: &Path) {
    fs::create_dir_all(root.join("acme/util")).unwrap();
    fs::write(root.join("acme/App.class"), b"app").unwrap();
    fs::write(root.join("acme/util/Strings.class"), b"strings").unwrap();
    fs::write(root.join("acme/util/empty.txt"), b"").unwrap();
}

#[test]
fn test_copy_tree_into_registers_each_path_once() {
    let ws = Workspace::new();
    let archive = ws.archive("app.jar", &[("a.txt", Some(b"a"))]);
    let source = ws.path().join("classes");
    external_tree(&source);

    ws.factory
        .edit(&archive, |copy| {
            copy.copy_into(&source, "com")?;
            Ok(())
        })
        .unwrap();

    assert_eq!(
        entry_names(&archive),
        vec![
            "a.txt",
            "com/",
            "com/acme/",
            "com/acme/App.class",
            "com/acme/util/",
            "com/acme/util/Strings.class",
            "com/acme/util/empty.txt",
        ]
    );
    assert_eq!(read_entry(&archive, "com/acme/util/Strings.class"), b"strings");
    assert_eq!(
        common::entry_method(&archive, "com/acme/util/empty.txt"),
        zip::CompressionMethod::Stored
    );
}

#[test]
fn test_copy_tree_over_existing_directory() {
    let ws = Workspace::new();
    let archive = ws.archive(
        "app.jar",
        &[
            ("com/", None),
            ("com/acme/", None),
            ("com/acme/App.class", Some(b"old")),
            ("z.txt", Some(b"z")),
        ],
    );
    let source = ws.path().join("classes");
    external_tree(&source);

    ws.factory
        .edit(&archive, |copy| {
            copy.copy_into(&source, "com")?;
            Ok(())
        })
        .unwrap();

    // Existing entries keep their place; only new paths are appended
    assert_eq!(
        entry_names(&archive),
        vec![
            "com/",
            "com/acme/",
            "com/acme/App.class",
            "z.txt",
            "com/acme/util/",
            "com/acme/util/Strings.class",
            "com/acme/util/empty.txt",
        ]
    );
    assert_eq!(read_entry(&archive, "com/acme/App.class"), b"app");
}

#[test]
fn test_copy_file_into() {
    let ws = Workspace::new();
    let archive = ws.archive("app.jar", &[("a.txt", Some(b"a"))]);
    let source = ws.path().join("logback.xml");
    fs::write(&source, b"<configuration/>").unwrap();

    ws.factory
        .edit(&archive, |copy| {
            copy.copy_into(&source, "config/logback.xml")?;
            copy.copy_into(&source, "a.txt")?;
            Ok(())
        })
        .unwrap();

    assert_eq!(entry_names(&archive), vec!["a.txt", "config/logback.xml"]);
    assert_eq!(read_entry(&archive, "a.txt"), b"<configuration/>");
}

#[test]
fn test_copy_into_nested_archive() {
    let ws = Workspace::new();
    let inner = create_zip(&[("x.txt", Some(b"x"))]);
    let archive = ws.archive("app.war", &[("lib/", None), ("lib/inner.jar", Some(&inner))]);
    let source = ws.path().join("classes");
    external_tree(&source);

    ws.factory
        .edit(&archive, |copy| {
            copy.copy_into(source.join("acme"), "lib/inner.jar:/acme")?;
            Ok(())
        })
        .unwrap();

    assert_eq!(entry_names(&archive), vec!["lib/", "lib/inner.jar"]);
    let inner = read_entry(&archive, "lib/inner.jar");
    assert_eq!(
        entry_names_of(&inner),
        vec![
            "x.txt",
            "acme/",
            "acme/App.class",
            "acme/util/",
            "acme/util/Strings.class",
            "acme/util/empty.txt",
        ]
    );
    assert_eq!(read_entry_of(&inner, "acme/App.class"), b"app");
}

#[test]
fn test_copy_directory_over_file_conflicts() {
    let ws = Workspace::new();
    let archive = ws.archive("app.jar", &[("com", Some(b"file"))]);
    let source = ws.path().join("classes");
    external_tree(&source);

    let err = ws
        .factory
        .edit(&archive, |copy| {
            copy.copy_into(&source, "com")?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, Error::FileConflict { .. }));
}

#[test]
fn test_copy_out_file_and_tree() {
    let ws = Workspace::new();
    let archive = ws.archive(
        "app.jar",
        &[
            ("META-INF/", None),
            ("META-INF/MANIFEST.MF", Some(b"Manifest-Version: 1.0\n")),
            ("META-INF/services/", None),
            ("META-INF/services/x.Provider", Some(b"x.Impl\n")),
        ],
    );
    let before = fs::read(&archive).unwrap();
    let out = ws.path().join("out");

    ws.factory
        .edit(&archive, |copy| {
            copy.copy_out("META-INF/MANIFEST.MF", out.join("one/MANIFEST.MF"))?;
            copy.copy_out("META-INF", out.join("meta"))?;
            assert!(!copy.is_dirty());
            Ok(())
        })
        .unwrap();

    assert_eq!(
        fs::read(out.join("one/MANIFEST.MF")).unwrap(),
        b"Manifest-Version: 1.0\n"
    );
    assert_eq!(
        fs::read(out.join("meta/services/x.Provider")).unwrap(),
        b"x.Impl\n"
    );
    assert!(!out.join("meta").join(LEDGER_FILE_NAME).exists());
    assert_eq!(fs::read(&archive).unwrap(), before);
}

#[test]
fn test_copy_out_missing_entry() {
    let ws = Workspace::new();
    let archive = ws.archive("app.jar", &[("a.txt", Some(b"a"))]);

    let err = ws
        .factory
        .edit(&archive, |copy| {
            copy.copy_out("missing.txt", ws.path().join("x"))?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, Error::EntryNotFound { .. }));
    assert!(!ws.path().join("x").exists());
}

#[test]
fn test_repeated_copy_adds_nothing() {
    let ws = Workspace::new();
    let archive = ws.archive("app.jar", &[("a.txt", Some(b"a"))]);
    let source = ws.path().join("classes");
    external_tree(&source);

    let (first, second) = ws
        .factory
        .edit(&archive, |copy| {
            copy.copy_into(&source, "com")?;
            let first = copy.entries()?;
            copy.copy_into(source.join("acme"), "com/acme")?;
            copy.copy_into(&source, "com")?;
            Ok((first, copy.entries()?))
        })
        .unwrap();

    assert_eq!(first.len(), 7);
    assert_eq!(first, second);
}

#[test]
fn test_copy_tree_with_exploded_suffix_is_refused() {
    let ws = Workspace::new();
    let archive = ws.archive("app.jar", &[("a.txt", Some(b"a"))]);
    let before = fs::read(&archive).unwrap();
    let source = ws.path().join("classes");
    external_tree(&source);
    fs::create_dir_all(source.join("weird.$")).unwrap();
    fs::write(source.join("weird.$/f.txt"), b"f").unwrap();

    let err = ws
        .factory
        .edit(&archive, |copy| {
            let result = copy.copy_into(&source, "com").map(|_| ());
            assert!(!copy.is_dirty());
            result
        })
        .unwrap_err();
    assert!(matches!(err, Error::ReservedName { .. }));
    assert_eq!(fs::read(&archive).unwrap(), before);

    // The archive is still editable afterwards
    ws.factory
        .edit(&archive, |copy| {
            copy.write_bytes("b.txt", b"b")?;
            Ok(())
        })
        .unwrap();
    assert_eq!(entry_names(&archive), vec!["a.txt", "b.txt"]);
}

#[test]
fn test_copy_out_skips_opened_nested_archives() {
    let ws = Workspace::new();
    let inner = create_zip(&[("x.txt", Some(b"x"))]);
    let archive = ws.archive("app.war", &[("lib/", None), ("lib/inner.jar", Some(&inner))]);
    let out = ws.path().join("out");

    ws.factory
        .edit(&archive, |copy| {
            assert_eq!(copy.read_bytes("lib/inner.jar:/x.txt")?, b"x");
            copy.copy_out("lib", &out)?;
            Ok(())
        })
        .unwrap();

    let mut listed: Vec<_> = fs::read_dir(&out)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    listed.sort();
    assert_eq!(listed, vec!["inner.jar"]);
    assert_eq!(entry_names_of(&fs::read(out.join("inner.jar")).unwrap()), vec!["x.txt"]);
}

//! Nested archive tests.
//!
//! These tests address entries of archives stored inside other archives with
//! the `:/` marker and check that edits survive the repack of every level.

mod common;

use std::fs;

use jarup::{Charset, Error};

use common::{Workspace, create_zip, entry_names, entry_names_of, read_entry, read_entry_of};

/// Builds `app.war` containing `WEB-INF/lib/core.jar`, which in turn
/// contains `util.jar`.
fn war(ws: &Workspace) -> std::path::PathBuf {
    let util = create_zip(&[("Util.class", Some(b"util"))]);
    let core = create_zip(&[
        ("META-INF/MANIFEST.MF", Some(b"Manifest-Version: 1.0\n")),
        ("util.jar", Some(&util)),
        ("core.properties", Some(b"cache=on\n")),
    ]);
    ws.archive(
        "app.war",
        &[
            ("WEB-INF/", None),
            ("WEB-INF/web.xml", Some(b"<web-app/>")),
            ("WEB-INF/lib/", None),
            ("WEB-INF/lib/core.jar", Some(&core)),
            ("index.html", Some(b"<html/>")),
        ],
    )
}

fn outer_names() -> Vec<String> {
    [
        "WEB-INF/",
        "WEB-INF/web.xml",
        "WEB-INF/lib/",
        "WEB-INF/lib/core.jar",
        "index.html",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[test]
fn test_read_nested_entry_does_not_rewrite() {
    let ws = Workspace::new();
    let archive = war(&ws);
    let before = fs::read(&archive).unwrap();

    let text = ws
        .factory
        .edit(&archive, |copy| {
            let text = copy.read("WEB-INF/lib/core.jar:/core.properties", Charset::Iso8859_1)?;
            assert!(copy.root().join("WEB-INF/lib/core.jar.$").is_dir());
            Ok(text)
        })
        .unwrap();

    assert_eq!(text, "cache=on\n");
    assert_eq!(fs::read(&archive).unwrap(), before);
}

#[test]
fn test_write_nested_entry_then_reopen() {
    let ws = Workspace::new();
    let archive = war(&ws);

    ws.factory
        .edit(&archive, |copy| {
            copy.write(
                "WEB-INF/lib/core.jar:/core.properties",
                Charset::Iso8859_1,
                "cache=off\n",
            )?;
            copy.write("WEB-INF/lib/core.jar:/extra/added.txt", Charset::Utf8, "new")?;
            Ok(())
        })
        .unwrap();

    // Outer order is untouched and no exploded directory leaked in
    assert_eq!(entry_names(&archive), outer_names());

    let core = read_entry(&archive, "WEB-INF/lib/core.jar");
    assert_eq!(
        entry_names_of(&core),
        vec![
            "META-INF/MANIFEST.MF",
            "util.jar",
            "core.properties",
            "extra/added.txt"
        ]
    );
    assert_eq!(read_entry_of(&core, "core.properties"), b"cache=off\n");

    let reread = ws
        .factory
        .edit(&archive, |copy| {
            copy.read("WEB-INF/lib/core.jar:/extra/added.txt", Charset::Utf8)
        })
        .unwrap();
    assert_eq!(reread, "new");
    assert!(ws.work_is_clean());
}

#[test]
fn test_two_levels_of_nesting() {
    let ws = Workspace::new();
    let archive = war(&ws);

    ws.factory
        .edit(&archive, |copy| {
            let path = "WEB-INF/lib/core.jar:/util.jar:/Util.class";
            assert_eq!(copy.read_bytes(path)?, b"util");
            copy.write_bytes(path, b"patched")?;
            copy.write_bytes("WEB-INF/lib/core.jar:/util.jar:/Extra.class", b"extra")?;
            Ok(())
        })
        .unwrap();

    let core = read_entry(&archive, "WEB-INF/lib/core.jar");
    let util = read_entry_of(&core, "util.jar");
    assert_eq!(entry_names_of(&util), vec!["Util.class", "Extra.class"]);
    assert_eq!(read_entry_of(&util, "Util.class"), b"patched");
    assert_eq!(
        entry_names_of(&core),
        vec!["META-INF/MANIFEST.MF", "util.jar", "core.properties"]
    );
}

#[test]
fn test_delete_nested_entry() {
    let ws = Workspace::new();
    let archive = war(&ws);

    let deleted = ws
        .factory
        .edit(&archive, |copy| copy.delete("WEB-INF/lib/core.jar:/META-INF"))
        .unwrap();

    assert!(deleted);
    let core = read_entry(&archive, "WEB-INF/lib/core.jar");
    assert_eq!(entry_names_of(&core), vec!["util.jar", "core.properties"]);
}

#[test]
fn test_delete_exploded_archive() {
    let ws = Workspace::new();
    let archive = war(&ws);

    ws.factory
        .edit(&archive, |copy| {
            copy.read_bytes("WEB-INF/lib/core.jar:/core.properties")?;
            assert!(copy.delete("WEB-INF/lib/core.jar")?);
            assert!(!copy.root().join("WEB-INF/lib/core.jar.$").exists());
            Ok(())
        })
        .unwrap();

    assert_eq!(
        entry_names(&archive),
        vec!["WEB-INF/", "WEB-INF/web.xml", "WEB-INF/lib/", "index.html"]
    );
}

#[test]
fn test_replace_exploded_archive() {
    let ws = Workspace::new();
    let archive = war(&ws);
    let replacement = create_zip(&[("only.txt", Some(b"only"))]);

    ws.factory
        .edit(&archive, |copy| {
            copy.write_bytes("WEB-INF/lib/core.jar:/core.properties", b"lost")?;
            copy.write_bytes("WEB-INF/lib/core.jar", &replacement)?;
            Ok(())
        })
        .unwrap();

    let core = read_entry(&archive, "WEB-INF/lib/core.jar");
    assert_eq!(entry_names_of(&core), vec!["only.txt"]);
}

#[test]
fn test_missing_nested_archive() {
    let ws = Workspace::new();
    let archive = war(&ws);
    let before = fs::read(&archive).unwrap();

    let err = ws
        .factory
        .edit(&archive, |copy| {
            copy.write_bytes("WEB-INF/lib/missing.jar:/x.txt", b"x")?;
            Ok(())
        })
        .unwrap_err();

    assert!(matches!(err, Error::EntryNotFound { .. }));
    assert_eq!(fs::read(&archive).unwrap(), before);
}

#[test]
fn test_nested_entry_that_is_not_an_archive() {
    let ws = Workspace::new();
    let archive = war(&ws);

    let err = ws
        .factory
        .edit(&archive, |copy| copy.read_bytes("index.html:/x"))
        .unwrap_err();

    assert!(matches!(err, Error::Zip(_)));
    assert!(ws.work_is_clean());
}

#[test]
fn test_nested_copy_out() {
    let ws = Workspace::new();
    let archive = war(&ws);
    let before = fs::read(&archive).unwrap();
    let dest = ws.path().join("out/MANIFEST.MF");

    ws.factory
        .edit(&archive, |copy| {
            copy.copy_out("WEB-INF/lib/core.jar:/META-INF/MANIFEST.MF", &dest)?;
            assert!(!copy.is_dirty());
            Ok(())
        })
        .unwrap();

    assert_eq!(fs::read(&dest).unwrap(), b"Manifest-Version: 1.0\n");
    assert_eq!(fs::read(&archive).unwrap(), before);
}

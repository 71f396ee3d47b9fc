//! Zip-slip and related containment tests.
//!
//! Each case feeds a hostile entry name through a complete extraction and
//! checks that nothing lands outside the destination.

#![allow(clippy::unwrap_used)]

mod common;

use common::ZipBuilder;
use fwinflate_core::ExtractionConfig;
use fwinflate_core::ExtractionError;
use fwinflate_core::FailureKind;
use fwinflate_core::extract_archive;
use fwinflate_core::types::DestDir;
use fwinflate_core::types::SafePath;
use std::path::Path;
use tempfile::TempDir;

fn extract_single(entry: &str) -> (TempDir, ExtractionError) {
    let temp = TempDir::new().unwrap();
    let archive = ZipBuilder::new()
        .file(entry, b"owned")
        .write_to(&temp.path().join("fw.ipsw"));
    let err = extract_archive(
        &archive,
        temp.path().join("bundle"),
        &ExtractionConfig::default(),
    )
    .unwrap_err();
    (temp, err)
}

#[test]
fn test_parent_dir_entries_rejected() {
    for entry in [
        "../escape.txt",
        "../../escape.txt",
        "foo/../../escape.txt",
        "a/b/../../../escape.txt",
    ] {
        let (temp, err) = extract_single(entry);
        assert!(
            matches!(err, ExtractionError::PathTraversal { .. }),
            "entry should be rejected: {entry}"
        );
        assert_eq!(err.kind(), FailureKind::EntryWriteFailed);
        assert!(!temp.path().join("escape.txt").exists());
    }
}

#[test]
#[cfg(unix)]
fn test_absolute_entry_rejected() {
    let outside = TempDir::new().unwrap();
    let target = outside.path().join("planted.txt");
    let (_temp, err) = extract_single(target.to_str().unwrap());

    assert!(err.is_security_violation());
    assert!(!target.exists());
}

#[test]
#[cfg(unix)]
fn test_null_byte_name_rejected() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let temp = TempDir::new().unwrap();
    let dest = DestDir::create(temp.path()).unwrap();
    let path = Path::new(OsStr::from_bytes(b"file\0.txt"));

    let result = SafePath::validate(path, &dest, &ExtractionConfig::default());
    assert!(matches!(
        result,
        Err(ExtractionError::SecurityViolation { .. })
    ));
}

#[test]
fn test_deep_nesting_rejected() {
    let deep = (0..40)
        .map(|i| format!("dir{i}"))
        .collect::<Vec<_>>()
        .join("/");
    let (_temp, err) = extract_single(&deep);
    assert!(matches!(err, ExtractionError::SecurityViolation { .. }));
}

#[test]
#[cfg(unix)]
fn test_preexisting_symlink_in_destination_not_followed() {
    let temp = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    let out = temp.path().join("bundle");
    std::fs::create_dir_all(&out).unwrap();
    std::os::unix::fs::symlink(outside.path(), out.join("Firmware")).unwrap();

    let archive = ZipBuilder::new()
        .file("Firmware/LLB.img4", b"owned")
        .write_to(&temp.path().join("fw.ipsw"));
    let err = extract_archive(&archive, &out, &ExtractionConfig::default()).unwrap_err();

    assert!(matches!(err, ExtractionError::PathTraversal { .. }));
    assert!(!outside.path().join("LLB.img4").exists());
}

#[test]
fn test_dot_segments_inside_destination_allowed() {
    let temp = TempDir::new().unwrap();
    let archive = ZipBuilder::new()
        .file("./Firmware/./dfu/iBSS.img4", b"ok")
        .write_to(&temp.path().join("fw.ipsw"));
    let out = temp.path().join("bundle");

    extract_archive(&archive, &out, &ExtractionConfig::default()).unwrap();
    assert!(out.join("Firmware/dfu/iBSS.img4").is_file());
}

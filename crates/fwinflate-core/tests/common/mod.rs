//! Shared fixtures for integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::missing_panics_doc)]

use std::cell::RefCell;
use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;

use fwinflate_core::ExtractionObserver;
use fwinflate_core::FailureKind;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;
use zip::write::ZipWriter;

/// Builds zip archives in memory.
pub struct ZipBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default()
                .compression_method(CompressionMethod::Stored)
                .unix_permissions(0o644),
        }
    }

    pub fn deflated(mut self) -> Self {
        self.options = self.options.compression_method(CompressionMethod::Deflated);
        self
    }

    pub fn file(mut self, path: &str, data: &[u8]) -> Self {
        self.writer.start_file(path, self.options).unwrap();
        self.writer.write_all(data).unwrap();
        self
    }

    pub fn file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        let options = self.options.unix_permissions(mode);
        self.writer.start_file(path, options).unwrap();
        self.writer.write_all(data).unwrap();
        self
    }

    pub fn directory(mut self, path: &str) -> Self {
        self.writer.add_directory(path, self.options).unwrap();
        self
    }

    pub fn symlink(mut self, path: &str, target: &str) -> Self {
        self.writer.add_symlink(path, target, self.options).unwrap();
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.writer.finish().unwrap().into_inner()
    }

    pub fn write_to(self, path: &Path) -> PathBuf {
        std::fs::write(path, self.build()).unwrap();
        path.to_path_buf()
    }
}

/// The two-entry archive from the basic extraction scenario.
pub fn scenario_archive(dir: &Path) -> PathBuf {
    ZipBuilder::new()
        .file("a.txt", b"hello")
        .file("sub/b.txt", b"world")
        .write_to(&dir.join("fw.zip"))
}

/// Flips one byte of a stored payload so its CRC no longer matches.
pub fn corrupt_payload(data: &mut [u8], marker: &[u8]) {
    let pos = data
        .windows(marker.len())
        .position(|w| w == marker)
        .unwrap();
    data[pos] ^= 0x20;
}

/// What an observer saw, in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Finished { files: usize },
    Failed { kind: FailureKind },
}

/// An observer that records every callback into a shared log.
pub fn recording_observer() -> (Rc<ExtractionObserver>, Rc<RefCell<Vec<Event>>>) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let observer = ExtractionObserver::new()
        .on_finished({
            let events = Rc::clone(&events);
            move |_, report| {
                events.borrow_mut().push(Event::Finished {
                    files: report.files_extracted,
                });
            }
        })
        .on_failed({
            let events = Rc::clone(&events);
            move |_, error| {
                events.borrow_mut().push(Event::Failed { kind: error.kind() });
            }
        });
    (Rc::new(observer), events)
}

/// Sorted relative paths of every file and directory under `root`.
pub fn tree(root: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let entry = entry.unwrap();
            let path = entry.path();
            let rel = path.strip_prefix(root).unwrap();
            out.push(rel.to_string_lossy().replace('\\', "/"));
            if entry.file_type().unwrap().is_dir() {
                walk(root, &path, out);
            }
        }
    }
    let mut out = Vec::new();
    if root.exists() {
        walk(root, root, &mut out);
    }
    out.sort();
    out
}

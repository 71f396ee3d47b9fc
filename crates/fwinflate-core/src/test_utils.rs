//! In-memory zip builders for unit tests.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::io::Cursor;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use zip::CompressionMethod;
use zip::write::SimpleFileOptions;
use zip::write::ZipWriter;

/// Builder for zip test archives with files, directories and symlinks.
///
/// Entries are stored uncompressed with mode 0o644 unless
/// [`deflated`](Self::deflated) is called first.
pub struct ZipTestBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl ZipTestBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default()
                .compression_method(CompressionMethod::Stored)
                .unix_permissions(0o644),
        }
    }

    /// Switches subsequent entries to deflate compression.
    pub fn deflated(mut self) -> Self {
        self.options = self.options.compression_method(CompressionMethod::Deflated);
        self
    }

    pub fn add_file(mut self, path: &str, data: &[u8]) -> Self {
        self.writer.start_file(path, self.options).unwrap();
        self.writer.write_all(data).unwrap();
        self
    }

    pub fn add_directory(mut self, path: &str) -> Self {
        self.writer.add_directory(path, self.options).unwrap();
        self
    }

    pub fn add_symlink(mut self, path: &str, target: &str) -> Self {
        self.writer.add_symlink(path, target, self.options).unwrap();
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.writer.finish().unwrap().into_inner()
    }
}

/// Writes `data` to `dir/name` and returns the path.
pub fn write_archive(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

/// Rewrites the central-directory "version made by" host byte and external
/// attributes of the entry called `name`.
///
/// Lets tests produce directory entries that carry no trailing slash, which
/// `ZipWriter` never emits.
pub fn set_entry_attributes(data: &mut [u8], name: &str, host_system: u8, attributes: u32) {
    const CENTRAL_HEADER: &[u8] = b"PK\x01\x02";

    let mut pos = 0;
    while let Some(offset) = data[pos..]
        .windows(CENTRAL_HEADER.len())
        .position(|w| w == CENTRAL_HEADER)
    {
        let header = pos + offset;
        let name_len = usize::from(u16::from_le_bytes([data[header + 28], data[header + 29]]));
        let name_start = header + 46;
        if data.get(name_start..name_start + name_len) == Some(name.as_bytes()) {
            data[header + 5] = host_system;
            data[header + 38..header + 42].copy_from_slice(&attributes.to_le_bytes());
            return;
        }
        pos = header + CENTRAL_HEADER.len();
    }
    panic!("no central directory entry named {name}");
}

//! Filesystem writers shared by the extraction paths.
//!
//! # Functions
//!
//! - [`extract_file`]: Buffered file write with size verification
//! - [`create_directory`]: Directory creation (idempotent)

use std::fs::File;
use std::fs::create_dir_all;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;

use crate::ExtractionError;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;
use crate::types::DestDir;
use crate::types::SafePath;

/// Declared metadata for a file entry.
#[derive(Debug, Clone, Copy)]
pub struct FileEntryMeta {
    /// Uncompressed size recorded in the archive.
    pub expected_size: u64,
    /// Unix mode to apply, if permissions are preserved.
    pub mode: Option<u32>,
}

/// Writes one file entry under `dest`.
///
/// Missing parent directories are created. An existing file at the target
/// is truncated and overwritten.
///
/// # Errors
///
/// - `EntryWriteFailed` if a parent directory, the file, or a permission
///   change cannot be written
/// - `ArchiveCorrupt` if reading the entry fails or yields a byte count
///   different from `meta.expected_size`
pub fn extract_file<R: Read + ?Sized>(
    reader: &mut R,
    safe_path: &SafePath,
    dest: &DestDir,
    meta: FileEntryMeta,
    report: &mut ExtractionReport,
    copy_buffer: &mut CopyBuffer,
    progress: &mut dyn ProgressCallback,
) -> Result<()> {
    let entry = safe_path.as_path();
    let write_failed = |source: std::io::Error| ExtractionError::EntryWriteFailed {
        entry: entry.to_path_buf(),
        source,
    };
    let output_path = dest.join(safe_path);

    if let Some(parent) = output_path.parent() {
        create_dir_all(parent).map_err(write_failed)?;
    }

    let output_file = File::create(&output_path).map_err(write_failed)?;
    let mut buffered_writer = BufWriter::with_capacity(64 * 1024, output_file);
    let bytes_written = copy_with_buffer(reader, &mut buffered_writer, copy_buffer, entry, progress)?;
    buffered_writer.flush().map_err(write_failed)?;

    if bytes_written != meta.expected_size {
        return Err(ExtractionError::ArchiveCorrupt {
            entry: entry.display().to_string(),
            reason: format!(
                "size mismatch: expected {} bytes, decoded {bytes_written}",
                meta.expected_size
            ),
        });
    }

    #[cfg(unix)]
    if let Some(mode) = meta.mode {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(mode & 0o7777);
        std::fs::set_permissions(&output_path, permissions).map_err(write_failed)?;
    }
    #[cfg(not(unix))]
    let _ = meta.mode;

    report.files_extracted += 1;
    report.bytes_written = report.bytes_written.saturating_add(bytes_written);

    Ok(())
}

/// Creates a directory entry under `dest`.
///
/// Idempotent: an already existing directory is not an error.
pub fn create_directory(
    safe_path: &SafePath,
    dest: &DestDir,
    report: &mut ExtractionReport,
) -> Result<()> {
    let dir_path = dest.join(safe_path);

    create_dir_all(&dir_path).map_err(|source| ExtractionError::EntryWriteFailed {
        entry: safe_path.as_path().to_path_buf(),
        source,
    })?;

    report.directories_created += 1;

    Ok(())
}

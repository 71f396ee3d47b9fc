//! Error conversion utilities for CLI.
//!
//! Converts fwinflate-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use fwinflate_core::ExtractionError;
use std::path::Path;

/// Converts `ExtractionError` to user-friendly anyhow error with context
pub fn convert_extraction_error(err: &ExtractionError, archive: &Path) -> anyhow::Error {
    match err {
        ExtractionError::DestinationUnavailable { path, source } => {
            anyhow!(
                "Cannot use destination '{}': {source}\n\
                 HINT: Check that the directory can be created and is writable, \
                 or pass a different OUTPUT_DIR.",
                path.display()
            )
        }
        ExtractionError::ArchiveUnreadable { path, reason } => {
            anyhow!(
                "Cannot read archive '{}': {reason}\n\
                 HINT: Make sure the file exists and is a complete firmware download.",
                path.display()
            )
        }
        ExtractionError::EntryWriteFailed { entry, source } => {
            anyhow!(
                "Failed to write '{}' while extracting '{}': {source}\n\
                 HINT: Check free disk space and permissions on the destination.",
                entry.display(),
                archive.display()
            )
        }
        ExtractionError::ArchiveCorrupt { entry, reason } => {
            anyhow!(
                "Archive '{}' is corrupt at '{entry}': {reason}\n\
                 HINT: The download may be truncated or damaged. Download the firmware again.",
                archive.display()
            )
        }
        ExtractionError::PathTraversal { path } => {
            anyhow!(
                "Security violation: Archive '{}' attempted path traversal with '{}'\n\
                 HINT: This archive may be malicious. Do not extract from untrusted sources.",
                archive.display(),
                path.display()
            )
        }
        ExtractionError::SecurityViolation { reason } => {
            anyhow!(
                "Entry rejected in '{}': {reason}\n\
                 HINT: Firmware archives only contain regular files and directories. \
                 Use --max-path-depth if a legitimate archive nests deeper.",
                archive.display()
            )
        }
        ExtractionError::WorkerLost => {
            anyhow!(
                "Extraction of '{}' was interrupted before it reported a result",
                archive.display()
            )
        }
    }
}

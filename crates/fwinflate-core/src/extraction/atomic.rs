//! Staged extraction with rollback on failure.
//!
//! Entries are first written into a hidden staging directory inside the
//! destination. Only after every entry succeeded is the staged tree moved
//! into place; a failed run drops the staging directory and leaves the
//! destination as it was.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;
use tracing::warn;

use crate::ExtractionError;
use crate::ExtractionReport;
use crate::Result;
use crate::types::DestDir;

const STAGING_PREFIX: &str = ".fwinflate-staging-";

/// Runs `extract_fn` against a staging directory and merges its output into
/// `dest` on success.
///
/// The staging directory lives inside `dest`, so the final moves are
/// same-filesystem renames. Existing files at the same relative paths are
/// replaced; existing directories are merged.
///
/// Symlinks already in `dest` are never followed during the merge: one that
/// sits where a staged entry lands is removed and the staged entry takes its
/// place. Direct extraction instead writes through a symlink whose target
/// resolves inside the destination, so the two modes can leave different
/// trees when the destination already contains symlinks.
///
/// # Errors
///
/// - `DestinationUnavailable` if the staging directory cannot be created
/// - whatever `extract_fn` returns (nothing reaches `dest` in that case)
/// - `EntryWriteFailed` if moving a staged entry into place fails
pub fn extract_staged<F>(dest: &DestDir, extract_fn: F) -> Result<ExtractionReport>
where
    F: FnOnce(&DestDir) -> Result<ExtractionReport>,
{
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(dest.as_path())
        .map_err(|source| ExtractionError::DestinationUnavailable {
            path: dest.as_path().to_path_buf(),
            source,
        })?;
    let staging_dest = DestDir::create(staging.path())?;
    debug!(staging = %staging_dest.as_path().display(), "extracting into staging directory");

    let report = extract_fn(&staging_dest)?;

    merge_into(staging_dest.as_path(), dest.as_path(), Path::new(""))?;

    if let Err(e) = staging.close() {
        warn!(error = %e, "failed to remove staging directory");
    }

    Ok(report)
}

/// Moves every entry of `src` into `dst`, recursing into directories that
/// exist on both sides. `rel` is the path relative to the destination root
/// and only labels errors.
fn merge_into(src: &Path, dst: &Path, rel: &Path) -> Result<()> {
    let write_failed = |entry: &Path, source: io::Error| ExtractionError::EntryWriteFailed {
        entry: entry.to_path_buf(),
        source,
    };

    let entries = fs::read_dir(src).map_err(|e| write_failed(rel, e))?;

    for entry in entries {
        let entry = entry.map_err(|e| write_failed(rel, e))?;
        let name = entry.file_name();
        let entry_rel = rel.join(&name);
        let from = entry.path();
        let to = dst.join(&name);

        let from_is_dir = entry
            .file_type()
            .map_err(|e| write_failed(&entry_rel, e))?
            .is_dir();

        match fs::symlink_metadata(&to) {
            Ok(existing) if existing.is_dir() => {
                if from_is_dir {
                    merge_into(&from, &to, &entry_rel)?;
                    continue;
                }
                return Err(write_failed(
                    &entry_rel,
                    io::Error::new(
                        io::ErrorKind::IsADirectory,
                        "a directory already exists at this path",
                    ),
                ));
            }
            Ok(_) => {
                // Files and symlinks in the way are replaced, never followed.
                if from_is_dir || cfg!(windows) {
                    fs::remove_file(&to).map_err(|e| write_failed(&entry_rel, e))?;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(write_failed(&entry_rel, e)),
        }

        fs::rename(&from, &to).map_err(|e| write_failed(&entry_rel, e))?;
    }

    Ok(())
}

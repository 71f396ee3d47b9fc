//! Synchronous extraction API.
//!
//! These functions block the calling thread for the whole run. The
//! [`Extractor`](crate::Extractor) runs them on its worker thread; call them
//! directly when you already are off the thread that must stay responsive.

use std::path::Path;
use std::time::Instant;

use tracing::info;
use tracing::warn;

use crate::ExtractionConfig;
use crate::ExtractionReport;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::extraction::extract_staged;
use crate::formats::ZipArchive;
use crate::types::DestDir;

/// Extracts a zip archive into `output_dir`.
///
/// # Arguments
///
/// * `archive_path` - Path to the archive file
/// * `output_dir` - Directory to populate; created with any missing parents
/// * `config` - Extraction options
///
/// # Errors
///
/// The destination is prepared before the archive is opened, so a
/// `DestinationUnavailable` error means no archive I/O happened. See
/// [`ExtractionError`](crate::ExtractionError) for the other cases.
///
/// # Examples
///
/// ```no_run
/// use fwinflate_core::ExtractionConfig;
/// use fwinflate_core::extract_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ExtractionConfig::default();
/// let report = extract_archive("iPhone_Restore.ipsw", "/tmp/bundle", &config)?;
/// println!("Extracted {} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    config: &ExtractionConfig,
) -> Result<ExtractionReport> {
    let mut noop = NoopProgress;
    extract_archive_with_progress(archive_path, output_dir, config, &mut noop)
}

/// Extracts a zip archive into `output_dir`, reporting progress.
///
/// # Errors
///
/// Same as [`extract_archive`].
pub fn extract_archive_with_progress<P: AsRef<Path>, Q: AsRef<Path>>(
    archive_path: P,
    output_dir: Q,
    config: &ExtractionConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let archive_path = archive_path.as_ref();
    let output_dir = output_dir.as_ref();
    let start = Instant::now();

    let result = run(archive_path, output_dir, config, progress);

    match result {
        Ok(mut report) => {
            report.duration = start.elapsed();
            info!(
                archive = %archive_path.display(),
                files = report.files_extracted,
                directories = report.directories_created,
                bytes = report.bytes_written,
                elapsed_ms = report.duration.as_millis(),
                "extraction finished"
            );
            Ok(report)
        }
        Err(e) => {
            warn!(
                archive = %archive_path.display(),
                kind = %e.kind(),
                error = %e,
                "extraction failed"
            );
            Err(e)
        }
    }
}

fn run(
    archive_path: &Path,
    output_dir: &Path,
    config: &ExtractionConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let dest = DestDir::create(output_dir)?;
    let mut archive = ZipArchive::open(archive_path)?;

    if config.staged {
        extract_staged(&dest, |staging| archive.extract(staging, config, progress))
    } else {
        archive.extract(&dest, config, progress)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use crate::test_utils::ZipTestBuilder;
    use crate::test_utils::write_archive;
    use tempfile::TempDir;

    #[test]
    fn test_extract_archive_scenario() {
        let temp = TempDir::new().unwrap();
        let data = ZipTestBuilder::new()
            .add_file("a.txt", b"hello")
            .add_file("sub/b.txt", b"world")
            .build();
        let archive = write_archive(temp.path(), "fw.zip", &data);
        let out = temp.path().join("bundle");

        let report = extract_archive(&archive, &out, &ExtractionConfig::default()).unwrap();

        assert_eq!(report.files_extracted, 2);
        assert_eq!(std::fs::read_to_string(out.join("a.txt")).unwrap(), "hello");
        assert_eq!(std::fs::read_to_string(out.join("sub/b.txt")).unwrap(), "world");
    }

    #[test]
    fn test_destination_checked_before_archive() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();

        let err = extract_archive(
            temp.path().join("missing.zip"),
            blocker.join("bundle"),
            &ExtractionConfig::default(),
        )
        .unwrap_err();

        assert_eq!(err.kind(), FailureKind::DestinationUnavailable);
    }

    #[test]
    fn test_staged_failure_leaves_nothing_behind() {
        let temp = TempDir::new().unwrap();
        let mut data = ZipTestBuilder::new()
            .add_file("a.txt", b"hello")
            .add_file("b.txt", b"corrupt me")
            .build();
        let pos = data.windows(7).position(|w| w == b"corrupt").unwrap();
        data[pos] = b'C';
        let archive = write_archive(temp.path(), "fw.zip", &data);
        let out = temp.path().join("bundle");

        let config = ExtractionConfig::default().with_staged(true);
        let err = extract_archive(&archive, &out, &config).unwrap_err();

        assert_eq!(err.kind(), FailureKind::ArchiveCorrupt);
        assert!(out.is_dir());
        assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
    }
}

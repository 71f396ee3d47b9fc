//! ZIP archive decoding.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;

use crate::ExtractionConfig;
use crate::ExtractionError;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::types::DestDir;
use crate::types::SafePath;

use super::common::FileEntryMeta;
use super::common::create_directory;
use super::common::extract_file;

const S_IFMT: u32 = 0o170_000;
const S_IFLNK: u32 = 0o120_000;
const S_IFDIR: u32 = 0o040_000;

/// An opened zip archive backed by a file on disk.
pub struct ZipArchive {
    path: PathBuf,
    inner: zip::ZipArchive<BufReader<File>>,
}

impl std::fmt::Debug for ZipArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipArchive")
            .field("path", &self.path)
            .field("entries", &self.inner.len())
            .finish()
    }
}

impl ZipArchive {
    /// Opens the archive and reads its central directory.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::ArchiveUnreadable`] if the file cannot be
    /// opened or does not parse as a zip archive (including zero-byte
    /// files).
    pub fn open(path: &Path) -> Result<Self> {
        let unreadable = |reason: String| ExtractionError::ArchiveUnreadable {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path).map_err(|e| unreadable(e.to_string()))?;
        let inner =
            zip::ZipArchive::new(BufReader::new(file)).map_err(|e| unreadable(e.to_string()))?;

        debug!(archive = %path.display(), entries = inner.len(), "opened archive");

        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    /// Returns the number of entries in the central directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the archive has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.len() == 0
    }

    /// Writes every entry under `dest`, one at a time, in central-directory
    /// order. Stops at the first failing entry.
    ///
    /// # Errors
    ///
    /// - `ArchiveCorrupt` for unreadable, encrypted, or damaged entries
    /// - `PathTraversal` / `SecurityViolation` for unsafe entry names and
    ///   symlink entries
    /// - `EntryWriteFailed` for filesystem errors
    pub fn extract(
        &mut self,
        dest: &DestDir,
        config: &ExtractionConfig,
        progress: &mut dyn ProgressCallback,
    ) -> Result<ExtractionReport> {
        let total = self.inner.len();
        let mut report = ExtractionReport {
            entries_total: total,
            ..ExtractionReport::default()
        };
        let mut copy_buffer = CopyBuffer::new();

        for index in 0..total {
            let mut entry =
                self.inner
                    .by_index(index)
                    .map_err(|e| ExtractionError::ArchiveCorrupt {
                        entry: format!("#{index}"),
                        reason: e.to_string(),
                    })?;

            let name = PathBuf::from(entry.name());
            progress.on_entry_start(&name, total, index + 1);

            let safe_path = SafePath::validate(&name, dest, config)?;
            let unix_mode = entry.unix_mode();

            if unix_mode.is_some_and(|mode| mode & S_IFMT == S_IFLNK) {
                return Err(ExtractionError::SecurityViolation {
                    reason: format!("symlink entries are not supported: {}", name.display()),
                });
            }

            // Some writers mark directories only through the mode bits or the
            // MS-DOS attribute, which `unix_mode` folds into `S_IFDIR`.
            let is_dir = entry.is_dir() || unix_mode.is_some_and(|mode| mode & S_IFMT == S_IFDIR);

            if is_dir {
                debug!(entry = %name.display(), "creating directory");
                create_directory(&safe_path, dest, &mut report)?;
            } else {
                let meta = FileEntryMeta {
                    expected_size: entry.size(),
                    mode: unix_mode.filter(|_| config.preserve_permissions),
                };
                debug!(entry = %name.display(), size = meta.expected_size, "writing file");
                extract_file(
                    &mut entry,
                    &safe_path,
                    dest,
                    meta,
                    &mut report,
                    &mut copy_buffer,
                    progress,
                )?;
            }

            progress.on_entry_complete(&name);
        }

        progress.on_complete();
        Ok(report)
    }

    /// Returns the archive path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

//! Validated destination directory type.

use crate::ExtractionError;
use crate::Result;
use std::path::Path;
use std::path::PathBuf;

/// A destination directory that exists, is writable, and is canonical.
///
/// # Examples
///
/// ```no_run
/// use fwinflate_core::types::DestDir;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::create("/tmp/restore/bundle")?;
/// println!("Extracting to: {}", dest.as_path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestDir(PathBuf);

impl DestDir {
    /// Creates the directory (and any missing parents) and validates it.
    ///
    /// # Validation
    ///
    /// 1. `create_dir_all`, which is a no-op for an existing directory
    /// 2. Verifies the path is a directory (not a file)
    /// 3. Canonicalizes the path to an absolute path
    /// 4. Checks write permissions (Unix only)
    ///
    /// Entry paths are later checked against the canonical path, so a
    /// destination reached through a symlink is resolved once here.
    ///
    /// # Errors
    ///
    /// Every failure is reported as
    /// [`ExtractionError::DestinationUnavailable`].
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let unavailable = |source: std::io::Error| ExtractionError::DestinationUnavailable {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&path).map_err(unavailable)?;

        if !path.is_dir() {
            return Err(unavailable(std::io::Error::new(
                std::io::ErrorKind::NotADirectory,
                "path is not a directory",
            )));
        }

        let canonical = path.canonicalize().map_err(unavailable)?;

        #[cfg(unix)]
        {
            use std::ffi::CString;
            use std::os::unix::ffi::OsStrExt;

            let path_cstring = CString::new(canonical.as_os_str().as_bytes()).map_err(|_| {
                unavailable(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path contains null byte",
                ))
            })?;

            // SAFETY: `path_cstring` is a valid NUL-terminated string that
            // outlives the call; access() only reads it.
            #[allow(unsafe_code)]
            let result = unsafe { libc::access(path_cstring.as_ptr(), libc::W_OK) };

            if result != 0 {
                return Err(unavailable(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "directory is not writable",
                )));
            }
        }

        Ok(Self(canonical))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Joins a `SafePath` to this destination directory.
    #[inline]
    #[must_use]
    pub fn join(&self, safe_path: &super::SafePath) -> PathBuf {
        self.0.join(safe_path.as_path())
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

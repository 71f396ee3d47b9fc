//! Validated entry path type.

use crate::ExtractionConfig;
use crate::ExtractionError;
use crate::Result;
use std::borrow::Cow;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use super::DestDir;

/// A relative entry path that stays inside the destination directory.
///
/// `SafePath` can only be obtained from [`SafePath::validate`]; there is no
/// `From<PathBuf>`.
///
/// # Examples
///
/// ```no_run
/// use fwinflate_core::ExtractionConfig;
/// use fwinflate_core::types::DestDir;
/// use fwinflate_core::types::SafePath;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestDir::create("/tmp/bundle")?;
/// let config = ExtractionConfig::default();
///
/// let safe = SafePath::validate(Path::new("Firmware/dfu/iBSS.im4p"), &dest, &config)?;
/// assert!(SafePath::validate(Path::new("../etc/passwd"), &dest, &config).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(PathBuf);

impl SafePath {
    /// Validates an entry path against `dest`.
    ///
    /// # Validation Steps
    ///
    /// 1. Reject null bytes
    /// 2. Reject absolute paths, roots and prefixes
    /// 3. Reject `..` components
    /// 4. Drop `.` components
    /// 5. Reject empty paths and paths deeper than `config.max_path_depth`
    /// 6. Verify the nearest existing ancestor of the resolved path stays
    ///    within `dest` after symlink resolution
    ///
    /// # Errors
    ///
    /// - `ExtractionError::PathTraversal` for `..`, absolute paths, or
    ///   escapes through existing symlinks
    /// - `ExtractionError::SecurityViolation` for null bytes, empty paths,
    ///   or excessive depth
    pub fn validate(path: &Path, dest: &DestDir, config: &ExtractionConfig) -> Result<Self> {
        if has_null_bytes(path) {
            return Err(ExtractionError::SecurityViolation {
                reason: format!("path contains null bytes: {}", path.display()),
            });
        }

        if path.is_absolute() {
            return Err(ExtractionError::PathTraversal {
                path: path.to_path_buf(),
            });
        }

        let mut depth = 0;
        let mut normalized = PathBuf::new();
        let mut needs_normalization = false;

        for component in path.components() {
            match component {
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                    return Err(ExtractionError::PathTraversal {
                        path: path.to_path_buf(),
                    });
                }
                Component::Normal(_) => {
                    depth += 1;
                    normalized.push(component);
                }
                Component::CurDir => {
                    needs_normalization = true;
                }
            }
        }

        if depth == 0 {
            return Err(ExtractionError::SecurityViolation {
                reason: format!("empty entry path: {:?}", path.display().to_string()),
            });
        }

        if depth > config.max_path_depth {
            return Err(ExtractionError::SecurityViolation {
                reason: format!(
                    "path depth {} exceeds maximum {}",
                    depth, config.max_path_depth
                ),
            });
        }

        let final_path = if needs_normalization {
            Cow::Owned(normalized)
        } else {
            Cow::Borrowed(path)
        };

        let resolved = dest.as_path().join(final_path.as_ref());
        ensure_contained(&resolved, dest, path)?;

        Ok(Self(final_path.into_owned()))
    }

    /// Returns the path as a `&Path`.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Converts into the inner `PathBuf`.
    #[inline]
    #[must_use]
    pub fn into_path_buf(self) -> PathBuf {
        self.0
    }
}

/// Checks that the nearest existing ancestor of `resolved` (itself
/// included) canonicalizes to somewhere under `dest`.
///
/// Components below that ancestor do not exist yet and will be created as
/// real directories, so they cannot redirect the write.
fn ensure_contained(resolved: &Path, dest: &DestDir, entry: &Path) -> Result<()> {
    let traversal = || ExtractionError::PathTraversal {
        path: entry.to_path_buf(),
    };

    for ancestor in resolved.ancestors() {
        match ancestor.canonicalize() {
            Ok(canonical) if canonical.starts_with(dest.as_path()) => return Ok(()),
            Ok(_) => return Err(traversal()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Dangling symlink: writing through it would create its target.
                if ancestor.symlink_metadata().is_ok() {
                    return Err(traversal());
                }
            }
            Err(e) => {
                return Err(ExtractionError::EntryWriteFailed {
                    entry: entry.to_path_buf(),
                    source: e,
                });
            }
        }
    }

    Ok(())
}

#[cfg(unix)]
fn has_null_bytes(path: &Path) -> bool {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().contains(&b'\0')
}

#[cfg(not(unix))]
fn has_null_bytes(path: &Path) -> bool {
    path.to_str().is_none_or(|s| s.contains('\0'))
}

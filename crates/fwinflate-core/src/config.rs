//! Extraction configuration and the default firmware bundle location.

use std::path::PathBuf;

/// Cache area whose contents the host OS purges at startup.
///
/// Tilde-expanded by [`default_destination`].
pub const PREFERRED_CACHE_DIR: &str = "~/Library/Caches/Cleanup At Startup";

/// Name of the bundle directory created under [`PREFERRED_CACHE_DIR`].
pub const PREFERRED_BUNDLE_DIR: &str = "iOSRestoreRestoreBundle";

/// Returns the conventional destination for unpacked firmware.
///
/// This is `PREFERRED_BUNDLE_DIR` inside `PREFERRED_CACHE_DIR`, with `~`
/// expanded to the current user's home directory. Extraction itself does
/// not care where the destination points; this exists for callers that
/// want a standard location.
///
/// # Examples
///
/// ```
/// use fwinflate_core::config::default_destination;
///
/// let dest = default_destination();
/// assert!(dest.ends_with("iOSRestoreRestoreBundle"));
/// ```
#[must_use]
pub fn default_destination() -> PathBuf {
    let cache = shellexpand::tilde(PREFERRED_CACHE_DIR);
    PathBuf::from(cache.as_ref()).join(PREFERRED_BUNDLE_DIR)
}

/// Options controlling how an archive is written to disk.
///
/// # Examples
///
/// ```
/// use fwinflate_core::ExtractionConfig;
///
/// let config = ExtractionConfig::default()
///     .with_staged(true)
///     .with_preserve_permissions(true);
/// assert!(config.staged);
/// assert_eq!(config.max_path_depth, 32);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Maximum number of normal components in an entry path.
    pub max_path_depth: usize,

    /// Apply Unix permission bits stored in the archive.
    pub preserve_permissions: bool,

    /// Write into a staging directory and merge into the destination only
    /// once every entry has been written.
    pub staged: bool,
}

impl Default for ExtractionConfig {
    /// Default values:
    /// - `max_path_depth`: 32
    /// - `preserve_permissions`: false
    /// - `staged`: false
    fn default() -> Self {
        Self {
            max_path_depth: 32,
            preserve_permissions: false,
            staged: false,
        }
    }
}

impl ExtractionConfig {
    /// Sets the maximum entry path depth.
    #[must_use]
    pub fn with_max_path_depth(mut self, depth: usize) -> Self {
        self.max_path_depth = depth;
        self
    }

    /// Sets whether archive permission bits are applied.
    #[must_use]
    pub fn with_preserve_permissions(mut self, preserve: bool) -> Self {
        self.preserve_permissions = preserve;
        self
    }

    /// Sets whether extraction goes through a staging directory.
    #[must_use]
    pub fn with_staged(mut self, staged: bool) -> Self {
        self.staged = staged;
        self
    }
}

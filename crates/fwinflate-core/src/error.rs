//! Error types for firmware archive extraction.

use std::path::PathBuf;
use thiserror::Error;

use crate::extractor::ExtractionState;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Coarse classification of why an extraction run failed.
///
/// Every [`ExtractionError`] maps onto exactly one kind via
/// [`ExtractionError::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The destination directory could not be created or is not writable.
    DestinationUnavailable,
    /// The archive is missing, unreadable, or not a zip archive.
    ArchiveUnreadable,
    /// An individual entry could not be written (I/O error or unsafe path).
    EntryWriteFailed,
    /// An entry's data failed integrity or size checks while decoding.
    ArchiveCorrupt,
    /// The worker ended without reporting an outcome.
    Interrupted,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::DestinationUnavailable => "destination unavailable",
            Self::ArchiveUnreadable => "archive unreadable",
            Self::EntryWriteFailed => "entry write failed",
            Self::ArchiveCorrupt => "archive corrupt",
            Self::Interrupted => "interrupted",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during firmware archive extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Destination directory could not be created, resolved, or written.
    #[error("destination unavailable: {path}: {source}")]
    DestinationUnavailable {
        /// The destination that was requested.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },

    /// Archive could not be opened or is not a valid zip archive.
    #[error("archive unreadable: {path}: {reason}")]
    ArchiveUnreadable {
        /// The archive path.
        path: PathBuf,
        /// What went wrong while opening or parsing.
        reason: String,
    },

    /// Writing an entry to disk failed.
    #[error("failed to write entry {entry}: {source}")]
    EntryWriteFailed {
        /// Entry path relative to the destination.
        entry: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },

    /// Entry data failed a checksum or size check while decoding.
    #[error("corrupt archive entry {entry}: {reason}")]
    ArchiveCorrupt {
        /// Entry name as stored in the archive, or its index if unnamed.
        entry: String,
        /// Description of the integrity failure.
        reason: String,
    },

    /// Entry path would resolve outside the destination directory.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending entry path.
        path: PathBuf,
    },

    /// Entry rejected for a reason other than traversal.
    #[error("entry rejected: {reason}")]
    SecurityViolation {
        /// Reason for the rejection.
        reason: String,
    },

    /// The worker thread went away without posting an outcome.
    #[error("extraction worker terminated without reporting an outcome")]
    WorkerLost,
}

impl ExtractionError {
    /// Classifies this error into a [`FailureKind`].
    ///
    /// Unsafe entry paths are classified as [`FailureKind::EntryWriteFailed`]
    /// because the entry could not be written where the archive asked.
    ///
    /// # Examples
    ///
    /// ```
    /// use fwinflate_core::ExtractionError;
    /// use fwinflate_core::FailureKind;
    /// use std::path::PathBuf;
    ///
    /// let err = ExtractionError::PathTraversal {
    ///     path: PathBuf::from("../etc/passwd"),
    /// };
    /// assert_eq!(err.kind(), FailureKind::EntryWriteFailed);
    /// ```
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::DestinationUnavailable { .. } => FailureKind::DestinationUnavailable,
            Self::ArchiveUnreadable { .. } => FailureKind::ArchiveUnreadable,
            Self::EntryWriteFailed { .. }
            | Self::PathTraversal { .. }
            | Self::SecurityViolation { .. } => FailureKind::EntryWriteFailed,
            Self::ArchiveCorrupt { .. } => FailureKind::ArchiveCorrupt,
            Self::WorkerLost => FailureKind::Interrupted,
        }
    }

    /// Returns `true` if the archive tried to place an entry somewhere it
    /// must not go.
    #[must_use]
    pub const fn is_security_violation(&self) -> bool {
        matches!(
            self,
            Self::PathTraversal { .. } | Self::SecurityViolation { .. }
        )
    }

    /// Returns the entry this error concerns, if it concerns one.
    ///
    /// # Examples
    ///
    /// ```
    /// use fwinflate_core::ExtractionError;
    ///
    /// let err = ExtractionError::ArchiveCorrupt {
    ///     entry: "Firmware/all_flash/manifest".to_string(),
    ///     reason: "invalid checksum".to_string(),
    /// };
    /// assert_eq!(err.entry().as_deref(), Some("Firmware/all_flash/manifest"));
    /// assert_eq!(ExtractionError::WorkerLost.entry(), None);
    /// ```
    #[must_use]
    pub fn entry(&self) -> Option<String> {
        match self {
            Self::EntryWriteFailed { entry, .. } => Some(entry.display().to_string()),
            Self::ArchiveCorrupt { entry, .. } => Some(entry.clone()),
            Self::PathTraversal { path } => Some(path.display().to_string()),
            _ => None,
        }
    }
}

/// Errors returned synchronously when a run cannot be started.
#[derive(Error, Debug)]
pub enum StartError {
    /// `begin_extraction` was called on an extractor that already left
    /// [`ExtractionState::Idle`].
    #[error("extraction already started (state: {state})")]
    AlreadyStarted {
        /// State of the extractor when the call was rejected.
        state: ExtractionState,
    },

    /// The operating system refused to spawn the worker thread.
    #[error("failed to spawn extraction worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
}

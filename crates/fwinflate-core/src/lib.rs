//! Background extraction of firmware restore archives.
//!
//! `fwinflate-core` unpacks a zip-format firmware image (an `.ipsw` file)
//! into a destination directory. The work runs on a worker thread; the
//! outcome is handed to an optional, weakly held [`ExtractionObserver`] on
//! the thread that owns the [`Extractor`], never on the worker.
//!
//! Every entry path is validated before anything is written, so an archive
//! cannot place files outside the destination.
//!
//! # Examples
//!
//! ```no_run
//! use fwinflate_core::ExtractionObserver;
//! use fwinflate_core::Extractor;
//! use fwinflate_core::config::default_destination;
//! use std::rc::Rc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let observer = Rc::new(
//!     ExtractionObserver::new()
//!         .on_finished(|_, report| println!("extracted {} files", report.files_extracted))
//!         .on_failed(|_, error| eprintln!("extraction failed: {error}")),
//! );
//!
//! let mut extractor = Extractor::new("iPhone_Restore.ipsw", default_destination());
//! extractor.set_observer(Some(&observer));
//! extractor.begin_extraction()?;
//! extractor.wait();
//! # Ok(())
//! # }
//! ```
//!
//! For a plain blocking call, use [`extract_archive`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod copy;
pub mod error;
pub mod extraction;
pub mod extractor;
pub mod formats;
pub mod observer;
pub mod report;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export main API types
pub use api::extract_archive;
pub use api::extract_archive_with_progress;
pub use config::ExtractionConfig;
pub use error::ExtractionError;
pub use error::FailureKind;
pub use error::Result;
pub use error::StartError;
pub use extractor::ExtractionState;
pub use extractor::Extractor;
pub use observer::ExtractionObserver;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;

pub use types::DestDir;
pub use types::SafePath;

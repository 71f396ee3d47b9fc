//! Notification target for extraction outcomes.

use crate::ExtractionError;
use crate::ExtractionReport;
use crate::Extractor;

type FinishedHandler = dyn Fn(&Extractor, &ExtractionReport);
type FailedHandler = dyn Fn(&Extractor, &ExtractionError);

/// Receives the terminal outcome of an [`Extractor`] run.
///
/// Both handlers are optional. An unset handler means the corresponding
/// outcome is simply not reported. Handlers run on the thread that pumps
/// the extractor, so they need not be `Send`.
///
/// The extractor only holds a weak reference; keep the `Rc` alive for as
/// long as you want to be notified.
///
/// # Examples
///
/// ```
/// use fwinflate_core::ExtractionObserver;
/// use std::rc::Rc;
///
/// let observer = Rc::new(
///     ExtractionObserver::new()
///         .on_finished(|extractor, report| {
///             println!(
///                 "{} unpacked: {} files",
///                 extractor.archive_path().display(),
///                 report.files_extracted
///             );
///         })
///         .on_failed(|_, error| eprintln!("unzip failed: {error}")),
/// );
/// assert!(observer.handles_finished());
/// ```
#[derive(Default)]
pub struct ExtractionObserver {
    finished: Option<Box<FinishedHandler>>,
    failed: Option<Box<FailedHandler>>,
}

impl ExtractionObserver {
    /// Creates an observer with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the handler invoked after every entry was written.
    #[must_use]
    pub fn on_finished<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Extractor, &ExtractionReport) + 'static,
    {
        self.finished = Some(Box::new(handler));
        self
    }

    /// Sets the handler invoked when the run could not complete.
    #[must_use]
    pub fn on_failed<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Extractor, &ExtractionError) + 'static,
    {
        self.failed = Some(Box::new(handler));
        self
    }

    /// Returns `true` if a finished handler is set.
    #[must_use]
    pub fn handles_finished(&self) -> bool {
        self.finished.is_some()
    }

    /// Returns `true` if a failed handler is set.
    #[must_use]
    pub fn handles_failed(&self) -> bool {
        self.failed.is_some()
    }

    pub(crate) fn notify_finished(&self, extractor: &Extractor, report: &ExtractionReport) {
        if let Some(handler) = &self.finished {
            handler(extractor, report);
        }
    }

    pub(crate) fn notify_failed(&self, extractor: &Extractor, error: &ExtractionError) {
        if let Some(handler) = &self.failed {
            handler(extractor, error);
        }
    }
}

impl std::fmt::Debug for ExtractionObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionObserver")
            .field("finished", &self.finished.is_some())
            .field("failed", &self.failed.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_observer() {
        let observer = ExtractionObserver::new();
        assert!(!observer.handles_finished());
        assert!(!observer.handles_failed());
        assert_eq!(
            format!("{observer:?}"),
            "ExtractionObserver { finished: false, failed: false }"
        );
    }

    #[test]
    fn test_handlers_are_independent() {
        let observer = ExtractionObserver::new().on_failed(|_, _| {});
        assert!(!observer.handles_finished());
        assert!(observer.handles_failed());
    }
}

//! Background extraction with notifications delivered on the caller's thread.
//!
//! An [`Extractor`] runs one extraction on a dedicated worker thread. The
//! worker never calls the observer: it posts its outcome into a one-shot
//! channel, and the outcome is handed to the observer only when the owning
//! thread pumps the extractor with [`Extractor::dispatch`],
//! [`Extractor::wait`] or [`Extractor::notified`].

use std::path::Path;
use std::path::PathBuf;
use std::rc::Rc;
use std::rc::Weak;
use std::thread;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tracing::debug;
use tracing::warn;

use crate::ExtractionConfig;
use crate::ExtractionError;
use crate::ExtractionObserver;
use crate::ExtractionReport;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::api::extract_archive_with_progress;
use crate::error::StartError;

const WORKER_THREAD_NAME: &str = "fwinflate-worker";

/// Lifecycle of an [`Extractor`].
///
/// `Idle → Running → {Succeeded, Failed}`. The last two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionState {
    /// Constructed; extraction may begin.
    Idle,
    /// The worker is running or its outcome has not been delivered yet.
    Running,
    /// Every entry was written and the outcome was delivered.
    Succeeded,
    /// The run failed and the outcome was delivered.
    Failed,
}

impl ExtractionState {
    /// Returns `true` for `Succeeded` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl std::fmt::Display for ExtractionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

type Outcome = Result<ExtractionReport>;

/// Extracts one firmware archive off the calling thread.
///
/// Both paths are fixed at construction and never validated until the run
/// starts. An instance performs at most one run.
///
/// `Extractor` is deliberately `!Send`: it lives on the thread that owns
/// the observer, and that is where notifications are delivered.
///
/// # Examples
///
/// ```no_run
/// use fwinflate_core::ExtractionObserver;
/// use fwinflate_core::ExtractionState;
/// use fwinflate_core::Extractor;
/// use std::rc::Rc;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let observer = Rc::new(
///     ExtractionObserver::new()
///         .on_finished(|_, report| println!("{} files", report.files_extracted))
///         .on_failed(|_, error| eprintln!("failed: {error}")),
/// );
///
/// let mut extractor = Extractor::new("iPhone_Restore.ipsw", "/tmp/bundle");
/// extractor.set_observer(Some(&observer));
/// extractor.begin_extraction()?;
///
/// // Either integrate `dispatch()` into an event loop, or block:
/// let state = extractor.wait();
/// assert!(state.is_terminal());
/// # Ok(())
/// # }
/// ```
pub struct Extractor {
    archive_path: PathBuf,
    destination_path: PathBuf,
    config: ExtractionConfig,
    observer: Weak<ExtractionObserver>,
    progress: Option<Box<dyn ProgressCallback>>,
    state: ExtractionState,
    pending: Option<oneshot::Receiver<Outcome>>,
    outcome: Option<Outcome>,
}

impl Extractor {
    /// Creates an idle extractor for `archive_path` → `destination_path`.
    pub fn new(archive_path: impl Into<PathBuf>, destination_path: impl Into<PathBuf>) -> Self {
        Self {
            archive_path: archive_path.into(),
            destination_path: destination_path.into(),
            config: ExtractionConfig::default(),
            observer: Weak::new(),
            progress: None,
            state: ExtractionState::Idle,
            pending: None,
            outcome: None,
        }
    }

    /// Replaces the extraction options.
    #[must_use]
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// Installs a progress callback.
    ///
    /// The callback moves to the worker thread when the run begins and is
    /// invoked there, not on the caller's thread.
    #[must_use]
    pub fn with_progress(mut self, progress: impl ProgressCallback + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Returns the archive path given at construction.
    #[must_use]
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Returns the destination path given at construction.
    #[must_use]
    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    /// Returns the extraction options.
    #[must_use]
    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ExtractionState {
        self.state
    }

    /// Sets or clears the observer.
    ///
    /// Only a weak reference is kept. If the observer has been dropped by
    /// the time the outcome is delivered, nothing is notified.
    pub fn set_observer(&mut self, observer: Option<&Rc<ExtractionObserver>>) {
        self.observer = observer.map_or_else(Weak::new, Rc::downgrade);
    }

    /// Returns the observer if one is set and still alive.
    #[must_use]
    pub fn observer(&self) -> Option<Rc<ExtractionObserver>> {
        self.observer.upgrade()
    }

    /// Returns the report of a delivered successful run.
    #[must_use]
    pub fn report(&self) -> Option<&ExtractionReport> {
        self.outcome.as_ref().and_then(|outcome| outcome.as_ref().ok())
    }

    /// Returns the error of a delivered failed run.
    #[must_use]
    pub fn error(&self) -> Option<&ExtractionError> {
        self.outcome.as_ref().and_then(|outcome| outcome.as_ref().err())
    }

    /// Starts the run on a worker thread and returns immediately.
    ///
    /// # Errors
    ///
    /// - [`StartError::AlreadyStarted`] if the extractor is not idle. The
    ///   call has no other effect.
    /// - [`StartError::WorkerSpawn`] if the thread could not be spawned. The
    ///   extractor stays idle, but a progress callback passed to
    ///   [`with_progress`](Self::with_progress) has been consumed.
    pub fn begin_extraction(&mut self) -> std::result::Result<(), StartError> {
        if self.state != ExtractionState::Idle {
            warn!(
                archive = %self.archive_path.display(),
                state = %self.state,
                "rejected second extraction start"
            );
            return Err(StartError::AlreadyStarted { state: self.state });
        }

        let (tx, rx) = oneshot::channel::<Outcome>();
        let archive_path = self.archive_path.clone();
        let destination_path = self.destination_path.clone();
        let config = self.config.clone();
        let mut progress = self
            .progress
            .take()
            .unwrap_or_else(|| Box::new(NoopProgress));

        thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let outcome = extract_archive_with_progress(
                    &archive_path,
                    &destination_path,
                    &config,
                    &mut *progress,
                );
                if tx.send(outcome).is_err() {
                    debug!("extractor dropped before the outcome could be delivered");
                }
            })
            .map_err(StartError::WorkerSpawn)?;

        debug!(
            archive = %self.archive_path.display(),
            destination = %self.destination_path.display(),
            "extraction started"
        );
        self.state = ExtractionState::Running;
        self.pending = Some(rx);
        Ok(())
    }

    /// Delivers the outcome if the worker has posted it; never blocks.
    ///
    /// Call this from the owning thread's event loop. Returns the state
    /// after any delivery.
    pub fn dispatch(&mut self) -> ExtractionState {
        let Some(rx) = self.pending.as_mut() else {
            return self.state;
        };

        match rx.try_recv() {
            Ok(outcome) => self.deliver(outcome),
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Closed) => self.deliver(Err(ExtractionError::WorkerLost)),
        }
        self.state
    }

    /// Blocks the calling thread until the outcome arrives, then delivers
    /// it.
    ///
    /// Returns immediately if there is nothing pending (idle, or already
    /// delivered).
    ///
    /// # Panics
    ///
    /// Panics if called from within an asynchronous execution context; use
    /// [`notified`](Self::notified) there.
    pub fn wait(&mut self) -> ExtractionState {
        let Some(rx) = self.pending.take() else {
            return self.state;
        };

        let outcome = rx
            .blocking_recv()
            .unwrap_or_else(|_| Err(ExtractionError::WorkerLost));
        self.deliver(outcome);
        self.state
    }

    /// Waits asynchronously for the outcome, then delivers it.
    ///
    /// Cancel-safe: dropping the future before completion keeps the
    /// outcome pending.
    pub async fn notified(&mut self) -> ExtractionState {
        let Some(rx) = self.pending.as_mut() else {
            return self.state;
        };

        let outcome = rx
            .await
            .unwrap_or_else(|_| Err(ExtractionError::WorkerLost));
        self.deliver(outcome);
        self.state
    }

    fn deliver(&mut self, outcome: Outcome) {
        self.pending = None;
        self.state = match &outcome {
            Ok(_) => ExtractionState::Succeeded,
            Err(_) => ExtractionState::Failed,
        };
        self.outcome = Some(outcome);
        debug!(archive = %self.archive_path.display(), state = %self.state, "outcome delivered");

        let Some(observer) = self.observer.upgrade() else {
            debug!("no live observer, outcome not reported");
            return;
        };

        match &self.outcome {
            Some(Ok(report)) => observer.notify_finished(self, report),
            Some(Err(error)) => observer.notify_failed(self, error),
            None => {}
        }
    }
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("archive_path", &self.archive_path)
            .field("destination_path", &self.destination_path)
            .field("config", &self.config)
            .field("state", &self.state)
            .field("has_observer", &(self.observer.strong_count() > 0))
            .finish_non_exhaustive()
    }
}

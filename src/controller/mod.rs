//! Download lifecycle controller.
//!
//! Owns the per-request state machine (idle → running → succeeded/failed),
//! invokes the backend executor exactly once per accepted request, drives the
//! injected progress source while the call is outstanding, and records
//! successful requests in the history store.
//!
//! # Concurrency model
//!
//! One request may be in flight per controller instance. The single-slot
//! guard is an atomic flag acquired before any side effect; a `start()` call
//! while it is held is rejected with [`ControllerError::Concurrency`] and
//! does nothing. The progress ticker is a scoped resource of `start()`: it is
//! stopped and awaited on the success path, the failure path, and the unwind
//! path, always before a terminal status is published, so no tick can land
//! after a terminal state.

mod error;
mod status;

pub use error::ControllerError;
pub use status::{
    DownloadPhase, DownloadStatus, MSG_COMPLETE, MSG_DOWNLOADING, MSG_PROCESSING, MSG_STARTING,
    StatusChannel,
};

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::Local;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::executor::BackendExecutor;
use crate::history::{HistoryEntry, HistoryStore};
use crate::paths::PathResolver;
use crate::platform::{FileManager, SystemFileManager};
use crate::progress::ProgressSource;
use crate::request::DownloadRequest;

/// Delay before a succeeded status automatically returns to idle.
pub const DEFAULT_RESET_DELAY: Duration = Duration::from_secs(3);

/// Stops the progress ticker and releases it on every exit path.
///
/// `shutdown()` is the orderly path; `Drop` covers an unwind out of the
/// executor call so an orphaned ticker can never keep firing.
struct TickerGuard {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TickerGuard {
    fn new(stop: Arc<AtomicBool>, handle: JoinHandle<()>) -> Self {
        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Signals stop, aborts the task, and waits for it to finish.
    async fn shutdown(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for TickerGuard {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Releases the single-flight slot when dropped.
struct SlotGuard {
    in_flight: Arc<AtomicBool>,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

/// Orchestrates one download request at a time.
///
/// All collaborators are injected: the backend executor, the progress source,
/// the destination resolver, and the (shared) history store. The store sits
/// behind an async mutex so append/save is a critical section even if several
/// controllers ever share one; with a single controller this degenerates to
/// ordinary sequential access.
pub struct DownloadController {
    executor: Arc<dyn BackendExecutor>,
    progress: Arc<dyn ProgressSource>,
    resolver: PathResolver,
    history: Arc<Mutex<HistoryStore>>,
    file_manager: Arc<dyn FileManager>,
    status: StatusChannel,
    in_flight: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    reset_delay: Duration,
}

impl DownloadController {
    /// Creates a controller with the given collaborators and the system file
    /// manager.
    pub fn new(
        executor: Arc<dyn BackendExecutor>,
        progress: Arc<dyn ProgressSource>,
        resolver: PathResolver,
        history: Arc<Mutex<HistoryStore>>,
    ) -> Self {
        Self {
            executor,
            progress,
            resolver,
            history,
            file_manager: Arc::new(SystemFileManager),
            status: StatusChannel::new(),
            in_flight: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            reset_delay: DEFAULT_RESET_DELAY,
        }
    }

    /// Replaces the file manager used for post-success reveal actions.
    #[must_use]
    pub fn with_file_manager(mut self, file_manager: Arc<dyn FileManager>) -> Self {
        self.file_manager = file_manager;
        self
    }

    /// Overrides the succeeded→idle reset delay.
    #[must_use]
    pub fn with_reset_delay(mut self, delay: Duration) -> Self {
        self.reset_delay = delay;
        self
    }

    /// Subscribes an observer to status updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DownloadStatus> {
        self.status.subscribe()
    }

    /// Snapshot of the current status.
    #[must_use]
    pub fn status(&self) -> DownloadStatus {
        self.status.current()
    }

    /// Shared handle to the history store.
    #[must_use]
    pub fn history(&self) -> Arc<Mutex<HistoryStore>> {
        Arc::clone(&self.history)
    }

    /// Submits a request and drives it to its terminal state.
    ///
    /// Exactly one terminal transition happens per accepted call. On success
    /// the derived history entry is appended and the collection saved; after
    /// the reset delay the status returns to idle. On failure the status
    /// carries the executor's message verbatim and the error is also
    /// returned.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::Validation`] for an empty/whitespace URL; the
    ///   executor is never invoked.
    /// - [`ControllerError::Concurrency`] while another request is running;
    ///   no side effects.
    /// - [`ControllerError::Backend`] when the executor fails.
    pub async fn start(&self, request: DownloadRequest) -> Result<(), ControllerError> {
        let url = request.url.trim().to_string();
        if url.is_empty() {
            return Err(ControllerError::validation("url must not be empty"));
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ControllerError::Concurrency);
        }
        let _slot = SlotGuard {
            in_flight: Arc::clone(&self.in_flight),
        };
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let destination = self.resolver.resolve(request.destination.as_deref());
        info!(url = %url, quality = %request.quality, destination = %destination.display(), "Download starting");

        self.status.set_running();
        let stop = Arc::new(AtomicBool::new(false));
        let ticker = tokio::spawn({
            let progress = Arc::clone(&self.progress);
            let status = self.status.clone();
            let stop = Arc::clone(&stop);
            async move { progress.drive(status, stop).await }
        });
        let ticker = TickerGuard::new(stop, ticker);

        let outcome = self
            .executor
            .download(&url, &destination, request.quality)
            .await;

        // The ticker must be fully stopped before the terminal status goes
        // out, otherwise a late tick could overwrite it.
        ticker.shutdown().await;

        match outcome {
            Ok(()) => {
                self.status.succeed();
                let entry =
                    HistoryEntry::for_success(&url, &destination, request.quality, Local::now());
                info!(label = %entry.label, path = %entry.resolved_file_path, "Download succeeded");
                {
                    let mut history = self.history.lock().await;
                    history.append(entry);
                    if let Err(err) = history.save() {
                        // The entry stays committed in memory; durability is
                        // retried on the next save.
                        warn!(%err, "Could not persist history");
                    }
                }
                self.spawn_idle_reset(generation);
                Ok(())
            }
            Err(err) => {
                warn!(url = %url, error = %err, "Download failed");
                self.status.fail(err.message());
                Err(err.into())
            }
        }
    }

    /// After the reset delay, returns a succeeded status to idle, unless a
    /// newer request has taken over in the meantime.
    fn spawn_idle_reset(&self, generation: u64) {
        let status = self.status.clone();
        let current_generation = Arc::clone(&self.generation);
        let delay = self.reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if current_generation.load(Ordering::SeqCst) == generation {
                status.reset_if_succeeded();
                debug!("Status reset to idle");
            }
        });
    }

    /// Reveals a recorded download in the file manager, falling back to
    /// opening its folder when selection fails.
    ///
    /// This is a post-success convenience: whatever happens here, the
    /// committed history entry and the controller phase are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::SideEffect`] when both the reveal and the
    /// open-folder fallback fail.
    pub async fn reveal(&self, entry: &HistoryEntry) -> Result<(), ControllerError> {
        let path = Path::new(&entry.resolved_file_path);
        match self.file_manager.reveal(path).await {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(%err, path = %path.display(), "Reveal failed, opening folder instead");
                let folder = path.parent().unwrap_or(path);
                self.file_manager
                    .open_folder(folder)
                    .await
                    .map_err(|err| ControllerError::side_effect(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::executor::BackendError;
    use crate::platform::PlatformError;
    use crate::request::QualityPreset;
    use async_trait::async_trait;
    use std::path::PathBuf;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    struct NoopProgress;

    #[async_trait]
    impl ProgressSource for NoopProgress {
        async fn drive(&self, _status: StatusChannel, stop: Arc<AtomicBool>) {
            while !stop.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        }
    }

    struct CountingExecutor {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl BackendExecutor for CountingExecutor {
        async fn download(
            &self,
            _url: &str,
            _destination: &Path,
            _quality: QualityPreset,
        ) -> Result<(), BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct RecordingFileManager {
        reveal_ok: bool,
        open_ok: bool,
        opened: Arc<Mutex<Vec<PathBuf>>>,
    }

    #[async_trait]
    impl FileManager for RecordingFileManager {
        async fn reveal(&self, path: &Path) -> Result<(), PlatformError> {
            if self.reveal_ok {
                Ok(())
            } else {
                Err(PlatformError::Launch {
                    command: "explorer".to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, path.display().to_string()),
                })
            }
        }

        async fn open_folder(&self, path: &Path) -> Result<(), PlatformError> {
            self.opened.lock().await.push(path.to_path_buf());
            if self.open_ok {
                Ok(())
            } else {
                Err(PlatformError::Launch {
                    command: "explorer".to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
                })
            }
        }
    }

    fn controller_with(
        executor: Arc<dyn BackendExecutor>,
        temp: &TempDir,
    ) -> DownloadController {
        let history = Arc::new(Mutex::new(HistoryStore::load(
            temp.path().join("history.json"),
        )));
        DownloadController::new(
            executor,
            Arc::new(NoopProgress),
            PathResolver::with_home(temp.path()),
            history,
        )
    }

    #[tokio::test]
    async fn test_empty_url_is_rejected_without_invoking_executor() {
        let temp = TempDir::new().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let controller = controller_with(
            Arc::new(CountingExecutor {
                calls: Arc::clone(&calls),
            }),
            &temp,
        );

        let err = controller
            .start(DownloadRequest::new("   ", QualityPreset::Hd))
            .await
            .unwrap_err();

        assert!(matches!(err, ControllerError::Validation { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(controller.status().phase, DownloadPhase::Idle);
        assert!(controller.history().lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_reveal_fallback_opens_parent_folder() {
        let temp = TempDir::new().unwrap();
        let opened = Arc::new(Mutex::new(Vec::new()));
        let controller = controller_with(
            Arc::new(CountingExecutor {
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            &temp,
        )
        .with_file_manager(Arc::new(RecordingFileManager {
            reveal_ok: false,
            open_ok: true,
            opened: Arc::clone(&opened),
        }));

        let entry = HistoryEntry::for_success(
            "https://x.test/watch?v=abc",
            Path::new("/tmp/out"),
            QualityPreset::Hd,
            Local::now(),
        );
        controller.reveal(&entry).await.unwrap();

        let opened = opened.lock().await;
        assert_eq!(opened.as_slice(), [PathBuf::from("/tmp/out")]);
    }

    #[tokio::test]
    async fn test_reveal_double_failure_is_side_effect_error() {
        let temp = TempDir::new().unwrap();
        let controller = controller_with(
            Arc::new(CountingExecutor {
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            &temp,
        )
        .with_file_manager(Arc::new(RecordingFileManager {
            reveal_ok: false,
            open_ok: false,
            opened: Arc::new(Mutex::new(Vec::new())),
        }));

        let entry = HistoryEntry::for_success(
            "https://x.test/watch?v=abc",
            Path::new("/tmp/out"),
            QualityPreset::Hd,
            Local::now(),
        );
        let err = controller.reveal(&entry).await.unwrap_err();
        assert!(matches!(err, ControllerError::SideEffect { .. }));
        // Phase untouched by the failed convenience action.
        assert_eq!(controller.status().phase, DownloadPhase::Idle);
    }
}

//! Lifecycle status types and the watch channel observers subscribe to.
//!
//! A controller publishes exactly one [`DownloadStatus`] at a time; observers
//! read it through a `tokio::sync::watch` receiver. The mutation helpers on
//! [`StatusChannel`] are the only writers and enforce the progress invariants:
//! non-decreasing while running, reset to 0 only on entry into a new running
//! phase, forced to 100 on success.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

/// Message shown while progress is in the first half of the bar.
pub const MSG_DOWNLOADING: &str = "Downloading…";

/// Message shown once progress reaches the second half of the bar.
pub const MSG_PROCESSING: &str = "Processing and merging…";

/// Message published on entry into the running phase, before the first tick.
pub const MSG_STARTING: &str = "Starting download...";

/// Message published on the success terminal transition.
pub const MSG_COMPLETE: &str = "Download complete!";

/// Lifecycle phase of the (single) request a controller tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    /// No request in flight; ready to accept one.
    Idle,
    /// A request was accepted and the backend call is outstanding.
    Running,
    /// The backend settled successfully.
    Succeeded,
    /// The backend settled with an error.
    Failed,
}

impl DownloadPhase {
    /// Returns a lowercase label for logs and display.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DownloadPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The single observable status of a controller instance.
///
/// `speed_estimate` and `eta_estimate` are advisory display values synthesized
/// by the progress source. They are illustrative, not measured, and carry no
/// authority about the actual transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadStatus {
    /// Current lifecycle phase.
    pub phase: DownloadPhase,
    /// Progress in percent, 0-100.
    pub progress_percent: u8,
    /// Human-readable status line.
    pub message: String,
    /// Advisory transfer-speed estimate (non-authoritative).
    pub speed_estimate: Option<String>,
    /// Advisory time-remaining estimate (non-authoritative).
    pub eta_estimate: Option<String>,
}

impl DownloadStatus {
    /// The initial idle status.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            phase: DownloadPhase::Idle,
            progress_percent: 0,
            message: String::new(),
            speed_estimate: None,
            eta_estimate: None,
        }
    }

    fn running() -> Self {
        Self {
            phase: DownloadPhase::Running,
            progress_percent: 0,
            message: MSG_STARTING.to_string(),
            speed_estimate: None,
            eta_estimate: None,
        }
    }

    /// Returns true when the phase is terminal (`Succeeded` or `Failed`).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, DownloadPhase::Succeeded | DownloadPhase::Failed)
    }
}

impl Default for DownloadStatus {
    fn default() -> Self {
        Self::idle()
    }
}

/// Shared writer/reader handle for a controller's status.
///
/// Cloning is cheap; all clones publish into the same watch channel.
#[derive(Debug, Clone)]
pub struct StatusChannel {
    tx: Arc<watch::Sender<DownloadStatus>>,
}

impl StatusChannel {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(DownloadStatus::idle());
        Self { tx: Arc::new(tx) }
    }

    /// Subscribes a new observer to status updates.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DownloadStatus> {
        self.tx.subscribe()
    }

    /// Returns a snapshot of the current status.
    #[must_use]
    pub fn current(&self) -> DownloadStatus {
        self.tx.borrow().clone()
    }

    /// Enters the running phase: progress back to 0, starting message.
    pub(crate) fn set_running(&self) {
        self.tx.send_replace(DownloadStatus::running());
    }

    /// Advances progress by `step`, capped at `ceiling`, with advisory
    /// speed/ETA estimates. No-op unless the phase is `Running`, so a tick
    /// racing a terminal transition can never overwrite it.
    pub(crate) fn advance(&self, step: u8, ceiling: u8, speed: String, eta: String) {
        self.tx.send_if_modified(|status| {
            if status.phase != DownloadPhase::Running {
                return false;
            }
            let next = status.progress_percent.saturating_add(step).min(ceiling);
            // Monotone: a ceiling below the current value must not move it back.
            status.progress_percent = status.progress_percent.max(next);
            status.message = if status.progress_percent < 50 {
                MSG_DOWNLOADING.to_string()
            } else {
                MSG_PROCESSING.to_string()
            };
            status.speed_estimate = Some(speed.clone());
            status.eta_estimate = Some(eta.clone());
            true
        });
    }

    /// Publishes the success terminal state: progress forced to 100.
    pub(crate) fn succeed(&self) {
        self.tx.send_replace(DownloadStatus {
            phase: DownloadPhase::Succeeded,
            progress_percent: 100,
            message: MSG_COMPLETE.to_string(),
            speed_estimate: None,
            eta_estimate: None,
        });
    }

    /// Publishes the failure terminal state carrying `message` verbatim.
    pub(crate) fn fail(&self, message: impl Into<String>) {
        self.tx.send_replace(DownloadStatus {
            phase: DownloadPhase::Failed,
            progress_percent: 0,
            message: message.into(),
            speed_estimate: None,
            eta_estimate: None,
        });
    }

    /// Returns to idle, but only if the phase is still `Succeeded`; a newer
    /// running request must not be clobbered by a stale reset timer.
    pub(crate) fn reset_if_succeeded(&self) {
        self.tx.send_if_modified(|status| {
            if status.phase != DownloadPhase::Succeeded {
                return false;
            }
            *status = DownloadStatus::idle();
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advance_n(channel: &StatusChannel, n: usize) {
        for _ in 0..n {
            channel.advance(5, 90, "3.0 MB/s".to_string(), "10s".to_string());
        }
    }

    #[test]
    fn test_initial_status_is_idle() {
        let channel = StatusChannel::new();
        let status = channel.current();
        assert_eq!(status.phase, DownloadPhase::Idle);
        assert_eq!(status.progress_percent, 0);
        assert!(status.message.is_empty());
    }

    #[test]
    fn test_set_running_resets_progress_and_sets_starting_message() {
        let channel = StatusChannel::new();
        channel.set_running();
        channel.advance(5, 90, "s".to_string(), "e".to_string());
        channel.succeed();

        channel.set_running();
        let status = channel.current();
        assert_eq!(status.phase, DownloadPhase::Running);
        assert_eq!(status.progress_percent, 0);
        assert_eq!(status.message, MSG_STARTING);
    }

    #[test]
    fn test_advance_is_monotone_and_capped() {
        let channel = StatusChannel::new();
        channel.set_running();

        let mut last = 0;
        for _ in 0..40 {
            channel.advance(5, 90, "s".to_string(), "e".to_string());
            let current = channel.current().progress_percent;
            assert!(current >= last, "progress went backwards: {last} -> {current}");
            assert!(current <= 90, "progress exceeded ceiling: {current}");
            last = current;
        }
        assert_eq!(last, 90);
    }

    #[test]
    fn test_advance_message_thresholds() {
        let channel = StatusChannel::new();
        channel.set_running();

        advance_n(&channel, 9); // 45%
        assert_eq!(channel.current().message, MSG_DOWNLOADING);

        advance_n(&channel, 1); // 50%
        assert_eq!(channel.current().message, MSG_PROCESSING);
    }

    #[test]
    fn test_advance_ignored_outside_running() {
        let channel = StatusChannel::new();
        channel.advance(5, 90, "s".to_string(), "e".to_string());
        assert_eq!(channel.current().progress_percent, 0);
        assert_eq!(channel.current().phase, DownloadPhase::Idle);

        channel.set_running();
        channel.succeed();
        channel.advance(5, 90, "s".to_string(), "e".to_string());
        assert_eq!(channel.current().progress_percent, 100);
        assert_eq!(channel.current().phase, DownloadPhase::Succeeded);
    }

    #[test]
    fn test_succeed_forces_progress_to_100() {
        let channel = StatusChannel::new();
        channel.set_running();
        advance_n(&channel, 3);
        channel.succeed();

        let status = channel.current();
        assert_eq!(status.phase, DownloadPhase::Succeeded);
        assert_eq!(status.progress_percent, 100);
        assert_eq!(status.message, MSG_COMPLETE);
        assert!(status.is_terminal());
    }

    #[test]
    fn test_fail_carries_message_verbatim() {
        let channel = StatusChannel::new();
        channel.set_running();
        channel.fail("network unreachable");

        let status = channel.current();
        assert_eq!(status.phase, DownloadPhase::Failed);
        assert_eq!(status.progress_percent, 0);
        assert_eq!(status.message, "network unreachable");
        assert!(status.is_terminal());
    }

    #[test]
    fn test_reset_if_succeeded_only_from_succeeded() {
        let channel = StatusChannel::new();
        channel.set_running();
        channel.reset_if_succeeded();
        assert_eq!(channel.current().phase, DownloadPhase::Running);

        channel.succeed();
        channel.reset_if_succeeded();
        assert_eq!(channel.current().phase, DownloadPhase::Idle);
        assert_eq!(channel.current().progress_percent, 0);
    }

    #[tokio::test]
    async fn test_subscribers_observe_updates() {
        let channel = StatusChannel::new();
        let mut rx = channel.subscribe();

        channel.set_running();
        rx.changed().await.expect("sender alive");
        assert_eq!(rx.borrow_and_update().phase, DownloadPhase::Running);

        channel.succeed();
        rx.changed().await.expect("sender alive");
        assert_eq!(rx.borrow_and_update().progress_percent, 100);
    }
}

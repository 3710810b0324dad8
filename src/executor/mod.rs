//! Backend executor capability: the external program that actually fetches
//! and transcodes video data.
//!
//! The controller is deliberately blind to how the fetch happens. It sees a
//! single async call that settles with success or an error message, nothing
//! more. The shipped implementation offers no incremental progress channel,
//! which is why perceived progress is synthesized (see [`crate::progress`]).

mod ytdlp;

pub use ytdlp::YtDlpExecutor;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

use crate::request::QualityPreset;

/// Failure reported by a backend executor.
///
/// The message is the only information the executor contract exposes; it is
/// forwarded to callers verbatim.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct BackendError {
    /// The executor's error text.
    message: String,
}

impl BackendError {
    /// Creates a backend error from the executor's message text.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the executor's error text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The external capability that performs the real fetch/transcode.
///
/// Implementations run the request to settlement; there is no abort path for
/// an in-flight call. An accepted limitation, not an oversight: cancellation
/// would need to be threaded through the external process boundary.
#[async_trait]
pub trait BackendExecutor: Send + Sync {
    /// Downloads `url` into the `destination` directory at the requested
    /// quality. Settles exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] carrying the executor's error text when the
    /// fetch fails for any reason, including an unusable destination.
    async fn download(
        &self,
        url: &str,
        destination: &Path,
        quality: QualityPreset,
    ) -> Result<(), BackendError>;
}

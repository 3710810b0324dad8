//! Backend executor backed by an external `yt-dlp` process.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{BackendError, BackendExecutor};
use crate::request::QualityPreset;

/// Maps a preset to a yt-dlp format selector, with fallbacks so a missing
/// exact format degrades instead of failing.
fn format_selector(quality: QualityPreset) -> &'static str {
    match quality {
        QualityPreset::Ultra => {
            "bestvideo[ext=mp4]+bestaudio[ext=m4a]/bestvideo+bestaudio/best[ext=mp4]/best"
        }
        QualityPreset::Hd => {
            "bestvideo[height<=720][ext=mp4]+bestaudio[ext=m4a]/bestvideo[height<=720]+bestaudio/best[height<=720][ext=mp4]/best[height<=720]"
        }
        QualityPreset::Sd => {
            "bestvideo[height<=480][ext=mp4]+bestaudio[ext=m4a]/bestvideo[height<=480]+bestaudio/best[height<=480][ext=mp4]/best[height<=480]"
        }
        QualityPreset::AudioOnly => "bestaudio[ext=m4a]/bestaudio/best",
    }
}

/// Runs `yt-dlp` as a child process and reports its outcome.
///
/// Output naming is owned by yt-dlp (`%(title)s.%(ext)s`); the executor does
/// not report the saved path back, so callers guess it (see
/// [`crate::history::HistoryEntry`]).
#[derive(Debug, Clone)]
pub struct YtDlpExecutor {
    binary: PathBuf,
}

impl YtDlpExecutor {
    /// Uses `yt-dlp` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
        }
    }

    /// Uses a specific yt-dlp binary.
    #[must_use]
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn build_args(url: &str, destination: &Path, quality: QualityPreset) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            format_selector(quality).to_string(),
            "-o".to_string(),
            format!("{}/%(title)s.%(ext)s", destination.display()),
            "--no-warnings".to_string(),
            "--newline".to_string(),
        ];
        if quality == QualityPreset::AudioOnly {
            args.push("--extract-audio".to_string());
            args.push("--audio-format".to_string());
            args.push("mp3".to_string());
        } else {
            args.push("--merge-output-format".to_string());
            args.push("mp4".to_string());
        }
        args.push(url.to_string());
        args
    }
}

impl Default for YtDlpExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackendExecutor for YtDlpExecutor {
    async fn download(
        &self,
        url: &str,
        destination: &Path,
        quality: QualityPreset,
    ) -> Result<(), BackendError> {
        let args = Self::build_args(url, destination, quality);
        debug!(binary = %self.binary.display(), ?args, "Spawning yt-dlp");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|err| {
                BackendError::new(format!(
                    "failed to launch {}: {err}. Make sure yt-dlp is installed and in PATH.",
                    self.binary.display()
                ))
            })?;

        if output.status.success() {
            info!(url, "yt-dlp finished");
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = stderr.trim();
        if message.is_empty() {
            return Err(BackendError::new(format!(
                "yt-dlp exited with {}",
                output.status
            )));
        }
        Err(BackendError::new(message))
    }
}

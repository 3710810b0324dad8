//! History entry type and its derivation rules.

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::request::QualityPreset;

/// Last id handed out, so entries created within the same millisecond still
/// get unique, ordered ids.
static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_entry_id(at: DateTime<Local>) -> String {
    let now_ms = at.timestamp_millis();
    let mut prev = LAST_ID.load(Ordering::SeqCst);
    loop {
        let next = now_ms.max(prev + 1);
        match LAST_ID.compare_exchange(prev, next, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => return next.to_string(),
            Err(actual) => prev = actual,
        }
    }
}

/// Extracts the `v` query parameter from a watch URL, falling back to the
/// literal `video` when the URL is unparseable or the parameter is absent.
fn video_label(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())
        })
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "video".to_string())
}

/// A single completed download, recorded at the success transition.
///
/// Field names on the wire (`id`, `title`, `time`, `quality`, `url`,
/// `filePath`) are the storage contract and must round-trip exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique, monotonically orderable id (millisecond epoch timestamp).
    pub id: String,
    /// Label derived from the request URL.
    #[serde(rename = "title")]
    pub label: String,
    /// Wall-clock time the download completed.
    #[serde(rename = "time")]
    pub completed_at: String,
    /// Quality preset the request was made with.
    pub quality: QualityPreset,
    /// The URL that was requested.
    #[serde(rename = "url")]
    pub source_url: String,
    /// Guessed path of the saved file.
    ///
    /// Best-effort only: the backend executor names files itself and does not
    /// report the result, so this will be wrong whenever its naming differs.
    #[serde(rename = "filePath")]
    pub resolved_file_path: String,
}

impl HistoryEntry {
    /// Derives the entry for a request that just succeeded.
    ///
    /// The filename is synthesized as `{label}_{ISO-date}.{ext}` under the
    /// effective destination, `mp3` for audio-only and `mp4` otherwise.
    #[must_use]
    pub fn for_success(
        url: &str,
        destination: &Path,
        quality: QualityPreset,
        completed_at: DateTime<Local>,
    ) -> Self {
        let label = video_label(url);
        let filename = format!(
            "{label}_{}.{}",
            completed_at.format("%Y-%m-%d"),
            quality.extension()
        );
        Self {
            id: next_entry_id(completed_at),
            label,
            completed_at: completed_at.format("%H:%M:%S").to_string(),
            quality,
            source_url: url.to_string(),
            resolved_file_path: destination.join(filename).display().to_string(),
        }
    }

    /// Returns true for audio-only entries.
    #[must_use]
    pub fn is_audio(&self) -> bool {
        self.quality == QualityPreset::AudioOnly
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.completed_at,
            self.quality.label(),
            self.label
        )
    }
}

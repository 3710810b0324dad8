//! On-disk history store: one JSON array, written atomically.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::{HistoryEntry, HistoryError};

/// Filename the collection is persisted under.
const HISTORY_FILE: &str = "history.json";

/// Counts per media kind over the whole collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryStats {
    /// Entries downloaded as video.
    pub videos: usize,
    /// Entries downloaded as audio only.
    pub audio: usize,
}

/// Returns the default location of the history file, under the platform data
/// directory with a current-directory fallback.
#[must_use]
pub fn default_history_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("tubedl").join(HISTORY_FILE))
        .unwrap_or_else(|| PathBuf::from(HISTORY_FILE))
}

/// Ordered collection of completed downloads, most-recent-first.
///
/// Growth is unbounded by default: display layers cap what they show, not
/// what is stored. An optional retention cap can bound the collection; the
/// append/list/order contracts hold unchanged below the cap.
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
    retention_cap: Option<usize>,
}

impl HistoryStore {
    /// Loads the collection from `path`.
    ///
    /// Missing or corrupt data yields an empty collection rather than an
    /// error; a corrupt file is logged and overwritten on the next save.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Vec<HistoryEntry>>(&bytes) {
                Ok(entries) => {
                    debug!(count = entries.len(), path = %path.display(), "History loaded");
                    entries
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "History file corrupt, starting empty");
                    Vec::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Vec::new(),
            Err(err) => {
                warn!(path = %path.display(), %err, "Could not read history, starting empty");
                Vec::new()
            }
        };
        Self {
            path,
            entries,
            retention_cap: None,
        }
    }

    /// Bounds the collection to the `cap` most recent entries.
    #[must_use]
    pub fn with_retention_cap(mut self, cap: usize) -> Self {
        self.retention_cap = Some(cap);
        self.entries.truncate(cap);
        self
    }

    /// Adds `entry` at the front (most-recent-first). No deduplication.
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        if let Some(cap) = self.retention_cap {
            self.entries.truncate(cap);
        }
    }

    /// Returns up to `limit` entries, order preserved; all of them when
    /// `limit` is `None`.
    #[must_use]
    pub fn list(&self, limit: Option<usize>) -> &[HistoryEntry] {
        let end = limit.unwrap_or(self.entries.len()).min(self.entries.len());
        &self.entries[..end]
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns video/audio counts over the whole collection.
    #[must_use]
    pub fn stats(&self) -> LibraryStats {
        let audio = self.entries.iter().filter(|entry| entry.is_audio()).count();
        LibraryStats {
            videos: self.entries.len() - audio,
            audio,
        }
    }

    /// Path the collection persists to.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the whole collection as one atomic unit: serialize to a
    /// temporary file next to the target, then rename over it.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError`] on serialization or I/O failure. The previous
    /// on-disk state stays intact when the write fails.
    pub fn save(&self) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(&self.entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, &bytes)?;
        if let Err(err) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(err.into());
        }
        debug!(count = self.entries.len(), path = %self.path.display(), "History saved");
        Ok(())
    }
}

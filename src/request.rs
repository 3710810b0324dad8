//! Download request types and quality preset definitions.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Target fidelity/format for a download request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityPreset {
    /// Best available video + audio (4K/1080p).
    #[serde(rename = "best")]
    Ultra,
    /// Capped at 720p.
    #[serde(rename = "720p")]
    Hd,
    /// Capped at 480p.
    #[serde(rename = "480p")]
    Sd,
    /// Audio track only, saved as mp3.
    #[serde(rename = "audio")]
    AudioOnly,
}

impl QualityPreset {
    /// Returns the storage/wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ultra => "best",
            Self::Hd => "720p",
            Self::Sd => "480p",
            Self::AudioOnly => "audio",
        }
    }

    /// Returns the short display label shown to users.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Ultra => "ULTRA",
            Self::Hd => "HD",
            Self::Sd => "SD",
            Self::AudioOnly => "MP3",
        }
    }

    /// Returns the file extension guessed for completed downloads.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::AudioOnly => "mp3",
            _ => "mp4",
        }
    }
}

impl fmt::Display for QualityPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for QualityPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "best" => Ok(Self::Ultra),
            "720p" => Ok(Self::Hd),
            "480p" => Ok(Self::Sd),
            "audio" => Ok(Self::AudioOnly),
            _ => Err(format!(
                "invalid quality preset: {s} (expected one of: best, 720p, 480p, audio)"
            )),
        }
    }
}

/// A single remote-video download request.
///
/// Immutable once submitted to the controller. The destination is optional:
/// `None` means "use the resolver default", read at submission time rather
/// than cached here.
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    /// The video URL to download. Trimmed at construction.
    pub url: String,
    /// Destination directory override, when the caller picked one.
    pub destination: Option<PathBuf>,
    /// Requested quality preset.
    pub quality: QualityPreset,
}

impl DownloadRequest {
    /// Creates a request for `url` with the given quality and no destination
    /// override.
    #[must_use]
    pub fn new(url: impl Into<String>, quality: QualityPreset) -> Self {
        Self {
            url: url.into().trim().to_string(),
            destination: None,
            quality,
        }
    }

    /// Sets a destination directory override.
    #[must_use]
    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }
}

impl fmt::Display for DownloadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DownloadRequest {{ url: {}, quality: {} }}", self.url, self.quality)
    }
}

//! Platform capabilities consumed by the orchestration core.
//!
//! The file manager and directory picker are external collaborators: the core
//! depends on the trait seams, and the shipped [`SystemFileManager`] shells
//! out to whatever the desktop provides. No dialog implementation ships here
//! (folder pickers belong to a UI layer).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Errors from launching platform helpers.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The helper process could not be started.
    #[error("failed to launch {command}: {source}")]
    Launch {
        /// The command that failed to start.
        command: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },
}

impl PlatformError {
    fn launch(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Launch {
            command: command.into(),
            source,
        }
    }
}

/// Reveal/open operations against the desktop file manager.
#[async_trait]
pub trait FileManager: Send + Sync {
    /// Reveals `path` selected inside its containing folder.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the file manager cannot be launched.
    async fn reveal(&self, path: &Path) -> Result<(), PlatformError>;

    /// Opens `path` as a folder, without selecting anything.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] when the file manager cannot be launched.
    async fn open_folder(&self, path: &Path) -> Result<(), PlatformError>;
}

/// Directory selection dialog, provided by a UI layer.
pub trait DirectoryPicker: Send + Sync {
    /// Asks the user to choose a directory, starting from `initial`.
    /// `None` means the dialog was dismissed.
    fn choose_directory(&self, initial: &Path) -> Option<PathBuf>;
}

/// File manager access through the platform's own launcher commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFileManager;

impl SystemFileManager {
    fn spawn_detached(command: &str, args: &[&std::ffi::OsStr]) -> Result<(), PlatformError> {
        Command::new(command)
            .args(args)
            .spawn()
            .map_err(|err| PlatformError::launch(command, err))?;
        Ok(())
    }
}

#[async_trait]
impl FileManager for SystemFileManager {
    async fn reveal(&self, path: &Path) -> Result<(), PlatformError> {
        debug!(path = %path.display(), "Revealing in file manager");

        #[cfg(target_os = "windows")]
        {
            use std::ffi::OsStr;
            return Self::spawn_detached("explorer", &[OsStr::new("/select,"), path.as_os_str()]);
        }

        #[cfg(target_os = "macos")]
        {
            use std::ffi::OsStr;
            return Self::spawn_detached("open", &[OsStr::new("-R"), path.as_os_str()]);
        }

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            // No select support; open the containing directory instead.
            let parent = path.parent().unwrap_or(path);
            Self::spawn_detached("xdg-open", &[parent.as_os_str()])
        }
    }

    async fn open_folder(&self, path: &Path) -> Result<(), PlatformError> {
        debug!(path = %path.display(), "Opening folder");

        #[cfg(target_os = "windows")]
        return Self::spawn_detached("explorer", &[path.as_os_str()]);

        #[cfg(target_os = "macos")]
        return Self::spawn_detached("open", &[path.as_os_str()]);

        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        Self::spawn_detached("xdg-open", &[path.as_os_str()])
    }
}

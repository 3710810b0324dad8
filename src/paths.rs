//! Destination directory resolution.

use std::path::{Path, PathBuf};

use tracing::warn;

/// Subdirectory of the home directory used when no override is given.
const DEFAULT_SUBDIR: &str = "Videos";

/// Resolves the destination directory for saved files.
///
/// No existence or writability check happens here: the backend executor is
/// the one touching the filesystem and surfaces destination errors, which the
/// controller forwards as a failed request.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    home: Option<PathBuf>,
}

impl PathResolver {
    /// Resolver backed by the process's home directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver with a fixed home directory instead of the process's own.
    #[must_use]
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: Some(home.into()),
        }
    }

    /// Returns `override_path` verbatim when provided and well-formed
    /// (non-empty), else the home directory joined with `Videos`.
    #[must_use]
    pub fn resolve(&self, override_path: Option<&Path>) -> PathBuf {
        if let Some(path) = override_path
            && !path.as_os_str().is_empty()
        {
            return path.to_path_buf();
        }
        self.home_dir().join(DEFAULT_SUBDIR)
    }

    fn home_dir(&self) -> PathBuf {
        if let Some(home) = &self.home {
            return home.clone();
        }
        dirs::home_dir().unwrap_or_else(|| {
            warn!("Could not resolve home directory, falling back to current directory");
            PathBuf::from(".")
        })
    }
}

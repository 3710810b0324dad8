//! Error types for the download lifecycle controller.

use thiserror::Error;

use crate::executor::BackendError;

/// Errors surfaced by controller operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Malformed or empty request, rejected before any side effect. Never
    /// reaches the failed phase.
    #[error("invalid request: {reason}")]
    Validation {
        /// What was wrong with the request.
        reason: String,
    },

    /// A request is already in flight; the single-slot guard refused this
    /// one before any side effect.
    #[error("a download is already in progress")]
    Concurrency,

    /// The backend executor settled with an error. This becomes the failed
    /// terminal state; the message is the executor's text, unmodified.
    #[error("{0}")]
    Backend(#[from] BackendError),

    /// A post-success convenience action (reveal in file manager) failed,
    /// including its open-folder fallback. Non-fatal: the committed history
    /// entry and the controller phase are unaffected.
    #[error("could not reveal download: {message}")]
    SideEffect {
        /// Description of the failed action.
        message: String,
    },
}

impl ControllerError {
    /// Creates a validation error.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Creates a side-effect error.
    pub fn side_effect(message: impl Into<String>) -> Self {
        Self::SideEffect {
            message: message.into(),
        }
    }

    /// Returns true for pre-side-effect rejections (validation/concurrency).
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Concurrency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ControllerError::validation("url is empty");
        let msg = err.to_string();
        assert!(msg.contains("invalid request"), "got: {msg}");
        assert!(msg.contains("url is empty"), "got: {msg}");
        assert!(err.is_rejection());
    }

    #[test]
    fn test_concurrency_error_display() {
        let err = ControllerError::Concurrency;
        assert!(err.to_string().contains("already in progress"));
        assert!(err.is_rejection());
    }

    #[test]
    fn test_backend_error_passes_message_through_unmodified() {
        let err = ControllerError::Backend(BackendError::new("network unreachable"));
        assert_eq!(err.to_string(), "network unreachable");
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_side_effect_error_display() {
        let err = ControllerError::side_effect("explorer not found");
        let msg = err.to_string();
        assert!(msg.contains("could not reveal"), "got: {msg}");
        assert!(msg.contains("explorer not found"), "got: {msg}");
    }
}

//! Error types for the confirmation engine.

/// Errors surfaced to callers of `confirm` and the distribution context.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfirmError {
    #[error("Confirmation already pending")]
    AlreadyPending,
    #[error("Confirmation queue is full ({0} waiting)")]
    QueueFull(usize),
    #[error("No orchestrator available: install one before requesting confirmation")]
    NoOrchestrator,
    #[error("An orchestrator is already installed")]
    AlreadyInstalled,
    #[error("Orchestrator dropped before the confirmation settled")]
    Dropped,
}

/// Failure reported by a confirm action.
///
/// Never propagated to the `confirm` caller; it becomes the dialog's error
/// message and the user may retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("{0}")]
    Failed(String),
    #[error("An error occurred")]
    Unspecified,
}

impl ActionError {
    /// Wrap any error as an action failure, keeping its display text.
    pub fn from_error<E: std::error::Error>(err: E) -> Self {
        ActionError::Failed(err.to_string())
    }

    /// Message to show in the dialog, or `None` when the failure carries none.
    pub fn message(&self) -> Option<&str> {
        match self {
            ActionError::Failed(msg) if !msg.trim().is_empty() => Some(msg),
            _ => None,
        }
    }
}

impl From<String> for ActionError {
    fn from(msg: String) -> Self {
        ActionError::Failed(msg)
    }
}

impl From<&str> for ActionError {
    fn from(msg: &str) -> Self {
        ActionError::Failed(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_error_display() {
        assert_eq!(
            ConfirmError::AlreadyPending.to_string(),
            "Confirmation already pending"
        );
        assert_eq!(
            ConfirmError::QueueFull(4).to_string(),
            "Confirmation queue is full (4 waiting)"
        );
        assert!(ConfirmError::NoOrchestrator
            .to_string()
            .starts_with("No orchestrator available"));
        assert_eq!(
            ConfirmError::Dropped.to_string(),
            "Orchestrator dropped before the confirmation settled"
        );
    }

    #[test]
    fn test_action_error_message() {
        assert_eq!(ActionError::from("boom").message(), Some("boom"));
        assert_eq!(ActionError::Failed("   ".to_string()).message(), None);
        assert_eq!(ActionError::Unspecified.message(), None);
        assert_eq!(ActionError::Unspecified.to_string(), "An error occurred");
    }

    #[test]
    fn test_action_error_from_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = ActionError::from_error(io_err);
        assert_eq!(err.message(), Some("read-only"));
    }
}

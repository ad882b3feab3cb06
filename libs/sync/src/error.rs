//! Error taxonomy for eventboard operations.

use std::time::Duration;

use eventboard_id::{EventId, IdError};
use eventboard_model::ModelError;
use thiserror::Error;

/// Errors returned by the eventboard components.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("not authenticated")]
    NotAuthenticated,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error(transparent)]
    Model(#[from] ModelError),

    /// The backend handed out an identifier that cannot be used.
    #[error("malformed identifier: {0}")]
    Id(#[from] IdError),

    #[error("invalid bearer token")]
    InvalidToken,

    /// A newer request has already been applied.
    #[error("response #{seq} superseded by #{latest}")]
    Stale { seq: u64, latest: u64 },

    #[error("a subscription change for event {0} is already in flight")]
    ToggleInFlight(EventId),

    #[error("event {0} is not in the current listing")]
    UnknownEvent(EventId),
}

/// Coarse classification used to decide how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Network or server failure, including responses of an unknown shape.
    Transport,
    /// Input rejected before any request was sent.
    Validation,
    /// Superseded by a newer request; dropped silently.
    Stale,
    /// Rejected because a conflicting operation is in flight.
    Busy,
}

impl SyncError {
    /// Create an API error from response details.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            SyncError::NotAuthenticated
            | SyncError::Api { .. }
            | SyncError::Network(_)
            | SyncError::Timeout { .. } => FailureKind::Transport,
            SyncError::Model(err) if err.is_validation() => FailureKind::Validation,
            SyncError::Model(_) | SyncError::Id(_) => FailureKind::Transport,
            SyncError::InvalidToken | SyncError::UnknownEvent(_) => FailureKind::Validation,
            SyncError::Stale { .. } => FailureKind::Stale,
            SyncError::ToggleInFlight(_) => FailureKind::Busy,
        }
    }

    /// Returns true if the error should be dropped without telling the user.
    pub fn is_stale(&self) -> bool {
        self.kind() == FailureKind::Stale
    }
}

/// Result type alias for eventboard operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn event(raw: &str) -> EventId {
        EventId::parse(raw).unwrap()
    }

    #[rstest]
    #[case(SyncError::NotAuthenticated, FailureKind::Transport)]
    #[case(SyncError::api(404, "Event not found"), FailureKind::Transport)]
    #[case(SyncError::Timeout { operation: "list events", timeout: Duration::from_secs(10) }, FailureKind::Transport)]
    #[case(SyncError::from(EventId::parse("a/b").unwrap_err()), FailureKind::Transport)]
    #[case(SyncError::InvalidToken, FailureKind::Validation)]
    #[case(SyncError::UnknownEvent(event("e9")), FailureKind::Validation)]
    #[case(SyncError::ToggleInFlight(event("e1")), FailureKind::Busy)]
    fn test_kind(#[case] err: SyncError, #[case] expected: FailureKind) {
        assert_eq!(err.kind(), expected);
    }

    #[test]
    fn test_ambiguous_shape_is_transport() {
        let err = SyncError::from(ModelError::AmbiguousShape("mixed".to_string()));
        assert_eq!(err.kind(), FailureKind::Transport);
    }

    #[test]
    fn test_missing_field_is_validation() {
        let err = SyncError::from(ModelError::MissingField { field: "title" });
        assert_eq!(err.kind(), FailureKind::Validation);
        assert_eq!(err.to_string(), "title is required");
    }

    #[test]
    fn test_stale_is_silent() {
        let err = SyncError::Stale { seq: 1, latest: 2 };
        assert!(err.is_stale());
        assert!(!SyncError::api(500, "boom").is_stale());
    }
}

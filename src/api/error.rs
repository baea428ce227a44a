//! Error types for the backend client.

use thiserror::Error;

/// A remote call that could not be completed.
///
/// Covers unreachable endpoints, non-success HTTP statuses, XML-RPC faults and
/// responses whose shape does not match what the operation expects.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// A response that decoded fine but is not what the caller expected.
    pub fn malformed(expected: &str) -> Self {
        Self::new(format!("Unexpected response from server: expected {expected}"))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors reported by [`AttendanceClient`](super::AttendanceClient).
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend address is not `http(s)://host` or ends with a slash.
    #[error("Invalid URL: \"{0}\" (expected http(s)://host without a trailing slash)")]
    Validation(String),

    /// A remote call failed; `operation` names the step that was running.
    #[error("{operation} failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: TransportError,
    },

    /// The session user does not map to exactly one employee.
    #[error("None or multiple employee ID(s) found for user {uid} ({found} records)")]
    AmbiguousResult { uid: i32, found: usize },

    /// The requested reason is not part of the current catalog.
    #[error("Unknown reason ID: {0}")]
    UnknownReason(i32),

    /// The backend reported an attendance state this client does not know.
    #[error("Unexpected attendance state: \"{0}\"")]
    UnexpectedState(String),
}

impl ApiError {
    pub(crate) fn transport(operation: &'static str, source: TransportError) -> Self {
        Self::Transport { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_names_operation() {
        let err = ApiError::transport("check in", TransportError::new("connection refused"));
        assert_eq!(err.to_string(), "check in failed: connection refused");
    }

    #[test]
    fn test_unknown_reason_names_id() {
        assert_eq!(ApiError::UnknownReason(99).to_string(), "Unknown reason ID: 99");
    }

    #[test]
    fn test_malformed_message() {
        let err = TransportError::malformed("a list of records");
        assert!(err.message().contains("a list of records"));
    }
}

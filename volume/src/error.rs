use std::fmt;

use thiserror::Error;

/// Which request a source failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    /// The one-shot historical fetch.
    Initial,
    /// A steady-state live-update poll.
    Live,
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestType::Initial => f.write_str("initial"),
            RequestType::Live => f.write_str("live"),
        }
    }
}

/// A failure reported by the event source's error channel.
#[derive(Debug, Clone, Error)]
#[error("{request_type} request failed: {message}")]
pub struct SourceError {
    pub message: String,
    /// Criticality as flagged by the source itself, if it flagged it at all.
    pub critical: Option<bool>,
    pub request_type: RequestType,
}

impl SourceError {
    pub fn new(message: impl Into<String>, request_type: RequestType) -> Self {
        SourceError {
            message: message.into(),
            critical: None,
            request_type,
        }
    }

    pub fn with_critical(mut self, critical: bool) -> Self {
        self.critical = Some(critical);
        self
    }

    /// Unflagged failures are always critical; flagged ones only matter for the
    /// initial load.
    pub fn is_critical(&self) -> bool {
        match self.critical {
            None => true,
            Some(critical) => critical && self.request_type == RequestType::Initial,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("ledger has no buckets")]
    Empty,
    #[error("bucket {index} starts at {found}, expected {expected}")]
    InvariantViolation {
        index: usize,
        expected: i64,
        found: i64,
    },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Unable to retrieve data, target URL is not specified.")]
    MissingTarget,
    #[error("initial fetch failed: {0}")]
    InitialFetch(#[source] SourceError),
    #[error("aggregation halted: {0}")]
    Invariant(#[from] LedgerError),
    #[error("session has been torn down")]
    TornDown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unflagged_failures_are_critical() {
        assert!(SourceError::new("boom", RequestType::Live).is_critical());
        assert!(SourceError::new("boom", RequestType::Initial).is_critical());
    }

    #[test]
    fn flagged_failures_only_critical_on_initial_load() {
        let initial = SourceError::new("boom", RequestType::Initial);
        let live = SourceError::new("boom", RequestType::Live);
        assert!(initial.clone().with_critical(true).is_critical());
        assert!(!live.clone().with_critical(true).is_critical());
        assert!(!initial.with_critical(false).is_critical());
        assert!(!live.with_critical(false).is_critical());
    }

    #[test]
    fn source_error_message_names_request() {
        let err = SourceError::new("timed out", RequestType::Live);
        assert_eq!(err.to_string(), "live request failed: timed out");
    }
}

//! Submission flow types
//!
//! The submission coordinator itself lives in [`crate::engine`], where the
//! guard runs synchronously against the store's status before any request
//! is issued. This module defines the mode a submission was initiated
//! with, the errors the host reports back, and the messages the UI
//! receives about the flow.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a submission was initiated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmitMode {
    /// The student confirmed submission on the summary dialog
    Manual,
    /// The deadline expired; confirmation is skipped
    Forced,
}

impl SubmitMode {
    /// Whether this submission was deadline-forced
    pub fn is_forced(self) -> bool {
        matches!(self, Self::Forced)
    }
}

/// Errors the host reports for a finished submit request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The request never reached the backend or timed out
    #[error("network failure during submission: {0}")]
    Network(String),
    /// The backend refused the submission
    #[error("submission rejected: {0}")]
    Rejected(String),
    /// The backend already holds a submission for this attempt
    ///
    /// Transport-level retries can resend a submit request; the backend
    /// answers the duplicate with this, and the engine treats it as
    /// success.
    #[error("attempt was already submitted")]
    AlreadySubmitted,
}

/// Submission updates sent to the host UI
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// A submission was accepted and its request is in flight
    Submitting,
    /// The attempt is submitted; the host should navigate away
    Submitted,
    /// The submission failed; the student may retry
    SubmitFailed {
        /// Human-readable failure detail
        detail: String,
        /// Whether the failed submission was deadline-forced
        forced: bool,
    },
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_mode_forced_flag() {
        assert!(SubmitMode::Forced.is_forced());
        assert!(!SubmitMode::Manual.is_forced());
    }

    #[test]
    fn test_error_display() {
        let error = SubmitError::Network("connection reset".to_string());
        assert_eq!(
            error.to_string(),
            "network failure during submission: connection reset"
        );
    }
}

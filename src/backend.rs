//! Persistence collaborator
//!
//! This module defines the trait through which the engine reaches the
//! platform backend. The abstraction keeps the engine free of transport
//! concerns; implementations typically wrap an async HTTP client and spawn
//! the request, reporting completions back through the engine's
//! `submit_resolved`, `saves_settled`, and `save_failed` entry points.
//! Request timeouts belong to the transport, not to this interface.

use thiserror::Error;

use crate::{
    attempt_id::AttemptId,
    exam::{question::QuestionId, response::Response},
};

/// Errors from the attempt fetch
///
/// The fetch happens in the host before a session exists, so these errors
/// never pass through the engine; they are typed here so hosts surface
/// them uniformly. Both are fatal to session initialization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No attempt exists for the requested id
    #[error("attempt not found")]
    NotFound,
    /// The request never completed
    #[error("network failure while loading attempt: {0}")]
    Network(String),
}

/// Trait for persisting attempt state to the platform backend
///
/// All three operations are idempotent upserts keyed per attempt (and per
/// question where applicable), and all are fire-and-forget from the
/// engine's perspective: the engine never awaits them and never consumes a
/// return value through this trait.
pub trait Backend {
    /// Upserts one question's current response
    ///
    /// Failures are the host's to log; the engine neither retries nor
    /// blocks on them. The next edit's debounce cycle naturally
    /// re-persists the question's current value.
    fn save_answer(&self, attempt_id: AttemptId, question_id: &QuestionId, response: &Response);

    /// Persists a review-mark toggle
    ///
    /// Marking is infrequent, so these calls bypass the autosave debounce
    /// and are issued one per toggle.
    fn mark_for_review(&self, attempt_id: AttemptId, question_id: &QuestionId, marked: bool);

    /// Finalizes the attempt server-side
    ///
    /// The engine's coordinator guard prevents issuing this twice, and the
    /// backend tolerates a transport-level duplicate by answering
    /// [`crate::submit::SubmitError::AlreadySubmitted`]. The host reports
    /// the outcome through [`crate::engine::Engine::submit_resolved`].
    fn submit_attempt(&self, attempt_id: AttemptId);
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(FetchError::NotFound.to_string(), "attempt not found");
        assert_eq!(
            FetchError::Network("timeout".to_string()).to_string(),
            "network failure while loading attempt: timeout"
        );
    }
}

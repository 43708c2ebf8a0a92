//! Polymorphic answer values
//!
//! A [`Response`] is the student's current answer to one question. The
//! variant is implied by the owning question's kind rather than stored
//! redundantly next to it; [`crate::exam::question::Question::accepts`]
//! performs that resolution.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::question::OptionId;

/// The student's answer to a single question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    /// A single selected option (single choice, assertion-reason)
    OptionId(OptionId),
    /// A set of selected options (multiple choice)
    OptionIdSet(HashSet<OptionId>),
    /// Typed text (free text and numeric entry)
    Text(String),
}

impl Response {
    /// Whether this response counts as unanswered
    ///
    /// An empty option set and blank text are both unanswered; a selected
    /// option id never is.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::OptionId(_) => false,
            Self::OptionIdSet(ids) => ids.is_empty(),
            Self::Text(text) => text.trim().is_empty(),
        }
    }
}

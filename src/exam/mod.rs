//! Exam data model consumed by the session engine
//!
//! This module defines the shapes the engine receives from the backend when
//! an attempt is fetched: ordered sections, a question map, previously
//! persisted answers, and the attempt metadata the deadline is derived
//! from. None of these carry behavior beyond emptiness and shape checks;
//! the session logic lives in [`crate::store`] and [`crate::engine`].

pub mod media;
pub mod question;
pub mod response;

use std::time::Duration;

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use web_time::SystemTime;

use crate::attempt_id::AttemptId;

use question::{OptionId, Question, QuestionId, QuestionKind};
use response::Response;

/// One titled group of questions, presented in exam order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Section {
    /// Backend-assigned section identifier
    #[garde(skip)]
    pub id: String,
    /// Section title shown in the section tabs
    #[garde(length(chars, max = crate::constants::exam::MAX_TITLE_LENGTH))]
    pub title: String,
    /// Ordered question ids; fixed after load
    #[garde(length(min = 1))]
    pub questions: Vec<QuestionId>,
}

/// Wire shape of a previously persisted answer
///
/// The backend stores one record per question with whichever value fields
/// apply; [`SavedAnswer::to_response`] resolves the record into a typed
/// [`Response`] using the owning question's kind.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedAnswer {
    /// Question this record belongs to
    pub question_id: QuestionId,
    /// Selected option, for single-selection kinds
    pub option_id: Option<OptionId>,
    /// Selected options, for multiple choice
    #[serde(default)]
    pub option_ids: Vec<OptionId>,
    /// Typed text, for numeric and free text kinds
    pub text: Option<String>,
    /// Whether the student had marked the question for review
    #[serde(default)]
    pub reviewed: bool,
}

impl SavedAnswer {
    /// Resolves this record into a typed response for a question kind
    ///
    /// Returns `None` when the record carries no value for the kind, when
    /// the carried value is empty (which counts as unanswered), or when the
    /// kind accepts no responses at all.
    pub fn to_response(&self, kind: QuestionKind) -> Option<Response> {
        let response = match kind {
            QuestionKind::SingleChoice | QuestionKind::AssertionReason => {
                Response::OptionId(self.option_id.clone()?)
            }
            QuestionKind::MultiChoice => {
                Response::OptionIdSet(self.option_ids.iter().cloned().collect())
            }
            QuestionKind::Numeric | QuestionKind::FreeText => Response::Text(self.text.clone()?),
            QuestionKind::Unsupported => return None,
        };
        (!response.is_empty()).then_some(response)
    }
}

/// Everything the attempt fetch returns
///
/// This is the seed of a session: exam metadata, the ordered sections, the
/// question map source, and any answers persisted by an earlier device or
/// a previous visit to the screen.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AttemptPayload {
    /// Identifier of the attempt, immutable for the session
    #[garde(skip)]
    pub attempt_id: AttemptId,
    /// Exam title shown in the screen header
    #[garde(length(chars, max = crate::constants::exam::MAX_TITLE_LENGTH))]
    pub title: String,
    /// Total allotted time in minutes
    #[garde(range(min = 1, max = crate::constants::exam::MAX_DURATION_MINS))]
    pub duration_mins: u64,
    /// When the attempt clock started; absent means it starts at load
    #[garde(skip)]
    pub started_at: Option<SystemTime>,
    /// Ordered sections in exam order
    #[garde(length(min = 1, max = crate::constants::exam::MAX_SECTION_COUNT), dive)]
    pub sections: Vec<Section>,
    /// All questions referenced by the sections
    #[garde(length(min = 1, max = crate::constants::exam::MAX_QUESTION_COUNT), dive)]
    pub questions: Vec<Question>,
    /// Previously persisted answers and review marks
    #[garde(skip)]
    #[serde(default)]
    pub saved: Vec<SavedAnswer>,
}

impl AttemptPayload {
    /// Total allotted time derived from the exam metadata
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_mins * 60)
    }
}

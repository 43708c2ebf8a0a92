//! Question data shapes
//!
//! Questions are immutable for the lifetime of a session. The engine never
//! inspects question content beyond its kind; rendering the form for each
//! kind belongs to the UI layer.

use std::fmt::Display;

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use super::{media::Diagram, response::Response};

/// Opaque backend-assigned identifier of a question
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for QuestionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque backend-assigned identifier of an answer option
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct OptionId(String);

impl OptionId {
    /// Returns the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OptionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for OptionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for OptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The kind of a question, which implies the shape of its response
///
/// `Unsupported` covers kinds introduced by newer exam papers that this
/// client version cannot render; such questions stay navigable and markable
/// but accept no response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionKind {
    /// Exactly one option is selected
    SingleChoice,
    /// Any subset of options is selected
    MultiChoice,
    /// An assertion and a reason, answered by selecting one option
    AssertionReason,
    /// A numeric value typed by the student
    Numeric,
    /// Free-form text typed by the student
    FreeText,
    /// A kind unknown to this client version
    Unsupported,
}

impl QuestionKind {
    /// Whether a response variant matches the shape this kind implies
    pub fn accepts(self, response: &Response) -> bool {
        matches!(
            (self, response),
            (Self::SingleChoice | Self::AssertionReason, Response::OptionId(_))
                | (Self::MultiChoice, Response::OptionIdSet(_))
                | (Self::Numeric | Self::FreeText, Response::Text(_))
        )
    }
}

/// One selectable option of a choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct AnswerOption {
    /// Identifier referenced by responses
    #[garde(skip)]
    pub id: OptionId,
    /// Display text of the option
    #[garde(length(chars, max = crate::constants::question::MAX_OPTION_TEXT_LENGTH))]
    pub text: String,
}

/// A single question of the exam, immutable for the session
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Question {
    /// Identifier referenced by sections, answers, and review marks
    #[garde(skip)]
    pub id: QuestionId,
    /// The kind of question, implying the response shape
    #[garde(skip)]
    pub kind: QuestionKind,
    /// The question text shown to the student
    #[garde(length(chars, max = crate::constants::question::MAX_TEXT_LENGTH))]
    pub text: String,
    /// Options for choice kinds; empty for typed kinds
    #[garde(length(max = crate::constants::question::MAX_OPTION_COUNT), dive)]
    #[serde(default)]
    pub options: Vec<AnswerOption>,
    /// Optional reference to an accompanying figure
    #[garde(dive)]
    pub diagram: Option<Diagram>,
}

impl Question {
    /// Whether a response matches the shape implied by this question's kind
    pub fn accepts(&self, response: &Response) -> bool {
        self.kind.accepts(response)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn option(id: &str, text: &str) -> AnswerOption {
        AnswerOption {
            id: OptionId::from(id),
            text: text.to_string(),
        }
    }

    fn question(kind: QuestionKind) -> Question {
        Question {
            id: QuestionId::from("q1"),
            kind,
            text: "What is the SI unit of force?".to_string(),
            options: vec![option("A", "Joule"), option("B", "Newton")],
            diagram: None,
        }
    }

    #[test]
    fn test_single_choice_accepts_option_id() {
        let q = question(QuestionKind::SingleChoice);
        assert!(q.accepts(&Response::OptionId(OptionId::from("B"))));
        assert!(!q.accepts(&Response::Text("Newton".to_string())));
        assert!(!q.accepts(&Response::OptionIdSet(HashSet::new())));
    }

    #[test]
    fn test_assertion_reason_accepts_option_id() {
        let q = question(QuestionKind::AssertionReason);
        assert!(q.accepts(&Response::OptionId(OptionId::from("A"))));
        assert!(!q.accepts(&Response::OptionIdSet(HashSet::new())));
    }

    #[test]
    fn test_multi_choice_accepts_option_id_set() {
        let q = question(QuestionKind::MultiChoice);
        assert!(q.accepts(&Response::OptionIdSet(HashSet::from([OptionId::from("A")]))));
        assert!(!q.accepts(&Response::OptionId(OptionId::from("A"))));
    }

    #[test]
    fn test_typed_kinds_accept_text() {
        assert!(question(QuestionKind::Numeric).accepts(&Response::Text("9.8".to_string())));
        assert!(question(QuestionKind::FreeText).accepts(&Response::Text("because".to_string())));
        assert!(!question(QuestionKind::Numeric).accepts(&Response::OptionId(OptionId::from("A"))));
    }

    #[test]
    fn test_unsupported_accepts_nothing() {
        let q = question(QuestionKind::Unsupported);
        assert!(!q.accepts(&Response::OptionId(OptionId::from("A"))));
        assert!(!q.accepts(&Response::OptionIdSet(HashSet::new())));
        assert!(!q.accepts(&Response::Text("anything".to_string())));
    }

    #[test]
    fn test_question_validation() {
        assert!(question(QuestionKind::SingleChoice).validate().is_ok());
    }

    #[test]
    fn test_id_display_matches_as_str() {
        let id = QuestionId::from("q17");
        assert_eq!(id.to_string(), id.as_str());
        let option_id = OptionId::from(String::from("B"));
        assert_eq!(option_id.to_string(), option_id.as_str());
    }

    #[test]
    fn test_question_text_too_long() {
        let mut q = question(QuestionKind::SingleChoice);
        q.text = "a".repeat(crate::constants::question::MAX_TEXT_LENGTH + 1);
        assert!(q.validate().is_err());
    }

    #[test]
    fn test_question_too_many_options() {
        let mut q = question(QuestionKind::SingleChoice);
        q.options =
            vec![option("A", "opt"); crate::constants::question::MAX_OPTION_COUNT + 1];
        assert!(q.validate().is_err());
    }
}

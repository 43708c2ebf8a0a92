//! In-memory session state for one attempt
//!
//! This module contains the single source of truth for a running attempt:
//! the answers, review marks, navigation cursor, and lifecycle status. One
//! screen instance owns exactly one [`AttemptSession`]; it is seeded from
//! the fetched payload, mutated synchronously by user events, and torn
//! down when the student navigates away after submission.

use std::{
    collections::{HashMap, HashSet},
    fmt::Debug,
    time::Duration,
};

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::SystemTime;

use crate::{
    attempt_id::AttemptId,
    exam::{
        question::{Question, QuestionId},
        response::Response,
        AttemptPayload, Section,
    },
    navigation::{self, Cursor},
};

/// Lifecycle status of an attempt session
///
/// The session starts `Active` and only ever moves forward: once
/// `Submitting` is entered no path leads back except an explicit
/// submission failure, which restores whichever editable status preceded
/// it. `Submitted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// The student is answering
    Active,
    /// The deadline passed before a submission was accepted
    Expired,
    /// A submission was accepted and its request may be in flight
    Submitting {
        /// Status to restore if the submission fails
        was_expired: bool,
    },
    /// The attempt is finalized; terminal
    Submitted,
}

impl Status {
    /// Whether answer and review-mark edits are currently accepted
    pub fn accepts_edits(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether a submission has been accepted and not yet resolved
    pub fn is_submitting(self) -> bool {
        matches!(self, Self::Submitting { .. })
    }

    /// Whether the session has reached its terminal state
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Submitted)
    }
}

/// Counts shown on the submission summary dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptStats {
    /// Questions with a non-empty response
    pub answered: usize,
    /// Questions without one; `answered + unanswered` equals the total
    pub unanswered: usize,
    /// Questions marked for review
    pub marked: usize,
}

/// Palette state of one question, in exam order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteEntry {
    /// The question this entry describes
    pub question_id: QuestionId,
    /// Whether the question holds a non-empty response
    pub answered: bool,
    /// Whether the question is marked for review
    pub marked: bool,
}

/// Fatal errors while seeding a session from the fetched payload
///
/// The caller must treat any of these as fatal for the session: the screen
/// never reaches the active state and neither autosave nor submission may
/// be attempted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The payload failed structural validation
    #[error("attempt payload failed validation: {0}")]
    Invalid(String),
    /// A section references a question missing from the question list
    #[error("section {section} references unknown question {question}")]
    UnknownQuestion {
        /// Id of the offending section
        section: String,
        /// The unresolvable question id
        question: QuestionId,
    },
}

/// Single source of truth for in-memory attempt state
///
/// All mutations are synchronous and complete atomically with respect to
/// other events on the host's single-threaded event loop; no locking is
/// involved anywhere in the engine.
#[serde_with::serde_as]
#[derive(Serialize, Deserialize)]
pub struct AttemptSession {
    /// Identifier of the attempt, immutable for the session
    attempt_id: AttemptId,
    /// Exam title for the screen header
    title: String,
    /// Total allotted time, derived once from exam metadata
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    duration: Duration,
    /// Absolute deadline; remaining time is always derived from this
    deadline_at: SystemTime,
    /// Ordered sections in exam order, immutable after load
    sections: Vec<Section>,
    /// Question lookup, immutable after load
    questions_by_id: HashMap<QuestionId, Question>,
    /// Current responses by question id
    answers: HashMap<QuestionId, Response>,
    /// Questions the student flagged to revisit
    marked_for_review: HashSet<QuestionId>,
    /// Position of the visible question
    cursor: Cursor,
    /// Lifecycle status
    status: Status,
    /// Statistics frozen at the moment a submission was accepted
    #[serde(skip)]
    final_stats: once_cell_serde::sync::OnceCell<AttemptStats>,
}

impl Debug for AttemptSession {
    /// Custom debug implementation that avoids printing the question map
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttemptSession")
            .field("attempt_id", &self.attempt_id)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl AttemptSession {
    /// Seeds a session from the fetched attempt payload
    ///
    /// Validates the payload, computes the deadline (`started_at` plus the
    /// allotted time, with an absent `started_at` meaning the clock starts
    /// at `now`), and reconstructs answers and review marks from the
    /// previously persisted records. Saved records for unknown questions
    /// are skipped so the store never references ids outside the question
    /// map.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the payload is malformed; the caller
    /// must treat this as fatal for the session.
    pub fn initialize(payload: AttemptPayload, now: SystemTime) -> Result<Self, LoadError> {
        garde::Validate::validate(&payload).map_err(|report| LoadError::Invalid(report.to_string()))?;

        let duration = payload.duration();
        let AttemptPayload {
            attempt_id,
            title,
            started_at,
            sections,
            questions,
            saved,
            ..
        } = payload;

        let questions_by_id: HashMap<QuestionId, Question> = questions
            .into_iter()
            .map(|question| (question.id.clone(), question))
            .collect();

        for section in &sections {
            for question_id in &section.questions {
                if !questions_by_id.contains_key(question_id) {
                    return Err(LoadError::UnknownQuestion {
                        section: section.id.clone(),
                        question: question_id.clone(),
                    });
                }
            }
        }

        let deadline_at = started_at.unwrap_or(now) + duration;

        let mut answers = HashMap::new();
        let mut marked_for_review = HashSet::new();
        for record in &saved {
            let Some(question) = questions_by_id.get(&record.question_id) else {
                continue;
            };
            if let Some(response) = record.to_response(question.kind) {
                answers.insert(record.question_id.clone(), response);
            }
            if record.reviewed {
                marked_for_review.insert(record.question_id.clone());
            }
        }

        Ok(Self {
            attempt_id,
            title,
            duration,
            deadline_at,
            sections,
            questions_by_id,
            answers,
            marked_for_review,
            cursor: Cursor::default(),
            status: Status::Active,
            final_stats: once_cell_serde::sync::OnceCell::new(),
        })
    }

    /// Identifier of the attempt
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    /// Exam title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Total allotted time
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Absolute deadline of the attempt
    pub fn deadline_at(&self) -> SystemTime {
        self.deadline_at
    }

    /// Ordered sections in exam order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Looks up a question by id
    pub fn question(&self, question_id: &QuestionId) -> Option<&Question> {
        self.questions_by_id.get(question_id)
    }

    /// The question under the cursor
    pub fn current_question(&self) -> Option<&Question> {
        self.sections
            .get(self.cursor.section)
            .and_then(|section| section.questions.get(self.cursor.question))
            .and_then(|question_id| self.question(question_id))
    }

    /// Current cursor position
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Current lifecycle status
    pub fn status(&self) -> Status {
        self.status
    }

    /// The stored response for a question, if any
    pub fn answer(&self, question_id: &QuestionId) -> Option<&Response> {
        self.answers.get(question_id)
    }

    /// Whether a question is marked for review
    pub fn is_marked(&self, question_id: &QuestionId) -> bool {
        self.marked_for_review.contains(question_id)
    }

    /// Total question count across all sections
    pub fn total_questions(&self) -> usize {
        navigation::total_questions(&self.sections)
    }

    /// Upserts the response for a question
    ///
    /// Returns `true` when the edit was recorded, which is the caller's
    /// signal to arm the autosave debounce. Edits are silently ignored
    /// when the session no longer accepts them, when the question id is
    /// unknown, when the response shape does not match the question's
    /// kind, or when typed text exceeds the platform bound; none of these
    /// can corrupt the store.
    pub fn set_answer(&mut self, question_id: &QuestionId, response: Response) -> bool {
        if !self.status.accepts_edits() {
            return false;
        }
        let Some(question) = self.questions_by_id.get(question_id) else {
            tracing::debug!(question = %question_id, "ignoring edit for unknown question");
            return false;
        };
        if !question.accepts(&response) {
            tracing::debug!(question = %question_id, "ignoring response of mismatched shape");
            return false;
        }
        if let Response::Text(text) = &response {
            if text.chars().count() > crate::constants::free_text::MAX_LENGTH {
                tracing::debug!(question = %question_id, "ignoring oversized text response");
                return false;
            }
        }
        self.answers.insert(question_id.clone(), response);
        true
    }

    /// Flips a question's membership in the review set
    ///
    /// Returns the new marked state, or `None` when the toggle was ignored
    /// (unknown question or a session that no longer accepts edits). The
    /// caller persists the returned state immediately; marking is not
    /// debounced.
    pub fn toggle_review(&mut self, question_id: &QuestionId) -> Option<bool> {
        if !self.status.accepts_edits() || !self.questions_by_id.contains_key(question_id) {
            return None;
        }
        if self.marked_for_review.remove(question_id) {
            Some(false)
        } else {
            self.marked_for_review.insert(question_id.clone());
            Some(true)
        }
    }

    /// Whether the stored response is non-empty per its type
    pub fn is_answered(&self, question_id: &QuestionId) -> bool {
        self.answers
            .get(question_id)
            .is_some_and(|response| !response.is_empty())
    }

    /// Answered, unanswered, and marked counts over the full question set
    ///
    /// While a submission is in flight or done, returns the snapshot
    /// frozen when it was accepted, so the summary the student confirmed
    /// cannot shift under them.
    pub fn stats(&self) -> AttemptStats {
        if let Some(frozen) = self.final_stats.get() {
            return *frozen;
        }
        self.compute_stats()
    }

    fn compute_stats(&self) -> AttemptStats {
        let total = self.total_questions();
        let answered = self
            .sections
            .iter()
            .flat_map(|section| &section.questions)
            .filter(|question_id| self.is_answered(question_id))
            .count();
        AttemptStats {
            answered,
            unanswered: total - answered,
            marked: self.marked_for_review.len(),
        }
    }

    /// Per-question palette states in exam order
    pub fn overview(&self) -> Vec<PaletteEntry> {
        self.sections
            .iter()
            .flat_map(|section| &section.questions)
            .map(|question_id| PaletteEntry {
                question_id: question_id.clone(),
                answered: self.is_answered(question_id),
                marked: self.marked_for_review.contains(question_id),
            })
            .collect_vec()
    }

    /// Moves the cursor, rejecting out-of-range positions
    ///
    /// Navigation freezes once a submission is accepted.
    pub fn set_cursor(&mut self, cursor: Cursor) -> bool {
        if self.status.is_submitting() || self.status.is_terminal() {
            return false;
        }
        let valid = self
            .sections
            .get(cursor.section)
            .is_some_and(|section| cursor.question < section.questions.len());
        if valid {
            self.cursor = cursor;
        }
        valid
    }

    /// Records that the deadline passed before a submission was accepted
    ///
    /// Only transitions out of `Active`; returns whether it did.
    pub fn mark_expired(&mut self) -> bool {
        if self.status == Status::Active {
            self.status = Status::Expired;
            true
        } else {
            false
        }
    }

    /// Accepts a submission if none is in flight or done
    ///
    /// This is the coordinator's idempotent guard: it runs synchronously,
    /// so of two competing requests (say the expiry signal and a manual
    /// tap) whichever reaches it first wins and the other becomes a
    /// no-op. On acceptance the statistics are frozen.
    pub fn begin_submitting(&mut self) -> bool {
        let was_expired = match self.status {
            Status::Active => false,
            Status::Expired => true,
            Status::Submitting { .. } | Status::Submitted => return false,
        };
        let _ = self.final_stats.set(self.compute_stats());
        self.status = Status::Submitting { was_expired };
        true
    }

    /// Restores the pre-submission status after a failed submission
    ///
    /// Local answers and marks were never touched, so a retry is safe.
    pub fn submission_failed(&mut self) {
        if let Status::Submitting { was_expired } = self.status {
            self.status = if was_expired {
                Status::Expired
            } else {
                Status::Active
            };
            self.final_stats.take();
        }
    }

    /// Enters the terminal state after a successful submission
    pub fn submission_succeeded(&mut self) {
        if self.status.is_submitting() {
            self.status = Status::Submitted;
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::exam::{
        question::{AnswerOption, OptionId, QuestionKind},
        SavedAnswer,
    };

    fn choice_question(id: &str, kind: QuestionKind) -> Question {
        Question {
            id: QuestionId::from(id),
            kind,
            text: format!("Question {id}"),
            options: vec![
                AnswerOption {
                    id: OptionId::from("A"),
                    text: "First".to_string(),
                },
                AnswerOption {
                    id: OptionId::from("B"),
                    text: "Second".to_string(),
                },
            ],
            diagram: None,
        }
    }

    fn section(id: &str, question_ids: &[&str]) -> Section {
        Section {
            id: id.to_string(),
            title: id.to_string(),
            questions: question_ids.iter().map(|q| QuestionId::from(*q)).collect(),
        }
    }

    fn test_payload() -> AttemptPayload {
        AttemptPayload {
            attempt_id: AttemptId::new(),
            title: "Weekly Mock".to_string(),
            duration_mins: 60,
            started_at: None,
            sections: vec![
                section("s1", &["q1", "q2", "q3"]),
                section("s2", &["q4", "q5"]),
            ],
            questions: vec![
                choice_question("q1", QuestionKind::SingleChoice),
                choice_question("q2", QuestionKind::MultiChoice),
                choice_question("q3", QuestionKind::Numeric),
                choice_question("q4", QuestionKind::FreeText),
                choice_question("q5", QuestionKind::AssertionReason),
            ],
            saved: Vec::new(),
        }
    }

    fn session() -> AttemptSession {
        AttemptSession::initialize(test_payload(), SystemTime::now()).unwrap()
    }

    #[test]
    fn test_initialize_defaults() {
        let session = session();
        assert_eq!(session.status(), Status::Active);
        assert_eq!(session.cursor(), Cursor::default());
        assert_eq!(session.total_questions(), 5);
        assert_eq!(session.duration(), Duration::from_secs(3600));
        assert_eq!(session.title(), "Weekly Mock");
        assert_eq!(
            session.current_question().map(|q| q.id.clone()),
            Some(QuestionId::from("q1"))
        );
    }

    #[test]
    fn test_deadline_from_started_at() {
        let now = SystemTime::now();
        let mut payload = test_payload();
        payload.started_at = Some(now - Duration::from_secs(50 * 60));

        let session = AttemptSession::initialize(payload, now).unwrap();
        assert_eq!(
            session.deadline_at(),
            now + Duration::from_secs(10 * 60)
        );
    }

    #[test]
    fn test_deadline_defaults_to_load_time() {
        let now = SystemTime::now();
        let session = AttemptSession::initialize(test_payload(), now).unwrap();
        assert_eq!(session.deadline_at(), now + Duration::from_secs(3600));
    }

    #[test]
    fn test_initialize_reconstructs_saved_answers() {
        let mut payload = test_payload();
        payload.saved = vec![
            SavedAnswer {
                question_id: QuestionId::from("q1"),
                option_id: Some(OptionId::from("B")),
                option_ids: Vec::new(),
                text: None,
                reviewed: true,
            },
            SavedAnswer {
                question_id: QuestionId::from("q3"),
                option_id: None,
                option_ids: Vec::new(),
                text: Some("  ".to_string()),
                reviewed: false,
            },
            SavedAnswer {
                question_id: QuestionId::from("q999"),
                option_id: Some(OptionId::from("A")),
                option_ids: Vec::new(),
                text: None,
                reviewed: true,
            },
        ];

        let session = AttemptSession::initialize(payload, SystemTime::now()).unwrap();
        assert!(session.is_answered(&QuestionId::from("q1")));
        assert!(session.is_marked(&QuestionId::from("q1")));
        // blank saved text is not an answer
        assert!(!session.is_answered(&QuestionId::from("q3")));
        // unknown ids are skipped entirely
        assert!(!session.is_marked(&QuestionId::from("q999")));
        assert_eq!(session.stats().answered, 1);
    }

    #[test]
    fn test_initialize_rejects_unknown_question_reference() {
        let mut payload = test_payload();
        payload.sections[1].questions.push(QuestionId::from("q9"));

        let error = AttemptSession::initialize(payload, SystemTime::now()).unwrap_err();
        assert!(matches!(error, LoadError::UnknownQuestion { .. }));
    }

    #[test]
    fn test_initialize_rejects_invalid_payload() {
        let mut payload = test_payload();
        payload.sections.clear();

        let error = AttemptSession::initialize(payload, SystemTime::now()).unwrap_err();
        assert!(matches!(error, LoadError::Invalid(_)));
    }

    #[test]
    fn test_set_answer_idempotence() {
        let mut session = session();
        let q1 = QuestionId::from("q1");
        let response = Response::OptionId(OptionId::from("B"));

        assert!(session.set_answer(&q1, response.clone()));
        assert!(session.set_answer(&q1, response.clone()));
        assert_eq!(session.answer(&q1), Some(&response));
        assert_eq!(session.stats().answered, 1);
    }

    #[test]
    fn test_set_answer_ignores_unknown_question() {
        let mut session = session();
        assert!(!session.set_answer(
            &QuestionId::from("q999"),
            Response::Text("x".to_string())
        ));
        assert_eq!(session.stats().answered, 0);
    }

    #[test]
    fn test_set_answer_ignores_mismatched_shape() {
        let mut session = session();
        // q1 is single choice, text does not fit
        assert!(!session.set_answer(
            &QuestionId::from("q1"),
            Response::Text("Newton".to_string())
        ));
        assert!(session.answer(&QuestionId::from("q1")).is_none());
    }

    #[test]
    fn test_set_answer_ignores_oversized_text() {
        let mut session = session();
        let oversized = "a".repeat(crate::constants::free_text::MAX_LENGTH + 1);
        assert!(!session.set_answer(&QuestionId::from("q4"), Response::Text(oversized)));
    }

    #[test]
    fn test_toggle_review_twice_returns_to_unmarked() {
        let mut session = session();
        let q5 = QuestionId::from("q5");

        assert_eq!(session.toggle_review(&q5), Some(true));
        assert!(session.is_marked(&q5));
        assert_eq!(session.toggle_review(&q5), Some(false));
        assert!(!session.is_marked(&q5));
    }

    #[test]
    fn test_toggle_review_unknown_question() {
        let mut session = session();
        assert_eq!(session.toggle_review(&QuestionId::from("q999")), None);
    }

    #[test]
    fn test_stats_conservation() {
        let mut session = session();
        let total = session.total_questions();

        for step in [
            ("q1", Response::OptionId(OptionId::from("A"))),
            ("q3", Response::Text("42".to_string())),
            ("q4", Response::Text("because".to_string())),
        ] {
            session.set_answer(&QuestionId::from(step.0), step.1);
            let stats = session.stats();
            assert_eq!(stats.answered + stats.unanswered, total);
        }
        assert_eq!(session.stats().answered, 3);
    }

    #[test]
    fn test_empty_response_counts_as_unanswered() {
        let mut session = session();
        let q2 = QuestionId::from("q2");
        session.set_answer(&q2, Response::OptionIdSet(HashSet::new()));

        assert!(!session.is_answered(&q2));
        assert_eq!(session.stats().answered, 0);
    }

    #[test]
    fn test_overview_in_exam_order() {
        let mut session = session();
        session.set_answer(&QuestionId::from("q4"), Response::Text("ans".to_string()));
        session.toggle_review(&QuestionId::from("q2"));

        let overview = session.overview();
        assert_eq!(overview.len(), 5);
        assert_eq!(overview[0].question_id, QuestionId::from("q1"));
        assert!(overview[1].marked);
        assert!(overview[3].answered);
    }

    #[test]
    fn test_set_cursor_validation() {
        let mut session = session();
        assert!(session.set_cursor(Cursor {
            section: 1,
            question: 1
        }));
        assert!(!session.set_cursor(Cursor {
            section: 1,
            question: 2
        }));
        assert!(!session.set_cursor(Cursor {
            section: 2,
            question: 0
        }));
        assert_eq!(
            session.cursor(),
            Cursor {
                section: 1,
                question: 1
            }
        );
        assert_eq!(
            session.current_question().map(|q| q.id.clone()),
            Some(QuestionId::from("q5"))
        );
    }

    #[test]
    fn test_submission_guard_is_idempotent() {
        let mut session = session();
        assert!(session.begin_submitting());
        assert!(!session.begin_submitting());
        assert!(session.status().is_submitting());
    }

    #[test]
    fn test_no_edits_once_submitting() {
        let mut session = session();
        session.begin_submitting();

        assert!(!session.set_answer(
            &QuestionId::from("q1"),
            Response::OptionId(OptionId::from("A"))
        ));
        assert_eq!(session.toggle_review(&QuestionId::from("q1")), None);
        assert!(!session.set_cursor(Cursor {
            section: 1,
            question: 0
        }));
    }

    #[test]
    fn test_stats_frozen_across_submission() {
        let mut session = session();
        session.set_answer(
            &QuestionId::from("q1"),
            Response::OptionId(OptionId::from("A")),
        );
        session.begin_submitting();

        let frozen = session.stats();
        assert_eq!(frozen.answered, 1);

        session.submission_succeeded();
        assert_eq!(session.status(), Status::Submitted);
        assert_eq!(session.stats(), frozen);
    }

    #[test]
    fn test_submission_failure_restores_active() {
        let mut session = session();
        session.begin_submitting();
        session.submission_failed();

        assert_eq!(session.status(), Status::Active);
        // edits work again and stats recount live state
        assert!(session.set_answer(
            &QuestionId::from("q1"),
            Response::OptionId(OptionId::from("A"))
        ));
        assert_eq!(session.stats().answered, 1);
    }

    #[test]
    fn test_submission_failure_restores_expired() {
        let mut session = session();
        assert!(session.mark_expired());
        session.begin_submitting();
        session.submission_failed();

        assert_eq!(session.status(), Status::Expired);
        // no edits against a passed deadline
        assert!(!session.set_answer(
            &QuestionId::from("q1"),
            Response::OptionId(OptionId::from("A"))
        ));
        // but the retry path is open
        assert!(session.begin_submitting());
    }

    #[test]
    fn test_mark_expired_only_from_active() {
        let mut session = session();
        session.begin_submitting();
        assert!(!session.mark_expired());
        assert!(session.status().is_submitting());
    }
}

//! Attempt session orchestration
//!
//! The [`Engine`] wires the store, the countdown, and the autosave
//! scheduler together and routes every event of a running attempt: user
//! messages from the screen, alarms delivered by the host timer, and
//! completions of the fire-and-forget persistence calls. All routing is
//! synchronous; the guard checks happen before any request is issued, so
//! competing events (a manual submit racing the expiry tick, an edit
//! racing a flush) resolve by plain program order on the host's single
//! event loop.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::SystemTime;

use crate::{
    AlarmMessage, autosave,
    autosave::{SaveState, Scheduler},
    backend::Backend,
    constants, countdown,
    countdown::Countdown,
    exam::{AttemptPayload, question::QuestionId, response::Response},
    frontend::Frontend,
    navigation,
    store::{AttemptSession, AttemptStats, LoadError, Status},
    submit,
    submit::{SubmitError, SubmitMode},
};

/// Events arriving from the host screen
#[derive(Debug, Clone, Deserialize)]
pub enum IncomingMessage {
    /// The student edited a question's answer
    Answer(QuestionId, Response),
    /// The student toggled a question's review flag
    ToggleReview(QuestionId),
    /// Advance to the next question
    Next,
    /// Retreat to the previous question
    Prev,
    /// Jump to a flat question ordinal (palette tap)
    Jump(usize),
    /// Request submission of the attempt
    Submit(SubmitMode),
}

/// Drives one student's attempt from load to submission
///
/// A single screen instance owns exactly one engine; it is discarded when
/// the student navigates away after the `Submitted` update.
#[derive(Debug, Serialize, Deserialize)]
pub struct Engine {
    /// The session state
    session: AttemptSession,
    /// Countdown against the session's deadline
    countdown: Countdown,
    /// Debounce scheduler for answer persistence
    scheduler: Scheduler,
    /// Mode of the submission currently in flight, if any
    pending_submit: Option<SubmitMode>,
}

impl Engine {
    /// Seeds an engine from the fetched attempt payload
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when the payload is malformed. The host must
    /// treat this as fatal and return the student to the prior screen;
    /// no autosave or submission may be attempted.
    pub fn new(payload: AttemptPayload) -> Result<Self, LoadError> {
        let session = AttemptSession::initialize(payload, SystemTime::now())?;
        let countdown = Countdown::new(session.deadline_at());
        Ok(Self {
            session,
            countdown,
            scheduler: Scheduler::new(),
            pending_submit: None,
        })
    }

    /// Starts the countdown and pushes the initial remaining time
    ///
    /// Idempotent; only the first call arms the tick cadence.
    pub fn begin<F: Frontend, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        frontend: &F,
        mut schedule_message: S,
    ) {
        if self.countdown.start() {
            frontend.send_update(
                &countdown::UpdateMessage::TimeRemaining {
                    remaining: self.countdown.remaining(SystemTime::now()),
                }
                .into(),
            );
            schedule_message(
                countdown::AlarmMessage::Tick.into(),
                constants::session::TICK_INTERVAL,
            );
        }
    }

    /// Handles an event from the host screen
    pub fn receive_message<B: Backend, F: Frontend, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        message: IncomingMessage,
        backend: &B,
        frontend: &F,
        mut schedule_message: S,
    ) {
        match message {
            IncomingMessage::Answer(question_id, response) => {
                if self.session.set_answer(&question_id, response) {
                    if let Some(alarm) = self.scheduler.note_edit(question_id) {
                        frontend.send_update(
                            &autosave::UpdateMessage::SaveState(self.scheduler.save_state())
                                .into(),
                        );
                        schedule_message(alarm.into(), constants::session::AUTOSAVE_DEBOUNCE);
                    }
                }
            }
            IncomingMessage::ToggleReview(question_id) => {
                if let Some(marked) = self.session.toggle_review(&question_id) {
                    backend.mark_for_review(self.session.attempt_id(), &question_id, marked);
                }
            }
            IncomingMessage::Next => {
                let moved = navigation::next(self.session.sections(), self.session.cursor());
                self.session.set_cursor(moved);
            }
            IncomingMessage::Prev => {
                let moved = navigation::prev(self.session.sections(), self.session.cursor());
                self.session.set_cursor(moved);
            }
            IncomingMessage::Jump(ordinal) => {
                match navigation::cursor_from_global_index(self.session.sections(), ordinal) {
                    Ok(cursor) => {
                        self.session.set_cursor(cursor);
                    }
                    Err(error) => tracing::debug!(%error, "ignoring out-of-range jump"),
                }
            }
            IncomingMessage::Submit(mode) => self.request_submit(mode, backend, frontend),
        }
    }

    /// Handles an alarm previously handed to `schedule_message`
    pub fn receive_alarm<B: Backend, F: Frontend, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        message: AlarmMessage,
        backend: &B,
        frontend: &F,
        mut schedule_message: S,
    ) {
        match message {
            AlarmMessage::Autosave(autosave::AlarmMessage::Flush { generation }) => {
                if let Some(due) = self.scheduler.take_due(generation) {
                    self.flush(&due, backend);
                    frontend.send_update(
                        &autosave::UpdateMessage::SaveState(self.scheduler.save_state()).into(),
                    );
                }
            }
            AlarmMessage::Countdown(countdown::AlarmMessage::Tick) => {
                let Some(outcome) = self.countdown.tick(SystemTime::now()) else {
                    return;
                };
                frontend.send_update(
                    &countdown::UpdateMessage::TimeRemaining {
                        remaining: outcome.remaining,
                    }
                    .into(),
                );
                if outcome.expired {
                    tracing::info!("attempt deadline reached, forcing submission");
                    frontend.send_update(&countdown::UpdateMessage::Expired.into());
                    self.session.mark_expired();
                    self.request_submit(SubmitMode::Forced, backend, frontend);
                } else {
                    schedule_message(
                        countdown::AlarmMessage::Tick.into(),
                        constants::session::TICK_INTERVAL,
                    );
                }
            }
        }
    }

    /// Requests submission of the attempt
    ///
    /// No-op when a submission is already in flight or done; the guard is
    /// checked synchronously before any request is issued, so at most one
    /// `submit_attempt` call ever happens per attempt. In `Manual` mode
    /// the caller is expected to have shown the [`Engine::stats`] summary
    /// and obtained confirmation already; `Forced` mode skips that.
    ///
    /// On acceptance any still-dirty answers are flushed first, then
    /// autosave scheduling is disabled for the rest of the session.
    pub fn request_submit<B: Backend, F: Frontend>(
        &mut self,
        mode: SubmitMode,
        backend: &B,
        frontend: &F,
    ) {
        if !self.session.begin_submitting() {
            return;
        }
        let due = self.scheduler.drain();
        self.flush(&due, backend);
        self.scheduler.disable();
        self.pending_submit = Some(mode);

        tracing::info!(forced = mode.is_forced(), "submitting attempt");
        frontend.send_update(&submit::UpdateMessage::Submitting.into());
        backend.submit_attempt(self.session.attempt_id());
    }

    /// Reports the outcome of the in-flight submit request
    ///
    /// Success (or the backend reporting the attempt as already
    /// submitted) finishes the session; any other error restores the
    /// pre-submission status, re-enables autosave when that status
    /// accepts edits, and surfaces a retryable failure to the UI.
    pub fn submit_resolved<F: Frontend>(&mut self, result: Result<(), SubmitError>, frontend: &F) {
        let Some(mode) = self.pending_submit.take() else {
            return;
        };
        match result {
            Ok(()) | Err(SubmitError::AlreadySubmitted) => {
                self.session.submission_succeeded();
                tracing::info!("attempt submitted");
                frontend.send_update(&submit::UpdateMessage::Submitted.into());
            }
            Err(error) => {
                tracing::warn!(%error, "submission failed");
                self.session.submission_failed();
                if self.session.status().accepts_edits() {
                    self.scheduler.enable();
                }
                frontend.send_update(
                    &submit::UpdateMessage::SubmitFailed {
                        detail: error.to_string(),
                        forced: mode.is_forced(),
                    }
                    .into(),
                );
            }
        }
    }

    /// Reports that all issued answer saves settled successfully
    pub fn saves_settled<F: Frontend>(&mut self, frontend: &F) {
        self.scheduler.settled();
        frontend
            .send_update(&autosave::UpdateMessage::SaveState(self.scheduler.save_state()).into());
    }

    /// Reports that an answer save failed
    ///
    /// The failure is logged and dropped; it is never retried and never
    /// blocks later saves or submission. The next edit of the question
    /// re-persists its current value through the normal debounce cycle.
    pub fn save_failed<F: Frontend>(&mut self, question_id: &QuestionId, detail: &str, frontend: &F) {
        tracing::warn!(question = %question_id, detail, "answer save failed, dropping");
        self.scheduler.settled();
        frontend
            .send_update(&autosave::UpdateMessage::SaveState(self.scheduler.save_state()).into());
    }

    /// Read access to the session state
    pub fn session(&self) -> &AttemptSession {
        &self.session
    }

    /// Current lifecycle status
    pub fn status(&self) -> Status {
        self.session.status()
    }

    /// Current save indicator
    pub fn save_state(&self) -> SaveState {
        self.scheduler.save_state()
    }

    /// Statistics for the submission summary dialog
    pub fn stats(&self) -> AttemptStats {
        self.session.stats()
    }

    /// Current cursor position
    pub fn cursor(&self) -> navigation::Cursor {
        self.session.cursor()
    }

    /// The question under the cursor
    pub fn current_question(&self) -> Option<&crate::exam::question::Question> {
        self.session.current_question()
    }

    /// Remaining time right now, for the initial render
    pub fn remaining(&self) -> Duration {
        self.countdown.remaining(SystemTime::now())
    }

    fn flush<B: Backend>(&self, due: &[QuestionId], backend: &B) {
        for question_id in due {
            if let Some(response) = self.session.answer(question_id) {
                tracing::debug!(question = %question_id, "autosaving answer");
                backend.save_answer(self.session.attempt_id(), question_id, response);
            }
        }
    }
}

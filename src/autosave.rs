//! Debounced persistence of answer edits
//!
//! Rapid input, a student typing into a free text box most of all, must not
//! turn into one network write per keystroke. The scheduler coalesces edits
//! into a single flush per debounce window: every edit arms a fresh alarm
//! carrying a new generation number, and only the alarm whose generation is
//! still current when it fires gets to flush. Superseded alarms arrive and
//! are dropped, which is the cancel half of the cancel-and-reschedule
//! primitive built on the host's one-shot timer.
//!
//! The scheduler never holds answer values. It only remembers which
//! questions are dirty; the flush reads the current value from the store,
//! so within a window only the latest value per question reaches the wire.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::exam::question::QuestionId;

/// Whether a persistence write is pending or running
///
/// This indicator is global to the session and exists for the UI only; it
/// never blocks edits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveState {
    /// Nothing scheduled or in flight
    #[default]
    Idle,
    /// A debounce window is armed
    Pending,
    /// Save requests have been issued and not yet settled
    Saving,
}

/// Alarm scheduled when an edit arms the debounce window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// The window for the carried generation has elapsed
    Flush {
        /// Generation the window was armed with; stale ones are dropped
        generation: u64,
    },
}

/// Autosave updates sent to the host UI
#[derive(Debug, Serialize, Clone)]
pub enum UpdateMessage {
    /// The save indicator changed
    SaveState(SaveState),
}

/// Debounces answer edits into a bounded rate of persistence calls
#[derive(Debug, Serialize, Deserialize)]
pub struct Scheduler {
    /// Generation of the most recently armed window
    generation: u64,
    /// Questions edited since the last flush, in stable order
    dirty: BTreeSet<QuestionId>,
    /// UI-facing indicator
    save_state: SaveState,
    /// Cleared once submission is accepted
    enabled: bool,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Creates an enabled scheduler with nothing pending
    pub fn new() -> Self {
        Self {
            generation: 0,
            dirty: BTreeSet::new(),
            save_state: SaveState::Idle,
            enabled: true,
        }
    }

    /// Current save indicator
    pub fn save_state(&self) -> SaveState {
        self.save_state
    }

    /// Records an edit and arms a fresh debounce window
    ///
    /// Returns the alarm to schedule after
    /// [`crate::constants::session::AUTOSAVE_DEBOUNCE`], or `None` when
    /// scheduling is disabled. Arming a new window supersedes any previous
    /// one; the old alarm will be recognized as stale when it fires.
    pub fn note_edit(&mut self, question_id: QuestionId) -> Option<AlarmMessage> {
        if !self.enabled {
            return None;
        }
        self.dirty.insert(question_id);
        self.generation += 1;
        self.save_state = SaveState::Pending;
        Some(AlarmMessage::Flush {
            generation: self.generation,
        })
    }

    /// Claims the dirty set when a flush alarm fires
    ///
    /// Returns `None` for stale generations, when scheduling has been
    /// disabled, or when an immediate drain already emptied the set; the
    /// caller must not issue any saves in those cases.
    pub fn take_due(&mut self, generation: u64) -> Option<Vec<QuestionId>> {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "dropping stale flush alarm");
            return None;
        }
        if !self.enabled || self.dirty.is_empty() {
            return None;
        }
        self.save_state = SaveState::Saving;
        Some(std::mem::take(&mut self.dirty).into_iter().collect())
    }

    /// Drains the dirty set immediately, bypassing the debounce
    ///
    /// Used for the final flush when a submission is accepted. A pending
    /// alarm for the drained edits becomes a no-op because the set it
    /// would claim is empty by the time it fires.
    pub fn drain(&mut self) -> Vec<QuestionId> {
        if self.dirty.is_empty() {
            return Vec::new();
        }
        self.save_state = SaveState::Saving;
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    /// Marks issued saves as settled
    ///
    /// Only leaves the `Saving` state; if new edits armed another window in
    /// the meantime the indicator is already `Pending` and stays there.
    pub fn settled(&mut self) {
        if self.save_state == SaveState::Saving {
            self.save_state = if self.dirty.is_empty() {
                SaveState::Idle
            } else {
                SaveState::Pending
            };
        }
    }

    /// Stops all further scheduling; in-flight saves may still settle
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Resumes scheduling after a failed submission returned the session
    /// to its editable state
    pub fn enable(&mut self) {
        self.enabled = true;
    }
}

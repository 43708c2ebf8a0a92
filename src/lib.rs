//! # Examly Attempt Engine
//!
//! This library provides the core session logic for a student's timed exam
//! attempt on the Examly study platform. It tracks remaining time against a
//! hard deadline, captures and debounces answer edits into infrequent
//! persistence calls, maintains review-marking and navigation state across
//! heterogeneous question types, and drives a single idempotent submission
//! flow, whether student-initiated or deadline-forced.
//!
//! The engine is sans-IO: it never touches the network or owns a timer. The
//! host screen supplies a [`backend::Backend`] for persistence, a
//! [`frontend::Frontend`] for UI updates, and a `schedule_message` callback
//! that delivers [`AlarmMessage`]s back through
//! [`engine::Engine::receive_alarm`] after the requested delay.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

use serde::{Deserialize, Serialize};

pub mod constants;

pub mod attempt_id;
pub mod autosave;
pub mod backend;
pub mod countdown;
pub mod engine;
pub mod exam;
pub mod frontend;
pub mod navigation;
pub mod store;
pub mod submit;

/// Messages sent to the host UI about changes in session state
///
/// This enum aggregates the update messages of the individual engine
/// components so the host only has to handle a single message type.
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum UpdateMessage {
    /// Countdown updates (remaining time, expiry)
    Countdown(countdown::UpdateMessage),
    /// Autosave indicator updates
    Autosave(autosave::UpdateMessage),
    /// Submission flow updates
    Submit(submit::UpdateMessage),
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Messages scheduled for future delivery through the host's timer
///
/// The engine hands one of these to the `schedule_message` callback together
/// with a delay; the host must deliver it back through
/// [`engine::Engine::receive_alarm`] once the delay elapses. Scheduled
/// alarms are never cancelled by the host; stale ones are recognized and
/// dropped by the engine itself.
#[derive(Debug, Clone, derive_more::From, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Autosave debounce alarms
    Autosave(autosave::AlarmMessage),
    /// Countdown tick alarms
    Countdown(countdown::AlarmMessage),
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_update_message_to_message() {
        let message = UpdateMessage::Submit(submit::UpdateMessage::Submitted);
        let json_str = message.to_message();

        assert!(json_str.contains("Submit"));
        assert!(json_str.contains("Submitted"));
    }

    #[test]
    fn test_alarm_message_round_trip() {
        let alarm: AlarmMessage = autosave::AlarmMessage::Flush { generation: 7 }.into();
        let json_str = serde_json::to_string(&alarm).unwrap();
        let back: AlarmMessage = serde_json::from_str(&json_str).unwrap();

        assert!(matches!(
            back,
            AlarmMessage::Autosave(autosave::AlarmMessage::Flush { generation: 7 })
        ));
    }
}

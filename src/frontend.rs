//! UI collaborator
//!
//! The engine pushes state changes to the host screen through this trait
//! instead of returning them, so alarm-driven changes (ticks, flushes,
//! forced submission) reach the UI the same way user-driven ones do.

use crate::UpdateMessage;

/// Trait for delivering update messages to the host screen
///
/// Implementations might dispatch into a state container, a channel
/// polled by the render loop, or a native bridge. Delivery must not
/// re-enter the engine synchronously.
pub trait Frontend {
    /// Delivers an update message to the screen
    fn send_update(&self, message: &UpdateMessage);
}

//! Attempt identifier
//!
//! This module provides the unique identifier for an exam attempt. The id
//! is assigned by the backend when the attempt is created and stays
//! immutable for the lifetime of the session.

use std::{fmt::Display, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};
use uuid::Uuid;

/// A unique identifier for an exam attempt
///
/// Attempt ids are backend-assigned and opaque to the engine; every
/// persistence call carries one so the backend can route the write to the
/// right attempt record.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct AttemptId(Uuid);

impl AttemptId {
    /// Creates a new random attempt id
    ///
    /// Production ids come from the backend via the attempt payload; this
    /// constructor exists for hosts that create attempts locally and for
    /// tests.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AttemptId {
    /// Creates a new random attempt id (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for AttemptId {
    /// Formats the id as a UUID string
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AttemptId {
    type Err = uuid::Error;

    /// Parses an attempt id from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

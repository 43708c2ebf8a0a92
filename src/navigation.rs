//! Cursor and ordinal navigation over sections
//!
//! The screen addresses questions two ways: the palette and progress bar
//! use a flat 0-based ordinal across all sections, while the section tabs
//! and the store's cursor use a (section, question) pair. The functions
//! here convert between the two and step the cursor across section
//! boundaries. They are pure over a borrowed section list so they stay
//! unit-testable without any session or network state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::exam::Section;

/// Position of the visible question as a (section, question) pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Index into the section list
    pub section: usize,
    /// Index into the section's question list
    pub question: usize,
}

/// A flat ordinal did not address any question
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("ordinal {ordinal} is out of range for {total} questions")]
pub struct OutOfRangeError {
    /// The rejected ordinal
    pub ordinal: usize,
    /// Total number of questions at the time of the call
    pub total: usize,
}

/// Sum of section lengths
pub fn total_questions(sections: &[Section]) -> usize {
    sections.iter().map(|s| s.questions.len()).sum()
}

/// Flat 0-based ordinal of the cursor's question
pub fn global_index(sections: &[Section], cursor: Cursor) -> usize {
    sections
        .iter()
        .take(cursor.section)
        .map(|s| s.questions.len())
        .sum::<usize>()
        + cursor.question
}

/// Inverse of [`global_index`]
///
/// # Errors
///
/// Returns [`OutOfRangeError`] when `ordinal` is at or past the total
/// question count. Negative ordinals are unrepresentable by `usize`.
pub fn cursor_from_global_index(
    sections: &[Section],
    ordinal: usize,
) -> Result<Cursor, OutOfRangeError> {
    let mut remaining = ordinal;
    for (section, s) in sections.iter().enumerate() {
        if remaining < s.questions.len() {
            return Ok(Cursor {
                section,
                question: remaining,
            });
        }
        remaining -= s.questions.len();
    }
    Err(OutOfRangeError {
        ordinal,
        total: total_questions(sections),
    })
}

/// Advances the cursor by one question, crossing section boundaries
///
/// At the last question of the last section this is a no-op rather than a
/// wraparound.
pub fn next(sections: &[Section], cursor: Cursor) -> Cursor {
    let Some(section_len) = sections.get(cursor.section).map(|s| s.questions.len()) else {
        return cursor;
    };
    if cursor.question + 1 < section_len {
        return Cursor {
            question: cursor.question + 1,
            ..cursor
        };
    }
    for (section, s) in sections.iter().enumerate().skip(cursor.section + 1) {
        if !s.questions.is_empty() {
            return Cursor {
                section,
                question: 0,
            };
        }
    }
    cursor
}

/// Retreats the cursor by one question, crossing section boundaries
///
/// At the first question of the first section this is a no-op.
pub fn prev(sections: &[Section], cursor: Cursor) -> Cursor {
    if cursor.question > 0 {
        return Cursor {
            question: cursor.question - 1,
            ..cursor
        };
    }
    for (section, s) in sections.iter().enumerate().take(cursor.section).rev() {
        if !s.questions.is_empty() {
            return Cursor {
                section,
                question: s.questions.len() - 1,
            };
        }
    }
    cursor
}

/// Whether the cursor sits on the very first question
pub fn is_first(sections: &[Section], cursor: Cursor) -> bool {
    global_index(sections, cursor) == 0
}

/// Whether the cursor sits on the very last question
pub fn is_last(sections: &[Section], cursor: Cursor) -> bool {
    global_index(sections, cursor) + 1 == total_questions(sections)
}

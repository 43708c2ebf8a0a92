//! Configuration constants for the attempt engine
//!
//! This module contains the timing parameters and data bounds used
//! throughout the session engine to ensure data integrity and provide
//! consistent boundaries for the different components.

/// Session timing constants
pub mod session {
    use std::time::Duration;

    /// Delay between the last answer edit and the autosave flush
    pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(500);
    /// Cadence of countdown ticks
    pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);
}

/// Exam structure constants
pub mod exam {
    /// Maximum number of sections in a single attempt
    pub const MAX_SECTION_COUNT: usize = 50;
    /// Maximum number of questions across all sections
    pub const MAX_QUESTION_COUNT: usize = 500;
    /// Maximum length of an exam or section title in characters
    pub const MAX_TITLE_LENGTH: usize = 200;
    /// Maximum allotted time for an attempt in minutes
    pub const MAX_DURATION_MINS: u64 = 600;
}

/// Question content constants
pub mod question {
    /// Maximum length of a question's text in characters
    pub const MAX_TEXT_LENGTH: usize = 2000;
    /// Maximum number of options for a choice question
    pub const MAX_OPTION_COUNT: usize = 10;
    /// Maximum length of an option's text in characters
    pub const MAX_OPTION_TEXT_LENGTH: usize = 400;
}

/// Free text response constants
pub mod free_text {
    /// Maximum length of a free text or numeric response in characters
    pub const MAX_LENGTH: usize = 5000;
}

/// Diagram reference constants
pub mod diagram {
    /// Maximum length of a diagram identifier
    pub const MAX_ID_LENGTH: usize = 64;
    /// Maximum length of alt text for accessibility
    pub const MAX_ALT_LENGTH: usize = 200;
}

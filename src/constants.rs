//! Configuration constants for the Sportmix engine
//!
//! This module contains the limits and default timings used throughout the
//! engine to keep stored rooms consistent and to give every client the same
//! pacing for events and quizzes.

/// Room limits
pub mod room {
    /// Number of characters in a room code
    pub const CODE_LENGTH: usize = 4;
    /// Characters a room code is drawn from
    pub const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    /// Maximum number of players allowed in a single room
    pub const MAX_PLAYER_COUNT: usize = 100;
    /// Maximum number of rules a room may carry
    pub const MAX_RULE_COUNT: usize = 64;
}

/// Nickname limits
pub mod names {
    /// Maximum length of a nickname in bytes
    pub const MAX_LENGTH: usize = 30;
    /// Suggestions drawn before falling back to a numbered one
    pub const SUGGESTION_ATTEMPTS: usize = 16;
}

/// Rule card limits
pub mod rule {
    /// Maximum length of a rule label
    pub const MAX_LABEL_LENGTH: usize = 100;
    /// Maximum length of the action text
    pub const MAX_ACTION_LENGTH: usize = 100;
    /// Maximum length of the unit text
    pub const MAX_UNIT_LENGTH: usize = 30;
    /// Maximum drink value on a single rule
    pub const MAX_VALUE: u32 = 99;
    /// Maximum countdown in seconds
    pub const MAX_COUNTDOWN: u32 = 120;
}

/// Quiz limits
pub mod quiz {
    /// Minimum number of options on a quiz question
    pub const MIN_OPTION_COUNT: usize = 2;
    /// Maximum number of options on a quiz question
    pub const MAX_OPTION_COUNT: usize = 8;
    /// Maximum length of the question text
    pub const MAX_QUESTION_LENGTH: usize = 200;
    /// Maximum length of a single option
    pub const MAX_OPTION_LENGTH: usize = 100;
    /// Maximum length of the penalty text
    pub const MAX_PENALTY_LENGTH: usize = 100;
}

/// Shape-tap challenge layout
pub mod shapes {
    /// Default number of decoy shapes around the target
    pub const DECOY_COUNT: usize = 12;
    /// Upper bound on decoy shapes
    pub const MAX_DECOY_COUNT: usize = 40;
    /// Identifier of the target shape
    pub const TARGET_ID: u32 = 99;
    /// Size of the target shape in pixels
    pub const TARGET_SIZE: f64 = 60.;
    /// Smallest decoy size in pixels
    pub const MIN_DECOY_SIZE: f64 = 40.;
    /// Range added on top of the smallest decoy size
    pub const DECOY_SIZE_RANGE: f64 = 40.;
    /// Minimum position of a shape in percent of the field
    pub const MIN_POSITION: f64 = 10.;
    /// Range added on top of the minimum position
    pub const POSITION_RANGE: f64 = 80.;
}

/// Default timings, in milliseconds
pub mod timing {
    /// Alert window during which safety taps count
    pub const SAFETY_WINDOW: u64 = 3_500;
    /// Delay before a safe player's resting view moves to results
    pub const RESTING: u64 = 2_000;
    /// Delay between completing a challenge and showing results
    pub const COMPLETION: u64 = 1_000;
    /// How long results stay on screen before dismissal
    pub const RESULTS_DISPLAY: u64 = 6_000;
    /// Answering time for a quiz round
    pub const QUIZ_ANSWERING: u64 = 15_000;
    /// How long quiz results stay on screen before dismissal
    pub const QUIZ_RESULTS_DISPLAY: u64 = 5_000;
    /// Shortest configurable timer
    pub const MIN_TIMER: u64 = 500;
    /// Longest configurable timer
    pub const MAX_TIMER: u64 = 120_000;
}

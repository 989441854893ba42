//! Runtime options for the engine
//!
//! Every timer the event and quiz views schedule is looked up here, so a host
//! environment can slow the pacing down for tests or demos. Options are
//! validated with `garde` before a [`crate::service::RoomService`] accepts them.

use enum_map::{Enum, EnumMap, enum_map};
use garde::Validate;
use serde::{Deserialize, Serialize};
use web_time::Duration;

use crate::{
    constants::{shapes, timing},
    names::NameStyle,
};

/// The timers driving the event and quiz views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum Timer {
    /// Alert window for safety taps
    SafetyWindow,
    /// Resting view shown to safe players before results
    Resting,
    /// Pause between completing a challenge and showing results
    Completion,
    /// Event results display
    ResultsDisplay,
    /// Quiz answering countdown
    QuizAnswering,
    /// Quiz results display
    QuizResultsDisplay,
}

impl Timer {
    fn default_duration(self) -> Duration {
        Duration::from_millis(match self {
            Self::SafetyWindow => timing::SAFETY_WINDOW,
            Self::Resting => timing::RESTING,
            Self::Completion => timing::COMPLETION,
            Self::ResultsDisplay => timing::RESULTS_DISPLAY,
            Self::QuizAnswering => timing::QUIZ_ANSWERING,
            Self::QuizResultsDisplay => timing::QUIZ_RESULTS_DISPLAY,
        })
    }
}

type ValidationResult = garde::Result;

fn validate_timers(val: &EnumMap<Timer, Duration>, _ctx: &()) -> ValidationResult {
    for (timer, duration) in val {
        let millis = duration.as_millis();
        if !(u128::from(timing::MIN_TIMER)..=u128::from(timing::MAX_TIMER)).contains(&millis) {
            return Err(garde::Error::new(format!(
                "{timer:?} is outside of the bounds [{},{}] ms",
                timing::MIN_TIMER,
                timing::MAX_TIMER,
            )));
        }
    }
    Ok(())
}

/// Options shared by every client of a room
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Options {
    /// Duration of each timer
    #[garde(custom(validate_timers))]
    timers: EnumMap<Timer, Duration>,
    /// Number of decoys in the shape-tap challenge
    #[garde(range(min = 1, max = shapes::MAX_DECOY_COUNT))]
    decoy_count: usize,
    /// Style of nicknames suggested to players who leave theirs blank
    #[garde(dive)]
    name_style: NameStyle,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timers: enum_map! { timer => timer.default_duration() },
            decoy_count: shapes::DECOY_COUNT,
            name_style: NameStyle::default(),
        }
    }
}

impl Options {
    /// Returns the configured duration of `timer`
    pub fn duration(&self, timer: Timer) -> Duration {
        self.timers[timer]
    }

    /// Replaces the duration of `timer`
    #[must_use]
    pub fn with_duration(mut self, timer: Timer, duration: Duration) -> Self {
        self.timers[timer] = duration;
        self
    }

    /// Number of decoys drawn around the target shape
    pub fn decoy_count(&self) -> usize {
        self.decoy_count
    }

    /// Replaces the number of decoys
    #[must_use]
    pub fn with_decoy_count(mut self, decoy_count: usize) -> Self {
        self.decoy_count = decoy_count;
        self
    }

    /// Style of suggested nicknames
    pub fn name_style(&self) -> NameStyle {
        self.name_style
    }

    /// Replaces the style of suggested nicknames
    #[must_use]
    pub fn with_name_style(mut self, name_style: NameStyle) -> Self {
        self.name_style = name_style;
        self
    }
}

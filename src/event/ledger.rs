//! The active event record shared by every client of a room

use std::collections::{HashMap, hash_map::Entry};

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use web_time::{Duration, SystemTime};

use crate::id::Id;

use super::{challenge::ChallengeKind, resolver::Outcome};

/// The event currently running in a room
///
/// Created when the host triggers a rule and cleared when the host dismisses
/// the results. A player present in the safety log is exempt from the
/// challenge.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEvent {
    /// The rule that fired
    pub rule_id: Id,
    /// When the host triggered it
    pub start_time: SystemTime,
    /// Which mini-game the unsafe players get
    pub challenge_kind: ChallengeKind,
    /// First safety tap of each player
    #[serde(default)]
    safety_log: HashMap<Id, SystemTime>,
    /// Set once the host commits the result
    outcome: Option<Outcome>,
}

impl ActiveEvent {
    /// Creates an event with an empty safety log
    pub fn new(rule_id: Id, challenge_kind: ChallengeKind, start_time: SystemTime) -> Self {
        Self {
            rule_id,
            start_time,
            challenge_kind,
            safety_log: HashMap::new(),
            outcome: None,
        }
    }

    /// Whether `player` tapped safe
    pub fn is_safe(&self, player: Id) -> bool {
        self.safety_log.contains_key(&player)
    }

    /// When `player` tapped safe, if they did
    pub fn safe_at(&self, player: Id) -> Option<SystemTime> {
        self.safety_log.get(&player).copied()
    }

    /// Number of players who tapped safe
    pub fn safe_count(&self) -> usize {
        self.safety_log.len()
    }

    /// Whether a tap at `at` still falls inside the alert window
    pub fn accepts_safety_tap(&self, at: SystemTime, window: Duration) -> bool {
        at.duration_since(self.start_time).unwrap_or_default() < window
    }

    /// Records a safety tap, keeping only the first one per player
    ///
    /// Returns `true` if the tap was recorded.
    pub fn record_safety_tap(&mut self, player: Id, at: SystemTime) -> bool {
        match self.safety_log.entry(player) {
            Entry::Occupied(_) => false,
            Entry::Vacant(v) => {
                v.insert(at);
                true
            }
        }
    }

    /// The committed outcome, if the host already finalized this event
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Whether the host already committed an outcome
    pub fn is_finalized(&self) -> bool {
        self.outcome.is_some()
    }

    /// Commits the outcome unless one is already committed
    ///
    /// Returns `true` if this call committed it.
    pub(crate) fn commit(&mut self, outcome: Outcome) -> bool {
        if self.outcome.is_some() {
            return false;
        }
        self.outcome = Some(outcome);
        true
    }
}

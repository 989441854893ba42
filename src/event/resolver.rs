//! Loser adjudication
//!
//! Participants are the players who did not tap safe. A participant who has
//! not finished the challenge loses before anyone who finished; among
//! finishers the slowest loses. Ties go to whoever comes first in the roster.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{id::Id, player::Player};

use super::ledger::ActiveEvent;

/// The adjudicated result of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Every player tapped safe, nobody loses
    AllSafe,
    /// One player loses the round
    Loser {
        /// The losing player
        id: Id,
        /// `false` if they never completed the challenge
        finished: bool,
    },
}

impl Outcome {
    /// The losing player, if any
    pub fn loser(&self) -> Option<Id> {
        match self {
            Self::AllSafe => None,
            Self::Loser { id, .. } => Some(*id),
        }
    }

    /// Whether every player was safe
    pub fn is_all_safe(&self) -> bool {
        matches!(self, Self::AllSafe)
    }
}

/// Players who must play the challenge, in roster order
pub fn participants<'a>(
    players: &'a [Player],
    event: &'a ActiveEvent,
) -> impl Iterator<Item = &'a Player> + 'a {
    players.iter().filter(|p| !event.is_safe(p.id))
}

/// Computes the outcome of `event` for the given roster snapshot
pub fn resolve(players: &[Player], event: &ActiveEvent) -> Outcome {
    let participants = participants(players, event).collect_vec();

    if let Some(unfinished) = participants.iter().find(|p| !p.has_finished()) {
        return Outcome::Loser {
            id: unfinished.id,
            finished: false,
        };
    }

    // max_by_key keeps the last maximum, so walk backwards to keep the first
    participants
        .iter()
        .rev()
        .max_by_key(|p| p.last_reaction_time)
        .map_or(Outcome::AllSafe, |slowest| Outcome::Loser {
            id: slowest.id,
            finished: true,
        })
}

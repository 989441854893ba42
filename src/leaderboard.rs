//! Shame leaderboard
//!
//! Standings are a snapshot of the roster sorted by losses, most first.
//! Players with the same count keep their roster order.

use std::{cmp::Reverse, collections::HashMap};

use itertools::Itertools;
use serde::Serialize;

use crate::{TruncatedVec, id::Id, player::Player};

/// Score information for a player
///
/// Contains the player's loss count and their position in the standings.
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct ScoreMessage {
    /// Number of events lost
    pub points: u64,
    /// Position in the standings, 0 is the most shamed
    pub position: usize,
}

/// Standings computed from a roster snapshot
#[derive(Debug, Clone, Default, Serialize)]
pub struct Leaderboard {
    scores_descending: Vec<(Id, u64)>,
    #[serde(skip)]
    score_and_position: HashMap<Id, (u64, usize)>,
}

impl Leaderboard {
    /// Ranks the given roster
    ///
    /// # Arguments
    ///
    /// * `players` - The roster in join order
    pub fn new(players: &[Player]) -> Self {
        let scores_descending = players
            .iter()
            .map(|p| (p.id, p.score))
            .sorted_by_key(|(_, score)| Reverse(*score))
            .collect_vec();

        let score_and_position = scores_descending
            .iter()
            .enumerate()
            .map(|(position, (id, points))| (*id, (*points, position)))
            .collect();

        Self {
            scores_descending,
            score_and_position,
        }
    }

    /// The standings for display, capped to the first fifty entries
    pub fn standings(&self) -> TruncatedVec<(Id, u64)> {
        const LIMIT: usize = 50;

        TruncatedVec::new(
            self.scores_descending.iter().copied(),
            LIMIT,
            self.scores_descending.len(),
        )
    }

    /// The player to highlight, only once someone has actually lost
    pub fn leader(&self) -> Option<(Id, u64)> {
        self.scores_descending
            .first()
            .copied()
            .filter(|(_, score)| *score > 0)
    }

    /// Returns the loss count and position of a player
    ///
    /// # Returns
    ///
    /// `None` if the player was not in the roster
    pub fn score(&self, player: Id) -> Option<ScoreMessage> {
        let (points, position) = self.score_and_position.get(&player)?;
        Some(ScoreMessage {
            points: *points,
            position: *position,
        })
    }

    /// Sum of every player's losses
    pub fn total_losses(&self) -> u64 {
        self.scores_descending.iter().map(|(_, score)| score).sum()
    }
}

//! Players in a room
//!
//! A player carries their cumulative loss count and, while an event is
//! running, the moment they completed its challenge. The roster order of a
//! room is significant: it is the iteration order used to break ties when
//! adjudicating a loser.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use web_time::SystemTime;

use crate::id::Id;

/// A participant in a room
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Unique within the room
    pub id: Id,
    /// Display name
    pub nickname: String,
    /// Number of events this player has lost
    pub score: u64,
    /// Exactly one player per room is the host
    pub is_host: bool,
    /// When this player completed the current challenge
    pub last_reaction_time: Option<SystemTime>,
}

impl Player {
    /// Creates a player with a fresh id and no losses
    pub fn new(nickname: String, is_host: bool) -> Self {
        Self {
            id: Id::new(),
            nickname,
            score: 0,
            is_host,
            last_reaction_time: None,
        }
    }

    /// Whether the player completed the current challenge
    pub fn has_finished(&self) -> bool {
        self.last_reaction_time.is_some()
    }

    /// Records the completion time unless one is already recorded
    ///
    /// Returns `true` if the time was recorded.
    pub fn record_completion(&mut self, at: SystemTime) -> bool {
        if self.last_reaction_time.is_some() {
            return false;
        }
        self.last_reaction_time = Some(at);
        true
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use web_time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_new_player() {
        let player = Player::new("Ana".to_string(), true);
        assert_eq!(player.nickname, "Ana");
        assert_eq!(player.score, 0);
        assert!(player.is_host);
        assert!(!player.has_finished());
    }

    #[test]
    fn test_record_completion_only_once() {
        let mut player = Player::new("Ben".to_string(), false);
        let first = UNIX_EPOCH + Duration::from_millis(100);
        let second = UNIX_EPOCH + Duration::from_millis(200);

        assert!(player.record_completion(first));
        assert!(!player.record_completion(second));
        assert_eq!(player.last_reaction_time, Some(first));
    }

    #[test]
    fn test_unfinished_player_omits_reaction_time() {
        let player = Player::new("Cy".to_string(), false);
        let json = serde_json::to_string(&player).unwrap();
        assert!(!json.contains("last_reaction_time"));

        let restored: Player = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, player);
    }
}

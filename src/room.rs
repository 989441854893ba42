//! The shared room record
//!
//! A room is the single source of truth every client reads. It holds the
//! roster, the rule set, and at most one running event and one running quiz.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::{
    constants::room::MAX_PLAYER_COUNT,
    event::ActiveEvent,
    id::Id,
    player::Player,
    quiz::ActiveQuiz,
    room_code::RoomCode,
    rule::RuleSet,
};

/// The sport being watched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sport {
    /// NBA and friends
    Basketball,
    /// Union or league
    Rugby,
    /// Association football
    Soccer,
    /// Tournament golf
    Golf,
}

/// Who the forfeits are written for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    /// Sips and shots
    Drinking,
    /// Push-ups and silly faces
    Kids,
}

/// Lifecycle of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    /// Players are joining
    #[default]
    Lobby,
    /// The host is editing rules
    Config,
    /// The match is on, rules can be triggered
    Playing,
    /// The match is over
    Ended,
}

/// Errors that can occur when managing the roster
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The room has reached its player limit
    #[error("maximum number of players reached")]
    MaximumPlayers,
}

/// A watch party
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Join code, also the storage key
    pub code: RoomCode,
    /// The sport being watched
    pub sport: Sport,
    /// Drinking or kids forfeits
    pub mode: GameMode,
    /// Lifecycle stage
    pub status: Status,
    /// The rule set
    pub rules: RuleSet,
    /// Roster in join order, the host first
    pub players: Vec<Player>,
    /// The event currently running
    pub active_event: Option<ActiveEvent>,
    /// The quiz currently running
    pub active_quiz: Option<ActiveQuiz>,
}

impl Room {
    /// Opens a room in the lobby with `host` as its only player
    pub fn new(code: RoomCode, sport: Sport, mode: GameMode, rules: RuleSet, host: Player) -> Self {
        Self {
            code,
            sport,
            mode,
            status: Status::Lobby,
            rules,
            players: vec![host],
            active_event: None,
            active_quiz: None,
        }
    }

    /// Looks up a player by id
    pub fn player(&self, id: Id) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Looks up a player by id for mutation
    pub fn player_mut(&mut self, id: Id) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// The host, if still in the room
    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_host)
    }

    /// Whether `id` is the host
    pub fn is_host(&self, id: Id) -> bool {
        self.player(id).is_some_and(|p| p.is_host)
    }

    /// Nicknames in roster order
    pub fn nicknames(&self) -> impl Iterator<Item = &str> {
        self.players.iter().map(|p| p.nickname.as_str())
    }

    /// Appends a player to the roster
    ///
    /// # Errors
    ///
    /// Returns `Error::MaximumPlayers` if the room is full.
    pub fn add_player(&mut self, player: Player) -> Result<(), Error> {
        if self.players.len() >= MAX_PLAYER_COUNT {
            return Err(Error::MaximumPlayers);
        }
        self.players.push(player);
        Ok(())
    }

    /// Whether an event or a quiz is running
    pub fn has_active_state(&self) -> bool {
        self.active_event.is_some() || self.active_quiz.is_some()
    }

    /// Clears the running event and quiz along with per-event completion times
    ///
    /// Returns `false` if nothing was running.
    pub fn clear_active_state(&mut self) -> bool {
        let event = self.clear_event();
        let quiz = self.clear_quiz();
        event || quiz
    }

    /// Clears the running event and every player's completion time
    ///
    /// A running quiz is left alone. Returns `false` if no event was running.
    pub fn clear_event(&mut self) -> bool {
        if self.active_event.take().is_none() {
            return false;
        }
        for player in &mut self.players {
            player.last_reaction_time = None;
        }
        true
    }

    /// Clears the running quiz, leaving any event in place
    ///
    /// Returns `false` if no quiz was running.
    pub fn clear_quiz(&mut self) -> bool {
        self.active_quiz.take().is_some()
    }
}

/// A partial update of a room's settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPatch {
    /// The sport being watched
    pub sport: Option<Sport>,
    /// Drinking or kids forfeits
    pub mode: Option<GameMode>,
    /// Lifecycle stage
    pub status: Option<Status>,
    /// The rule set
    pub rules: Option<RuleSet>,
}

impl RoomPatch {
    /// Overwrites the fields this patch carries
    pub fn apply(self, room: &mut Room) {
        if let Some(sport) = self.sport {
            room.sport = sport;
        }
        if let Some(mode) = self.mode {
            room.mode = mode;
        }
        if let Some(status) = self.status {
            room.status = status;
        }
        if let Some(rules) = self.rules {
            room.rules = rules;
        }
    }
}

//! Room operations
//!
//! Every operation is a read-modify-write of one room through the
//! repository. Operations that fail return an error and leave the stored
//! room untouched. Submissions that repeat an earlier one return `Ok(false)`
//! without writing.

use garde::Validate;
use serde::Serialize;
use thiserror::Error;
use web_time::SystemTime;

use crate::{
    catalog,
    config::{Options, Timer},
    event::{ActiveEvent, ChallengeKind, Outcome, resolver},
    id::Id,
    leaderboard::Leaderboard,
    names,
    player::Player,
    quiz::{ActiveQuiz, Quiz},
    repository::RoomRepository,
    room::{self, GameMode, Room, RoomPatch, Sport, Status},
    room_code::{self, RoomCode},
    rule::RuleSet,
    session::{Session, SessionStore},
};

/// Errors returned by room operations
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No room is stored under this code
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),
    /// The player is not in the room
    #[error("player not found")]
    PlayerNotFound,
    /// The rule is not in the room's rule set
    #[error("rule not found")]
    RuleNotFound,
    /// The rule exists but is switched off
    #[error("rule is disabled")]
    RuleDisabled,
    /// The quiz is not in the question pool
    #[error("quiz not found")]
    QuizNotFound,
    /// Only the host may do this
    #[error("only the host can do that")]
    NotHost,
    /// An event is already running
    #[error("an event is already running")]
    EventAlreadyActive,
    /// A quiz is already running
    #[error("a quiz is already running")]
    QuizAlreadyActive,
    /// The player tapped safe and cannot lose the event
    #[error("player is safe")]
    PlayerSafe,
    /// No event is running
    #[error("no event is running")]
    NoActiveEvent,
    /// No quiz is running
    #[error("no quiz is running")]
    NoActiveQuiz,
    /// The option index is out of range for the running quiz
    #[error("option does not exist")]
    InvalidOption,
    /// The room has reached its player limit
    #[error("room is full")]
    RoomFull,
    /// The nickname was rejected
    #[error("invalid nickname: {0}")]
    InvalidName(#[from] names::Error),
    /// The room code is malformed
    #[error("invalid room code: {0}")]
    InvalidCode(#[from] room_code::Error),
    /// The rule set failed validation
    #[error("invalid rules: {0}")]
    InvalidRules(String),
}

impl From<room::Error> for Error {
    fn from(error: room::Error) -> Self {
        match error {
            room::Error::MaximumPlayers => Self::RoomFull,
        }
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Operations over the rooms stored in a repository
///
/// The service is what one client uses to act on the shared state. The
/// repository doubles as the client's session store.
#[derive(Debug)]
pub struct RoomService<R> {
    repository: R,
    pub(crate) options: Options,
    quizzes: Vec<Quiz>,
    rng: fastrand::Rng,
}

impl<R: RoomRepository + SessionStore> RoomService<R> {
    /// Creates a service with default options and the sample question pool
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            options: Options::default(),
            quizzes: catalog::sample_quizzes(),
            rng: fastrand::Rng::new(),
        }
    }

    /// Creates a service with custom options
    ///
    /// # Errors
    ///
    /// Returns the validation report if `options` are out of range.
    pub fn with_options(repository: R, options: Options) -> std::result::Result<Self, garde::Report> {
        options.validate()?;
        Ok(Self {
            options,
            ..Self::new(repository)
        })
    }

    /// Replaces the question pool
    ///
    /// # Errors
    ///
    /// Returns the validation report of the first invalid quiz.
    pub fn with_quizzes(mut self, quizzes: Vec<Quiz>) -> std::result::Result<Self, garde::Report> {
        for quiz in &quizzes {
            quiz.validate()?;
        }
        self.quizzes = quizzes;
        Ok(self)
    }

    /// Replaces the random source used for room codes
    #[must_use]
    pub fn with_rng(mut self, rng: fastrand::Rng) -> Self {
        self.rng = rng;
        self
    }

    /// The options every view of this client uses
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// The question pool
    pub fn quizzes(&self) -> &[Quiz] {
        &self.quizzes
    }

    /// Looks up a quiz in the pool
    pub fn quiz(&self, id: &str) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| q.id == id)
    }

    /// The underlying repository
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// The underlying repository, for subscribing to changes
    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repository
    }

    /// A snapshot of a room
    pub fn room(&self, code: RoomCode) -> Option<Room> {
        self.repository.get(code)
    }

    /// The standings of a room
    pub fn leaderboard(&self, code: RoomCode) -> Option<Leaderboard> {
        self.repository.get(code).map(|room| Leaderboard::new(&room.players))
    }

    /// The room and player this client acts as
    pub fn current_session(&self) -> Option<Session> {
        self.repository.current_session()
    }

    fn load(&self, code: RoomCode) -> Result<Room> {
        self.repository.get(code).ok_or(Error::RoomNotFound(code))
    }

    fn require_host(room: &Room, actor: Id) -> Result<()> {
        if room.is_host(actor) {
            Ok(())
        } else {
            tracing::warn!(room = %room.code, player = %actor, "rejected host-only action");
            Err(Error::NotHost)
        }
    }

    /// Opens a new room with the caller as host
    ///
    /// The room starts with the starter rules for `sport` and `mode`. A
    /// blank nickname is replaced by a suggested one.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidName` - The nickname was rejected
    pub fn create_room(&mut self, nickname: &str, sport: Sport, mode: GameMode) -> Result<Room> {
        let nickname = names::validate_or_suggest(nickname, self.options.name_style(), [])?;

        let code = loop {
            let code = RoomCode::random(&mut self.rng);
            if !self.repository.contains(code) {
                break code;
            }
        };

        let host = Player::new(nickname, true);
        let player_id = host.id;
        let room = Room::new(code, sport, mode, catalog::starter_rules(sport, mode), host);

        self.repository.set(room.clone());
        self.repository.set_session(Session {
            room_code: code,
            player_id,
        });

        tracing::info!(room = %code, player = %player_id, ?sport, ?mode, "room created");

        Ok(room)
    }

    /// Joins an existing room as a regular player
    ///
    /// A blank nickname is replaced by a suggested one not yet in the room.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidCode` - The code is malformed
    /// * `Error::RoomNotFound` - No room has this code
    /// * `Error::InvalidName` - The nickname was rejected or is taken
    /// * `Error::RoomFull` - The room has reached its player limit
    pub fn join_room(&mut self, code: &str, nickname: &str) -> Result<Room> {
        let code: RoomCode = code.parse()?;
        let mut room = self.load(code)?;

        let nickname =
            names::validate_or_suggest(nickname, self.options.name_style(), room.nicknames())?;
        let player = Player::new(nickname, false);
        let player_id = player.id;
        room.add_player(player)?;

        self.repository.set(room.clone());
        self.repository.set_session(Session {
            room_code: code,
            player_id,
        });

        tracing::info!(room = %code, player = %player_id, "player joined");

        Ok(room)
    }

    /// Forgets the current session
    ///
    /// The player stays in the room's roster.
    pub fn leave_room(&mut self) {
        if let Some(session) = self.repository.current_session() {
            tracing::info!(room = %session.room_code, player = %session.player_id, "left room");
        }
        self.repository.clear_session();
    }

    /// Moves a room to another lifecycle stage
    ///
    /// # Errors
    ///
    /// * `Error::RoomNotFound` - No room has this code
    /// * `Error::NotHost` - `actor` is not the host
    pub fn set_status(&mut self, code: RoomCode, actor: Id, status: Status) -> Result<()> {
        let room = self.load(code)?;
        Self::require_host(&room, actor)?;

        self.repository.update(
            code,
            RoomPatch {
                status: Some(status),
                ..Default::default()
            },
        );

        tracing::info!(room = %code, ?status, "status changed");

        Ok(())
    }

    /// Replaces a room's rule set
    ///
    /// # Errors
    ///
    /// * `Error::RoomNotFound` - No room has this code
    /// * `Error::NotHost` - `actor` is not the host
    /// * `Error::InvalidRules` - A rule failed validation
    pub fn update_rules(&mut self, code: RoomCode, actor: Id, rules: RuleSet) -> Result<()> {
        let room = self.load(code)?;
        Self::require_host(&room, actor)?;
        rules
            .validate()
            .map_err(|report| Error::InvalidRules(report.to_string()))?;

        self.repository.update(
            code,
            RoomPatch {
                rules: Some(rules),
                ..Default::default()
            },
        );

        Ok(())
    }

    /// Starts an event for one of the room's rules
    ///
    /// The challenge kind is drawn from `rng` and every player's completion
    /// time is cleared.
    ///
    /// # Errors
    ///
    /// * `Error::RoomNotFound` - No room has this code
    /// * `Error::NotHost` - `actor` is not the host
    /// * `Error::RuleNotFound` / `Error::RuleDisabled` - The rule cannot fire
    /// * `Error::EventAlreadyActive` - Another event is still running
    pub fn trigger_event(
        &mut self,
        code: RoomCode,
        actor: Id,
        rule_id: Id,
        rng: &mut fastrand::Rng,
    ) -> Result<ActiveEvent> {
        let mut room = self.load(code)?;
        Self::require_host(&room, actor)?;

        let rule = room.rules.get(rule_id).ok_or(Error::RuleNotFound)?;
        if !rule.enabled {
            return Err(Error::RuleDisabled);
        }
        if room.active_event.is_some() {
            return Err(Error::EventAlreadyActive);
        }

        let kind = ChallengeKind::random(rng);
        let event = ActiveEvent::new(rule_id, kind, SystemTime::now());
        for player in &mut room.players {
            player.last_reaction_time = None;
        }
        room.active_event = Some(event.clone());
        self.repository.set(room);

        tracing::info!(room = %code, rule = %rule_id, ?kind, "event triggered");

        Ok(event)
    }

    /// Records a player's safety tap
    ///
    /// Taps after the alert window, from a player who already completed the
    /// challenge, or repeated taps are ignored.
    ///
    /// # Errors
    ///
    /// * `Error::RoomNotFound` - No room has this code
    /// * `Error::NoActiveEvent` - No event is running
    /// * `Error::PlayerNotFound` - The player is not in the room
    pub fn submit_safety_tap(&mut self, code: RoomCode, player_id: Id) -> Result<bool> {
        let mut room = self.load(code)?;
        let now = SystemTime::now();
        let window = self.options.duration(Timer::SafetyWindow);

        let finished = room
            .player(player_id)
            .ok_or(Error::PlayerNotFound)?
            .has_finished();
        let event = room.active_event.as_mut().ok_or(Error::NoActiveEvent)?;

        if finished || event.is_finalized() || !event.accepts_safety_tap(now, window) {
            tracing::debug!(room = %code, player = %player_id, "safety tap ignored");
            return Ok(false);
        }
        if !event.record_safety_tap(player_id, now) {
            tracing::debug!(room = %code, player = %player_id, "duplicate safety tap");
            return Ok(false);
        }

        self.repository.set(room);
        Ok(true)
    }

    /// Records that a player completed the challenge
    ///
    /// Safe players have nothing to complete; their submissions are ignored,
    /// as are repeats and submissions while the alert window is still open.
    ///
    /// # Errors
    ///
    /// * `Error::RoomNotFound` - No room has this code
    /// * `Error::NoActiveEvent` - No event is running
    /// * `Error::PlayerNotFound` - The player is not in the room
    pub fn submit_challenge_completion(&mut self, code: RoomCode, player_id: Id) -> Result<bool> {
        let mut room = self.load(code)?;
        let now = SystemTime::now();
        let window = self.options.duration(Timer::SafetyWindow);

        let event = room.active_event.as_ref().ok_or(Error::NoActiveEvent)?;
        let ignored = event.is_safe(player_id)
            || event.is_finalized()
            || event.accepts_safety_tap(now, window);

        let player = room.player_mut(player_id).ok_or(Error::PlayerNotFound)?;
        if ignored || !player.record_completion(now) {
            tracing::debug!(room = %code, player = %player_id, "completion ignored");
            return Ok(false);
        }

        self.repository.set(room);
        Ok(true)
    }

    /// Commits the result of the running event
    ///
    /// `loser` of `None` commits an all-safe result. A loser must be one of
    /// the players who did not tap safe. Once a result is committed, later
    /// calls return it unchanged.
    ///
    /// # Errors
    ///
    /// * `Error::RoomNotFound` - No room has this code
    /// * `Error::NotHost` - `actor` is not the host
    /// * `Error::NoActiveEvent` - No event is running
    /// * `Error::PlayerNotFound` - `loser` is not in the room
    /// * `Error::PlayerSafe` - `loser` tapped safe
    pub fn finalize_event(&mut self, code: RoomCode, actor: Id, loser: Option<Id>) -> Result<Outcome> {
        let mut room = self.load(code)?;
        Self::require_host(&room, actor)?;

        let event = room.active_event.as_ref().ok_or(Error::NoActiveEvent)?;
        if let Some(outcome) = event.outcome() {
            tracing::debug!(room = %code, "event already finalized");
            return Ok(outcome);
        }
        let exempt = loser.is_some_and(|id| event.is_safe(id))
            || resolver::participants(&room.players, event).next().is_none();

        let outcome = match loser {
            None => Outcome::AllSafe,
            Some(_) if exempt => {
                tracing::warn!(room = %code, "rejected a safe player as loser");
                return Err(Error::PlayerSafe);
            }
            Some(id) => {
                let player = room.player_mut(id).ok_or(Error::PlayerNotFound)?;
                player.score += 1;
                Outcome::Loser {
                    id,
                    finished: player.has_finished(),
                }
            }
        };

        if let Some(event) = room.active_event.as_mut() {
            event.commit(outcome);
        }
        self.repository.set(room);

        tracing::info!(room = %code, loser = ?outcome.loser(), "event finalized");

        Ok(outcome)
    }

    /// Adjudicates the running event from the stored state and commits it
    ///
    /// # Errors
    ///
    /// Same as [`Self::finalize_event`].
    pub fn resolve_event(&mut self, code: RoomCode, actor: Id) -> Result<Outcome> {
        let room = self.load(code)?;
        Self::require_host(&room, actor)?;
        let event = room.active_event.as_ref().ok_or(Error::NoActiveEvent)?;

        let outcome = event
            .outcome()
            .unwrap_or_else(|| resolver::resolve(&room.players, event));

        self.finalize_event(code, actor, outcome.loser())
    }

    /// Starts a quiz from the question pool
    ///
    /// # Errors
    ///
    /// * `Error::RoomNotFound` - No room has this code
    /// * `Error::NotHost` - `actor` is not the host
    /// * `Error::QuizNotFound` - The pool has no quiz with this id
    /// * `Error::QuizAlreadyActive` - Another quiz is still running
    pub fn trigger_quiz(&mut self, code: RoomCode, actor: Id, quiz_id: &str) -> Result<()> {
        let mut room = self.load(code)?;
        Self::require_host(&room, actor)?;

        if self.quiz(quiz_id).is_none() {
            return Err(Error::QuizNotFound);
        }
        if room.active_quiz.is_some() {
            return Err(Error::QuizAlreadyActive);
        }

        room.active_quiz = Some(ActiveQuiz::new(quiz_id, SystemTime::now()));
        self.repository.set(room);

        tracing::info!(room = %code, quiz = quiz_id, "quiz triggered");

        Ok(())
    }

    /// Starts a quiz drawn uniformly from the pool
    ///
    /// Returns the id of the drawn quiz.
    ///
    /// # Errors
    ///
    /// Same as [`Self::trigger_quiz`]; an empty pool is `Error::QuizNotFound`.
    pub fn trigger_random_quiz(
        &mut self,
        code: RoomCode,
        actor: Id,
        rng: &mut fastrand::Rng,
    ) -> Result<String> {
        if self.quizzes.is_empty() {
            return Err(Error::QuizNotFound);
        }
        let quiz_id = self.quizzes[rng.usize(..self.quizzes.len())].id.clone();
        self.trigger_quiz(code, actor, &quiz_id)?;
        Ok(quiz_id)
    }

    /// Records a player's quiz answer, first answer only
    ///
    /// # Errors
    ///
    /// * `Error::RoomNotFound` - No room has this code
    /// * `Error::NoActiveQuiz` - No quiz is running
    /// * `Error::PlayerNotFound` - The player is not in the room
    /// * `Error::QuizNotFound` - The running quiz is not in the pool
    /// * `Error::InvalidOption` - `index` is out of range
    pub fn submit_quiz_answer(&mut self, code: RoomCode, player_id: Id, index: usize) -> Result<bool> {
        let mut room = self.load(code)?;
        if room.player(player_id).is_none() {
            return Err(Error::PlayerNotFound);
        }
        let active = room.active_quiz.as_mut().ok_or(Error::NoActiveQuiz)?;
        let quiz = self
            .quizzes
            .iter()
            .find(|q| q.id == active.quiz_id)
            .ok_or(Error::QuizNotFound)?;
        if index >= quiz.options.len() {
            return Err(Error::InvalidOption);
        }

        if !active.record_answer(player_id, index) {
            tracing::debug!(room = %code, player = %player_id, "duplicate quiz answer");
            return Ok(false);
        }

        self.repository.set(room);
        Ok(true)
    }

    /// Ends the running event, leaving any quiz in place
    ///
    /// Completion times are reset. Does nothing if no event is running.
    ///
    /// # Errors
    ///
    /// * `Error::RoomNotFound` - No room has this code
    /// * `Error::NotHost` - `actor` is not the host
    pub fn clear_event(&mut self, code: RoomCode, actor: Id) -> Result<()> {
        let mut room = self.load(code)?;
        Self::require_host(&room, actor)?;

        if room.clear_event() {
            self.repository.set(room);
            tracing::info!(room = %code, "event cleared");
        }

        Ok(())
    }

    /// Ends the running quiz, leaving any event in place
    ///
    /// # Errors
    ///
    /// * `Error::RoomNotFound` - No room has this code
    /// * `Error::NotHost` - `actor` is not the host
    pub fn clear_quiz(&mut self, code: RoomCode, actor: Id) -> Result<()> {
        let mut room = self.load(code)?;
        Self::require_host(&room, actor)?;

        if room.clear_quiz() {
            self.repository.set(room);
            tracing::info!(room = %code, "quiz cleared");
        }

        Ok(())
    }

    /// Ends the running event and quiz
    ///
    /// Completion times are reset. Does nothing if neither is running.
    ///
    /// # Errors
    ///
    /// * `Error::RoomNotFound` - No room has this code
    /// * `Error::NotHost` - `actor` is not the host
    pub fn clear_active_state(&mut self, code: RoomCode, actor: Id) -> Result<()> {
        let mut room = self.load(code)?;
        Self::require_host(&room, actor)?;

        if room.clear_active_state() {
            self.repository.set(room);
            tracing::info!(room = %code, "active state cleared");
        }

        Ok(())
    }
}

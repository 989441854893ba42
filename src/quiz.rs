//! Host-triggered trivia quizzes
//!
//! A quiz runs for a fixed answering window. Every client keeps its own
//! countdown; when it reaches zero the client shows whether its answer was
//! right. Quiz answers never touch the score.

use std::collections::{HashMap, hash_map::Entry};

use garde::Validate;
use serde::{Deserialize, Serialize};
use web_time::{Duration, SystemTime};

use crate::{
    config::Timer,
    constants::quiz as limits,
    id::Id,
    repository::RoomRepository,
    room_code::RoomCode,
    service::RoomService,
    session::SessionStore,
};

fn within_options(options: &[String]) -> impl FnOnce(&usize, &()) -> garde::Result + '_ {
    move |index, _| {
        if *index < options.len() {
            Ok(())
        } else {
            Err(garde::Error::new("correct index is out of range"))
        }
    }
}

/// A multiple-choice trivia question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Quiz {
    /// Catalog identifier, e.g. "q1"
    #[garde(length(min = 1))]
    pub id: String,
    /// The question text
    #[garde(length(min = 1, max = limits::MAX_QUESTION_LENGTH))]
    pub question: String,
    /// Answer options in display order
    #[garde(
        length(min = limits::MIN_OPTION_COUNT, max = limits::MAX_OPTION_COUNT),
        inner(length(min = 1, max = limits::MAX_OPTION_LENGTH))
    )]
    pub options: Vec<String>,
    /// Index of the right option
    #[garde(custom(within_options(&self.options)))]
    pub correct_index: usize,
    /// Forfeit for a wrong answer, e.g. "Take 2 sips if wrong!"
    #[garde(length(max = limits::MAX_PENALTY_LENGTH))]
    pub penalty: String,
}

impl Quiz {
    /// Grades a player's selection
    pub fn feedback(&self, selected: Option<usize>) -> Feedback {
        match selected {
            None => Feedback::Unanswered,
            Some(index) if index == self.correct_index => Feedback::Correct,
            Some(_) => Feedback::Incorrect,
        }
    }

    /// The text of the right option
    pub fn correct_answer(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }
}

/// How a player did on a quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feedback {
    /// Picked the right option
    Correct,
    /// The penalty applies
    Incorrect,
    /// No answer before time ran out
    Unanswered,
}

/// The quiz currently running in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveQuiz {
    /// Which catalog quiz is running
    pub quiz_id: String,
    /// When the host triggered it
    pub start_time: SystemTime,
    #[serde(default)]
    answers: HashMap<Id, usize>,
}

impl ActiveQuiz {
    /// Starts a quiz with no answers
    pub fn new(quiz_id: impl Into<String>, start_time: SystemTime) -> Self {
        Self {
            quiz_id: quiz_id.into(),
            start_time,
            answers: HashMap::new(),
        }
    }

    /// The option `player` picked, if any
    pub fn answer(&self, player: Id) -> Option<usize> {
        self.answers.get(&player).copied()
    }

    /// Number of players who answered
    pub fn answer_count(&self) -> usize {
        self.answers.len()
    }

    /// Records an answer, keeping only the first one per player
    ///
    /// Returns `true` if the answer was recorded.
    pub fn record_answer(&mut self, player: Id, index: usize) -> bool {
        match self.answers.entry(player) {
            Entry::Occupied(_) => false,
            Entry::Vacant(v) => {
                v.insert(index);
                true
            }
        }
    }
}

/// Timer callbacks of a [`QuizView`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// The answering window is over
    TimeUp {
        /// Start time of the quiz this alarm belongs to
        started: SystemTime,
    },
    /// The result screen is over
    Dismiss {
        /// Start time of the quiz this alarm belongs to
        started: SystemTime,
    },
}

/// One client's view of the active quiz
#[derive(Debug, Clone)]
pub struct QuizView {
    code: RoomCode,
    player_id: Id,
    is_host: bool,
    quiz: Quiz,
    started: SystemTime,
    selected: Option<usize>,
    showing_result: bool,
    dismissed: bool,
}

impl QuizView {
    /// Opens the view over the room's active quiz
    ///
    /// Returns `None` if the room has no quiz running or the quiz is not in
    /// the catalog.
    pub fn open<R, S>(
        service: &RoomService<R>,
        code: RoomCode,
        player_id: Id,
        mut schedule: S,
    ) -> Option<Self>
    where
        R: RoomRepository + SessionStore,
        S: FnMut(crate::AlarmMessage, Duration),
    {
        let room = service.room(code)?;
        let active = room.active_quiz.as_ref()?;
        let quiz = service.quiz(&active.quiz_id)?.clone();

        schedule(
            AlarmMessage::TimeUp {
                started: active.start_time,
            }
            .into(),
            service.options().duration(Timer::QuizAnswering),
        );

        Some(Self {
            code,
            player_id,
            is_host: room.is_host(player_id),
            quiz,
            started: active.start_time,
            selected: active.answer(player_id),
            showing_result: false,
            dismissed: false,
        })
    }

    /// The question being asked
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    /// The option this player picked
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Whether the result screen is up
    pub fn is_showing_result(&self) -> bool {
        self.showing_result
    }

    /// Whether the view has closed
    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    /// Whole seconds left to answer after `elapsed`
    pub fn remaining(&self, elapsed: Duration, answering: Duration) -> u64 {
        answering.as_secs().saturating_sub(elapsed.as_secs())
    }

    /// The grade shown on the result screen
    pub fn feedback(&self) -> Option<Feedback> {
        self.showing_result
            .then(|| self.quiz.feedback(self.selected))
    }

    /// Picks an option
    ///
    /// Only the first pick counts, and only before time is up. Returns
    /// `true` if the pick was taken.
    pub fn select<R>(&mut self, service: &mut RoomService<R>, index: usize) -> bool
    where
        R: RoomRepository + SessionStore,
    {
        if self.selected.is_some() || self.showing_result || index >= self.quiz.options.len() {
            return false;
        }
        match service.submit_quiz_answer(self.code, self.player_id, index) {
            Ok(_) => {
                self.selected = Some(index);
                true
            }
            Err(error) => {
                tracing::debug!(%error, "quiz answer rejected");
                false
            }
        }
    }

    /// Handles one of this view's alarms
    ///
    /// Alarms from an earlier quiz are ignored.
    pub fn receive_alarm<R, S>(
        &mut self,
        service: &mut RoomService<R>,
        message: &AlarmMessage,
        mut schedule: S,
    ) where
        R: RoomRepository + SessionStore,
        S: FnMut(crate::AlarmMessage, Duration),
    {
        match *message {
            AlarmMessage::TimeUp { started } if started == self.started => {
                if self.showing_result || self.dismissed {
                    return;
                }
                self.showing_result = true;
                schedule(
                    AlarmMessage::Dismiss { started }.into(),
                    service.options().duration(Timer::QuizResultsDisplay),
                );
            }
            AlarmMessage::Dismiss { started } if started == self.started => {
                if !self.showing_result || self.dismissed {
                    return;
                }
                self.dismissed = true;
                if self.is_host {
                    if let Err(error) = service.clear_quiz(self.code, self.player_id) {
                        tracing::warn!(%error, "failed to clear quiz");
                    }
                }
            }
            _ => (),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{
        catalog,
        repository::MemoryDirectory,
        room::{GameMode, Sport},
    };
    use web_time::UNIX_EPOCH;

    fn create_test_quiz() -> Quiz {
        Quiz {
            id: "q".to_string(),
            question: "Best sport?".to_string(),
            options: vec!["Golf".to_string(), "Rugby".to_string(), "Soccer".to_string()],
            correct_index: 2,
            penalty: "Take 1 sip if wrong!".to_string(),
        }
    }

    #[test]
    fn test_quiz_validation() {
        assert!(create_test_quiz().validate().is_ok());

        let mut quiz = create_test_quiz();
        quiz.correct_index = 3;
        assert!(quiz.validate().is_err());

        let mut quiz = create_test_quiz();
        quiz.options.truncate(1);
        quiz.correct_index = 0;
        assert!(quiz.validate().is_err());

        let mut quiz = create_test_quiz();
        quiz.options[0] = String::new();
        assert!(quiz.validate().is_err());
    }

    #[test]
    fn test_feedback() {
        let quiz = create_test_quiz();
        assert_eq!(quiz.feedback(Some(2)), Feedback::Correct);
        assert_eq!(quiz.feedback(Some(0)), Feedback::Incorrect);
        assert_eq!(quiz.feedback(None), Feedback::Unanswered);
        assert_eq!(quiz.correct_answer(), Some("Soccer"));
    }

    #[test]
    fn test_only_first_answer_counts() {
        let mut active = ActiveQuiz::new("q1", UNIX_EPOCH);
        let player = Id::new();

        assert!(active.record_answer(player, 1));
        assert!(!active.record_answer(player, 2));
        assert_eq!(active.answer(player), Some(1));
        assert_eq!(active.answer_count(), 1);
    }

    #[test]
    fn test_remaining_counts_down() {
        let mut service = RoomService::new(MemoryDirectory::default());
        let room = service
            .create_room("Host", Sport::Soccer, GameMode::Drinking)
            .unwrap();
        let host = room.players[0].id;
        service.trigger_quiz(room.code, host, "q1").unwrap();

        let view = QuizView::open(&service, room.code, host, |_, _| {}).unwrap();
        let answering = Duration::from_secs(15);
        assert_eq!(view.remaining(Duration::ZERO, answering), 15);
        assert_eq!(view.remaining(Duration::from_millis(1_500), answering), 14);
        assert_eq!(view.remaining(Duration::from_secs(20), answering), 0);
    }

    #[test]
    fn test_quiz_round() {
        let mut service = RoomService::new(MemoryDirectory::default());
        let room = service
            .create_room("Host", Sport::Basketball, GameMode::Drinking)
            .unwrap();
        let host = room.players[0].id;
        let guest = service.join_room(room.code.as_str(), "Guest").unwrap();
        let guest = guest.players[1].id;

        service.trigger_quiz(room.code, host, "q1").unwrap();
        let quiz = catalog::sample_quizzes().remove(0);

        let mut alarms = Vec::new();
        let mut host_view =
            QuizView::open(&service, room.code, host, |m, d| alarms.push((m, d))).unwrap();
        let mut guest_view =
            QuizView::open(&service, room.code, guest, |m, d| alarms.push((m, d))).unwrap();
        assert_eq!(alarms.len(), 2);
        assert_eq!(alarms[0].1, Duration::from_secs(15));

        assert!(host_view.select(&mut service, quiz.correct_index));
        assert!(!host_view.select(&mut service, 0));
        assert!(guest_view.select(&mut service, 0));
        assert_eq!(host_view.feedback(), None);

        let crate::AlarmMessage::Quiz(time_up) = alarms[0].0 else {
            panic!("expected a quiz alarm");
        };
        alarms.clear();
        host_view.receive_alarm(&mut service, &time_up, |m, d| alarms.push((m, d)));
        guest_view.receive_alarm(&mut service, &time_up, |m, d| alarms.push((m, d)));
        assert_eq!(host_view.feedback(), Some(Feedback::Correct));
        assert_eq!(guest_view.feedback(), Some(Feedback::Incorrect));
        assert!(!guest_view.select(&mut service, 1));
        assert_eq!(alarms[0].1, Duration::from_secs(5));

        // scores are untouched by quizzes
        let snapshot = service.room(room.code).unwrap();
        assert!(snapshot.players.iter().all(|p| p.score == 0));

        let crate::AlarmMessage::Quiz(dismiss) = alarms[0].0 else {
            panic!("expected a quiz alarm");
        };
        guest_view.receive_alarm(&mut service, &dismiss, |_, _| {});
        assert!(service.room(room.code).unwrap().active_quiz.is_some());
        host_view.receive_alarm(&mut service, &dismiss, |_, _| {});
        assert!(host_view.is_dismissed());
        assert!(service.room(room.code).unwrap().active_quiz.is_none());
    }

    #[test]
    fn test_dismiss_keeps_running_event() {
        let mut service = RoomService::new(MemoryDirectory::default());
        let room = service
            .create_room("Host", Sport::Soccer, GameMode::Drinking)
            .unwrap();
        let host = room.players[0].id;
        let rule = room.rules.iter().next().unwrap().id;

        service.trigger_quiz(room.code, host, "q1").unwrap();
        let mut rng = fastrand::Rng::with_seed(8);
        service
            .trigger_event(room.code, host, rule, &mut rng)
            .unwrap();
        service.options = service
            .options()
            .clone()
            .with_duration(Timer::SafetyWindow, Duration::ZERO);
        assert_eq!(service.submit_challenge_completion(room.code, host), Ok(true));

        let mut alarms = Vec::new();
        let mut view =
            QuizView::open(&service, room.code, host, |m, d| alarms.push((m, d))).unwrap();
        let crate::AlarmMessage::Quiz(time_up) = alarms[0].0 else {
            panic!("expected a quiz alarm");
        };
        alarms.clear();
        view.receive_alarm(&mut service, &time_up, |m, d| alarms.push((m, d)));
        let crate::AlarmMessage::Quiz(dismiss) = alarms[0].0 else {
            panic!("expected a quiz alarm");
        };
        view.receive_alarm(&mut service, &dismiss, |_, _| {});

        let room = service.room(room.code).unwrap();
        assert!(room.active_quiz.is_none());
        assert!(room.active_event.is_some());
        assert!(room.player(host).unwrap().has_finished());
    }

    #[test]
    fn test_unanswered_and_stale_alarms() {
        let mut service = RoomService::new(MemoryDirectory::default());
        let room = service
            .create_room("Host", Sport::Golf, GameMode::Kids)
            .unwrap();
        let host = room.players[0].id;
        service.trigger_quiz(room.code, host, "q2").unwrap();

        let mut view = QuizView::open(&service, room.code, host, |_, _| {}).unwrap();

        let stale = AlarmMessage::TimeUp {
            started: UNIX_EPOCH,
        };
        view.receive_alarm(&mut service, &stale, |_, _| {});
        assert!(!view.is_showing_result());

        let started = service
            .room(room.code)
            .unwrap()
            .active_quiz
            .unwrap()
            .start_time;
        view.receive_alarm(&mut service, &AlarmMessage::TimeUp { started }, |_, _| {});
        assert_eq!(view.feedback(), Some(Feedback::Unanswered));
    }
}

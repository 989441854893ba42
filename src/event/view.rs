//! One client's walk through an event
//!
//! Every client runs its own view over the shared ledger: a safety window,
//! then either a resting screen or a challenge, then the results. Timers are
//! requested through a `schedule` callback and delivered back through
//! [`EventView::receive_alarm`]. Only the host's view writes the outcome and
//! dismisses the event.

use serde::{Deserialize, Serialize};
use web_time::{Duration, SystemTime};

use crate::{
    config::Timer,
    id::Id,
    repository::RoomRepository,
    room_code::RoomCode,
    service::RoomService,
    session::SessionStore,
};

use super::{
    challenge::{Challenge, ChallengeKind},
    resolver::{self, Outcome},
};

/// Timer callbacks of an [`EventView`]
///
/// Each carries the start time of its event so alarms outliving their event
/// are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// The safety window closed
    AlertElapsed {
        /// Start time of the event this alarm belongs to
        started: SystemTime,
    },
    /// Time to adjudicate and show the results
    ShowResults {
        /// Start time of the event this alarm belongs to
        started: SystemTime,
    },
    /// The results screen is over
    Dismiss {
        /// Start time of the event this alarm belongs to
        started: SystemTime,
    },
}

/// Screen the view is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Safety window is open
    Alert,
    /// Resting or playing the challenge
    Challenge,
    /// Outcome is on screen
    Results,
    /// The view is closed
    Dismissed,
}

/// One client's view of the active event
#[derive(Debug, Clone)]
pub struct EventView {
    code: RoomCode,
    player_id: Id,
    is_host: bool,
    started: SystemTime,
    kind: ChallengeKind,
    phase: Phase,
    safe: bool,
    challenge: Option<Challenge>,
    completed: bool,
    outcome: Option<Outcome>,
    finalized: bool,
}

impl EventView {
    /// Opens the view over the room's active event and starts the safety
    /// window
    ///
    /// Returns `None` if no event is running.
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
        let event = room.active_event.as_ref()?;

        schedule(
            AlarmMessage::AlertElapsed {
                started: event.start_time,
            }
            .into(),
            service.options().duration(Timer::SafetyWindow),
        );

        Some(Self {
            code,
            player_id,
            is_host: room.is_host(player_id),
            started: event.start_time,
            kind: event.challenge_kind,
            phase: Phase::Alert,
            safe: event.is_safe(player_id),
            challenge: None,
            completed: room.player(player_id).is_some_and(|p| p.has_finished()),
            outcome: None,
            finalized: false,
        })
    }

    /// The current screen
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Whether this player tapped safe in time
    pub fn is_safe(&self) -> bool {
        self.safe
    }

    /// This player's challenge, once the safety window closed
    pub fn challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    /// Whether this player completed the challenge
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// The outcome on the results screen
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Whether this player lost the event
    pub fn is_loser(&self) -> bool {
        self.outcome
            .and_then(|o| o.loser())
            .is_some_and(|id| id == self.player_id)
    }

    /// Seconds shown on the alert countdown after `elapsed`
    pub fn safety_countdown(&self, elapsed: Duration, window: Duration) -> u64 {
        window.as_secs().saturating_sub(elapsed.as_secs())
    }

    /// Taps the safety button
    ///
    /// Returns `true` if this tap was recorded. The view is safe afterwards
    /// whenever the ledger lists this player, including a tap recorded
    /// earlier from another device.
    pub fn tap_safe<R>(&mut self, service: &mut RoomService<R>) -> bool
    where
        R: RoomRepository + SessionStore,
    {
        if self.phase != Phase::Alert || self.safe {
            return false;
        }
        let recorded = match service.submit_safety_tap(self.code, self.player_id) {
            Ok(recorded) => recorded,
            Err(error) => {
                tracing::debug!(%error, "safety tap rejected");
                false
            }
        };
        self.safe = service
            .room(self.code)
            .and_then(|room| room.active_event)
            .filter(|event| event.start_time == self.started)
            .is_some_and(|event| event.is_safe(self.player_id));
        recorded
    }

    /// Taps a shape on the board
    ///
    /// Returns `true` if this tap completed the challenge.
    pub fn tap_shape<R, S>(&mut self, service: &mut RoomService<R>, id: u32, schedule: S) -> bool
    where
        R: RoomRepository + SessionStore,
        S: FnMut(crate::AlarmMessage, Duration),
    {
        let hit = self
            .challenge
            .as_ref()
            .is_some_and(|c| c.completes_with_shape(id));
        hit && self.complete(service, schedule)
    }

    /// Picks an option of the quiz challenge
    ///
    /// Returns `true` if this pick completed the challenge.
    pub fn choose_option<R, S>(
        &mut self,
        service: &mut RoomService<R>,
        index: usize,
        schedule: S,
    ) -> bool
    where
        R: RoomRepository + SessionStore,
        S: FnMut(crate::AlarmMessage, Duration),
    {
        let correct = self
            .challenge
            .as_ref()
            .is_some_and(|c| c.completes_with_option(index));
        correct && self.complete(service, schedule)
    }

    fn complete<R, S>(&mut self, service: &mut RoomService<R>, mut schedule: S) -> bool
    where
        R: RoomRepository + SessionStore,
        S: FnMut(crate::AlarmMessage, Duration),
    {
        if self.phase != Phase::Challenge || self.completed {
            return false;
        }
        match service.submit_challenge_completion(self.code, self.player_id) {
            Ok(true) => {
                self.completed = true;
                schedule(
                    AlarmMessage::ShowResults {
                        started: self.started,
                    }
                    .into(),
                    service.options().duration(Timer::Completion),
                );
                true
            }
            Ok(false) => false,
            Err(error) => {
                tracing::debug!(%error, "completion rejected");
                false
            }
        }
    }

    /// Handles one of this view's alarms
    ///
    /// Alarms from another event or for a phase already left are ignored.
    pub fn receive_alarm<R, S>(
        &mut self,
        service: &mut RoomService<R>,
        message: &AlarmMessage,
        rng: &mut fastrand::Rng,
        mut schedule: S,
    ) where
        R: RoomRepository + SessionStore,
        S: FnMut(crate::AlarmMessage, Duration),
    {
        match *message {
            AlarmMessage::AlertElapsed { started } if started == self.started => {
                if self.phase != Phase::Alert {
                    return;
                }
                self.phase = Phase::Challenge;
                if self.safe {
                    schedule(
                        AlarmMessage::ShowResults { started }.into(),
                        service.options().duration(Timer::Resting),
                    );
                } else {
                    self.challenge = Some(Challenge::generate(
                        self.kind,
                        rng,
                        service.options().decoy_count(),
                        service.quizzes(),
                    ));
                }
            }
            AlarmMessage::ShowResults { started } if started == self.started => {
                if self.phase != Phase::Challenge {
                    return;
                }
                self.show_results(service);
                if self.phase == Phase::Results {
                    schedule(
                        AlarmMessage::Dismiss { started }.into(),
                        service.options().duration(Timer::ResultsDisplay),
                    );
                }
            }
            AlarmMessage::Dismiss { started } if started == self.started => {
                if self.phase != Phase::Results {
                    return;
                }
                self.phase = Phase::Dismissed;
                if self.is_host {
                    if let Err(error) = service.clear_event(self.code, self.player_id) {
                        tracing::warn!(%error, "failed to clear event");
                    }
                }
            }
            _ => (),
        }
    }

    fn show_results<R>(&mut self, service: &mut RoomService<R>)
    where
        R: RoomRepository + SessionStore,
    {
        let Some(room) = service.room(self.code) else {
            self.phase = Phase::Dismissed;
            return;
        };
        let Some(event) = room
            .active_event
            .as_ref()
            .filter(|e| e.start_time == self.started)
        else {
            self.phase = Phase::Dismissed;
            return;
        };

        let mut outcome = event
            .outcome()
            .unwrap_or_else(|| resolver::resolve(&room.players, event));

        if self.is_host && !self.finalized {
            self.finalized = true;
            match service.finalize_event(self.code, self.player_id, outcome.loser()) {
                Ok(committed) => outcome = committed,
                Err(error) => tracing::warn!(%error, "failed to finalize event"),
            }
        }

        self.outcome = Some(outcome);
        self.phase = Phase::Results;
    }
}

//! Room storage and change notification
//!
//! The repository is the shared store every client reads rooms from. Reads
//! hand out owned snapshots; every write notifies the subscribed observers
//! so views can re-read.

use std::{collections::HashMap, fmt::Debug};

use crate::{
    room::{Room, RoomPatch},
    room_code::RoomCode,
    session::{Session, SessionStore},
};

/// Callback invoked after every write
pub trait Observer {
    /// Signals that stored state changed
    fn notify(&self);
}

impl<F: Fn()> Observer for F {
    fn notify(&self) {
        self();
    }
}

/// Handle returned by [`RoomRepository::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Trait for the shared room store
pub trait RoomRepository {
    /// Reads a snapshot of a room
    fn get(&self, code: RoomCode) -> Option<Room>;

    /// Stores a room under its code, replacing any previous version
    fn set(&mut self, room: Room);

    /// Deletes a room, returning its last version
    fn remove(&mut self, code: RoomCode) -> Option<Room>;

    /// Whether a room is stored under `code`
    fn contains(&self, code: RoomCode) -> bool {
        self.get(code).is_some()
    }

    /// Registers an observer for writes
    fn subscribe(&mut self, observer: Box<dyn Observer>) -> Subscription;

    /// Removes an observer
    ///
    /// Returns `false` if the subscription was unknown.
    fn unsubscribe(&mut self, subscription: Subscription) -> bool;

    /// Shallow-merges `patch` into a stored room
    ///
    /// Returns `false` if no room is stored under `code`.
    fn update(&mut self, code: RoomCode, patch: RoomPatch) -> bool {
        let Some(mut room) = self.get(code) else {
            return false;
        };
        patch.apply(&mut room);
        self.set(room);
        true
    }
}

/// In-memory store keeping rooms as JSON documents
///
/// Rooms round-trip through JSON on every access, so a snapshot never
/// aliases stored state.
#[derive(Default)]
pub struct MemoryDirectory {
    rooms: HashMap<RoomCode, String>,
    session: Option<Session>,
    observers: Vec<(Subscription, Box<dyn Observer>)>,
    next_subscription: u64,
}

impl Debug for MemoryDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDirectory")
            .field("rooms", &self.rooms.len())
            .field("session", &self.session)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}

impl MemoryDirectory {
    /// Number of stored rooms
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether no room is stored
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    fn notify_all(&self) {
        for (_, observer) in &self.observers {
            observer.notify();
        }
    }
}

impl RoomRepository for MemoryDirectory {
    fn get(&self, code: RoomCode) -> Option<Room> {
        let json = self.rooms.get(&code)?;
        match serde_json::from_str(json) {
            Ok(room) => Some(room),
            Err(error) => {
                tracing::warn!(%code, %error, "stored room is unreadable");
                None
            }
        }
    }

    fn set(&mut self, room: Room) {
        match serde_json::to_string(&room) {
            Ok(json) => {
                self.rooms.insert(room.code, json);
                self.notify_all();
            }
            Err(error) => {
                tracing::warn!(code = %room.code, %error, "failed to store room");
            }
        }
    }

    fn remove(&mut self, code: RoomCode) -> Option<Room> {
        let json = self.rooms.remove(&code)?;
        self.notify_all();
        serde_json::from_str(&json).ok()
    }

    fn contains(&self, code: RoomCode) -> bool {
        self.rooms.contains_key(&code)
    }

    fn subscribe(&mut self, observer: Box<dyn Observer>) -> Subscription {
        let subscription = Subscription(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((subscription, observer));
        subscription
    }

    fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(s, _)| *s != subscription);
        self.observers.len() != before
    }
}

impl SessionStore for MemoryDirectory {
    fn current_session(&self) -> Option<Session> {
        self.session
    }

    fn set_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    fn clear_session(&mut self) {
        if self.session.take().is_some() {
            self.notify_all();
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;
    use crate::{
        id::Id,
        player::Player,
        room::{GameMode, Sport, Status},
        rule::RuleSet,
    };

    fn create_test_room(code: &str) -> Room {
        Room::new(
            code.parse().unwrap(),
            Sport::Rugby,
            GameMode::Kids,
            RuleSet::default(),
            Player::new("Host".to_string(), true),
        )
    }

    #[test]
    fn test_set_and_get() {
        let mut directory = MemoryDirectory::default();
        let room = create_test_room("ABCD");
        directory.set(room.clone());

        assert_eq!(directory.get(room.code), Some(room.clone()));
        assert!(directory.contains(room.code));
        assert_eq!(directory.len(), 1);
        assert!(directory.get("ZZZZ".parse().unwrap()).is_none());
    }

    #[test]
    fn test_snapshots_are_independent() {
        let mut directory = MemoryDirectory::default();
        let room = create_test_room("ABCD");
        directory.set(room.clone());

        let mut snapshot = directory.get(room.code).unwrap();
        snapshot.status = Status::Ended;
        assert_eq!(directory.get(room.code).unwrap().status, Status::Lobby);
    }

    #[test]
    fn test_update_merges_patch() {
        let mut directory = MemoryDirectory::default();
        let room = create_test_room("ABCD");
        directory.set(room.clone());

        assert!(directory.update(
            room.code,
            RoomPatch {
                status: Some(Status::Playing),
                ..Default::default()
            }
        ));
        let stored = directory.get(room.code).unwrap();
        assert_eq!(stored.status, Status::Playing);
        assert_eq!(stored.sport, Sport::Rugby);

        assert!(!directory.update("ZZZZ".parse().unwrap(), RoomPatch::default()));
    }

    #[test]
    fn test_writes_notify_observers() {
        let mut directory = MemoryDirectory::default();
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let subscription = directory.subscribe(Box::new(move || counter.set(counter.get() + 1)));

        let room = create_test_room("ABCD");
        directory.set(room.clone());
        directory.update(room.code, RoomPatch::default());
        assert_eq!(count.get(), 2);

        // reads do not notify
        directory.get(room.code);
        assert_eq!(count.get(), 2);

        assert!(directory.unsubscribe(subscription));
        assert!(!directory.unsubscribe(subscription));
        directory.remove(room.code);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_remove() {
        let mut directory = MemoryDirectory::default();
        let room = create_test_room("ABCD");
        directory.set(room.clone());

        assert_eq!(directory.remove(room.code), Some(room.clone()));
        assert!(directory.remove(room.code).is_none());
        assert!(directory.is_empty());
    }

    #[test]
    fn test_session() {
        let mut directory = MemoryDirectory::default();
        assert!(directory.current_session().is_none());

        let session = Session {
            room_code: "ABCD".parse().unwrap(),
            player_id: Id::new(),
        };
        directory.set_session(session);
        assert_eq!(directory.current_session(), Some(session));

        directory.clear_session();
        assert!(directory.current_session().is_none());
    }
}

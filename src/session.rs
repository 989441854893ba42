//! Local session management
//!
//! Each client remembers which room it is in and which player it is. The
//! session survives a reload; leaving a room clears it.

use serde::{Deserialize, Serialize};

use crate::{id::Id, room_code::RoomCode};

/// The room and player this client acts as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The joined room
    pub room_code: RoomCode,
    /// This client's player in that room
    pub player_id: Id,
}

/// Trait for persisting the client's session
///
/// Implementations might use browser storage, a file, or plain memory.
pub trait SessionStore {
    /// The stored session, if any
    fn current_session(&self) -> Option<Session>;

    /// Replaces the stored session
    ///
    /// # Arguments
    ///
    /// * `session` - The session to remember
    fn set_session(&mut self, session: Session);

    /// Forgets the stored session
    fn clear_session(&mut self);
}

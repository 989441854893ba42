//! # Sportmix
//!
//! Core engine of a sports watch-party game. Players share a room; when
//! something happens on the pitch the host triggers one of the room's rules,
//! and everyone races to tap "safe" before a short window closes. Whoever
//! missed it plays a mini-game, and the slowest (or anyone who gave up) takes
//! the forfeit and a point on the shame leaderboard. The host can also run
//! trivia quizzes between plays.
//!
//! Rooms live in a [`repository::RoomRepository`]; every client acts on them
//! through a [`service::RoomService`] and renders the per-client
//! [`event::EventView`] and [`quiz::QuizView`] state machines.
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]

use derive_where::derive_where;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod config;
pub mod constants;
pub mod event;
pub mod id;
pub mod leaderboard;
pub mod names;
pub mod player;
pub mod quiz;
pub mod repository;
pub mod room;
pub mod room_code;
pub mod rule;
pub mod service;
pub mod session;

/// Alarm messages for the timed phases of events and quizzes
///
/// Views hand these to the host environment together with a delay; the
/// environment delivers them back when the delay elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::From, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Event view alarms
    Event(event::AlarmMessage),
    /// Quiz view alarms
    Quiz(quiz::AlarmMessage),
}

/// A list capped for display that still knows its full length
///
/// Used for standings: a room of 80 players shows the top 50 and "80
/// players".
#[derive(Debug, Clone, Serialize)]
#[derive_where(Default)]
pub struct TruncatedVec<T> {
    /// The exact total count of items
    exact_count: usize,
    /// Up to the limit of the first items
    items: Vec<T>,
}

impl<T: Clone> TruncatedVec<T> {
    /// Takes at most `limit` items from `list`
    ///
    /// # Arguments
    ///
    /// * `list` - An iterator over items to include
    /// * `limit` - Maximum number of items to keep
    /// * `exact_count` - The exact total count of items (may be larger than limit)
    pub fn new<I: Iterator<Item = T>>(list: I, limit: usize, exact_count: usize) -> Self {
        let items = list.take(limit).collect_vec();
        Self { exact_count, items }
    }

    /// Returns the exact count of items
    pub fn exact_count(&self) -> usize {
        self.exact_count
    }

    /// Returns the kept items
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

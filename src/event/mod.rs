//! Rule events: alert, challenge and results
//!
//! When the host triggers a rule, the room gets an [`ledger::ActiveEvent`].
//! Every client opens a [`view::EventView`] over it and walks the same three
//! phases independently. The outcome is a pure function of the ledger and
//! the roster ([`resolver::resolve`]); only the host commits it.

pub mod challenge;
pub mod ledger;
pub mod resolver;
pub mod view;

pub use challenge::{Challenge, ChallengeKind, ShapeField};
pub use ledger::ActiveEvent;
pub use resolver::Outcome;
pub use view::{AlarmMessage, EventView, Phase};

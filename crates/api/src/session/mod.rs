//! The quiz and poll mini-games. At most one of them runs at a time, owned by a
//! [`Lease`](crate::supervisor::Lease) from the [`Supervisor`](crate::supervisor::Supervisor).

mod poll;
mod quiz;
mod score;

pub use poll::{Ballot, Tally};
pub use quiz::{Quiz, Verdict};
pub use score::Scoreboard;

use alloc::boxed::Box;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Quiz,
    Poll,
}

/// Everything a running session reacts to, in arrival order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Chat input from a participant in the session's channel.
    Answer { user: Box<str>, text: Box<str> },
    /// Injected by the [`Timer`](crate::timer::Timer) once the armed duration elapses.
    Timeout { generation: u64 },
}

impl Event {
    pub fn answer(user: &str, text: &str) -> Self {
        Self::Answer { user: user.into(), text: text.into() }
    }
}

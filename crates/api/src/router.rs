use crate::{session::Event, supervisor::Supervisor};

/// Fate of a chat line that is not a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// Handed to the session running in the line's channel.
    Delivered,
    /// No session wanted it.
    Dropped,
}

/// Forwards ordinary chat to the running session of the same channel. Never waits on the
/// session: if it already exited, the line is simply dropped.
pub fn route(supervisor: &Supervisor, channel: &str, user: &str, text: &str) -> Route {
    if supervisor.deliver(channel, Event::answer(user, text)) {
        Route::Delivered
    } else {
        Route::Dropped
    }
}

use alloc::{boxed::Box, vec::Vec};

/// A registered chat user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub nick: Box<str>,
    /// IANA name such as `Europe/Lisbon`. Empty when unset.
    pub time_zone: Box<str>,
    /// Betting points, kept verbatim.
    pub points: Box<str>,
    /// Channels whose event reminders mention this user.
    pub channels: Vec<Box<str>>,
}

impl User {
    pub fn is(&self, nick: &str) -> bool {
        self.nick.eq_ignore_ascii_case(nick)
    }

    pub fn follows(&self, channel: &str) -> bool {
        self.channels.iter().any(|followed| followed.eq_ignore_ascii_case(channel))
    }

    /// Returns whether anything changed.
    pub fn subscribe(&mut self, channel: &str) -> bool {
        if self.follows(channel) {
            return false;
        }
        self.channels.push(channel.into());
        true
    }

    /// Returns whether anything changed.
    pub fn unsubscribe(&mut self, channel: &str) -> bool {
        let before = self.channels.len();
        self.channels.retain(|followed| !followed.eq_ignore_ascii_case(channel));
        self.channels.len() != before
    }
}

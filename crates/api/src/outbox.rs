use alloc::{boxed::Box, string::String};
use tokio::sync::mpsc;

/// A chat line waiting to be written by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Channel (or nick) that receives the line.
    pub target: Box<str>,
    pub text: String,
}

pub type Outbox = mpsc::UnboundedSender<Message>;

/// Writes lines into a single channel.
#[derive(Clone)]
pub struct Announcer {
    target: Box<str>,
    outbox: Outbox,
}

impl Announcer {
    pub fn new(target: &str, outbox: Outbox) -> Self {
        Self { target: target.into(), outbox }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn say(&self, text: impl Into<String>) {
        let message = Message { target: self.target.clone(), text: text.into() };
        if self.outbox.send(message).is_err() {
            log::warn!("outbox closed, dropping a line for {}", self.target);
        }
    }
}

use crate::session::{Event, Kind};
use alloc::{boxed::Box, sync::Arc};
use parking_lot::Mutex;
use tokio::sync::mpsc;

struct Active {
    kind: Kind,
    channel: Box<str>,
    /// Answer channel of the running session.
    answers: mpsc::UnboundedSender<Event>,
}

/// Process-wide record of the running session, if any.
#[derive(Default)]
pub struct Supervisor {
    active: Mutex<Option<Active>>,
}

impl Supervisor {
    /// Claims the session slot for `channel`. Returns `None` while another session is running,
    /// in which case nothing changes.
    pub fn try_start(self: &Arc<Self>, kind: Kind, channel: &str) -> Option<Lease> {
        let mut active = self.active.lock();
        if active.is_some() {
            return None;
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        *active = Some(Active { kind, channel: channel.into(), answers: sender.clone() });
        Some(Lease { supervisor: Arc::clone(self), sender, receiver })
    }

    /// Frees the session slot and closes the path from the router to the session.
    pub fn mark_ended(&self) {
        self.active.lock().take();
    }

    pub fn is_active(&self) -> bool {
        self.active.lock().is_some()
    }

    /// Kind and channel of the running session.
    pub fn status(&self) -> Option<(Kind, Box<str>)> {
        self.active.lock().as_ref().map(|active| (active.kind, active.channel.clone()))
    }

    /// Hands `event` to the session running in `channel` without waiting. Returns whether
    /// a session accepted it.
    pub fn deliver(&self, channel: &str, event: Event) -> bool {
        let active = self.active.lock();
        let Some(active) = active.as_ref() else {
            return false;
        };
        if !active.channel.eq_ignore_ascii_case(channel) {
            return false;
        }
        active.answers.send(event).is_ok()
    }
}

/// Exclusive ownership of the session slot. Dropping it ends the session.
pub struct Lease {
    supervisor: Arc<Supervisor>,
    sender: mpsc::UnboundedSender<Event>,
    receiver: mpsc::UnboundedReceiver<Event>,
}

impl Lease {
    pub async fn recv(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    /// A second handle into the answer channel, for the session's timer.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.sender.clone()
    }
}

impl Drop for Lease {
    fn drop(&mut self) {
        self.supervisor.mark_ended();
        self.receiver.close();
    }
}

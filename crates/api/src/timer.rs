use crate::session::Event;
use core::time::Duration;
use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant},
};

/// Stand-in deadline for durations too long to represent.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Injects [`Event::Timeout`] into a session's answer channel. At most one timeout is
/// outstanding. Every arming bumps the generation so that a timeout which was already in
/// flight when the timer got reset can be told apart from the current one.
pub struct Timer {
    events: mpsc::UnboundedSender<Event>,
    generation: u64,
    deadline: Option<Instant>,
    handle: Option<JoinHandle<()>>,
}

impl Timer {
    pub fn new(events: mpsc::UnboundedSender<Event>) -> Self {
        Self { events, generation: 0, deadline: None, handle: None }
    }

    /// Schedules a single timeout after `duration`, cancelling any pending one.
    pub fn arm(&mut self, duration: Duration) {
        self.stop();
        self.generation += 1;
        let generation = self.generation;
        let now = Instant::now();
        let deadline = now.checked_add(duration).unwrap_or_else(|| now + FAR_FUTURE);
        let events = self.events.clone();
        self.deadline = Some(deadline);
        self.handle = Some(tokio::spawn(async move {
            time::sleep_until(deadline).await;
            // The session may have exited in the meantime.
            let _ = events.send(Event::Timeout { generation });
        }));
    }

    pub fn reset(&mut self, duration: Duration) {
        self.arm(duration);
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.deadline = None;
    }

    /// Whether a timeout carrying `generation` belongs to the pending arming.
    pub fn is_current(&self, generation: u64) -> bool {
        self.deadline.is_some() && generation == self.generation
    }

    /// Time left until the pending timeout fires.
    pub fn remaining(&self) -> Duration {
        self.deadline.map(|deadline| deadline.saturating_duration_since(Instant::now())).unwrap_or_default()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::{Event, Timer};
    use core::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_duration() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = Timer::new(tx);
        timer.arm(Duration::from_secs(20));
        assert_eq!(timer.remaining(), Duration::from_secs(20));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(timer.remaining().as_secs_f64().round(), 15.0);
        assert!(rx.try_recv().is_err());

        let Some(Event::Timeout { generation }) = rx.recv().await else { panic!("expected a timeout") };
        assert!(timer.is_current(generation));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_invalidates_earlier_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = Timer::new(tx);
        timer.arm(Duration::from_secs(1));
        let Some(Event::Timeout { generation: stale }) = rx.recv().await else { panic!("expected a timeout") };

        timer.reset(Duration::from_secs(10));
        assert!(!timer.is_current(stale));

        tokio::time::sleep(Duration::from_secs(4)).await;
        timer.reset(Duration::from_secs(10));
        let Some(Event::Timeout { generation }) = rx.recv().await else { panic!("expected a timeout") };
        assert!(timer.is_current(generation));
        assert_eq!(generation, stale + 2);
    }

    #[tokio::test(start_paused = true)]
    async fn huge_duration_saturates() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = Timer::new(tx);
        timer.arm(Duration::MAX);
        assert!(timer.remaining() > Duration::from_secs(86400 * 365));

        tokio::time::sleep(Duration::from_secs(86400)).await;
        assert!(rx.try_recv().is_err());
        timer.reset(Duration::from_secs(1));
        assert!(matches!(rx.recv().await, Some(Event::Timeout { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_timeout() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = Timer::new(tx);
        timer.arm(Duration::from_secs(1));
        timer.stop();
        assert_eq!(timer.remaining(), Duration::ZERO);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
        drop(timer);
        assert!(rx.recv().await.is_none());
    }
}

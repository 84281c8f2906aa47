use super::Event;
use crate::{outbox::Announcer, supervisor::Lease, timer::Timer};
use alloc::{boxed::Box, collections::BTreeMap, vec, vec::Vec};
use core::time::Duration;
use model::Poll;

/// Outcome of a single option.
#[derive(Clone, Debug, PartialEq)]
pub struct Tally<'poll> {
    /// 1-based option index.
    pub index: usize,
    pub option: &'poll str,
    pub count: usize,
    /// Share of all votes, from 0 to 100.
    pub percent: f64,
}

/// A poll accepting votes until its single timeout fires. Each participant keeps only their
/// latest valid vote.
pub struct Ballot {
    poll: Poll,
    votes: BTreeMap<Box<str>, usize>,
}

impl Ballot {
    pub fn new(poll: Poll) -> Self {
        Self { poll, votes: BTreeMap::new() }
    }

    pub fn poll(&self) -> &Poll {
        &self.poll
    }

    /// Records `text` as the vote of `user` if it names an option. Returns whether it did.
    pub fn vote(&mut self, user: &str, text: &str) -> bool {
        let Some(vote) = self.poll.vote(text) else {
            return false;
        };
        self.votes.insert(user.into(), vote);
        true
    }

    pub fn total(&self) -> usize {
        self.votes.len()
    }

    /// Options that received at least one vote, in option order. Empty without votes.
    pub fn results(&self) -> Vec<Tally<'_>> {
        let mut counts = vec![0usize; self.poll.options.len()];
        for &vote in self.votes.values() {
            counts[vote - 1] += 1;
        }

        let total = self.total() as f64;
        self.poll
            .options
            .iter()
            .zip(counts)
            .zip(1..)
            .filter(|((_, count), _)| *count > 0)
            .map(|((option, count), index)| Tally { index, option, count, percent: count as f64 / total * 100.0 })
            .collect()
    }

    /// Collects votes until the timeout, then announces the results.
    pub async fn run(mut self, mut lease: Lease, chat: Announcer, timeout: Duration) {
        chat.say(alloc::format!("Poll: {} ({} seconds to vote)", self.poll.prompt, timeout.as_secs()));
        for (option, index) in self.poll.options.iter().zip(1..) {
            chat.say(alloc::format!("{index}. {option}"));
        }

        let mut timer = Timer::new(lease.sender());
        timer.arm(timeout);
        while let Some(event) = lease.recv().await {
            match event {
                Event::Answer { user, text } => {
                    self.vote(&user, &text);
                }
                Event::Timeout { generation } if timer.is_current(generation) => break,
                Event::Timeout { .. } => continue,
            }
        }

        timer.stop();
        chat.say("The Poll has ended.");
        let results = self.results();
        if !results.is_empty() {
            chat.say("Results:");
            for Tally { index, option, percent, .. } in results {
                chat.say(alloc::format!("{index}. {option} - {percent:.2}% votes"));
            }
        }

        log::info!("poll in {} finished with {} vote(s)", chat.target(), self.total());
        drop(lease);
    }
}

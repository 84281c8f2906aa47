use super::{Event, Scoreboard};
use crate::{outbox::Announcer, supervisor::Lease, timer::Timer};
use alloc::{boxed::Box, vec::Vec};
use core::time::Duration;
use model::Question;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Wrong,
}

/// A quiz of several rounds. Each round ends on a correct answer or a timeout, never on a
/// wrong answer.
pub struct Quiz {
    questions: Vec<Question>,
    index: usize,
    scores: Scoreboard,
}

impl Quiz {
    /// Plays at most `rounds` of the given questions in order. Returns `None` when there is
    /// nothing to ask.
    pub fn new(mut questions: Vec<Question>, rounds: usize) -> Option<Self> {
        questions.truncate(rounds);
        if questions.is_empty() {
            return None;
        }
        Some(Self { questions, index: 0, scores: Scoreboard::default() })
    }

    pub fn rounds(&self) -> usize {
        self.questions.len()
    }

    /// Zero-based index of the current round.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&Question> {
        self.questions.get(self.index)
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.questions.len()
    }

    pub fn scores(&self) -> &Scoreboard {
        &self.scores
    }

    /// Judges a participant's answer. Only a correct answer advances the round.
    pub fn answer(&mut self, user: &str, text: &str) -> Option<Verdict> {
        if !self.current()?.accepts(text) {
            return Some(Verdict::Wrong);
        }
        self.scores.credit(user);
        self.index += 1;
        Some(Verdict::Correct)
    }

    /// Closes the current round unanswered. Returns the answer that nobody found.
    pub fn expire(&mut self) -> Option<Box<str>> {
        let answer = self.current()?.answer.clone();
        self.index += 1;
        Some(answer)
    }

    fn announce_question(&self, chat: &Announcer, timer: &Timer) {
        let Some(question) = self.current() else {
            return;
        };
        let remaining = timer.remaining().as_secs_f64();
        chat.say(alloc::format!(
            "{}/{} - {} ({remaining:.0} seconds remaining)",
            self.index + 1,
            self.rounds(),
            question.prompt,
        ));
    }

    /// Plays the quiz to completion, reading answers and timeouts from the lease.
    pub async fn run(mut self, mut lease: Lease, chat: Announcer, timeout: Duration) {
        let mut timer = Timer::new(lease.sender());
        timer.arm(timeout);
        self.announce_question(&chat, &timer);

        while let Some(event) = lease.recv().await {
            match event {
                Event::Answer { user, text } => match self.answer(&user, &text) {
                    Some(Verdict::Correct) => {
                        chat.say("Correct!");
                        timer.reset(timeout);
                    }
                    Some(Verdict::Wrong) => chat.say("Wrong!"),
                    None => break,
                },
                Event::Timeout { generation } if timer.is_current(generation) => {
                    let Some(answer) = self.expire() else { break };
                    chat.say(alloc::format!("Time's up... The correct answer was: {answer}"));
                    timer.reset(timeout);
                }
                Event::Timeout { generation } => {
                    log::debug!("ignoring stale quiz timeout #{generation} in {}", chat.target());
                    continue;
                }
            }

            if self.is_finished() {
                break;
            }
            self.announce_question(&chat, &timer);
        }

        timer.stop();
        chat.say("The quiz is over!");
        chat.say("Score:");
        for (user, points) in self.scores.ranking() {
            chat.say(alloc::format!("{user} - {points}"));
        }

        log::info!("quiz in {} finished after {} round(s)", chat.target(), self.index);
        drop(lease);
    }
}

use alloc::boxed::Box;

/// A single row of the question pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    /// Question to be displayed in chat.
    pub prompt: Box<str>,
    /// Expected answer. Matching ignores case and surrounding whitespace.
    pub answer: Box<str>,
    /// Channel that owns this question. Untagged questions may be asked anywhere.
    pub channel: Option<Box<str>>,
}

impl Question {
    pub fn new(prompt: &str, answer: &str) -> Self {
        Self { prompt: prompt.into(), answer: answer.into(), channel: None }
    }

    /// Whether this question may be drawn for a quiz running in `channel`.
    pub fn is_eligible(&self, channel: &str) -> bool {
        self.channel.as_deref().map_or(true, |owner| owner.eq_ignore_ascii_case(channel))
    }

    /// Whether `text` counts as the correct answer.
    pub fn accepts(&self, text: &str) -> bool {
        let expected = self.answer.trim();
        let given = text.trim();
        expected.eq_ignore_ascii_case(given) || expected.to_lowercase() == given.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::Question;

    #[test]
    fn answers_ignore_case_and_padding() {
        let question = Question::new("Who won in 1994?", "Schumacher");
        assert!(question.accepts("schumacher"));
        assert!(question.accepts("  SCHUMACHER "));
        assert!(!question.accepts("Hill"));
        assert!(!question.accepts(""));
    }

    #[test]
    fn non_ascii_answers_ignore_case() {
        let question = Question::new("Where is the Nürburgring?", "Nürburg");
        assert!(question.accepts("NÜRBURG"));
    }

    #[test]
    fn channel_partitioning() {
        let mut question = Question::new("2+2?", "4");
        assert!(question.is_eligible("#motorsport"));
        question.channel = Some("#formula1".into());
        assert!(question.is_eligible("#Formula1"));
        assert!(!question.is_eligible("#motorsport"));
    }
}

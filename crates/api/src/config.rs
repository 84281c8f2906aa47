use core::time::Duration;

/// Timing and sizing knobs of the interactive sessions.
#[derive(Clone, Debug)]
pub struct Config {
    /// How long each quiz question stays open.
    pub quiz_timeout: Duration,
    /// How long a poll accepts votes.
    pub poll_timeout: Duration,
    /// Rounds played when the request names no valid count.
    pub default_rounds: usize,
    /// Largest round count a request may ask for.
    pub max_rounds: usize,
    /// How often the event calendar is checked for sessions about to start.
    pub reminder_period: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quiz_timeout: Duration::from_secs(20),
            poll_timeout: Duration::from_secs(60),
            default_rounds: 5,
            max_rounds: 10,
            reminder_period: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Resolves the round count of a quiz request. Anything that is not an integer in
    /// `1..=max_rounds` falls back to the default.
    pub fn rounds(&self, requested: Option<&str>) -> usize {
        requested
            .and_then(|count| count.trim().parse().ok())
            .filter(|count| (1..=self.max_rounds).contains(count))
            .unwrap_or(self.default_rounds)
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn round_count_resolution() {
        let config = Config::default();
        assert_eq!(config.rounds(None), 5);
        assert_eq!(config.rounds(Some("1")), 1);
        assert_eq!(config.rounds(Some("10")), 10);
        assert_eq!(config.rounds(Some("0")), 5);
        assert_eq!(config.rounds(Some("11")), 5);
        assert_eq!(config.rounds(Some("-3")), 5);
        assert_eq!(config.rounds(Some("lots")), 5);
    }
}

use anyhow::Context;
use core::{str::FromStr, time::Duration};
use std::{env, path::PathBuf};

/// Longest quiz question or poll the bot will run.
const MAX_TIMEOUT_SECS: u64 = 3600;

/// Runtime configuration read from the environment.
pub struct Settings {
    /// `host:port` of the IRC server.
    pub server: Box<str>,
    pub nick: Box<str>,
    pub channels: Vec<Box<str>>,
    /// Folder holding the CSV tables.
    pub data_dir: PathBuf,
    /// Pause after every outbound chat line to stay below flood limits.
    pub send_delay: Duration,
    /// Pause before dialing again after the connection drops.
    pub reconnect_delay: Duration,
    pub sessions: api::Config,
}

struct Source<F>(F);

impl<F> Source<F>
where
    F: Fn(&str) -> Result<String, env::VarError>,
{
    fn var_or<T>(&self, key: &str, default: T) -> anyhow::Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match (self.0)(key) {
            Ok(value) => value.trim().parse().with_context(|| format!("invalid value for {key}")),
            Err(env::VarError::NotPresent) => Ok(default),
            Err(err) => Err(err).with_context(|| format!("cannot read {key}")),
        }
    }

    fn timeout_or(&self, key: &str, default: Duration) -> anyhow::Result<Duration> {
        let secs = self.var_or(key, default.as_secs())?;
        anyhow::ensure!((1..=MAX_TIMEOUT_SECS).contains(&secs), "{key} must be between 1 and {MAX_TIMEOUT_SECS} seconds");
        Ok(Duration::from_secs(secs))
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_source(|key| env::var(key))
    }

    fn from_source<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let source = Source(var);
        let server = source.var_or("IRC_SERVER", String::from("irc.quakenet.org:6667"))?.into_boxed_str();
        let nick = source.var_or("IRC_NICK", String::from("Schumacher"))?.into_boxed_str();
        let channels = source
            .var_or("IRC_CHANNELS", String::from("#motorsport"))?
            .split(',')
            .map(str::trim)
            .filter(|channel| !channel.is_empty())
            .map(Box::from)
            .collect();
        let data_dir = (source.0)("DATA_DIR").context("DATA_DIR must point to the folder of CSV tables")?.into();
        let send_delay = Duration::from_millis(source.var_or("SEND_DELAY_MS", 1000)?);
        let reconnect_delay = Duration::from_secs(source.var_or("RECONNECT_DELAY", 30)?);

        let defaults = api::Config::default();
        let quiz_timeout = source.timeout_or("QUIZ_TIMEOUT", defaults.quiz_timeout)?;
        let poll_timeout = source.timeout_or("POLL_TIMEOUT", defaults.poll_timeout)?;

        Ok(Self {
            server,
            nick,
            channels,
            data_dir,
            send_delay,
            reconnect_delay,
            sessions: api::Config { quiz_timeout, poll_timeout, ..defaults },
        })
    }
}

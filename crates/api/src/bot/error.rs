use core::fmt::{self, Display};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// Not one of ours. Ignored without a reply.
    UnknownCommandName,
    /// A quiz or poll is already running. Ignored without a reply.
    Busy,
    PollUsage,
    QuoteUsage,
    AskUsage,
    /// The question pool holds nothing for this channel.
    NoQuestions,
    /// The question pool could not be read.
    Questions,
    NoQuotes,
    Quotes,
    AddQuote,
    NoAnswers,
    Answers,
    NoEvent,
    Users,
    UpdateUsers,
    NotRegistered,
    NotifyUsage,
}

impl Error {
    /// Whether the error is answered with silence.
    pub const fn is_silent(&self) -> bool {
        matches!(self, Self::UnknownCommandName | Self::Busy)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UnknownCommandName => "Unknown command name.",
            Self::Busy => "A quiz or poll is already running.",
            Self::PollUsage => "Syntax: !poll question;option 1;option 2;option n",
            Self::QuoteUsage => "Usage: !quote [get|add] [text]",
            Self::AskUsage => "Usage: !ask <question>",
            Self::NoQuestions => "No quiz questions available for this channel.",
            Self::Questions => "Error reading questions.",
            Self::NoQuotes => "No quotes available.",
            Self::Quotes => "Error getting quote.",
            Self::AddQuote => "Error adding quote.",
            Self::NoAnswers => "No answers available.",
            Self::Answers => "Error getting answer.",
            Self::NoEvent => "No event found.",
            Self::Users => "Error getting users.",
            Self::UpdateUsers => "Error updating users.",
            Self::NotRegistered => "You're not a registered user.",
            Self::NotifyUsage => "Usage: !notify [on|off]",
        })
    }
}

pub type Result<T> = core::result::Result<T, Error>;

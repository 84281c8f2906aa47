use alloc::{boxed::Box, format, string::String};
use chrono::{DateTime, Utc};

const FORMULA_1: &str = "[Formula 1]";

/// A scheduled session of some motorsport series.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    /// Bracketed series tag such as `[Formula 1]`.
    pub category: Box<str>,
    pub name: Box<str>,
    /// Session type such as `Race` or `Qualifying`.
    pub session: Box<str>,
    pub start: DateTime<Utc>,
    /// Channel that receives the start reminder.
    pub channel: Box<str>,
    pub link: Option<Box<str>>,
    /// Whether subscribers of the channel are mentioned in the reminder.
    pub notify: bool,
}

impl Event {
    pub fn title(&self) -> String {
        format!("{} {} {}", self.category, self.name, self.session)
    }
}

/// Which events `!next` looks at. An unset field matches anything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Search {
    pub category: Option<Box<str>>,
    pub session: Option<Box<str>>,
}

impl Search {
    /// Expands the shorthands users type after `!next`. Unknown terms name a category.
    pub fn parse(text: &str) -> Self {
        let text = text.trim().to_lowercase();
        let (category, session) = match text.as_str() {
            "" => return Self::default(),
            "f1" | "formula1" => (FORMULA_1, None),
            "f2" | "formula2" => ("[Formula 2]", None),
            "f3" | "formula3" => ("[Formula 3]", None),
            "q" | "quali" | "qualy" | "qualifier" | "qualifying" => (FORMULA_1, Some("Qualifying")),
            "r" | "race" => (FORMULA_1, Some("Race")),
            "s" | "sprint" => (FORMULA_1, Some("Sprint Race")),
            _ => return Self { category: Some(format!("[{text}]").into()), session: None },
        };
        Self { category: Some(category.into()), session: session.map(Box::from) }
    }

    pub fn matches(&self, event: &Event) -> bool {
        fn field(filter: Option<&str>, value: &str) -> bool {
            filter.map_or(true, |filter| filter.eq_ignore_ascii_case(value))
        }
        field(self.category.as_deref(), &event.category) && field(self.session.as_deref(), &event.session)
    }

    /// The earliest matching event that has not started before `now`.
    pub fn first<'ev>(&self, events: &'ev [Event], now: DateTime<Utc>) -> Option<&'ev Event> {
        events.iter().filter(|event| event.start >= now && self.matches(event)).min_by_key(|event| event.start)
    }
}

use alloc::{boxed::Box, vec::Vec};

/// A poll parsed from a `prompt;option 1;option 2;...` payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poll {
    pub prompt: Box<str>,
    /// Options in display order. Votes refer to them by 1-based index.
    pub options: Vec<Box<str>>,
}

impl Poll {
    /// Parses the payload of a poll command. Blank options are skipped. Returns `None` when
    /// the prompt is blank or no option remains.
    pub fn parse(payload: &str) -> Option<Self> {
        let mut fields = payload.split(';').map(str::trim);
        let prompt = fields.next().filter(|prompt| !prompt.is_empty())?;
        let options: Vec<Box<str>> = fields.filter(|option| !option.is_empty()).map(Box::from).collect();
        if options.is_empty() {
            return None;
        }
        Some(Self { prompt: prompt.into(), options })
    }

    /// Interprets chat input as a vote. Returns the 1-based option index.
    pub fn vote(&self, text: &str) -> Option<usize> {
        let vote: usize = text.trim().parse().ok()?;
        (1..=self.options.len()).contains(&vote).then_some(vote)
    }

    /// Looks up an option by its 1-based index.
    pub fn option(&self, vote: usize) -> Option<&str> {
        let index = vote.checked_sub(1)?;
        self.options.get(index).map(AsRef::as_ref)
    }
}

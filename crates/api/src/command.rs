use alloc::vec::Vec;

/// Marks a chat line as a command.
pub const PREFIX: char = '!';

/// A chat line of the form `!name arg1 arg2 ...`.
#[derive(Debug, PartialEq, Eq)]
pub struct Command<'txt> {
    /// Command name without the prefix, as typed.
    pub name: &'txt str,
    pub args: Vec<&'txt str>,
}

impl<'txt> Command<'txt> {
    /// Returns `None` for ordinary chat. A lone prefix is chat, but anything longer that starts
    /// with it is a command, even one with an empty name such as `! quiz`.
    pub fn parse(text: &'txt str) -> Option<Self> {
        let text = text.trim().strip_prefix(PREFIX).filter(|rest| !rest.is_empty())?;
        let (name, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
        Some(Self { name, args: rest.split_whitespace().collect() })
    }
}

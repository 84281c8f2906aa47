use alloc::string::String;
use serde::{Deserialize, Serialize};

/// Row of the quotes table, stored as `date,text`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Quote {
    /// Day the quote was added, formatted as `dd-mm-yyyy`.
    pub date: String,
    pub text: String,
}

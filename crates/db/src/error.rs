use core::fmt::{self, Display};
use std::io::{self, ErrorKind};

#[derive(Debug)]
pub enum Error {
    /// The requested table does not exist.
    NotFound,
    /// The table exists but could not be parsed.
    Malformed,
    /// Unexpected I/O failure.
    Io,
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        if err.kind() == ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        match err.into_kind() {
            csv::ErrorKind::Io(err) => err.into(),
            _ => Self::Malformed,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "Table not found.",
            Self::Malformed => "Table contains malformed records.",
            Self::Io => "Unexpected I/O error while accessing a table.",
        })
    }
}

pub type Result<T> = core::result::Result<T, Error>;

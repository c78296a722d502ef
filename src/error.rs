use std::error::Error;
use std::fmt;

/// Custom Error and Result types to unify errors from all sources.
pub type BoardResult<T> = Result<T, BoardError>;

#[derive(Debug)]
pub enum BoardError {
    Http(String),
    Store(String),
    Server(String),
    Parse,
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BoardError::Http(s) => write!(f, "HTTP Error: {}", s),
            BoardError::Store(s) => write!(f, "Store Error: {}", s),
            BoardError::Server(s) => write!(f, "Server Error: {}", s),
            BoardError::Parse => write!(f, "Parse Error"),
        }
    }
}

impl Error for BoardError {}

impl From<reqwest::Error> for BoardError {
    fn from(error: reqwest::Error) -> Self {
        BoardError::Http(error.to_string())
    }
}

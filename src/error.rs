use thiserror::Error;

/// Errors raised while building feeds or talking to a feed's endpoint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server answered {code}: {body}")]
    Status { code: u16, body: String },
    #[error("unsupported feed type '{0}'")]
    UnsupportedType(String),
    #[error("no feed named '{0}'")]
    UnknownFeed(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        FeedError::Transport(e.to_string())
    }
}

pub type FeedResult<T> = std::result::Result<T, FeedError>;

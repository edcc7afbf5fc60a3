use crate::config::ConfigError;
use feedsocket::FeedSocketError;
use thiserror::Error;

/// Errors raised inside the live news client
///
/// None of these escape the public client operations: they are logged or
/// surfaced as [`NewsEvent::Error`](crate::NewsEvent::Error).
#[derive(Error, Debug)]
pub enum NewsError {
    #[error("Failed to decode message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid WebSocket URL: {0}")]
    InvalidUrl(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] FeedSocketError),
}

pub type Result<T> = std::result::Result<T, NewsError>;

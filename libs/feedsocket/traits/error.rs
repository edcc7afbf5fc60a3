use thiserror::Error;

/// Main error type for feedsocket
#[derive(Error, Debug)]
pub enum FeedSocketError {
    /// WebSocket transport error (handshake, read or write)
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Message parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// The session task is gone and can no longer accept commands
    #[error("Channel send error: {0}")]
    ChannelSend(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic error
    #[error("Error: {0}")]
    Other(String),
}

/// Result type for feedsocket operations
pub type Result<T> = std::result::Result<T, FeedSocketError>;

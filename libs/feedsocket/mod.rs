//! # FeedSocket
//!
//! A reconnecting WebSocket session for server-pushed data feeds.
//!
//! ## Features
//!
//! - **Type-state builder**: URL and router are enforced at compile time
//! - **Ordered dispatch**: frames are parsed and handled inline, in arrival order
//! - **Lifecycle hooks**: connect, disconnect, retry and give-up transitions
//! - **Keep-alive**: optional periodic payload while connected
//! - **Pluggable reconnection**: exponential backoff with a retry budget, or none

pub mod core;
pub mod traits;

// Re-export all traits
pub use traits::*;

// Re-export core client functionality
pub use self::core::{
    builder, client, config, connection_state, heartbeat,
    builder::{states, RoutingBuilder, WebSocketClientBuilder},
    client::{ClientEvent, Metrics, WebSocketClient, NORMAL_CLOSE_CODE},
    config::ClientConfig,
    connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState},
};

// Convenience function
pub use self::core::builder as client_builder;

/// Type alias for Result with FeedSocketError
pub type Result<T> = std::result::Result<T, traits::FeedSocketError>;

//! # FeedSocket Traits
//!
//! Core traits and types for the feedsocket WebSocket session library:
//!
//! - **MessageRouter**: Parse incoming frames and pick a route
//! - **MessageHandler**: Consume typed messages for one route
//! - **LifecycleHandler**: Observe connect/disconnect/retry transitions
//! - **ReconnectionStrategy**: Control reconnection behavior

pub mod error;
pub mod lifecycle;
pub mod message;
pub mod reconnect;
pub mod router;

// Re-export commonly used types
pub use error::{FeedSocketError, Result};
pub use lifecycle::{LifecycleHandler, NoOpLifecycle};
pub use message::WsMessage;
pub use reconnect::{ExponentialBackoff, NeverReconnect, ReconnectionStrategy};
pub use router::{MessageHandler, MessageRouter};

//! # FeedSocket core
//!
//! The session task, its builder and the state it shares with the handle.
//!
//! ## Example
//!
//! ```rust,ignore
//! use feedsocket::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = feedsocket::builder()
//!         .url("wss://api.example.com/feed")
//!         .router(FeedRouter, |routing| {
//!             routing
//!                 .handler(Route::Data, DataHandler::new())
//!                 .handler(Route::Control, ControlHandler::new())
//!         })
//!         .lifecycle(StatusTracker::default())
//!         .heartbeat(Duration::from_secs(30), WsMessage::Text(r#"{"type":"ping"}"#.into()))
//!         .reconnect_strategy(ExponentialBackoff::new(
//!             Duration::from_secs(1),
//!             Duration::from_secs(60),
//!             Some(5),
//!         ))
//!         .build()?;
//!
//!     client.send(WsMessage::Text(r#"{"type":"subscribe"}"#.into()))?;
//!
//!     client.shutdown().await
//! }
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod connection_state;
pub mod heartbeat;

// Re-export main types
pub use builder::{states, RoutingBuilder, WebSocketClientBuilder};
pub use client::{ClientEvent, Metrics, WebSocketClient, NORMAL_CLOSE_CODE};
pub use config::{ClientConfig, RouteTable};
pub use connection_state::{AtomicConnectionState, AtomicMetrics, ConnectionState};
pub use heartbeat::Heartbeat;

// Re-export traits for convenience
pub use crate::traits::*;

/// Create a new WebSocket client builder
pub fn builder() -> WebSocketClientBuilder<builder::states::NoUrl, builder::states::NoRouter> {
    WebSocketClientBuilder::new()
}

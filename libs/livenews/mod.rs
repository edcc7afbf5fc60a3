//! # Live News
//!
//! Streaming client for the dashboard's live news feed.
//!
//! One [`LiveNewsClient`] keeps a single WebSocket to the backend open,
//! keeps it alive with periodic pings, reconnects with exponential backoff
//! after abnormal closes, caches the latest article lists and fans every
//! change out to subscribers as a typed [`NewsEvent`].
//!
//! ```rust,ignore
//! use livenews::{EventKind, LiveNewsClient, LiveNewsConfig, NewsEvent};
//! use std::sync::Arc;
//!
//! let client = Arc::new(LiveNewsClient::new(LiveNewsConfig::default()));
//! client.on(EventKind::BreakingNewsUpdated, |event| {
//!     if let NewsEvent::BreakingNewsUpdated(articles) = event {
//!         println!("{} breaking stories", articles.len());
//!     }
//! });
//! client.connect(Some("session-token"));
//! ```

pub mod article;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod message;
pub mod router;
pub mod status;

pub use article::{Article, HIGH_PRIORITY_THRESHOLD};
pub use cache::NewsCache;
pub use client::LiveNewsClient;
pub use config::{ConfigError, LiveNewsConfig, TOKEN_ENV};
pub use error::{NewsError, Result};
pub use events::{EventBus, EventKind, ListenerId, NewsEvent};
pub use logging::init_tracing;
pub use message::{InboundMessage, OutboundMessage};
pub use router::{MAX_RECONNECT_ERROR, TRANSPORT_ERROR};
pub use status::ConnectionStatus;

// Session types surfaced by the client API
pub use feedsocket::{ConnectionState, Metrics};

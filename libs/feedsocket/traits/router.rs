//! Message Routing System
//!
//! Every data frame read from the socket goes through the router, which turns
//! it into a typed message and picks the handler that owns it.
//!
//! # Architecture
//!
//! ```text
//! WebSocket → Router::parse → Route Key → Handler::handle
//!                                  ↓
//!                         FeedHandler (route A)
//!                         ControlHandler (route B)
//! ```
//!
//! # Ordering Guarantees
//!
//! Parsing and handling run inline on the session task, one frame at a time.
//! A handler always observes messages in the order the transport delivered
//! them, across all route keys.

use crate::{Result, WsMessage};
use async_trait::async_trait;
use std::fmt::Debug;
use std::hash::Hash;

/// Message router that parses WebSocket messages and determines routing
///
/// The router has two responsibilities:
/// 1. Parse the raw WebSocket message into a typed message
/// 2. Extract a route key that determines which handler processes it
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// enum Route {
///     Data,
///     Control,
/// }
///
/// struct FeedRouter;
///
/// #[async_trait]
/// impl MessageRouter for FeedRouter {
///     type Message = FeedMessage;
///     type RouteKey = Route;
///
///     async fn parse(&self, message: WsMessage) -> Result<Self::Message> {
///         // Parse JSON and return typed message
///     }
///
///     fn route_key(&self, message: &Self::Message) -> Self::RouteKey {
///         match message {
///             FeedMessage::Update { .. } => Route::Data,
///             _ => Route::Control,
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait MessageRouter: Send + Sync + 'static {
    /// The parsed message type
    type Message: Send + Debug + 'static;

    /// The route key type (determines which handler processes the message)
    type RouteKey: Hash + Eq + Clone + Send + Sync + Debug + 'static;

    /// Parse a raw WebSocket message into a typed message
    ///
    /// A parse error is logged by the session and the frame is dropped; it
    /// never tears the connection down.
    async fn parse(&self, message: WsMessage) -> Result<Self::Message>;

    /// Extract the route key from a parsed message
    ///
    /// Should be a simple match/field access.
    fn route_key(&self, message: &Self::Message) -> Self::RouteKey;
}

/// Message handler that processes typed messages sequentially
///
/// Handlers are owned by the session task and called inline, so they must not
/// block for long. Errors are logged and the next message is processed as
/// usual.
pub trait MessageHandler<M>: Send + 'static
where
    M: Send + Debug + 'static,
{
    /// Handle a parsed message
    fn handle(&mut self, message: M) -> Result<()>;
}

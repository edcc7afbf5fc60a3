use crate::traits::*;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Handlers keyed by the route key their router produces
pub type RouteTable<R> = HashMap<
    <R as MessageRouter>::RouteKey,
    Box<dyn MessageHandler<<R as MessageRouter>::Message>>,
>;

/// Configuration for one WebSocket session
///
/// Built by the type-state builder and moved into the session task.
pub struct ClientConfig<R>
where
    R: MessageRouter,
{
    /// WebSocket URL (wss:// or ws://)
    pub(crate) url: String,

    /// Message router for parsing and routing messages
    pub(crate) router: R,

    /// Receives connect/disconnect/retry transitions
    pub(crate) lifecycle: Arc<dyn LifecycleHandler>,

    /// Optional heartbeat configuration (interval, payload)
    pub(crate) heartbeat: Option<(Duration, WsMessage)>,

    /// Reconnection strategy
    pub(crate) reconnect_strategy: Box<dyn ReconnectionStrategy>,

    /// Shutdown flag - when false, the session stops reconnecting and
    /// dispatching
    pub(crate) shutdown_flag: Arc<AtomicBool>,
}

impl<R> ClientConfig<R>
where
    R: MessageRouter,
{
    /// Get a reference to the URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Check if heartbeat is configured
    pub fn has_heartbeat(&self) -> bool {
        self.heartbeat.is_some()
    }

    /// True while the shutdown flag still allows the session to run
    #[inline]
    pub(crate) fn is_running(&self) -> bool {
        self.shutdown_flag.load(std::sync::atomic::Ordering::Acquire)
    }
}

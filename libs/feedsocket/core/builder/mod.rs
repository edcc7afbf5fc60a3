pub mod states;

use crate::client::WebSocketClient;
use crate::config::{ClientConfig, RouteTable};
use crate::traits::*;
use states::*;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

/// Type-state builder for WebSocketClient
///
/// The URL and the router are required; the compiler rejects `build()` until
/// both are set. Handlers are registered per route key while setting the
/// router.
pub struct WebSocketClientBuilder<U, Ro>
where
    U: UrlState,
    Ro: RouterState,
{
    _url_state: PhantomData<U>,
    url: Option<String>,
    routing: Ro,
    lifecycle: Option<Arc<dyn LifecycleHandler>>,
    heartbeat: Option<(Duration, WsMessage)>,
    reconnect_strategy: Option<Box<dyn ReconnectionStrategy>>,
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl WebSocketClientBuilder<NoUrl, NoRouter> {
    /// Create a new builder instance
    pub fn new() -> Self {
        Self {
            _url_state: PhantomData,
            url: None,
            routing: NoRouter,
            lifecycle: None,
            heartbeat: None,
            reconnect_strategy: None,
            shutdown_flag: None,
        }
    }
}

impl Default for WebSocketClientBuilder<NoUrl, NoRouter> {
    fn default() -> Self {
        Self::new()
    }
}

// URL setting
impl<Ro> WebSocketClientBuilder<NoUrl, Ro>
where
    Ro: RouterState,
{
    pub fn url(self, url: impl Into<String>) -> WebSocketClientBuilder<HasUrl, Ro> {
        WebSocketClientBuilder {
            _url_state: PhantomData,
            url: Some(url.into()),
            routing: self.routing,
            lifecycle: self.lifecycle,
            heartbeat: self.heartbeat,
            reconnect_strategy: self.reconnect_strategy,
            shutdown_flag: self.shutdown_flag,
        }
    }
}

/// Routing builder helper
///
/// Collects one handler per route key produced by the router.
pub struct RoutingBuilder<R>
where
    R: MessageRouter,
{
    handlers: RouteTable<R>,
}

impl<R> RoutingBuilder<R>
where
    R: MessageRouter,
{
    fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Add a handler for a specific route key (replaces any previous one)
    pub fn handler<H>(mut self, route_key: R::RouteKey, handler: H) -> Self
    where
        H: MessageHandler<R::Message>,
    {
        self.handlers.insert(route_key, Box::new(handler));
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

// Router setting
impl<U> WebSocketClientBuilder<U, NoRouter>
where
    U: UrlState,
{
    pub fn router<R, F>(self, router: R, configure_routing: F) -> WebSocketClientBuilder<U, Routed<R>>
    where
        R: MessageRouter,
        F: FnOnce(RoutingBuilder<R>) -> RoutingBuilder<R>,
    {
        let routing = configure_routing(RoutingBuilder::new());

        WebSocketClientBuilder {
            _url_state: PhantomData,
            url: self.url,
            routing: Routed {
                router,
                routes: routing.handlers,
            },
            lifecycle: self.lifecycle,
            heartbeat: self.heartbeat,
            reconnect_strategy: self.reconnect_strategy,
            shutdown_flag: self.shutdown_flag,
        }
    }
}

// Optional configuration methods
impl<U, Ro> WebSocketClientBuilder<U, Ro>
where
    U: UrlState,
    Ro: RouterState,
{
    /// Observe connect/disconnect/retry transitions
    pub fn lifecycle(mut self, handler: impl LifecycleHandler) -> Self {
        self.lifecycle = Some(Arc::new(handler));
        self
    }

    /// Send `payload` every `interval` while connected
    pub fn heartbeat(mut self, interval: Duration, payload: WsMessage) -> Self {
        self.heartbeat = Some((interval, payload));
        self
    }

    pub fn reconnect_strategy(mut self, strategy: impl ReconnectionStrategy + 'static) -> Self {
        self.reconnect_strategy = Some(Box::new(strategy));
        self
    }

    /// Set a custom shutdown flag for coordinated shutdown across components
    ///
    /// By default the client creates its own flag. When the flag is set to
    /// `false`, the session stops dispatching, does not reconnect and closes
    /// an open socket normally.
    ///
    /// # Example
    /// ```ignore
    /// let shutdown_flag = Arc::new(AtomicBool::new(true));
    ///
    /// let client = feedsocket::builder()
    ///     .url("wss://api.example.com")
    ///     .router(MyRouter, |routing| routing.handler(Route::Main, MyHandler))
    ///     .shutdown_flag(Arc::clone(&shutdown_flag))
    ///     .build()?;
    ///
    /// // Later, from anywhere:
    /// shutdown_flag.store(false, Ordering::Release);
    /// ```
    pub fn shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }
}

// Build method - only available when all required fields are set
impl<R> WebSocketClientBuilder<HasUrl, Routed<R>>
where
    R: MessageRouter,
{
    /// Spawn the session on the current tokio runtime
    ///
    /// Fails with [`FeedSocketError::Configuration`] when called outside a
    /// runtime.
    pub fn build(self) -> Result<WebSocketClient> {
        let url = self
            .url
            .ok_or_else(|| FeedSocketError::Configuration("URL must be set".to_string()))?;

        let reconnect_strategy = self.reconnect_strategy.unwrap_or_else(|| {
            Box::new(ExponentialBackoff::new(
                Duration::from_secs(1),
                Duration::from_secs(60),
                Some(10),
            ))
        });

        let config = ClientConfig {
            url,
            router: self.routing.router,
            lifecycle: self.lifecycle.unwrap_or_else(|| Arc::new(NoOpLifecycle)),
            heartbeat: self.heartbeat,
            reconnect_strategy,
            shutdown_flag: self
                .shutdown_flag
                .unwrap_or_else(|| Arc::new(AtomicBool::new(true))),
        };

        WebSocketClient::spawn(config, self.routing.routes)
    }
}

use crate::article::Article;
use crate::cache::{self, NewsCache};
use crate::config::LiveNewsConfig;
use crate::error::{NewsError, Result};
use crate::events::{EventBus, EventKind, ListenerId, NewsEvent};
use crate::message::OutboundMessage;
use crate::router::{ControlHandler, FeedHandler, LifecycleBridge, NewsRoute, NewsRouter};
use crate::status::ConnectionStatus;
use chrono::{DateTime, Utc};
use crossbeam_channel::Receiver;
use feedsocket::{ConnectionState, Metrics, WebSocketClient};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// State shared between the client handle and the session task
///
/// Writers update under the lock, take a snapshot, release the lock and only
/// then emit, so listeners never run with a lock held.
pub(crate) struct Shared {
    pub(crate) cache: RwLock<NewsCache>,
    pub(crate) status: RwLock<ConnectionStatus>,
    pub(crate) events: EventBus,
}

impl Shared {
    pub(crate) fn new() -> Self {
        Self {
            cache: RwLock::new(NewsCache::new()),
            status: RwLock::new(ConnectionStatus::default()),
            events: EventBus::new(),
        }
    }

    pub(crate) fn replace_news(&self, articles: Vec<Article>) {
        let snapshot = articles.clone();
        self.cache.write().replace_all(articles);
        self.events.emit(NewsEvent::NewsUpdated(snapshot));
    }

    pub(crate) fn replace_breaking(&self, articles: Vec<Article>) {
        let snapshot = articles.clone();
        self.cache.write().replace_breaking(articles);
        self.events.emit(NewsEvent::BreakingNewsUpdated(snapshot));
    }

    pub(crate) fn category_news(&self, category: String, articles: Vec<Article>) {
        self.events
            .emit(NewsEvent::CategoryNewsUpdated { category, articles });
    }

    pub(crate) fn record_update(&self, timestamp: String) {
        let status = self.modify_status(|status| status.record_update(timestamp));
        self.events.emit(NewsEvent::StatusChanged(status));
    }

    pub(crate) fn report_error(&self, message: impl Into<String>) {
        let message = message.into();
        let status = self.modify_status(|status| status.record_error(message.clone()));
        self.events.emit(NewsEvent::Error(message));
        self.events.emit(NewsEvent::StatusChanged(status));
    }

    pub(crate) fn mark_connected(&self, now: DateTime<Utc>) {
        let status = self.modify_status(|status| status.mark_connected(now));
        self.events.emit(NewsEvent::Connected);
        self.events.emit(NewsEvent::StatusChanged(status));
    }

    pub(crate) fn mark_disconnected(&self) {
        let status = self.modify_status(ConnectionStatus::mark_disconnected);
        self.events.emit(NewsEvent::Disconnected);
        self.events.emit(NewsEvent::StatusChanged(status));
    }

    fn modify_status(&self, update: impl FnOnce(&mut ConnectionStatus)) -> ConnectionStatus {
        let mut status = self.status.write();
        update(&mut status);
        status.clone()
    }
}

/// Client for the live news WebSocket feed
///
/// Owns at most one feedsocket session at a time. Every public operation is
/// infallible: failures are logged and surfaced as [`NewsEvent::Error`].
///
/// Must be used from within a tokio runtime; `connect()` outside one reports
/// an error event instead of connecting.
pub struct LiveNewsClient {
    config: LiveNewsConfig,
    shared: Arc<Shared>,
    session: Mutex<Option<WebSocketClient>>,
}

impl LiveNewsClient {
    pub fn new(config: LiveNewsConfig) -> Self {
        Self {
            config,
            shared: Arc::new(Shared::new()),
            session: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &LiveNewsConfig {
        &self.config
    }

    /// Open the feed, with `token` appended to the feed path
    ///
    /// Does nothing while a live session is connecting or connected. A session
    /// waiting out a reconnect delay is replaced at once, so a new token takes
    /// effect immediately. After a disconnect, a failed session or a session
    /// task that died, it starts over with a fresh retry budget.
    pub fn connect(&self, token: Option<&str>) {
        let outcome = {
            let mut session = self.session.lock();
            if let Some(current) = session.as_ref() {
                let state = current.connection_state();
                if current.is_finished() {
                    debug!(%state, "Previous session has ended, starting a new one");
                } else if matches!(state, ConnectionState::Connecting | ConnectionState::Connected) {
                    info!(%state, "Already connected to live news service");
                    return;
                } else if state == ConnectionState::Reconnecting {
                    info!("Replacing session that is waiting to reconnect");
                }
            }

            self.start_session(token).map(|client| {
                // Dropping the previous handle stops its session
                *session = Some(client);
            })
        };

        if let Err(e) = outcome {
            error!("Failed to connect to live news service: {}", e);
            self.shared.report_error(format!("Connection failed: {e}"));
        }
    }

    fn start_session(&self, token: Option<&str>) -> Result<WebSocketClient> {
        let url = self.config.endpoint_url(token)?;
        let ping = OutboundMessage::Ping.to_ws_message()?;

        info!(
            host = %self.config.host,
            path = %self.config.path,
            secure = self.config.secure,
            token = token.is_some(),
            "Connecting to live news service"
        );

        let shared = &self.shared;
        let client = feedsocket::builder()
            .url(url.as_str())
            .router(NewsRouter, |routing| {
                routing
                    .handler(NewsRoute::Feed, FeedHandler::new(Arc::clone(shared)))
                    .handler(NewsRoute::Control, ControlHandler::new(Arc::clone(shared)))
            })
            .lifecycle(LifecycleBridge::new(Arc::clone(shared)))
            .heartbeat(self.config.ping_interval(), ping)
            .reconnect_strategy(self.config.reconnect_strategy())
            .build()?;

        Ok(client)
    }

    /// Close the feed with the normal close code; no reconnect follows
    ///
    /// Emits `Disconnected` and `StatusChanged` if the connection was up.
    /// A no-op without a session.
    pub fn disconnect(&self) {
        let Some(session) = self.session.lock().take() else {
            debug!("disconnect() called without a session");
            return;
        };

        info!("Disconnecting from live news service");
        session.stop();
        drop(session);
        self.finish_disconnect();
    }

    /// Like [`disconnect`](Self::disconnect), then wait for the session task
    /// to finish
    pub async fn shutdown(&self) {
        let session = self.session.lock().take();
        let Some(session) = session else {
            return;
        };

        info!("Shutting down live news client");
        if let Err(e) = session.shutdown().await {
            warn!("Live news session did not shut down cleanly: {}", e);
        }
        self.finish_disconnect();
    }

    fn finish_disconnect(&self) {
        let was_connected = self.shared.status.read().is_connected;
        if was_connected {
            self.shared.mark_disconnected();
        }
    }

    /// Ask the server for the latest articles
    pub fn request_latest_news(&self) {
        self.send_request(OutboundMessage::RequestNews);
    }

    /// Ask the server to refresh its sources
    pub fn request_news_refresh(&self) {
        self.send_request(OutboundMessage::RefreshNews);
    }

    pub fn request_breaking_news(&self) {
        self.send_request(OutboundMessage::RequestBreakingNews);
    }

    pub fn request_category_news(&self, category: &str) {
        self.send_request(OutboundMessage::RequestCategoryNews {
            category: category.to_string(),
        });
    }

    /// Send now or not at all: requests are never queued for later
    fn send_request(&self, request: OutboundMessage) {
        let session = self.session.lock();
        let Some(client) = session.as_ref().filter(|client| client.is_connected()) else {
            debug!(?request, "Not connected, request dropped");
            return;
        };

        let sent = request
            .to_ws_message()
            .and_then(|message| client.send(message).map_err(NewsError::from));
        match sent {
            Ok(()) => debug!(?request, "Request sent"),
            Err(e) => warn!(?request, "Failed to send request: {}", e),
        }
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.shared.status.read().clone()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.session
            .lock()
            .as_ref()
            .map_or(ConnectionState::Disconnected, WebSocketClient::connection_state)
    }

    /// Same flag as `connection_status().is_connected`
    ///
    /// Flips to true together with the `Connected` event, slightly after the
    /// transport itself reports [`ConnectionState::Connected`].
    pub fn is_connected(&self) -> bool {
        self.shared.status.read().is_connected
    }

    /// Transport counters of the current session, if any
    pub fn metrics(&self) -> Option<Metrics> {
        self.session.lock().as_ref().map(WebSocketClient::metrics)
    }

    pub fn cached_news(&self) -> Vec<Article> {
        self.shared.cache.read().all().to_vec()
    }

    pub fn cached_breaking_news(&self) -> Vec<Article> {
        self.shared.cache.read().breaking().to_vec()
    }

    pub fn news_by_category(&self, category: &str) -> Vec<Article> {
        cache::by_category(self.shared.cache.read().all(), category)
    }

    pub fn news_by_sentiment(&self, sentiment: &str) -> Vec<Article> {
        cache::by_sentiment(self.shared.cache.read().all(), sentiment)
    }

    /// Cached articles with priority 3 or higher
    pub fn high_priority_news(&self) -> Vec<Article> {
        cache::high_priority(self.shared.cache.read().all())
    }

    pub fn search_news(&self, query: &str) -> Vec<Article> {
        cache::search(self.shared.cache.read().all(), query)
    }

    /// Register a listener for one kind of event
    pub fn on<F>(&self, kind: EventKind, listener: F) -> ListenerId
    where
        F: Fn(&NewsEvent) + Send + Sync + 'static,
    {
        self.shared.events.on(kind, listener)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.shared.events.off(id)
    }

    /// Receive every event on a channel instead of a callback
    pub fn subscribe(&self) -> Receiver<NewsEvent> {
        self.shared.events.subscribe()
    }
}

//! Glue between the feedsocket session and the news domain
//!
//! ```text
//! frame ─> NewsRouter::parse ─> NewsRoute::Feed    ─> FeedHandler    (cache + news events)
//!                           └─> NewsRoute::Control ─> ControlHandler (status, server errors)
//!
//! session transitions ─> LifecycleBridge (status + connection events)
//! ```

use crate::client::Shared;
use crate::message::InboundMessage;
use async_trait::async_trait;
use chrono::Utc;
use feedsocket::{ClientEvent, FeedSocketError, LifecycleHandler, MessageHandler, MessageRouter, WsMessage};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Reported for any transport failure; details only go to the log
pub const TRANSPORT_ERROR: &str = "WebSocket connection error";
pub const MAX_RECONNECT_ERROR: &str = "Max reconnection attempts reached";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NewsRoute {
    /// Messages carrying articles
    Feed,
    /// Status, errors, pongs and unknown types
    Control,
}

pub struct NewsRouter;

#[async_trait]
impl MessageRouter for NewsRouter {
    type Message = InboundMessage;
    type RouteKey = NewsRoute;

    async fn parse(&self, message: WsMessage) -> feedsocket::Result<InboundMessage> {
        let text = match &message {
            WsMessage::Text(text) => text.as_str(),
            WsMessage::Binary(data) => {
                std::str::from_utf8(data).map_err(|e| FeedSocketError::Parse(e.to_string()))?
            }
        };
        InboundMessage::decode(text).map_err(|e| FeedSocketError::Parse(e.to_string()))
    }

    fn route_key(&self, message: &InboundMessage) -> NewsRoute {
        match message {
            InboundMessage::ConnectionStatus { .. }
            | InboundMessage::Error { .. }
            | InboundMessage::Pong { .. }
            | InboundMessage::Unknown(_) => NewsRoute::Control,
            _ => NewsRoute::Feed,
        }
    }
}

/// Applies article payloads to the cache
pub struct FeedHandler {
    shared: Arc<Shared>,
}

impl FeedHandler {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }
}

impl MessageHandler<InboundMessage> for FeedHandler {
    fn handle(&mut self, message: InboundMessage) -> feedsocket::Result<()> {
        match message {
            InboundMessage::InitialNews { news, count } => {
                if let Some(news) = news {
                    debug!(articles = news.len(), ?count, "Initial news received");
                    self.shared.replace_news(news);
                }
            }
            InboundMessage::NewsUpdate {
                news,
                latest_news,
                breaking_news,
                timestamp,
            } => {
                if let Some(news) = news {
                    self.shared.replace_news(news);
                }
                if let Some(latest) = latest_news {
                    self.shared.replace_news(latest);
                }
                if let Some(breaking) = breaking_news {
                    self.shared.replace_breaking(breaking);
                }
                if let Some(timestamp) = timestamp {
                    self.shared.record_update(timestamp);
                }
            }
            InboundMessage::BreakingNewsResponse { news } => {
                if let Some(news) = news {
                    self.shared.replace_breaking(news);
                }
            }
            InboundMessage::NewsResponse { news } | InboundMessage::NewsRefreshed { news } => {
                if let Some(news) = news {
                    self.shared.replace_news(news);
                }
            }
            InboundMessage::CategoryNewsResponse { category, news } => {
                if let Some(articles) = news {
                    debug!(%category, articles = articles.len(), "Category news received");
                    self.shared.category_news(category, articles);
                }
            }
            other => debug!(kind = other.kind(), "Ignoring non-feed message"),
        }
        Ok(())
    }
}

pub struct ControlHandler {
    shared: Arc<Shared>,
}

impl ControlHandler {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }
}

impl MessageHandler<InboundMessage> for ControlHandler {
    fn handle(&mut self, message: InboundMessage) -> feedsocket::Result<()> {
        match message {
            InboundMessage::ConnectionStatus { status, message } => {
                info!(?status, ?message, "Live news connection status");
            }
            InboundMessage::Error { message } => {
                warn!(%message, "Live news server error");
                self.shared.report_error(message);
            }
            InboundMessage::Pong { .. } => debug!("Pong received"),
            InboundMessage::Unknown(kind) => debug!(%kind, "Unknown message type"),
            other => debug!(kind = other.kind(), "Ignoring non-control message"),
        }
        Ok(())
    }
}

/// Turns session transitions into status updates and client events
pub struct LifecycleBridge {
    shared: Arc<Shared>,
}

impl LifecycleBridge {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }
}

impl LifecycleHandler for LifecycleBridge {
    fn on_event(&self, event: &ClientEvent) {
        match event {
            ClientEvent::Connected => {
                info!("Connected to live news service");
                self.shared.mark_connected(Utc::now());
            }
            ClientEvent::Disconnected { code, reason } => {
                info!(?code, %reason, "Disconnected from live news service");
                self.shared.mark_disconnected();
            }
            ClientEvent::Error(detail) => {
                warn!(%detail, "Live news transport error");
                self.shared.report_error(TRANSPORT_ERROR);
            }
            ClientEvent::Reconnecting { attempt, delay } => {
                info!(attempt, ?delay, "Attempting to reconnect to live news service");
            }
            ClientEvent::Failed { attempts } => {
                error!(attempts, "Max reconnection attempts reached");
                self.shared.report_error(MAX_RECONNECT_ERROR);
            }
        }
    }
}

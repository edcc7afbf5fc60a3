//! Wire messages exchanged with the live news server
//!
//! Inbound frames are decoded in two steps: a permissive [`Envelope`] that
//! accepts any combination of optional fields, then a conversion into the
//! strict [`InboundMessage`] union keyed by the `type` discriminant.

use crate::article::Article;
use crate::error::Result;
use feedsocket::WsMessage;
use serde::{Deserialize, Serialize};

/// Fallback text for server errors without a message
pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default)]
    news: Option<Vec<Article>>,
    #[serde(default)]
    latest_news: Option<Vec<Article>>,
    #[serde(default)]
    breaking_news: Option<Vec<Article>>,
    #[serde(default)]
    count: Option<u64>,
    #[serde(default)]
    category: Option<String>,
}

/// A decoded server message
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    ConnectionStatus {
        status: Option<String>,
        message: Option<String>,
    },
    InitialNews {
        news: Option<Vec<Article>>,
        count: Option<u64>,
    },
    /// Periodic push; each payload is applied independently
    NewsUpdate {
        news: Option<Vec<Article>>,
        latest_news: Option<Vec<Article>>,
        breaking_news: Option<Vec<Article>>,
        timestamp: Option<String>,
    },
    BreakingNewsResponse {
        news: Option<Vec<Article>>,
    },
    NewsResponse {
        news: Option<Vec<Article>>,
    },
    CategoryNewsResponse {
        category: String,
        news: Option<Vec<Article>>,
    },
    NewsRefreshed {
        news: Option<Vec<Article>>,
    },
    Error {
        message: String,
    },
    Pong {
        timestamp: Option<String>,
    },
    /// A well-formed message with a `type` this client does not know
    Unknown(String),
}

impl InboundMessage {
    /// Decode one JSON text frame
    pub fn decode(text: &str) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(text)?;
        Ok(envelope.into())
    }

    /// The wire discriminant of this message
    pub fn kind(&self) -> &str {
        match self {
            InboundMessage::ConnectionStatus { .. } => "connection_status",
            InboundMessage::InitialNews { .. } => "initial_news",
            InboundMessage::NewsUpdate { .. } => "news_update",
            InboundMessage::BreakingNewsResponse { .. } => "breaking_news_response",
            InboundMessage::NewsResponse { .. } => "news_response",
            InboundMessage::CategoryNewsResponse { .. } => "category_news_response",
            InboundMessage::NewsRefreshed { .. } => "news_refreshed",
            InboundMessage::Error { .. } => "error",
            InboundMessage::Pong { .. } => "pong",
            InboundMessage::Unknown(kind) => kind,
        }
    }
}

impl From<Envelope> for InboundMessage {
    fn from(envelope: Envelope) -> Self {
        match envelope.kind.as_str() {
            "connection_status" => InboundMessage::ConnectionStatus {
                status: envelope.status,
                message: envelope.message,
            },
            "initial_news" => InboundMessage::InitialNews {
                news: envelope.news,
                count: envelope.count,
            },
            "news_update" => InboundMessage::NewsUpdate {
                news: envelope.news,
                latest_news: envelope.latest_news,
                breaking_news: envelope.breaking_news,
                timestamp: envelope.timestamp,
            },
            "breaking_news_response" => InboundMessage::BreakingNewsResponse {
                news: envelope.news,
            },
            "news_response" => InboundMessage::NewsResponse {
                news: envelope.news,
            },
            "category_news_response" => InboundMessage::CategoryNewsResponse {
                category: envelope.category.unwrap_or_default(),
                news: envelope.news,
            },
            "news_refreshed" => InboundMessage::NewsRefreshed {
                news: envelope.news,
            },
            "error" => InboundMessage::Error {
                message: envelope
                    .message
                    .unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            },
            "pong" => InboundMessage::Pong {
                timestamp: envelope.timestamp,
            },
            _ => InboundMessage::Unknown(envelope.kind),
        }
    }
}

/// A client request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    Ping,
    RequestNews,
    RefreshNews,
    RequestBreakingNews,
    RequestCategoryNews { category: String },
}

impl OutboundMessage {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_ws_message(&self) -> Result<WsMessage> {
        self.to_json().map(WsMessage::Text)
    }
}

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Reason recorded when the connection goes down
pub const DISCONNECTED_REASON: &str = "Disconnected";

/// Connection status as seen by subscribers
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConnectionStatus {
    pub is_connected: bool,
    /// Timestamp of the last `news_update`, as sent by the server
    pub last_update: Option<String>,
    pub last_error: Option<String>,
    pub connected_since: Option<DateTime<Utc>>,
}

impl ConnectionStatus {
    pub fn mark_connected(&mut self, now: DateTime<Utc>) {
        self.is_connected = true;
        self.connected_since = Some(now);
        self.last_error = None;
    }

    pub fn mark_disconnected(&mut self) {
        self.is_connected = false;
        self.last_error = Some(DISCONNECTED_REASON.to_string());
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn record_update(&mut self, timestamp: impl Into<String>) {
        self.last_update = Some(timestamp.into());
    }
}

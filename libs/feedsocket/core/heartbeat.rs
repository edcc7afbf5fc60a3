//! Keep-alive heartbeat for WebSocket connections
//!
//! A fresh [`Heartbeat`] is created every time a connection is established and
//! polled from the session's `select!` loop. Dropping it (leaving the loop)
//! cancels it, so a payload is only ever produced while the socket is open.
//!
//! ```ignore
//! let client = feedsocket::builder()
//!     .url("wss://api.example.com")
//!     .router(MyRouter, |routing| routing.handler(Route::All, MyHandler))
//!     .heartbeat(
//!         Duration::from_secs(30),                          // interval
//!         WsMessage::Text(r#"{"type":"ping"}"#.to_string()) // payload
//!     )
//!     .build()?;
//! ```

use crate::traits::WsMessage;
use std::time::Duration;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Periodic keep-alive payload source for one connection
pub struct Heartbeat {
    ticker: Interval,
    payload: WsMessage,
}

impl Heartbeat {
    /// Start a heartbeat whose first tick fires one full `period` from now
    pub fn new(period: Duration, payload: WsMessage) -> Self {
        let mut ticker = interval_at(Instant::now() + period, period);
        // If the loop was busy past a tick, skip it rather than bursting
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { ticker, payload }
    }

    /// Wait for the next tick and return the payload to send
    pub async fn tick(&mut self) -> WsMessage {
        self.ticker.tick().await;
        self.payload.clone()
    }

    pub fn period(&self) -> Duration {
        self.ticker.period()
    }
}

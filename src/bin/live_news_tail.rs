//! Tail the live news feed and log every event
//!
//! Usage: `live_news_tail [token]` (falls back to `LIVE_NEWS_TOKEN`)

use anyhow::Result;
use livenews::{init_tracing, LiveNewsClient, NewsEvent, TOKEN_ENV};
use livenews_dashboard::bin_common::{
    load_config_from_env, load_live_news_config, parse_args, BinaryRunner, ConfigType, RunConfig,
};
use std::time::Duration;
use tracing::{error, info, warn};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);

struct NewsTail {
    run_config: RunConfig,
    client: LiveNewsClient,
    token: Option<String>,
}

impl NewsTail {
    fn log_event(&self, event: NewsEvent) {
        match event {
            NewsEvent::Connected => info!("Connected to live news feed"),
            NewsEvent::Disconnected => warn!("Disconnected from live news feed"),
            NewsEvent::Error(message) => error!("Feed error: {}", message),
            NewsEvent::StatusChanged(status) => {
                info!(
                    connected = status.is_connected,
                    last_update = ?status.last_update,
                    "Status changed"
                );
            }
            NewsEvent::NewsUpdated(articles) => {
                info!("News updated: {} articles", articles.len());
                for article in articles.iter().filter(|a| a.is_high_priority()) {
                    info!("  [P{}] {}", article.priority, article.title);
                }
            }
            NewsEvent::BreakingNewsUpdated(articles) => {
                info!("Breaking news: {} articles", articles.len());
                for article in &articles {
                    info!("  BREAKING {}", article.title);
                }
            }
            NewsEvent::CategoryNewsUpdated { category, articles } => {
                info!("Category '{}': {} articles", category, articles.len());
            }
        }
    }

    fn log_status(&self) {
        let status = self.client.connection_status();
        let cached = self.client.cached_news().len();
        match self.client.metrics() {
            Some(metrics) => info!(
                state = ?metrics.connection_state,
                received = metrics.messages_received,
                reconnects = metrics.reconnect_count,
                cached,
                "Heartbeat"
            ),
            None => info!(connected = status.is_connected, cached, "Heartbeat"),
        }
    }
}

impl BinaryRunner for NewsTail {
    async fn run(&mut self) -> Result<()> {
        let events = self.client.subscribe();
        self.client.connect(self.token.as_deref());

        let mut poll = tokio::time::interval(EVENT_POLL_INTERVAL);
        let mut status =
            tokio::time::interval(Duration::from_secs(self.run_config.status_interval_secs));
        // First tick of a tokio interval fires immediately
        status.tick().await;

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Received Ctrl+C, shutting down...");
                    break;
                }
                _ = poll.tick() => {
                    for event in events.try_iter() {
                        self.log_event(event);
                    }
                }
                _ = status.tick() => self.log_status(),
            }
        }

        self.client.shutdown().await;
        Ok(())
    }

    fn config(&self) -> &RunConfig {
        &self.run_config
    }

    fn shutdown_stats(&self) -> Option<String> {
        Some(format!(
            "Cached articles: {}, breaking: {}",
            self.client.cached_news().len(),
            self.client.cached_breaking_news().len()
        ))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Load config first (before logging is initialized)
    let config_path = load_config_from_env(ConfigType::LiveNews);
    let config = load_live_news_config(&config_path)?;

    init_tracing(&config.log_level);
    info!(
        host = %config.host,
        path = %config.path,
        secure = config.secure,
        "Live news config loaded"
    );

    let token = parse_args()
        .into_iter()
        .next()
        .or_else(|| std::env::var(TOKEN_ENV).ok());

    let mut app = NewsTail {
        run_config: RunConfig::new("Live News Tail").with_status_interval(60),
        client: LiveNewsClient::new(config),
        token,
    };

    app.execute().await
}

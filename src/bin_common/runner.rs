//! Binary runner utilities
//!
//! Startup and shutdown banners around a long-running main loop.

use tracing::info;

const RULE: &str = "========================================";

/// Name and status cadence of a long-running binary
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub name: String,
    /// Seconds between periodic status lines
    pub status_interval_secs: u64,
}

impl RunConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status_interval_secs: 60,
        }
    }

    /// Never below one second
    pub fn with_status_interval(mut self, secs: u64) -> Self {
        self.status_interval_secs = secs.max(1);
        self
    }

    fn startup_lines(&self) -> Vec<String> {
        vec![
            format!("Starting {}", self.name),
            format!("Status every {}s, press Ctrl+C to stop", self.status_interval_secs),
        ]
    }

    fn shutdown_lines(&self, summary: Option<String>) -> Vec<String> {
        let mut lines = vec![format!("{} stopped", self.name)];
        lines.extend(summary);
        lines
    }
}

fn log_banner(lines: &[String]) {
    info!("{}", RULE);
    for line in lines {
        info!("{}", line);
    }
    info!("{}", RULE);
}

/// A binary with a main loop that runs until Ctrl+C
#[allow(async_fn_in_trait)]
pub trait BinaryRunner {
    async fn run(&mut self) -> anyhow::Result<()>;

    fn config(&self) -> &RunConfig;

    /// Extra line for the shutdown banner
    fn shutdown_stats(&self) -> Option<String> {
        None
    }

    /// Banner, main loop, banner; the loop's result is returned as is
    async fn execute(&mut self) -> anyhow::Result<()> {
        log_banner(&self.config().startup_lines());
        let result = self.run().await;
        log_banner(&self.config().shutdown_lines(self.shutdown_stats()));
        result
    }
}

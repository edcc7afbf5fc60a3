//! Live News Dashboard - Main Library
//!
//! This crate ties the dashboard's live news client together for the
//! binaries.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, runners)
//! - **livenews**: Live news client, cache and events (re-exported from workspace)
//! - **feedsocket**: Reconnecting WebSocket session (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use livenews_dashboard::bin_common::{load_config_from_env, ConfigType};
//! use livenews_dashboard::livenews::LiveNewsClient;
//! ```

// Re-export workspace libraries for convenience
pub use feedsocket;
pub use livenews;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{load_config_from_env, load_live_news_config, parse_args, ConfigType};
    pub use runner::{BinaryRunner, RunConfig};
}

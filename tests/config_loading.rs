//! Integration test: Configuration utilities
//!
//! Tests the bin_common configuration loading functionality.

use livenews_dashboard::bin_common::{load_config_from_env, load_live_news_config, ConfigType};
use std::env;
use std::io::Write;

#[test]
fn test_live_news_config_default() {
    // Clear env var to test default
    env::remove_var("LIVE_NEWS_CONFIG_PATH");

    let config_path = load_config_from_env(ConfigType::LiveNews);
    assert_eq!(config_path.to_str().unwrap(), "config/live_news.yaml");
}

#[test]
fn test_custom_config() {
    let custom = ConfigType::Custom("custom/path.yaml".to_string());
    let config_path = load_config_from_env(custom);

    assert_eq!(config_path.to_str().unwrap(), "custom/path.yaml");
}

#[test]
fn test_config_type_default_paths() {
    assert_eq!(ConfigType::LiveNews.default_path(), "config/live_news.yaml");

    let custom = ConfigType::Custom("test.yaml".to_string());
    assert_eq!(custom.default_path(), "test.yaml");
}

#[test]
fn test_load_live_news_config_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "path: /feeds/live").unwrap();
    writeln!(file, "ping_interval_secs: 10").unwrap();
    writeln!(file, "max_reconnect_attempts: 2").unwrap();

    let config = load_live_news_config(file.path()).unwrap();
    assert_eq!(config.path, "/feeds/live");
    assert_eq!(config.ping_interval_secs, 10);
    assert_eq!(config.max_reconnect_attempts, 2);
}

#[test]
fn test_load_live_news_config_rejects_invalid_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "ping_interval_secs: 0").unwrap();

    assert!(load_live_news_config(file.path()).is_err());
}

#[test]
fn test_load_live_news_config_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_live_news_config(&dir.path().join("absent.yaml")).unwrap();

    assert_eq!(config.path, "/api/live-news/ws/live-news");
    assert_eq!(config.max_reconnect_attempts, 5);
}

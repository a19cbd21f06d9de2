// src/config.rs
use crate::services::market_data::DEFAULT_FINNHUB_BASE_URL;
use log::warn;
use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_HEATMAP_FEED_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vR0HlhpfGQtqzlf-fQelPx3GUS_aoS3WPKnoWnZuAWiX59j4k-OqvCZ48XxGTNdu34Y7wOMAjqYWCel/pub?gid=1639123512&single=true&output=csv";
pub const DEFAULT_SECTOR_FEED_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vR4sJE64V0wzzTCWUnZUUf-KC_ZaS7Ta4pUqk8Pox7Cc3J5eYmj1X3Vwpa2qs1P-JQ0DaKyJPNG0xq0/pub?gid=1177845108&single=true&output=csv";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub heatmap_feed_url: String,
    pub sector_feed_url: String,
    pub heatmap_max_rows: usize,
    pub sector_max_members: usize,
    pub heatmap_refresh: Duration,
    pub sector_refresh: Duration,
    pub news_refresh: Duration,
    pub index_refresh: Duration,
    pub finnhub_api_key: Option<String>,
    pub finnhub_base_url: String,
    pub market_news_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            port: 3030,
            heatmap_feed_url: DEFAULT_HEATMAP_FEED_URL.to_string(),
            sector_feed_url: DEFAULT_SECTOR_FEED_URL.to_string(),
            heatmap_max_rows: 112,
            sector_max_members: 100,
            heatmap_refresh: Duration::from_secs(60),
            sector_refresh: Duration::from_secs(180),
            news_refresh: Duration::from_secs(300),
            index_refresh: Duration::from_secs(60),
            finnhub_api_key: None,
            finnhub_base_url: DEFAULT_FINNHUB_BASE_URL.to_string(),
            market_news_url: None,
        }
    }
}

impl AppConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Self {
        AppConfig::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Bad numbers fall back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();
        let text = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let secs = |key: &str, default: Duration| match parse_or(&lookup, key, default.as_secs()) {
            0 => {
                warn!("${} must be at least 1 second, defaulting to {}", key, default.as_secs());
                default
            }
            value => Duration::from_secs(value),
        };

        AppConfig {
            port: parse_or(&lookup, "PORT", defaults.port),
            heatmap_feed_url: text("HEATMAP_FEED_URL").unwrap_or(defaults.heatmap_feed_url),
            sector_feed_url: text("SECTOR_FEED_URL").unwrap_or(defaults.sector_feed_url),
            heatmap_max_rows: parse_or(&lookup, "HEATMAP_MAX_ROWS", defaults.heatmap_max_rows),
            sector_max_members: parse_or(&lookup, "SECTOR_MAX_MEMBERS", defaults.sector_max_members),
            heatmap_refresh: secs("HEATMAP_REFRESH_SECS", defaults.heatmap_refresh),
            sector_refresh: secs("SECTOR_REFRESH_SECS", defaults.sector_refresh),
            news_refresh: secs("NEWS_REFRESH_SECS", defaults.news_refresh),
            index_refresh: secs("INDEX_REFRESH_SECS", defaults.index_refresh),
            finnhub_api_key: text("FINNHUB_API_KEY"),
            finnhub_base_url: text("FINNHUB_BASE_URL").unwrap_or(defaults.finnhub_base_url),
            market_news_url: text("MARKET_NEWS_URL"),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("${} is not a valid number ({:?}), defaulting to {}", key, raw, default);
                default
            }
        },
    }
}

// src/bin/test_quote.rs
use chrono::{Duration, Utc};
use dotenv::dotenv;
use log::{error, info};
use market_heatmap::config::AppConfig;
use market_heatmap::services::dashboard::normalize_symbol;
use market_heatmap::services::market_data::{FinnhubClient, MarketDataService};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let raw = env::args().nth(1).unwrap_or_else(|| "AAPL".to_string());
    let symbol = normalize_symbol(&raw)?;

    let config = AppConfig::from_env();
    let client = FinnhubClient::new(config.finnhub_base_url, config.finnhub_api_key);

    info!("Testing quote for {}...", symbol);
    match client.get_quote(&symbol).await {
        Ok(quote) => info!("SUCCESS: {:?}", quote),
        Err(e) => {
            error!("ERROR: Failed to fetch quote: {}", e);
            return Err(e.into());
        }
    }

    match client.get_extended_profile(&symbol).await {
        Ok(Some(profile)) => info!("Profile: {:?}", profile),
        Ok(None) => info!("No profile for {}", symbol),
        Err(e) => error!("ERROR: Failed to fetch profile: {}", e),
    }

    let to = Utc::now().date_naive();
    let from = to - Duration::days(7);
    match client.get_recent_news(&symbol, from, to).await {
        Ok(items) => {
            info!("{} news items", items.len());
            for item in items.iter().take(5) {
                info!("  {} ({})", item.headline, item.source);
            }
        }
        Err(e) => error!("ERROR: Failed to fetch news: {}", e),
    }

    Ok(())
}

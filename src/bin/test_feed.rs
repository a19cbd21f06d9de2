// src/bin/test_feed.rs
use dotenv::dotenv;
use log::{error, info};
use market_heatmap::config::AppConfig;
use market_heatmap::models::PeriodKey;
use market_heatmap::services::aggregation::{aggregate, GroupBy};
use market_heatmap::services::feed::{fetch_feed, fetch_sector_feed};
use market_heatmap::services::format::format_market_cap;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = AppConfig::from_env();
    let client = reqwest::Client::new();

    info!("Testing primary heat map feed...");
    match fetch_feed(&client, &config.heatmap_feed_url, Some(config.heatmap_max_rows)).await {
        Ok(batch) => {
            info!(
                "SUCCESS: {} records, {} dropped rows",
                batch.records.len(),
                batch.dropped_rows
            );
            let overall = aggregate(&batch.records, GroupBy::None).overall;
            info!("1D average: {:.2}%", overall.get(PeriodKey::OneDay));
        }
        Err(e) => {
            error!("ERROR: Failed to fetch heat map feed: {:#}", e);
            return Err(e);
        }
    }

    info!("Testing sector feed...");
    match fetch_sector_feed(&client, &config.sector_feed_url, config.sector_max_members).await {
        Ok(batch) => {
            let aggregation = aggregate(&batch.records, GroupBy::Sector);
            for group in &aggregation.groups {
                info!(
                    "{:<28} {:>3} members  cap {:>10}  1D {:+.2}%",
                    group.sector_name,
                    group.member_symbols.len(),
                    format_market_cap(group.total_market_cap),
                    group.average_change.get(PeriodKey::OneDay)
                );
            }
        }
        Err(e) => {
            error!("ERROR: Failed to fetch sector feed: {:#}", e);
            return Err(e);
        }
    }

    Ok(())
}

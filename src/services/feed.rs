// src/services/feed.rs
use crate::services::aggregation::cap_per_sector;
use crate::services::records::{parse_feed, FeedBatch};
use anyhow::{Context, Result};
use log::{info, warn};
use reqwest::Client;

/// Download a published-sheet CSV and build its records.
pub async fn fetch_feed(client: &Client, url: &str, max_records: Option<usize>) -> Result<FeedBatch> {
    info!("Fetching feed CSV from URL: {}", url);

    let text = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("feed unreachable: {}", url))?
        .error_for_status()?
        .text()
        .await?;

    let batch = parse_feed(&text, max_records);
    if batch.dropped_rows > 0 {
        warn!("Dropped {} rows from {}", batch.dropped_rows, url);
    }
    info!("Parsed {} records from feed", batch.records.len());
    Ok(batch)
}

/// Feed of the sector-grouped map: every row, then at most
/// `max_members` per sector in source order.
pub async fn fetch_sector_feed(client: &Client, url: &str, max_members: usize) -> Result<FeedBatch> {
    let mut batch = fetch_feed(client, url, None).await?;
    let before = batch.records.len();
    batch.records = cap_per_sector(batch.records, max_members);
    if batch.records.len() < before {
        info!(
            "Kept {} of {} records after sector cap of {}",
            batch.records.len(),
            before,
            max_members
        );
    }
    Ok(batch)
}

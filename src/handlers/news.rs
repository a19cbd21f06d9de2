// src/handlers/news.rs
use crate::handlers::error::ApiError;
use crate::models::MarketNewsItem;
use crate::services::dashboard::Dashboard;
use crate::services::format::time_ago;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use warp::reply::Json;
use warp::Rejection;

#[derive(Serialize)]
struct NewsEntry<'a> {
    #[serde(flatten)]
    item: &'a MarketNewsItem,
    age: String,
}

pub async fn get_news(dashboard: Arc<Dashboard>) -> Result<Json, Rejection> {
    let snapshot = dashboard.market_news.snapshot().await;
    let items = match snapshot.data {
        Some(items) => items,
        None => return Err(ApiError::unavailable("Market news", snapshot.status).reject()),
    };

    let now = Utc::now();
    let entries: Vec<NewsEntry> = items
        .iter()
        .map(|item| NewsEntry {
            item,
            age: time_ago(item.published_at, now),
        })
        .collect();

    Ok(warp::reply::json(&json!({
        "items": entries,
        "updated_at": snapshot.updated_at,
    })))
}

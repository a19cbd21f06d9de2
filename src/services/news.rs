// src/services/news.rs
use crate::models::{MarketNewsItem, NewsItem};
use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;

pub const MAX_COMPANY_NEWS: usize = 10;
pub const COMPANY_NEWS_DAYS: i64 = 7;

const EXCLUDED_PUBLISHER: &str = "GlobeNewswire";

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    results: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Publisher {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Insight {
    sentiment: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Article {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    article_url: String,
    image_url: Option<String>,
    publisher: Option<Publisher>,
    #[serde(default)]
    tickers: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    insights: Vec<Insight>,
    published_utc: Option<DateTime<Utc>>,
}

fn market_news_from(response: NewsResponse) -> Vec<MarketNewsItem> {
    response
        .results
        .into_iter()
        .filter_map(|article| {
            let publisher = article.publisher.and_then(|p| p.name).unwrap_or_default();
            if publisher.contains(EXCLUDED_PUBLISHER) {
                return None;
            }
            let Some(published_at) = article.published_utc else {
                debug!("Skipping market news item {} without a publish time", article.id);
                return None;
            };
            Some(MarketNewsItem {
                id: article.id,
                title: article.title,
                article_url: article.article_url,
                image_url: article.image_url,
                publisher,
                tickers: article.tickers,
                keywords: article.keywords,
                sentiment: article.insights.into_iter().find_map(|i| i.sentiment),
                published_at,
            })
        })
        .collect()
}

/// Fetch the market-wide headline list.
pub async fn fetch_market_news(client: &Client, url: &str) -> Result<Vec<MarketNewsItem>> {
    info!("Fetching market news");
    let response = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json::<NewsResponse>()
        .await?;

    let items = market_news_from(response);
    info!("Fetched {} market news items", items.len());
    Ok(items)
}

/// The most recent `limit` items, newest first.
pub fn latest(mut items: Vec<NewsItem>, limit: usize) -> Vec<NewsItem> {
    items.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    items.truncate(limit);
    items
}

// src/services/market_data.rs
use crate::models::{ExtendedProfile, MarketNewsItem, NewsItem, Quote};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::{debug, info};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";

/// General headlines kept after filtering.
pub const MAX_GENERAL_NEWS: usize = 10;

#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("Stock symbol not found: {0}")]
    NotFound(String),
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("Failed to decode response: {0}")]
    Decode(String),
    #[error("FINNHUB_API_KEY is not set")]
    MissingApiKey,
}

impl From<reqwest::Error> for MarketDataError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            MarketDataError::Decode(err.to_string())
        } else {
            MarketDataError::Http(err.to_string())
        }
    }
}

/// Quote, profile and news provider behind the overlays, search and the
/// index strip.
#[async_trait]
pub trait MarketDataService: Send + Sync {
    /// A sentinel all-zero quote from the provider is reported as `NotFound`.
    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;

    async fn get_extended_profile(
        &self,
        symbol: &str,
    ) -> Result<Option<ExtendedProfile>, MarketDataError>;

    /// Company news published between the two dates, newest first.
    async fn get_recent_news(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NewsItem>, MarketDataError>;

    /// General market headlines, newest first.
    async fn get_market_news(&self) -> Result<Vec<MarketNewsItem>, MarketDataError>;
}

#[derive(Debug, Deserialize)]
struct FinnhubQuote {
    #[serde(default)]
    c: f64,
    d: Option<f64>,
    dp: Option<f64>,
    #[serde(default)]
    h: f64,
    #[serde(default)]
    l: f64,
    #[serde(default)]
    o: f64,
    #[serde(default)]
    pc: f64,
}

#[derive(Debug, Deserialize)]
struct FinnhubProfile {
    name: Option<String>,
    #[serde(rename = "marketCapitalization")]
    market_capitalization: Option<f64>,
    #[serde(rename = "finnhubIndustry")]
    industry: Option<String>,
    weburl: Option<String>,
    exchange: Option<String>,
    logo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FinnhubNews {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    datetime: i64,
    #[serde(default)]
    headline: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    related: String,
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

fn quote_from(symbol: &str, raw: FinnhubQuote) -> Result<Quote, MarketDataError> {
    if raw.c == 0.0 && raw.h == 0.0 {
        return Err(MarketDataError::NotFound(symbol.to_string()));
    }
    Ok(Quote {
        symbol: symbol.to_string(),
        price: raw.c,
        change_absolute: raw.d.unwrap_or(0.0),
        change_percent: raw.dp.unwrap_or(0.0),
        open: raw.o,
        high: raw.h,
        low: raw.l,
        previous_close: raw.pc,
    })
}

fn profile_from(raw: FinnhubProfile) -> Option<ExtendedProfile> {
    // an unknown symbol comes back as `{}`
    let company_name = raw.name.filter(|name| !name.is_empty())?;
    Some(ExtendedProfile {
        company_name,
        // reported in millions
        market_cap: raw.market_capitalization.unwrap_or(0.0) * 1_000_000.0,
        sector: raw.industry.unwrap_or_default(),
        website: raw.weburl.unwrap_or_default(),
        exchange: raw.exchange.unwrap_or_default(),
        logo: raw.logo.unwrap_or_default(),
    })
}

fn company_news_from(mut raw: Vec<FinnhubNews>) -> Vec<NewsItem> {
    raw.sort_by(|a, b| b.datetime.cmp(&a.datetime));
    raw.into_iter()
        .filter(|item| !item.headline.is_empty())
        .map(|item| NewsItem {
            headline: item.headline,
            url: item.url,
            source: item.source,
            published_at: timestamp(item.datetime),
        })
        .collect()
}

fn general_news_from(raw: Vec<FinnhubNews>) -> Vec<MarketNewsItem> {
    raw.into_iter()
        .filter(|item| item.source != "MarketWatch")
        .take(MAX_GENERAL_NEWS)
        .map(|item| MarketNewsItem {
            id: item.id.to_string(),
            title: item.headline,
            article_url: item.url,
            image_url: Some(item.image).filter(|url| !url.is_empty()),
            publisher: item.source,
            tickers: item
                .related
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
            keywords: Vec::new(),
            sentiment: None,
            published_at: timestamp(item.datetime),
        })
        .collect()
}

pub struct FinnhubClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl FinnhubClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        FinnhubClient {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketDataError> {
        let token = self.api_key.as_deref().ok_or(MarketDataError::MissingApiKey)?;
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let value = self
            .client
            .get(&url)
            .query(query)
            .query(&[("token", token)])
            .send()
            .await?
            .error_for_status()?
            .json::<T>()
            .await?;
        Ok(value)
    }
}

#[async_trait]
impl MarketDataService for FinnhubClient {
    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let raw: FinnhubQuote = self
            .get_json("quote", &[("symbol", symbol.to_string())])
            .await?;
        quote_from(symbol, raw)
    }

    async fn get_extended_profile(
        &self,
        symbol: &str,
    ) -> Result<Option<ExtendedProfile>, MarketDataError> {
        let raw: FinnhubProfile = self
            .get_json("stock/profile2", &[("symbol", symbol.to_string())])
            .await?;
        Ok(profile_from(raw))
    }

    async fn get_recent_news(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NewsItem>, MarketDataError> {
        let raw: Vec<FinnhubNews> = self
            .get_json(
                "company-news",
                &[
                    ("symbol", symbol.to_string()),
                    ("from", from.format("%Y-%m-%d").to_string()),
                    ("to", to.format("%Y-%m-%d").to_string()),
                ],
            )
            .await?;
        let items = company_news_from(raw);
        info!("Fetched {} news items for {}", items.len(), symbol);
        Ok(items)
    }

    async fn get_market_news(&self) -> Result<Vec<MarketNewsItem>, MarketDataError> {
        let raw: Vec<FinnhubNews> = self
            .get_json("news", &[("category", "general".to_string())])
            .await?;
        Ok(general_news_from(raw))
    }
}

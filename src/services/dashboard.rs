// src/services/dashboard.rs
use crate::config::AppConfig;
use crate::models::{MarketNewsItem, Quote, StockRecord};
use crate::services::drilldown::Drilldown;
use crate::services::feed::{fetch_feed, fetch_sector_feed};
use crate::services::market_data::{MarketDataError, MarketDataService};
use crate::services::news::fetch_market_news;
use crate::services::records::FeedBatch;
use crate::services::scheduler::{ScheduledTask, Scheduler};
use crate::services::store::SnapshotStore;
use crate::services::views::IndexQuote;
use futures::future::join_all;
use futures::FutureExt;
use log::{error, info, warn};
use regex::Regex;
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;

pub const INDICES: [(&str, &str); 3] = [
    ("^DJI", "Dow Jones"),
    ("^GSPC", "S&P 500"),
    ("^IXIC", "Nasdaq"),
];

const SYMBOL_PATTERN: &str = r"^[\^A-Z0-9.\-]{1,12}$";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid stock symbol: {0:?}")]
    InvalidSymbol(String),
    #[error(transparent)]
    MarketData(#[from] MarketDataError),
}

/// Upper-case and validate user search input.
pub fn normalize_symbol(raw: &str) -> Result<String, SearchError> {
    let symbol = raw.trim().to_uppercase();
    let pattern = Regex::new(SYMBOL_PATTERN).map_err(|_| SearchError::InvalidSymbol(symbol.clone()))?;
    if pattern.is_match(&symbol) {
        Ok(symbol)
    } else {
        Err(SearchError::InvalidSymbol(raw.to_string()))
    }
}

/// All widget instances of the dashboard and their shared collaborators.
pub struct Dashboard {
    config: AppConfig,
    client: Client,
    market_data: Arc<dyn MarketDataService>,
    pub heatmap: SnapshotStore<FeedBatch>,
    pub sectors: SnapshotStore<FeedBatch>,
    pub indices: SnapshotStore<Vec<IndexQuote>>,
    pub market_news: SnapshotStore<Vec<MarketNewsItem>>,
    pub drilldown: Arc<Drilldown>,
}

impl Dashboard {
    pub fn new(config: AppConfig, market_data: Arc<dyn MarketDataService>) -> Arc<Self> {
        Arc::new(Dashboard {
            config,
            client: Client::new(),
            drilldown: Drilldown::new(Arc::clone(&market_data)),
            market_data,
            heatmap: SnapshotStore::new("heatmap"),
            sectors: SnapshotStore::new("sectors"),
            indices: SnapshotStore::new("indices"),
            market_news: SnapshotStore::new("market_news"),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub async fn refresh_heatmap(&self) -> bool {
        let max_rows = Some(self.config.heatmap_max_rows);
        self.heatmap
            .refresh(fetch_feed(&self.client, &self.config.heatmap_feed_url, max_rows))
            .await
    }

    pub async fn refresh_sectors(&self) -> bool {
        self.sectors
            .refresh(fetch_sector_feed(
                &self.client,
                &self.config.sector_feed_url,
                self.config.sector_max_members,
            ))
            .await
    }

    pub async fn refresh_indices(&self) -> bool {
        self.indices.refresh(self.fetch_indices()).await
    }

    pub async fn refresh_market_news(&self) -> bool {
        self.market_news.refresh(self.fetch_news()).await
    }

    async fn fetch_indices(&self) -> anyhow::Result<Vec<IndexQuote>> {
        let quotes = join_all(
            INDICES
                .iter()
                .map(|(symbol, _)| self.market_data.get_quote(symbol)),
        )
        .await;

        let mut strip = Vec::new();
        for ((symbol, name), quote) in INDICES.iter().zip(quotes) {
            match quote {
                Ok(quote) => strip.push(IndexQuote::new(name, &quote)),
                Err(err) => warn!("Skipping index {}: {}", symbol, err),
            }
        }
        if strip.is_empty() {
            anyhow::bail!("no index quotes available");
        }
        Ok(strip)
    }

    async fn fetch_news(&self) -> anyhow::Result<Vec<MarketNewsItem>> {
        match &self.config.market_news_url {
            Some(url) => fetch_market_news(&self.client, url).await,
            None => Ok(self.market_data.get_market_news().await?),
        }
    }

    /// Explicit user search. Errors here are meant to be shown.
    pub async fn search_quote(&self, raw: &str) -> Result<Quote, SearchError> {
        let symbol = normalize_symbol(raw)?;
        info!("Searching quote for {}", symbol);
        Ok(self.market_data.get_quote(&symbol).await?)
    }

    /// Look a symbol up in the sector feed first, then in the primary feed.
    pub async fn find_stock(&self, symbol: &str) -> Option<StockRecord> {
        for store in [&self.sectors, &self.heatmap] {
            if let Some(batch) = store.current().await {
                if let Some(record) = batch
                    .records
                    .iter()
                    .find(|r| r.symbol.eq_ignore_ascii_case(symbol))
                {
                    return Some(record.clone());
                }
            }
        }
        None
    }

    pub async fn has_sector(&self, sector: &str) -> bool {
        match self.sectors.current().await {
            Some(batch) => batch.records.iter().any(|r| r.sector == sector),
            None => false,
        }
    }

    /// Start every widget's refresh schedule. Dropping the returned guards
    /// stops them.
    pub fn start(self: &Arc<Self>, scheduler: &Scheduler) -> Vec<ScheduledTask> {
        let mut tasks = Vec::new();

        let this = Arc::clone(self);
        tasks.push(scheduler.every("heatmap", self.config.heatmap_refresh, move || {
            let this = Arc::clone(&this);
            async move {
                this.refresh_heatmap().await;
            }
            .boxed()
        }));

        let this = Arc::clone(self);
        tasks.push(scheduler.every("sectors", self.config.sector_refresh, move || {
            let this = Arc::clone(&this);
            async move {
                this.refresh_sectors().await;
            }
            .boxed()
        }));

        let this = Arc::clone(self);
        tasks.push(scheduler.every("indices", self.config.index_refresh, move || {
            let this = Arc::clone(&this);
            async move {
                this.refresh_indices().await;
            }
            .boxed()
        }));

        let this = Arc::clone(self);
        tasks.push(scheduler.every("market_news", self.config.news_refresh, move || {
            let this = Arc::clone(&this);
            async move {
                this.refresh_market_news().await;
            }
            .boxed()
        }));

        if self.config.finnhub_api_key.is_none() {
            error!("FINNHUB_API_KEY not set, quotes and news will be unavailable");
        }
        info!("Started {} refresh schedules", tasks.len());
        tasks
    }
}

// src/services/drilldown.rs
use crate::models::{Geometry, Point, StockRecord};
use crate::services::interaction::{
    EnrichmentTicket, InteractionError, InteractionMachine, InteractionState,
};
use crate::services::market_data::MarketDataService;
use crate::services::news::{latest, COMPANY_NEWS_DAYS, MAX_COMPANY_NEWS};
use chrono::{Duration as ChronoDuration, Utc};
use log::{debug, error, info};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{self, Instant};

/// Runs the interaction machine of one heat map against real time and the
/// market-data service.
pub struct Drilldown {
    machine: Mutex<InteractionMachine>,
    market_data: Arc<dyn MarketDataService>,
}

impl Drilldown {
    pub fn new(market_data: Arc<dyn MarketDataService>) -> Arc<Self> {
        Arc::new(Drilldown {
            machine: Mutex::new(InteractionMachine::new()),
            market_data,
        })
    }

    /// Current state with any due collapse applied.
    pub async fn state(&self) -> InteractionState {
        let mut machine = self.machine.lock().await;
        machine.tick(Instant::now());
        machine.state().clone()
    }

    pub async fn open_sector(
        &self,
        sector: &str,
        origin: Geometry,
    ) -> Result<InteractionState, InteractionError> {
        let mut machine = self.machine.lock().await;
        machine.open_sector(sector, origin, Instant::now())?;
        info!("Opened sector overlay for {}", sector);
        Ok(machine.state().clone())
    }

    /// Open the stock overlay and start the news/profile fetches. Returns
    /// right away with both sections loading.
    pub async fn open_stock(self: &Arc<Self>, stock: StockRecord, origin: Geometry) -> InteractionState {
        let (ticket, state) = {
            let mut machine = self.machine.lock().await;
            let ticket = machine.open_stock(stock, origin, Instant::now());
            (ticket, machine.state().clone())
        };
        info!("Opened stock overlay for {} (#{})", ticket.symbol, ticket.sequence);

        let this = Arc::clone(self);
        let news_ticket = ticket.clone();
        tokio::spawn(async move { this.load_news(news_ticket).await });
        let this = Arc::clone(self);
        tokio::spawn(async move { this.load_profile(ticket).await });
        state
    }

    // News and profile are applied separately, each as soon as it arrives.
    async fn load_news(&self, ticket: EnrichmentTicket) {
        let to = Utc::now().date_naive();
        let from = to - ChronoDuration::days(COMPANY_NEWS_DAYS);
        let symbol = ticket.symbol.as_str();

        let news = match self.market_data.get_recent_news(symbol, from, to).await {
            Ok(items) => Some(latest(items, MAX_COMPANY_NEWS)),
            Err(err) => {
                error!("Failed to fetch news for {}: {}", symbol, err);
                None
            }
        };

        if !self.machine.lock().await.apply_news(&ticket, news) {
            debug!("Discarded news for superseded overlay {} (#{})", symbol, ticket.sequence);
        }
    }

    async fn load_profile(&self, ticket: EnrichmentTicket) {
        let symbol = ticket.symbol.as_str();
        let profile = match self.market_data.get_extended_profile(symbol).await {
            Ok(profile) => profile,
            Err(err) => {
                error!("Failed to fetch profile for {}: {}", symbol, err);
                None
            }
        };

        if !self.machine.lock().await.apply_extended(&ticket, profile) {
            debug!("Discarded profile for superseded overlay {} (#{})", symbol, ticket.sequence);
        }
    }

    /// Explicit back. The parent level is restored after the collapse delay.
    pub async fn back(self: &Arc<Self>) -> InteractionState {
        let (deadline, state) = {
            let mut machine = self.machine.lock().await;
            let closed = machine.back(Instant::now());
            let deadline = if closed { machine.collapse_deadline() } else { None };
            (deadline, machine.state().clone())
        };
        if let Some(deadline) = deadline {
            self.schedule_collapse(deadline);
        }
        state
    }

    pub async fn backdrop_click(self: &Arc<Self>, point: Point, content: Geometry) -> InteractionState {
        let (deadline, state) = {
            let mut machine = self.machine.lock().await;
            let closed = machine.backdrop_click(point, content, Instant::now());
            let deadline = if closed { machine.collapse_deadline() } else { None };
            (deadline, machine.state().clone())
        };
        if let Some(deadline) = deadline {
            self.schedule_collapse(deadline);
        }
        state
    }

    fn schedule_collapse(self: &Arc<Self>, deadline: Instant) {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            time::sleep_until(deadline).await;
            if this.machine.lock().await.tick(Instant::now()) {
                debug!("Overlay collapse finished");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExtendedProfile, MarketNewsItem, NewsItem, PeriodChanges, Quote};
    use crate::services::interaction::{Enrichment, COLLAPSE_DELAY};
    use crate::services::market_data::MarketDataError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::time::Duration;

    struct StubService {
        fail_news: bool,
        news_delay: Duration,
        profile_delay: Duration,
    }

    #[async_trait]
    impl MarketDataService for StubService {
        async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
            Err(MarketDataError::NotFound(symbol.to_string()))
        }

        async fn get_extended_profile(
            &self,
            symbol: &str,
        ) -> Result<Option<ExtendedProfile>, MarketDataError> {
            time::sleep(self.profile_delay).await;
            Ok(Some(ExtendedProfile {
                company_name: format!("{} Corp", symbol),
                market_cap: 1e9,
                sector: "Technology".to_string(),
                website: String::new(),
                exchange: "NASDAQ".to_string(),
                logo: String::new(),
            }))
        }

        async fn get_recent_news(
            &self,
            symbol: &str,
            _from: NaiveDate,
            _to: NaiveDate,
        ) -> Result<Vec<NewsItem>, MarketDataError> {
            time::sleep(self.news_delay).await;
            if self.fail_news {
                return Err(MarketDataError::Http("connection reset".to_string()));
            }
            Ok((0..12)
                .map(|i| NewsItem {
                    headline: format!("{} story {}", symbol, i),
                    url: String::new(),
                    source: "Wire".to_string(),
                    published_at: Utc::now() - ChronoDuration::minutes(i),
                })
                .collect())
        }

        async fn get_market_news(&self) -> Result<Vec<MarketNewsItem>, MarketDataError> {
            Ok(Vec::new())
        }
    }

    fn drilldown(fail_news: bool, news_delay: Duration) -> Arc<Drilldown> {
        Drilldown::new(Arc::new(StubService {
            fail_news,
            news_delay,
            profile_delay: Duration::ZERO,
        }))
    }

    fn stock(symbol: &str) -> StockRecord {
        StockRecord {
            symbol: symbol.to_string(),
            price: 100.0,
            change_absolute: 1.0,
            period_changes: PeriodChanges::default(),
            market_cap: 1e9,
            volume: 0.0,
            relative_volume: 0.0,
            company: String::new(),
            sector: "Technology".to_string(),
            industry: String::new(),
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_stock_loads_enrichment() {
        let drilldown = drilldown(false, Duration::ZERO);
        let state = drilldown.open_stock(stock("AAPL"), Geometry::default()).await;
        match state {
            InteractionState::StockExpanded(overlay) => assert_eq!(overlay.news, Enrichment::Loading),
            other => panic!("unexpected {}", other.name()),
        }

        settle().await;
        match drilldown.state().await {
            InteractionState::StockExpanded(overlay) => {
                match &overlay.news {
                    Enrichment::Ready(items) => {
                        assert_eq!(items.len(), 10);
                        assert_eq!(items[0].headline, "AAPL story 0");
                    }
                    other => panic!("news not loaded: {:?}", other),
                }
                assert!(matches!(overlay.extended, Enrichment::Ready(_)));
            }
            other => panic!("unexpected {}", other.name()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_profile_does_not_hold_back_news() {
        let drilldown = Drilldown::new(Arc::new(StubService {
            fail_news: false,
            news_delay: Duration::ZERO,
            profile_delay: Duration::from_secs(3600),
        }));
        drilldown.open_stock(stock("AAPL"), Geometry::default()).await;
        settle().await;
        time::advance(Duration::from_secs(60)).await;
        settle().await;

        match drilldown.state().await {
            InteractionState::StockExpanded(overlay) => {
                assert!(matches!(overlay.news, Enrichment::Ready(_)), "news: {:?}", overlay.news);
                assert_eq!(overlay.extended, Enrichment::Loading);
            }
            other => panic!("unexpected {}", other.name()),
        }

        time::advance(Duration::from_secs(3600)).await;
        settle().await;
        match drilldown.state().await {
            InteractionState::StockExpanded(overlay) => {
                assert!(matches!(overlay.extended, Enrichment::Ready(_)));
            }
            other => panic!("unexpected {}", other.name()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_news_failure_leaves_overlay_usable() {
        let drilldown = drilldown(true, Duration::ZERO);
        drilldown.open_stock(stock("AAPL"), Geometry::default()).await;
        settle().await;

        match drilldown.state().await {
            InteractionState::StockExpanded(overlay) => {
                assert_eq!(overlay.news, Enrichment::Unavailable);
                assert!(matches!(overlay.extended, Enrichment::Ready(_)));
                assert!(overlay.expanded);
            }
            other => panic!("unexpected {}", other.name()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_news_for_replaced_stock_is_dropped() {
        let drilldown = drilldown(false, Duration::from_secs(2));
        drilldown.open_stock(stock("AAPL"), Geometry::default()).await;
        settle().await;
        time::advance(Duration::from_secs(1)).await;

        drilldown.open_stock(stock("MSFT"), Geometry::default()).await;
        settle().await;
        time::advance(Duration::from_secs(1)).await;
        settle().await;

        // AAPL news has arrived by now and must not land on the MSFT overlay
        match drilldown.state().await {
            InteractionState::StockExpanded(overlay) => {
                assert_eq!(overlay.stock.symbol, "MSFT");
                assert_eq!(overlay.news, Enrichment::Loading);
            }
            other => panic!("unexpected {}", other.name()),
        }

        time::advance(Duration::from_secs(1)).await;
        settle().await;
        match drilldown.state().await {
            InteractionState::StockExpanded(overlay) => match &overlay.news {
                Enrichment::Ready(items) => assert_eq!(items[0].headline, "MSFT story 0"),
                other => panic!("news not loaded: {:?}", other),
            },
            other => panic!("unexpected {}", other.name()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_collapses_after_delay() {
        let drilldown = drilldown(false, Duration::ZERO);
        drilldown.open_stock(stock("AAPL"), Geometry::default()).await;
        settle().await;

        let state = drilldown.back().await;
        match state {
            InteractionState::StockExpanded(overlay) => {
                assert!(!overlay.expanded);
                assert_eq!(overlay.stock.symbol, "AAPL");
                assert_eq!(overlay.news, Enrichment::Cleared);
            }
            other => panic!("unexpected {}", other.name()),
        }

        time::advance(COLLAPSE_DELAY - Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(drilldown.state().await.name(), "stock_expanded");

        time::advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(drilldown.state().await, InteractionState::Grid);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backdrop_click_inside_content_keeps_overlay() {
        let drilldown = drilldown(false, Duration::ZERO);
        drilldown
            .open_sector("Energy", Geometry::default())
            .await
            .unwrap();

        let content = Geometry { x: 0.0, y: 0.0, width: 100.0, height: 100.0 };
        let state = drilldown.backdrop_click(Point { x: 50.0, y: 50.0 }, content).await;
        assert!(matches!(state, InteractionState::SectorExpanded(ref s) if s.expanded));

        drilldown.backdrop_click(Point { x: 150.0, y: 50.0 }, content).await;
        time::advance(COLLAPSE_DELAY).await;
        settle().await;
        assert_eq!(drilldown.state().await, InteractionState::Grid);
    }
}

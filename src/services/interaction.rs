// src/services/interaction.rs
//! Drill-down state of one heat map: grid, sector overlay, stock overlay.
//!
//! The machine is synchronous and clock-agnostic, callers pass `now`. Leaving
//! an overlay does not drop its data at once: the overlay is flagged as
//! collapsing and the switch to the parent level happens on the first
//! [`InteractionMachine::tick`] at or after the collapse deadline.

use crate::models::{ExtendedProfile, Geometry, NewsItem, Point, StockRecord};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

pub const COLLAPSE_DELAY: Duration = Duration::from_millis(400);

/// Asynchronously loaded detail section of a stock overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Enrichment<T> {
    Loading,
    Ready(T),
    /// The fetch failed or returned nothing.
    Unavailable,
    /// Dropped on back, while the overlay collapses.
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorOverlay {
    pub sector: String,
    pub origin: Geometry,
    pub expanded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockOverlay {
    /// Sector overlay the stock was opened from, restored on back.
    pub parent: Option<SectorOverlay>,
    pub stock: StockRecord,
    pub origin: Geometry,
    pub news: Enrichment<Vec<NewsItem>>,
    pub extended: Enrichment<ExtendedProfile>,
    pub expanded: bool,
    #[serde(skip)]
    ticket: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InteractionState {
    Grid,
    SectorExpanded(SectorOverlay),
    StockExpanded(Box<StockOverlay>),
}

impl InteractionState {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Grid => "grid",
            InteractionState::SectorExpanded(_) => "sector_expanded",
            InteractionState::StockExpanded(_) => "stock_expanded",
        }
    }
}

/// Handle for the enrichment fetches issued when a stock overlay opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentTicket {
    pub sequence: u64,
    pub symbol: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InteractionError {
    #[error("cannot {action} while in {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
}

#[derive(Debug)]
struct PendingCollapse {
    deadline: Instant,
    target: InteractionState,
}

#[derive(Debug)]
pub struct InteractionMachine {
    state: InteractionState,
    pending: Option<PendingCollapse>,
    next_ticket: u64,
}

impl Default for InteractionMachine {
    fn default() -> Self {
        InteractionMachine::new()
    }
}

impl InteractionMachine {
    pub fn new() -> Self {
        InteractionMachine {
            state: InteractionState::Grid,
            pending: None,
            next_ticket: 0,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn collapse_deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Finish a pending collapse whose deadline has passed.
    /// Returns true when the state changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let due = self
            .pending
            .as_ref()
            .map_or(false, |pending| now >= pending.deadline);
        if !due {
            return false;
        }
        if let Some(pending) = self.pending.take() {
            self.state = pending.target;
        }
        true
    }

    // A click during a collapse acts on the level being returned to.
    fn settle(&mut self, now: Instant) {
        self.tick(now);
        if let Some(pending) = self.pending.take() {
            self.state = pending.target;
        }
    }

    pub fn open_sector(
        &mut self,
        sector: &str,
        origin: Geometry,
        now: Instant,
    ) -> Result<(), InteractionError> {
        self.settle(now);
        match self.state {
            InteractionState::Grid | InteractionState::SectorExpanded(_) => {
                self.state = InteractionState::SectorExpanded(SectorOverlay {
                    sector: sector.to_string(),
                    origin,
                    expanded: true,
                });
                Ok(())
            }
            InteractionState::StockExpanded(_) => Err(InteractionError::InvalidTransition {
                action: "open a sector",
                state: self.state.name(),
            }),
        }
    }

    /// Open the stock overlay, replacing any open one.
    pub fn open_stock(&mut self, stock: StockRecord, origin: Geometry, now: Instant) -> EnrichmentTicket {
        self.settle(now);

        let parent = match std::mem::replace(&mut self.state, InteractionState::Grid) {
            InteractionState::Grid => None,
            InteractionState::SectorExpanded(sector) => Some(sector),
            InteractionState::StockExpanded(previous) => previous.parent,
        };

        self.next_ticket += 1;
        let ticket = EnrichmentTicket {
            sequence: self.next_ticket,
            symbol: stock.symbol.clone(),
        };

        self.state = InteractionState::StockExpanded(Box::new(StockOverlay {
            parent,
            stock,
            origin,
            news: Enrichment::Loading,
            extended: Enrichment::Loading,
            expanded: true,
            ticket: ticket.sequence,
        }));
        ticket
    }

    /// Explicit back. Returns false when there is nothing to close.
    pub fn back(&mut self, now: Instant) -> bool {
        self.tick(now);
        if self.pending.is_some() {
            return false;
        }

        let target = match &mut self.state {
            InteractionState::Grid => return false,
            InteractionState::SectorExpanded(sector) => {
                sector.expanded = false;
                InteractionState::Grid
            }
            InteractionState::StockExpanded(overlay) => {
                overlay.expanded = false;
                overlay.news = Enrichment::Cleared;
                overlay.extended = Enrichment::Cleared;
                match &overlay.parent {
                    Some(parent) => InteractionState::SectorExpanded(parent.clone()),
                    None => InteractionState::Grid,
                }
            }
        };

        self.pending = Some(PendingCollapse {
            deadline: now + COLLAPSE_DELAY,
            target,
        });
        true
    }

    /// Click on the overlay backdrop. Clicks inside `content` are ignored.
    pub fn backdrop_click(&mut self, point: Point, content: Geometry, now: Instant) -> bool {
        if content.contains(point) {
            return false;
        }
        self.back(now)
    }

    fn current_overlay(&mut self, ticket: &EnrichmentTicket) -> Option<&mut StockOverlay> {
        match &mut self.state {
            InteractionState::StockExpanded(overlay)
                if overlay.expanded
                    && overlay.ticket == ticket.sequence
                    && overlay.stock.symbol == ticket.symbol =>
            {
                Some(overlay.as_mut())
            }
            _ => None,
        }
    }

    /// Apply a company-news result. Results for a superseded overlay are
    /// dropped and `false` is returned.
    pub fn apply_news(&mut self, ticket: &EnrichmentTicket, news: Option<Vec<NewsItem>>) -> bool {
        match self.current_overlay(ticket) {
            Some(overlay) => {
                overlay.news = match news {
                    Some(items) if !items.is_empty() => Enrichment::Ready(items),
                    _ => Enrichment::Unavailable,
                };
                true
            }
            None => false,
        }
    }

    pub fn apply_extended(
        &mut self,
        ticket: &EnrichmentTicket,
        profile: Option<ExtendedProfile>,
    ) -> bool {
        match self.current_overlay(ticket) {
            Some(overlay) => {
                overlay.extended = match profile {
                    Some(profile) => Enrichment::Ready(profile),
                    None => Enrichment::Unavailable,
                };
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeriodChanges;
    use chrono::Utc;

    fn stock(symbol: &str) -> StockRecord {
        StockRecord {
            symbol: symbol.to_string(),
            price: 10.0,
            change_absolute: 0.1,
            period_changes: PeriodChanges::default(),
            market_cap: 1.0,
            volume: 0.0,
            relative_volume: 0.0,
            company: String::new(),
            sector: "Technology".to_string(),
            industry: String::new(),
        }
    }

    fn geometry(x: f64) -> Geometry {
        Geometry { x, y: 0.0, width: 50.0, height: 20.0 }
    }

    fn news_item() -> NewsItem {
        NewsItem {
            headline: "Earnings beat".to_string(),
            url: "https://example.com/a".to_string(),
            source: "Wire".to_string(),
            published_at: Utc::now(),
        }
    }

    fn stock_overlay(machine: &InteractionMachine) -> &StockOverlay {
        match machine.state() {
            InteractionState::StockExpanded(overlay) => overlay,
            other => panic!("expected stock overlay, got {}", other.name()),
        }
    }

    #[test]
    fn test_grid_to_stock_and_deferred_back() {
        let start = Instant::now();
        let mut machine = InteractionMachine::new();

        machine.open_stock(stock("AAPL"), geometry(10.0), start);
        let overlay = stock_overlay(&machine);
        assert!(overlay.expanded);
        assert_eq!(overlay.origin, geometry(10.0));
        assert_eq!(overlay.news, Enrichment::Loading);
        assert_eq!(overlay.extended, Enrichment::Loading);

        assert!(machine.back(start));
        // during the collapse the stock is still readable
        let overlay = stock_overlay(&machine);
        assert!(!overlay.expanded);
        assert_eq!(overlay.stock.symbol, "AAPL");
        assert_eq!(overlay.news, Enrichment::Cleared);
        assert_eq!(overlay.extended, Enrichment::Cleared);

        assert!(!machine.tick(start + Duration::from_millis(399)));
        assert_eq!(machine.state().name(), "stock_expanded");

        assert!(machine.tick(start + COLLAPSE_DELAY));
        assert_eq!(*machine.state(), InteractionState::Grid);
        assert!(machine.collapse_deadline().is_none());
    }

    #[test]
    fn test_back_from_stock_returns_to_sector_first() {
        let start = Instant::now();
        let mut machine = InteractionMachine::new();

        machine.open_sector("Technology", geometry(0.0), start).unwrap();
        machine.open_stock(stock("MSFT"), geometry(5.0), start);
        assert_eq!(
            stock_overlay(&machine).parent.as_ref().map(|p| p.sector.as_str()),
            Some("Technology")
        );

        machine.back(start);
        machine.tick(start + COLLAPSE_DELAY);
        match machine.state() {
            InteractionState::SectorExpanded(sector) => {
                assert_eq!(sector.sector, "Technology");
                assert!(sector.expanded);
            }
            other => panic!("expected sector overlay, got {}", other.name()),
        }

        let later = start + COLLAPSE_DELAY;
        machine.back(later);
        machine.tick(later + COLLAPSE_DELAY);
        assert_eq!(*machine.state(), InteractionState::Grid);
    }

    #[test]
    fn test_reentry_replaces_selection() {
        let start = Instant::now();
        let mut machine = InteractionMachine::new();

        let first = machine.open_stock(stock("AAPL"), geometry(1.0), start);
        assert!(machine.apply_news(&first, Some(vec![news_item()])));

        let second = machine.open_stock(stock("NVDA"), geometry(2.0), start);
        assert_ne!(first, second);

        let overlay = stock_overlay(&machine);
        assert_eq!(overlay.stock.symbol, "NVDA");
        assert_eq!(overlay.origin, geometry(2.0));
        assert_eq!(overlay.news, Enrichment::Loading);

        // late result for the first selection is discarded
        assert!(!machine.apply_news(&first, Some(vec![news_item()])));
        assert_eq!(stock_overlay(&machine).news, Enrichment::Loading);
    }

    #[test]
    fn test_enrichment_results() {
        let start = Instant::now();
        let mut machine = InteractionMachine::new();
        let ticket = machine.open_stock(stock("AMD"), geometry(0.0), start);

        assert!(machine.apply_news(&ticket, Some(Vec::new())));
        assert_eq!(stock_overlay(&machine).news, Enrichment::Unavailable);

        assert!(machine.apply_extended(&ticket, None));
        assert_eq!(stock_overlay(&machine).extended, Enrichment::Unavailable);

        machine.back(start);
        assert!(!machine.apply_news(&ticket, Some(vec![news_item()])));
        assert_eq!(stock_overlay(&machine).news, Enrichment::Cleared);
    }

    #[test]
    fn test_backdrop_click_containment() {
        let start = Instant::now();
        let mut machine = InteractionMachine::new();
        machine.open_stock(stock("AAPL"), geometry(0.0), start);

        let content = Geometry { x: 100.0, y: 100.0, width: 400.0, height: 300.0 };
        assert!(!machine.backdrop_click(Point { x: 200.0, y: 200.0 }, content, start));
        assert!(stock_overlay(&machine).expanded);

        assert!(machine.backdrop_click(Point { x: 10.0, y: 10.0 }, content, start));
        assert!(!stock_overlay(&machine).expanded);
    }

    #[test]
    fn test_click_during_collapse_cancels_it() {
        let start = Instant::now();
        let mut machine = InteractionMachine::new();
        machine.open_stock(stock("AAPL"), geometry(0.0), start);
        machine.back(start);

        let mid = start + Duration::from_millis(100);
        machine.open_stock(stock("TSLA"), geometry(3.0), mid);
        assert!(machine.collapse_deadline().is_none());

        machine.tick(start + Duration::from_secs(5));
        let overlay = stock_overlay(&machine);
        assert_eq!(overlay.stock.symbol, "TSLA");
        assert!(overlay.expanded);
        assert!(overlay.parent.is_none());
    }

    #[test]
    fn test_invalid_and_idle_actions() {
        let start = Instant::now();
        let mut machine = InteractionMachine::new();

        assert!(!machine.back(start));
        assert_eq!(*machine.state(), InteractionState::Grid);

        machine.open_stock(stock("AAPL"), geometry(0.0), start);
        assert_eq!(
            machine.open_sector("Energy", geometry(0.0), start),
            Err(InteractionError::InvalidTransition {
                action: "open a sector",
                state: "stock_expanded",
            })
        );

        machine.back(start);
        // a second back during the collapse does nothing
        assert!(!machine.back(start + Duration::from_millis(10)));
        assert_eq!(machine.collapse_deadline(), Some(start + COLLAPSE_DELAY));
    }

    #[test]
    fn test_state_serializes_with_tag() {
        let start = Instant::now();
        let mut machine = InteractionMachine::new();
        assert_eq!(serde_json::to_value(machine.state()).unwrap()["state"], "grid");

        machine.open_stock(stock("AAPL"), geometry(0.0), start);
        let json = serde_json::to_value(machine.state()).unwrap();
        assert_eq!(json["state"], "stock_expanded");
        assert_eq!(json["stock"]["symbol"], "AAPL");
        assert_eq!(json["news"]["status"], "loading");
        assert!(json.get("ticket").is_none());
    }
}

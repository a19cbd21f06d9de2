// src/services/views.rs
//! Render-ready payloads served to the widgets.
use crate::models::{NewsItem, PeriodKey, Quote, StockRecord};
use crate::services::aggregation::{aggregate, GroupBy};
use crate::services::colors::{color_for, sector_color, ColorMode, ColorScale, Foreground, Gradient};
use crate::services::format::{
    display_value, format_market_cap, format_percent, format_price, tile_title, time_ago, DisplayMode,
};
use crate::services::interaction::{Enrichment, InteractionState, StockOverlay};
use crate::services::records::FeedBatch;
use crate::services::store::{LoadStatus, Snapshot};
use crate::services::synthetic::{intraday_series, previous_close};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the sector map colors by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectorMode {
    #[default]
    Heat,
    RelVol,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tile {
    pub symbol: String,
    pub company: String,
    pub value: f64,
    pub change_label: String,
    pub display_value: Option<String>,
    pub title: String,
    pub background: Gradient,
    pub foreground: Foreground,
    pub intensity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Legend {
    pub period: PeriodKey,
    pub min_label: String,
    pub max_label: String,
    pub neutral_threshold: f64,
}

impl Legend {
    pub fn for_period(period: PeriodKey) -> Self {
        let scale = ColorScale::for_period(period);
        Legend {
            period,
            min_label: format!("-{}%", scale.max_down),
            max_label: format!("+{}%", scale.max_up),
            neutral_threshold: scale.neutral_threshold,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapView {
    pub status: LoadStatus,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub period: PeriodKey,
    pub display: DisplayMode,
    pub daily_average: f64,
    pub daily_average_label: String,
    /// Only set when the selected period is not 1D.
    pub period_average: Option<f64>,
    pub period_average_label: Option<String>,
    pub legend: Legend,
    pub tiles: Vec<Tile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectorBlock {
    pub sector: String,
    pub average_change: f64,
    pub average_label: String,
    pub total_market_cap: f64,
    pub total_market_cap_label: String,
    pub background: Gradient,
    pub foreground: Foreground,
    pub members: Vec<Tile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectorsView {
    pub status: LoadStatus,
    pub updated_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub period: PeriodKey,
    pub mode: SectorMode,
    pub legend: Legend,
    pub sectors: Vec<SectorBlock>,
}

fn heat_tile(record: &StockRecord, period: PeriodKey, display: DisplayMode) -> Tile {
    let value = record.change(period);
    let color = color_for(value, period, ColorMode::Heat);
    Tile {
        symbol: record.symbol.clone(),
        company: record.company.clone(),
        value,
        change_label: format_percent(value),
        display_value: display_value(record, display),
        title: tile_title(record, period),
        background: color.background,
        foreground: color.foreground,
        intensity: color.intensity,
    }
}

fn volume_tile(record: &StockRecord, period: PeriodKey) -> Tile {
    let value = record.relative_volume;
    let color = color_for(
        value,
        period,
        ColorMode::RelativeVolume { sector_color: sector_color(&record.sector) },
    );
    Tile {
        symbol: record.symbol.clone(),
        company: record.company.clone(),
        value,
        change_label: format!("{:.2}x", value),
        display_value: Some(format_percent(record.change(period))),
        title: tile_title(record, period),
        background: color.background,
        foreground: color.foreground,
        intensity: color.intensity,
    }
}

pub fn heatmap_view(
    snapshot: &Snapshot<FeedBatch>,
    period: PeriodKey,
    display: DisplayMode,
) -> HeatmapView {
    let records: &[StockRecord] = snapshot
        .data
        .as_deref()
        .map(|batch| batch.records.as_slice())
        .unwrap_or(&[]);

    let overall = aggregate(records, GroupBy::None).overall;
    let daily_average = overall.get(PeriodKey::OneDay);
    let period_average = (period != PeriodKey::OneDay).then(|| overall.get(period));

    HeatmapView {
        status: snapshot.status,
        updated_at: snapshot.updated_at,
        last_error: snapshot.last_error.clone(),
        period,
        display,
        daily_average,
        daily_average_label: format!("1D Avg: {}", format_percent(daily_average)),
        period_average,
        period_average_label: period_average.map(|avg| format!("{} Avg: {}", period, format_percent(avg))),
        legend: Legend::for_period(period),
        tiles: records
            .iter()
            .map(|record| heat_tile(record, period, display))
            .collect(),
    }
}

pub fn sectors_view(snapshot: &Snapshot<FeedBatch>, period: PeriodKey, mode: SectorMode) -> SectorsView {
    let records: &[StockRecord] = snapshot
        .data
        .as_deref()
        .map(|batch| batch.records.as_slice())
        .unwrap_or(&[]);

    let aggregation = aggregate(records, GroupBy::Sector);
    let sectors = aggregation
        .groups
        .iter()
        .map(|group| {
            let average = group.average_change.get(period);
            let color = color_for(average, period, ColorMode::Heat);
            let members = group
                .member_symbols
                .iter()
                .filter_map(|symbol| records.iter().find(|r| &r.symbol == symbol))
                .map(|record| match mode {
                    SectorMode::Heat => heat_tile(record, period, DisplayMode::Pct),
                    SectorMode::RelVol => volume_tile(record, period),
                })
                .collect();

            SectorBlock {
                sector: group.sector_name.clone(),
                average_change: average,
                average_label: format_percent(average),
                total_market_cap: group.total_market_cap,
                total_market_cap_label: format_market_cap(group.total_market_cap),
                background: color.background,
                foreground: color.foreground,
                members,
            }
        })
        .collect();

    SectorsView {
        status: snapshot.status,
        updated_at: snapshot.updated_at,
        last_error: snapshot.last_error.clone(),
        period,
        mode,
        legend: Legend::for_period(period),
        sectors,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceCell {
    pub period: PeriodKey,
    pub value: f64,
    pub label: String,
    pub background: Gradient,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsView {
    pub headline: String,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    pub age: String,
}

impl NewsView {
    pub fn from_item(item: &NewsItem, now: DateTime<Utc>) -> Self {
        NewsView {
            headline: item.headline.clone(),
            url: item.url.clone(),
            source: item.source.clone(),
            published_at: item.published_at,
            age: time_ago(item.published_at, now),
        }
    }
}

/// Detail panel of an open stock overlay.
#[derive(Debug, Clone, Serialize)]
pub struct StockDetail {
    pub symbol: String,
    pub price_label: String,
    pub change_absolute: f64,
    pub change_percent: f64,
    pub change_label: String,
    pub previous_close: f64,
    pub market_cap_label: String,
    pub volume: f64,
    pub relative_volume: f64,
    pub performance: Vec<PerformanceCell>,
    /// Synthetic, see [`intraday_series`].
    pub intraday: Vec<f64>,
    pub positive: bool,
    pub news: Vec<NewsView>,
}

pub fn stock_detail(overlay: &StockOverlay, now: DateTime<Utc>) -> StockDetail {
    let stock = &overlay.stock;
    let change_percent = stock.change(PeriodKey::OneDay);
    let change_absolute = if stock.change_absolute != 0.0 {
        stock.change_absolute
    } else {
        stock.price * change_percent / 100.0
    };

    let performance = stock
        .period_changes
        .iter()
        .map(|(period, value)| PerformanceCell {
            period,
            value,
            label: format_percent(value),
            background: color_for(value, period, ColorMode::Heat).background,
        })
        .collect();

    let news = match &overlay.news {
        Enrichment::Ready(items) => items.iter().map(|item| NewsView::from_item(item, now)).collect(),
        _ => Vec::new(),
    };

    StockDetail {
        symbol: stock.symbol.clone(),
        price_label: format_price(stock.price),
        change_absolute,
        change_percent,
        change_label: format!("{:+.2} ({})", change_absolute, format_percent(change_percent)),
        previous_close: previous_close(stock.price, change_percent),
        market_cap_label: format_market_cap(stock.market_cap),
        volume: stock.volume,
        relative_volume: stock.relative_volume,
        performance,
        intraday: intraday_series(&stock.symbol, stock.price, change_percent),
        positive: change_percent >= 0.0,
        news,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OverlayView {
    pub overlay: InteractionState,
    pub detail: Option<StockDetail>,
}

impl OverlayView {
    pub fn new(state: InteractionState, now: DateTime<Utc>) -> Self {
        let detail = match &state {
            InteractionState::StockExpanded(overlay) => Some(stock_detail(overlay, now)),
            _ => None,
        };
        OverlayView { overlay: state, detail }
    }
}

/// One entry of the index strip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexQuote {
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub change_absolute: f64,
    pub change_percent: f64,
    pub price_label: String,
    pub change_label: String,
    pub positive: bool,
}

impl IndexQuote {
    pub fn new(name: &str, quote: &Quote) -> Self {
        let positive = quote.change_absolute >= 0.0;
        let arrow = if positive { '▲' } else { '▼' };
        IndexQuote {
            symbol: quote.symbol.clone(),
            name: name.to_string(),
            price: quote.price,
            change_absolute: quote.change_absolute,
            change_percent: quote.change_percent,
            price_label: format_price(quote.price),
            change_label: format!("{} {:.2}%", arrow, quote.change_percent.abs()),
            positive,
        }
    }
}

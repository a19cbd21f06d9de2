// src/services/records.rs
use crate::models::{PeriodChanges, PeriodKey, StockRecord};
use crate::services::csv_line::parse_line;
use crate::services::schema::{FeedField, FeedSchema};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::collections::HashSet;

/// Records of one feed refresh. Replaced wholesale on the next refresh.
#[derive(Debug, Clone)]
pub struct FeedBatch {
    pub records: Vec<StockRecord>,
    pub dropped_rows: usize,
    pub fetched_at: DateTime<Utc>,
}

/// Parse a numeric cell, ignoring thousands separators and percent signs.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != '%').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn number_or_zero(schema: &FeedSchema, field: FeedField, row: &[String]) -> f64 {
    schema
        .cell(field, row)
        .and_then(parse_number)
        .unwrap_or(0.0)
}

// `+ 0.0` turns a parsed "-0" into positive zero.
fn non_negative(value: f64) -> f64 {
    value.max(0.0) + 0.0
}

fn text_or_empty(schema: &FeedSchema, field: FeedField, row: &[String]) -> String {
    schema
        .cell(field, row)
        .map(|cell| cell.trim().to_string())
        .unwrap_or_default()
}

/// Build one record from a parsed row.
///
/// Rows without a symbol or with an unparseable price are rejected. Every
/// other numeric field degrades to 0.
pub fn build(row: &[String], schema: &FeedSchema) -> Option<StockRecord> {
    let symbol = text_or_empty(schema, FeedField::Ticker, row);
    if symbol.is_empty() {
        return None;
    }

    let price = schema
        .cell(FeedField::Price, row)
        .and_then(parse_number)
        .filter(|price| *price >= 0.0)?;

    let mut period_changes = PeriodChanges::default();
    for period in PeriodKey::ALL.iter().skip(1) {
        period_changes.set(
            *period,
            number_or_zero(schema, FeedField::Period(*period), row),
        );
    }
    period_changes.set(
        PeriodKey::OneDay,
        number_or_zero(schema, FeedField::ChangePercent, row),
    );

    Some(StockRecord {
        symbol,
        price,
        change_absolute: number_or_zero(schema, FeedField::Change, row),
        period_changes,
        market_cap: non_negative(number_or_zero(schema, FeedField::MarketCap, row)),
        volume: non_negative(number_or_zero(schema, FeedField::Volume, row)),
        relative_volume: non_negative(number_or_zero(schema, FeedField::RelativeVolume, row)),
        company: text_or_empty(schema, FeedField::Company, row),
        sector: text_or_empty(schema, FeedField::Sector, row),
        industry: text_or_empty(schema, FeedField::Industry, row),
    })
}

/// Parse a whole CSV document: header row, then one record per line.
///
/// `max_records` keeps only the first N retained records, in source order.
pub fn parse_feed(text: &str, max_records: Option<usize>) -> FeedBatch {
    let mut lines = text
        .trim()
        .lines()
        .map(|line| line.trim_end_matches('\r'));

    let schema = match lines.next() {
        Some(header) => FeedSchema::resolve(&parse_line(header)),
        None => FeedSchema::resolve(&[]),
    };

    let limit = max_records.unwrap_or(usize::MAX);
    let mut records = Vec::new();
    let mut seen = HashSet::new();
    let mut dropped_rows = 0;

    for line in lines {
        if records.len() >= limit {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        match build(&parse_line(line), &schema) {
            Some(record) => {
                if seen.insert(record.symbol.clone()) {
                    records.push(record);
                } else {
                    warn!("Duplicate symbol {} in feed, keeping first row", record.symbol);
                    dropped_rows += 1;
                }
            }
            None => {
                debug!("Dropping feed row: {}", line);
                dropped_rows += 1;
            }
        }
    }

    FeedBatch {
        records,
        dropped_rows,
        fetched_at: Utc::now(),
    }
}

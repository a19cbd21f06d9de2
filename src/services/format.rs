// src/services/format.rs
use crate::models::{PeriodKey, StockRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Secondary value shown on a heat map tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Pct,
    Price,
    MarketCap,
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pct" | "percent" => Ok(DisplayMode::Pct),
            "price" => Ok(DisplayMode::Price),
            "marketcap" | "mcap" => Ok(DisplayMode::MarketCap),
            other => Err(format!("unknown display mode '{}'", other)),
        }
    }
}

pub fn format_market_cap(value: f64) -> String {
    if !value.is_finite() || value == 0.0 {
        return "N/A".to_string();
    }
    if value >= 1e12 {
        format!("{:.3}T", value / 1e12)
    } else if value >= 1e9 {
        format!("{:.3}B", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.3}M", value / 1e6)
    } else {
        format!("{:.0}", value)
    }
}

pub fn format_price(value: f64) -> String {
    format!("${:.2}", value)
}

/// Signed percent with two decimals, `+0.00%` for zero.
pub fn format_percent(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.2}%", value)
    } else {
        format!("{:.2}%", value)
    }
}

pub fn display_value(record: &StockRecord, mode: DisplayMode) -> Option<String> {
    match mode {
        DisplayMode::Pct => None,
        DisplayMode::Price => Some(format_price(record.price)),
        DisplayMode::MarketCap => Some(format_market_cap(record.market_cap)),
    }
}

pub fn tile_title(record: &StockRecord, period: PeriodKey) -> String {
    format!(
        "{}: {} | MCap: {} ({})",
        record.symbol,
        format_price(record.price),
        format_market_cap(record.market_cap),
        format_percent(record.change(period))
    )
}

/// Relative age label of a news item.
pub fn time_ago(published_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(published_at);
    let hours = elapsed.num_hours();
    if hours < 1 {
        format!("{}m ago", elapsed.num_minutes().max(0))
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if hours < 24 * 7 {
        format!("{}d ago", hours / 24)
    } else {
        published_at.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PeriodChanges;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_format_market_cap() {
        struct TestCase {
            input: f64,
            expected: &'static str,
        }

        let tests = vec![
            TestCase { input: 2_750_000_000_000.0, expected: "2.750T" },  // TC0
            TestCase { input: 1_234_567_890.0, expected: "1.235B" },      // TC1
            TestCase { input: 45_600_000.0, expected: "45.600M" },        // TC2
            TestCase { input: 999_999.0, expected: "999999" },            // TC3
            TestCase { input: 0.0, expected: "N/A" },                     // TC4
            TestCase { input: f64::NAN, expected: "N/A" },                // TC5
        ];

        for (index, test) in tests.into_iter().enumerate() {
            assert_eq!(format_market_cap(test.input), test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_tile_title_and_display_value() {
        let mut period_changes = PeriodChanges::default();
        period_changes.set(PeriodKey::OneDay, 1.333);
        period_changes.set(PeriodKey::OneMonth, -4.5);
        let record = StockRecord {
            symbol: "AAPL".to_string(),
            price: 178.5,
            change_absolute: 2.34,
            period_changes,
            market_cap: 2_750_000_000_000.0,
            volume: 0.0,
            relative_volume: 0.0,
            company: String::new(),
            sector: String::new(),
            industry: String::new(),
        };

        assert_eq!(
            tile_title(&record, PeriodKey::OneDay),
            "AAPL: $178.50 | MCap: 2.750T (+1.33%)"
        );
        assert_eq!(
            tile_title(&record, PeriodKey::OneMonth),
            "AAPL: $178.50 | MCap: 2.750T (-4.50%)"
        );
        assert_eq!(display_value(&record, DisplayMode::Pct), None);
        assert_eq!(display_value(&record, DisplayMode::Price).as_deref(), Some("$178.50"));
        assert_eq!(display_value(&record, DisplayMode::MarketCap).as_deref(), Some("2.750T"));
    }

    #[test]
    fn test_display_mode_from_str() {
        assert_eq!("pct".parse::<DisplayMode>(), Ok(DisplayMode::Pct));
        assert_eq!("MarketCap".parse::<DisplayMode>(), Ok(DisplayMode::MarketCap));
        assert!("volume".parse::<DisplayMode>().is_err());

        assert_eq!(serde_json::to_value(DisplayMode::MarketCap).unwrap(), "marketcap");
        assert_eq!(serde_json::to_value(DisplayMode::Pct).unwrap(), "pct");
    }

    #[test]
    fn test_time_ago() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - Duration::minutes(150), now), "2h ago");
        assert_eq!(time_ago(now - Duration::hours(30), now), "1d ago");
        assert_eq!(time_ago(now - Duration::days(6), now), "6d ago");
        assert_eq!(time_ago(now - Duration::days(9), now), "2024-05-01");
        assert_eq!(time_ago(now + Duration::minutes(3), now), "0m ago");
    }
}

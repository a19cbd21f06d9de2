// src/models.rs
use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Time horizon a tile's percent change refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKey {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "YTD")]
    YearToDate,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "3Y")]
    ThreeYears,
    #[serde(rename = "5Y")]
    FiveYears,
    #[serde(rename = "10Y")]
    TenYears,
}

impl PeriodKey {
    pub const ALL: [PeriodKey; 10] = [
        PeriodKey::OneDay,
        PeriodKey::OneWeek,
        PeriodKey::OneMonth,
        PeriodKey::ThreeMonths,
        PeriodKey::SixMonths,
        PeriodKey::YearToDate,
        PeriodKey::OneYear,
        PeriodKey::ThreeYears,
        PeriodKey::FiveYears,
        PeriodKey::TenYears,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodKey::OneDay => "1D",
            PeriodKey::OneWeek => "1W",
            PeriodKey::OneMonth => "1M",
            PeriodKey::ThreeMonths => "3M",
            PeriodKey::SixMonths => "6M",
            PeriodKey::YearToDate => "YTD",
            PeriodKey::OneYear => "1Y",
            PeriodKey::ThreeYears => "3Y",
            PeriodKey::FiveYears => "5Y",
            PeriodKey::TenYears => "10Y",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PeriodKey::ALL
            .iter()
            .copied()
            .find(|period| period.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown period '{}'", s))
    }
}

/// Percent change per period. Every period always has a value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodChanges([f64; 10]);

impl PeriodChanges {
    pub fn get(&self, period: PeriodKey) -> f64 {
        self.0[period.slot()]
    }

    pub fn set(&mut self, period: PeriodKey, value: f64) {
        self.0[period.slot()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (PeriodKey, f64)> + '_ {
        PeriodKey::ALL.iter().map(move |period| (*period, self.get(*period)))
    }
}

impl Serialize for PeriodChanges {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(PeriodKey::ALL.len()))?;
        for (period, value) in self.iter() {
            map.serialize_entry(period.as_str(), &value)?;
        }
        map.end()
    }
}

/// One row of the feed after normalisation. Rebuilt on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StockRecord {
    pub symbol: String,
    pub price: f64,
    pub change_absolute: f64,
    pub period_changes: PeriodChanges,
    pub market_cap: f64,
    pub volume: f64,
    pub relative_volume: f64,
    pub company: String,
    pub sector: String,
    pub industry: String,
}

impl StockRecord {
    pub fn change(&self, period: PeriodKey) -> f64 {
        self.period_changes.get(period)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Screen rectangle of a clicked tile or block, used as the animation origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Geometry {
    /// Position of `self` inside `container`, keeping the size.
    pub fn relative_to(&self, container: &Geometry) -> Geometry {
        Geometry {
            x: self.x - container.x,
            y: self.y - container.y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change_absolute: f64,
    pub change_percent: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub previous_close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedProfile {
    pub company_name: String,
    pub market_cap: f64,
    pub sector: String,
    pub website: String,
    pub exchange: String,
    pub logo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketNewsItem {
    pub id: String,
    pub title: String,
    pub article_url: String,
    pub image_url: Option<String>,
    pub publisher: String,
    pub tickers: Vec<String>,
    pub keywords: Vec<String>,
    pub sentiment: Option<String>,
    pub published_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_key_round_trips_through_labels() {
        for period in PeriodKey::ALL {
            assert_eq!(period.as_str().parse::<PeriodKey>(), Ok(period));
        }
        assert_eq!("ytd".parse::<PeriodKey>(), Ok(PeriodKey::YearToDate));
        assert!("2D".parse::<PeriodKey>().is_err());
    }

    #[test]
    fn test_period_changes_serialize_as_labelled_map() {
        let mut changes = PeriodChanges::default();
        changes.set(PeriodKey::OneDay, 1.33);
        changes.set(PeriodKey::TenYears, -4.0);

        let json = serde_json::to_value(changes).unwrap();
        assert_eq!(json["1D"], 1.33);
        assert_eq!(json["1W"], 0.0);
        assert_eq!(json["10Y"], -4.0);
        assert_eq!(json.as_object().unwrap().len(), 10);
    }

    #[test]
    fn test_geometry_relative_and_contains() {
        let container = Geometry { x: 100.0, y: 50.0, width: 800.0, height: 600.0 };
        let tile = Geometry { x: 140.0, y: 90.0, width: 60.0, height: 40.0 };

        let origin = tile.relative_to(&container);
        assert_eq!(origin, Geometry { x: 40.0, y: 40.0, width: 60.0, height: 40.0 });

        assert!(tile.contains(Point { x: 150.0, y: 100.0 }));
        assert!(tile.contains(Point { x: 200.0, y: 130.0 }));
        assert!(!tile.contains(Point { x: 201.0, y: 100.0 }));
    }
}

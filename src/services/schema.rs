// src/services/schema.rs
use crate::models::PeriodKey;
use log::debug;

/// Logical columns the record builder reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedField {
    Ticker,
    Price,
    ChangePercent,
    Change,
    MarketCap,
    Volume,
    RelativeVolume,
    Company,
    Sector,
    Industry,
    /// Percent change over a period other than 1D.
    Period(PeriodKey),
}

/// Where a field's column came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Named(usize),
    Fallback(usize),
    Absent,
}

impl Column {
    pub fn index(&self) -> Option<usize> {
        match self {
            Column::Named(idx) | Column::Fallback(idx) => Some(*idx),
            Column::Absent => None,
        }
    }
}

struct FieldSpec {
    field: FeedField,
    title: &'static str,
    fallback: Option<usize>,
}

// The sheet keeps market cap in column H and the period block in U..AC even
// when the header titles drift.
const FIELD_SPECS: &[FieldSpec] = &[
    FieldSpec { field: FeedField::Ticker, title: "Ticker", fallback: None },
    FieldSpec { field: FeedField::Price, title: "Gprice", fallback: None },
    FieldSpec { field: FeedField::ChangePercent, title: "Gchangepct", fallback: None },
    FieldSpec { field: FeedField::Change, title: "Gchange", fallback: None },
    FieldSpec { field: FeedField::MarketCap, title: "Market Cap", fallback: Some(7) },
    FieldSpec { field: FeedField::Volume, title: "Volume", fallback: None },
    FieldSpec { field: FeedField::RelativeVolume, title: "Rel Volume", fallback: None },
    FieldSpec { field: FeedField::Company, title: "Company", fallback: None },
    FieldSpec { field: FeedField::Sector, title: "Sector", fallback: None },
    FieldSpec { field: FeedField::Industry, title: "Industry", fallback: None },
    FieldSpec { field: FeedField::Period(PeriodKey::OneWeek), title: "1W", fallback: Some(20) },
    FieldSpec { field: FeedField::Period(PeriodKey::OneMonth), title: "1M", fallback: Some(21) },
    FieldSpec { field: FeedField::Period(PeriodKey::ThreeMonths), title: "3M", fallback: Some(22) },
    FieldSpec { field: FeedField::Period(PeriodKey::SixMonths), title: "6M", fallback: Some(23) },
    FieldSpec { field: FeedField::Period(PeriodKey::YearToDate), title: "YTD", fallback: Some(24) },
    FieldSpec { field: FeedField::Period(PeriodKey::OneYear), title: "1Y", fallback: Some(25) },
    FieldSpec { field: FeedField::Period(PeriodKey::ThreeYears), title: "3Y", fallback: Some(26) },
    FieldSpec { field: FeedField::Period(PeriodKey::FiveYears), title: "5Y", fallback: Some(27) },
    FieldSpec { field: FeedField::Period(PeriodKey::TenYears), title: "10Y", fallback: Some(28) },
];

/// Column positions for one feed batch, resolved once from the header row.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSchema {
    columns: Vec<(FeedField, Column)>,
}

impl FeedSchema {
    pub fn resolve(header: &[String]) -> Self {
        let columns = FIELD_SPECS
            .iter()
            .map(|spec| {
                let column = match header.iter().position(|h| h.trim() == spec.title) {
                    Some(idx) => Column::Named(idx),
                    None => match spec.fallback {
                        Some(idx) => Column::Fallback(idx),
                        None => Column::Absent,
                    },
                };
                (spec.field, column)
            })
            .collect::<Vec<_>>();

        debug!(
            "Resolved feed schema: {} named, {} fallback, {} absent",
            columns.iter().filter(|(_, c)| matches!(c, Column::Named(_))).count(),
            columns.iter().filter(|(_, c)| matches!(c, Column::Fallback(_))).count(),
            columns.iter().filter(|(_, c)| matches!(c, Column::Absent)).count(),
        );

        FeedSchema { columns }
    }

    pub fn column(&self, field: FeedField) -> Column {
        self.columns
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, column)| *column)
            .unwrap_or(Column::Absent)
    }

    pub fn index(&self, field: FeedField) -> Option<usize> {
        self.column(field).index()
    }

    /// Raw cell for `field`, `None` when the column is absent or the row is short.
    pub fn cell<'a>(&self, field: FeedField, row: &'a [String]) -> Option<&'a str> {
        self.index(field)
            .and_then(|idx| row.get(idx))
            .map(String::as_str)
    }
}

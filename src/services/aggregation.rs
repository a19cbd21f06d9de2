// src/services/aggregation.rs
use crate::models::{PeriodChanges, PeriodKey, StockRecord};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Sector,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorAggregate {
    pub sector_name: String,
    pub average_change: PeriodChanges,
    pub total_market_cap: f64,
    /// Member symbols in feed order.
    pub member_symbols: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    pub overall: PeriodChanges,
    /// Ordered by descending total market cap, ties in first-seen order.
    pub groups: Vec<SectorAggregate>,
}

impl Aggregation {
    pub fn group(&self, sector_name: &str) -> Option<&SectorAggregate> {
        self.groups.iter().find(|g| g.sector_name == sector_name)
    }

    pub fn ranking(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.sector_name.as_str()).collect()
    }
}

/// Arithmetic mean per period. An empty input averages to 0 everywhere.
pub fn average_changes<'a, I>(records: I) -> PeriodChanges
where
    I: IntoIterator<Item = &'a StockRecord>,
{
    let mut sums = PeriodChanges::default();
    let mut count = 0usize;

    for record in records {
        count += 1;
        for (period, value) in record.period_changes.iter() {
            sums.set(period, sums.get(period) + value);
        }
    }

    if count == 0 {
        return PeriodChanges::default();
    }

    let mut averages = PeriodChanges::default();
    for period in PeriodKey::ALL {
        averages.set(period, sums.get(period) / count as f64);
    }
    averages
}

/// Records grouped by sector name in first-seen order. Records with an
/// empty sector are left out.
pub fn group_by_sector(records: &[StockRecord]) -> Vec<(&str, Vec<&StockRecord>)> {
    let mut order: Vec<(&str, Vec<&StockRecord>)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let sector = record.sector.as_str();
        if sector.is_empty() {
            continue;
        }
        let slot = *slots.entry(sector).or_insert_with(|| {
            order.push((sector, Vec::new()));
            order.len() - 1
        });
        order[slot].1.push(record);
    }

    order
}

/// Keep at most `max_members` records per sector, preserving feed order.
pub fn cap_per_sector(records: Vec<StockRecord>, max_members: usize) -> Vec<StockRecord> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    records
        .into_iter()
        .filter(|record| {
            if record.sector.is_empty() {
                return false;
            }
            let count = counts.entry(record.sector.clone()).or_insert(0);
            *count += 1;
            *count <= max_members
        })
        .collect()
}

pub fn aggregate(records: &[StockRecord], group_by: GroupBy) -> Aggregation {
    let overall = average_changes(records);

    let mut groups: Vec<SectorAggregate> = match group_by {
        GroupBy::None => Vec::new(),
        GroupBy::Sector => group_by_sector(records)
            .into_iter()
            .map(|(sector, members)| SectorAggregate {
                sector_name: sector.to_string(),
                average_change: average_changes(members.iter().copied()),
                total_market_cap: members.iter().map(|r| r.market_cap).sum(),
                member_symbols: members.iter().map(|r| r.symbol.clone()).collect(),
            })
            .collect(),
    };

    // sort_by is stable, equal caps keep encounter order
    groups.sort_by(|a, b| {
        b.total_market_cap
            .partial_cmp(&a.total_market_cap)
            .unwrap_or(Ordering::Equal)
    });

    Aggregation { overall, groups }
}

use crate::aggregator::{Aggregate, Notice};
use crate::quote::QuoteRecord;
use serde::Serialize;
use std::cmp::Ordering;

/// How many gainers and losers a market overview lists.
pub const MOVERS_COUNT: usize = 3;

/// Watchlist snapshot with the day's biggest movers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MarketOverview {
    pub records: Vec<QuoteRecord>,
    pub gainers: Vec<QuoteRecord>,
    pub losers: Vec<QuoteRecord>,
    pub analysis: Option<String>,
    pub notice: Option<Notice>,
}

impl MarketOverview {
    pub fn from_aggregate(aggregate: Aggregate) -> Self {
        let (gainers, losers) = top_movers(&aggregate.records, MOVERS_COUNT);
        Self {
            records: aggregate.records,
            gainers,
            losers,
            analysis: None,
            notice: aggregate.notice,
        }
    }
}

fn by_pct(a: &QuoteRecord, b: &QuoteRecord) -> Ordering {
    a.changes_percentage
        .partial_cmp(&b.changes_percentage)
        .unwrap_or(Ordering::Equal)
}

/// Up to `n` records with the largest positive and largest negative daily
/// percentage change. Flat records are in neither list.
pub fn top_movers(records: &[QuoteRecord], n: usize) -> (Vec<QuoteRecord>, Vec<QuoteRecord>) {
    let mut gainers: Vec<QuoteRecord> = records
        .iter()
        .filter(|q| q.changes_percentage > 0.0)
        .cloned()
        .collect();
    gainers.sort_by(|a, b| by_pct(b, a));
    gainers.truncate(n);

    let mut losers: Vec<QuoteRecord> = records
        .iter()
        .filter(|q| q.changes_percentage < 0.0)
        .cloned()
        .collect();
    losers.sort_by(by_pct);
    losers.truncate(n);

    (gainers, losers)
}

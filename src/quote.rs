use crate::ticker::Ticker;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a record's numbers came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "provider")]
pub enum QuoteSource {
    Live(String),
    Synthetic,
}

impl fmt::Display for QuoteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteSource::Live(provider) => write!(f, "live:{}", provider),
            QuoteSource::Synthetic => f.write_str("synthetic"),
        }
    }
}

/// Normalized market snapshot for one company.
///
/// Every provider (and the synthetic generator) produces this exact shape.
/// Unavailable optional values serialize as `null` rather than being omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    pub symbol: Ticker,
    pub name: String,
    pub price: f64,
    pub change: f64,
    pub changes_percentage: f64,
    // Fundamentals
    pub pe: Option<f64>,
    pub eps: Option<f64>,
    /// Raw currency units
    pub market_cap: Option<f64>,
    pub sector: String,
    pub industry: String,
    pub beta: Option<f64>,
    pub employees: Option<u64>,
    // Intraday
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub open: Option<f64>,
    pub range: Option<String>,
    pub volume: Option<u64>,
    pub avg_volume: Option<u64>,
    // Listing
    pub exchange: String,
    pub currency: String,
    pub country: String,
    pub website: Option<String>,
    pub description: String,
    pub source: QuoteSource,
}

impl QuoteRecord {
    pub fn is_synthetic(&self) -> bool {
        self.source == QuoteSource::Synthetic
    }

    /// Usable as a live record: strictly positive, finite price.
    pub fn has_valid_price(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percent change of `change` relative to `base`, 0 when `base` is unusable.
pub fn percent_change(change: f64, base: f64) -> f64 {
    if base.is_finite() && base != 0.0 {
        change / base * 100.0
    } else {
        0.0
    }
}

/// "low - high" range label used by the dashboards.
pub fn range_label(low: f64, high: f64) -> String {
    format!("{} - {}", round2(low), round2(high))
}

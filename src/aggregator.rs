//! Fan-out/fan-in quote lookup with synthetic fallback.
//!
//! Every symbol is looked up independently and concurrently; the call returns
//! once all lookups have settled. A lookup that errors, exceeds the deadline,
//! or yields a non-positive price is replaced by exactly one synthetic record.
//! There are no retries and no early exit.

use crate::api::QuoteProvider;
use crate::quote::QuoteRecord;
use crate::synthetic::SyntheticQuotes;
use crate::ticker::Ticker;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Informational notice for the caller. Never blocks rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Aggregate {
    pub records: Vec<QuoteRecord>,
    pub notice: Option<Notice>,
}

impl Aggregate {
    pub fn synthetic_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_synthetic()).count()
    }

    pub fn is_all_synthetic(&self) -> bool {
        !self.records.is_empty() && self.synthetic_count() == self.records.len()
    }
}

pub struct QuoteAggregator {
    provider: Arc<dyn QuoteProvider>,
    synthetic: SyntheticQuotes,
    deadline: Duration,
}

impl QuoteAggregator {
    pub fn new(provider: Arc<dyn QuoteProvider>, synthetic: SyntheticQuotes, deadline: Duration) -> Self {
        Self {
            provider,
            synthetic,
            deadline,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// One record per input symbol, in input order.
    pub async fn fetch(&self, symbols: &[Ticker]) -> Aggregate {
        if symbols.is_empty() {
            return Aggregate::default();
        }

        log::info!(
            "Fetching {} quote(s) from {}: {:?}",
            symbols.len(),
            self.provider.name(),
            symbols
        );

        let lookups: Vec<_> = symbols.iter().map(|s| self.fetch_one(s)).collect();
        let records = futures::future::join_all(lookups).await;

        let mut aggregate = Aggregate {
            records,
            notice: None,
        };
        aggregate.notice = fallback_notice(aggregate.synthetic_count(), aggregate.records.len());
        aggregate
    }

    async fn fetch_one(&self, symbol: &Ticker) -> QuoteRecord {
        let attempt = tokio::time::timeout(self.deadline, self.provider.fetch_quote(symbol)).await;
        match attempt {
            Ok(Ok(record)) if record.has_valid_price() => record,
            Ok(Ok(record)) => {
                log::warn!("{} returned unusable price {} for {}", self.provider.name(), record.price, symbol);
                self.synthetic.generate(symbol)
            }
            Ok(Err(e)) => {
                log::warn!("Using simulated data for {}: {}", symbol, e);
                self.synthetic.generate(symbol)
            }
            Err(_) => {
                log::warn!(
                    "Using simulated data for {}: no answer within {:?}",
                    symbol,
                    self.deadline
                );
                self.synthetic.generate(symbol)
            }
        }
    }
}

fn fallback_notice(synthetic: usize, total: usize) -> Option<Notice> {
    if synthetic == 0 {
        return None;
    }
    let message = if synthetic == total {
        "Using realistic simulated data because the market data provider is unreachable".to_string()
    } else {
        format!(
            "Using simulated data for {} of {} symbols that the provider could not serve",
            synthetic, total
        )
    };
    Some(Notice {
        title: "Simulated data".to_string(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_notice_when_everything_is_live() {
        assert!(fallback_notice(0, 3).is_none());
    }

    #[test]
    fn notice_wording_depends_on_outage_size() {
        let total = fallback_notice(2, 2).unwrap();
        assert!(total.message.contains("unreachable"));
        let partial = fallback_notice(1, 3).unwrap();
        assert!(partial.message.contains("1 of 3"));
    }
}

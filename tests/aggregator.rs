mod common;

use common::{FlakyProvider, SlowProvider, StubProvider, ticker};
use market_chat::aggregator::QuoteAggregator;
use market_chat::quote::QuoteSource;
use market_chat::synthetic::SyntheticQuotes;
use std::sync::Arc;
use std::time::Duration;

fn aggregator(provider: Arc<dyn market_chat::api::QuoteProvider>) -> QuoteAggregator {
    QuoteAggregator::new(provider, SyntheticQuotes::default(), Duration::from_secs(2))
}

#[tokio::test]
async fn empty_input_makes_no_calls() {
    let provider = Arc::new(StubProvider::new(100.0));
    let agg = aggregator(provider.clone());
    let result = agg.fetch(&[]).await;
    assert!(result.records.is_empty());
    assert!(result.notice.is_none());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn one_record_per_symbol_in_order() {
    let provider = Arc::new(StubProvider::new(100.0));
    let agg = aggregator(provider.clone());
    let symbols = vec![ticker("MSFT"), ticker("AAPL"), ticker("NVDA")];
    let result = agg.fetch(&symbols).await;

    let got: Vec<&str> = result.records.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(got, vec!["MSFT", "AAPL", "NVDA"]);
    assert_eq!(provider.calls(), 3);
    assert!(result.notice.is_none());
    assert_eq!(result.synthetic_count(), 0);
}

#[tokio::test]
async fn zero_price_becomes_synthetic() {
    let provider = Arc::new(StubProvider::new(0.0));
    let agg = aggregator(provider);
    let result = agg.fetch(&[ticker("ZZZZZ")]).await;

    assert_eq!(result.records.len(), 1);
    let record = &result.records[0];
    assert_eq!(record.source, QuoteSource::Synthetic);
    assert_eq!(record.sector, "Technology");
    assert_eq!(record.name, "ZZZZZ Inc.");
    assert!(record.price > 0.0);
    assert!(result.is_all_synthetic());
}

#[tokio::test]
async fn failed_symbols_are_replaced_individually() {
    let provider = Arc::new(FlakyProvider {
        failing: vec!["MSFT".to_string()],
    });
    let agg = aggregator(provider);
    let result = agg.fetch(&[ticker("AAPL"), ticker("MSFT")]).await;

    assert_eq!(result.records.len(), 2);
    assert!(!result.records[0].is_synthetic());
    assert!(result.records[1].is_synthetic());
    assert_eq!(result.records[1].symbol.as_str(), "MSFT");

    let notice = result.notice.expect("partial fallback should carry a notice");
    assert!(notice.message.contains("1 of 2"));
}

#[tokio::test]
async fn all_failing_notice_mentions_unreachable() {
    let provider = Arc::new(FlakyProvider {
        failing: vec!["AAPL".to_string(), "MSFT".to_string()],
    });
    let agg = aggregator(provider);
    let result = agg.fetch(&[ticker("AAPL"), ticker("MSFT")]).await;

    assert!(result.is_all_synthetic());
    let notice = result.notice.unwrap();
    assert!(notice.message.contains("unreachable"));
}

#[tokio::test]
async fn slow_provider_hits_deadline() {
    let provider = Arc::new(SlowProvider {
        delay: Duration::from_secs(5),
    });
    let agg = QuoteAggregator::new(provider, SyntheticQuotes::default(), Duration::from_millis(50));
    let started = std::time::Instant::now();
    let result = agg.fetch(&[ticker("AAPL"), ticker("TSLA")]).await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(result.records.len(), 2);
    assert!(result.is_all_synthetic());
    // Known symbols keep their company info in the synthetic record.
    assert_eq!(result.records[0].name, "Apple Inc.");
}

#[tokio::test]
async fn provider_name_is_exposed() {
    let agg = aggregator(Arc::new(StubProvider::new(1.0)));
    assert_eq!(agg.provider_name(), "stub");
}

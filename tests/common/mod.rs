#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use market_chat::api::{GenerationConfig, LanguageModel, QuoteProvider};
use market_chat::app::App;
use market_chat::config::{Config, Holding};
use market_chat::quote::{QuoteRecord, QuoteSource};
use market_chat::ticker::Ticker;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn ticker(symbol: &str) -> Ticker {
    Ticker::parse(symbol).unwrap()
}

pub fn make_record(symbol: &str, price: f64, change: f64) -> QuoteRecord {
    QuoteRecord {
        symbol: ticker(symbol),
        name: format!("{} Corp", symbol),
        price,
        change,
        changes_percentage: change / (price - change) * 100.0,
        pe: Some(25.0),
        eps: Some(4.2),
        market_cap: Some(1_500_000_000_000.0),
        sector: "Technology".to_string(),
        industry: "Software".to_string(),
        beta: Some(1.1),
        employees: Some(10_000),
        high: Some(price + 2.0),
        low: Some(price - 2.0),
        open: Some(price - change),
        range: None,
        volume: Some(1_000_000),
        avg_volume: None,
        exchange: "NASDAQ".to_string(),
        currency: "USD".to_string(),
        country: "US".to_string(),
        website: None,
        description: String::new(),
        source: QuoteSource::Live("stub".to_string()),
    }
}

pub fn make_holding(symbol: &str, shares: u32, avg_price: f64) -> Holding {
    Holding {
        symbol: symbol.to_string(),
        shares,
        avg_price,
    }
}

/// Answers every symbol with `make_record(symbol, price, 1.0)`.
pub struct StubProvider {
    pub price: f64,
    pub calls: AtomicUsize,
}

impl StubProvider {
    pub fn new(price: f64) -> Self {
        Self {
            price,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn fetch_quote(&self, symbol: &Ticker) -> Result<QuoteRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(make_record(symbol.as_str(), self.price, 1.0))
    }
}

/// Fails for the listed symbols, succeeds for the rest.
pub struct FlakyProvider {
    pub failing: Vec<String>,
}

#[async_trait]
impl QuoteProvider for FlakyProvider {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn fetch_quote(&self, symbol: &Ticker) -> Result<QuoteRecord> {
        if self.failing.iter().any(|s| s == symbol.as_str()) {
            return Err(anyhow!("HTTP 503 for {}", symbol));
        }
        Ok(make_record(symbol.as_str(), 100.0, 1.0))
    }
}

/// Sleeps before answering.
pub struct SlowProvider {
    pub delay: Duration,
}

#[async_trait]
impl QuoteProvider for SlowProvider {
    fn name(&self) -> &str {
        "slow"
    }

    async fn fetch_quote(&self, symbol: &Ticker) -> Result<QuoteRecord> {
        tokio::time::sleep(self.delay).await;
        Ok(make_record(symbol.as_str(), 100.0, 1.0))
    }
}

/// Returns canned replies in order, then errors. Records every prompt.
pub struct ScriptedModel {
    replies: Mutex<Vec<Result<String, String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Result<&str, &str>>) -> Self {
        let mut replies: Vec<Result<String, String>> = replies
            .into_iter()
            .map(|r| r.map(str::to_string).map_err(str::to_string))
            .collect();
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self::new(Vec::new())
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, prompt: &str, _params: &GenerationConfig) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop() {
            Some(Ok(text)) => Ok(text),
            Some(Err(e)) => Err(anyhow!(e)),
            None => Err(anyhow!("model unavailable")),
        }
    }
}

pub fn test_app(provider: Arc<dyn QuoteProvider>, model: Arc<dyn LanguageModel>) -> App {
    App::with_parts(Config::test_config(), provider, model)
}

pub mod finnhub;
pub mod gemini;
pub mod yahoo;

pub use finnhub::FinnhubClient;
pub use gemini::{GeminiClient, GenerationConfig};
pub use yahoo::YahooClient;

use crate::config::{Config, ProviderKind};
use crate::quote::QuoteRecord;
use crate::ticker::Ticker;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// A market-data service able to produce one normalized record per symbol.
///
/// Any error (network, HTTP status, missing price) is treated by callers as
/// "no live data" and answered with a synthetic record.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_quote(&self, symbol: &Ticker) -> Result<QuoteRecord>;
}

/// A text-completion endpoint.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn generate(&self, prompt: &str, params: &GenerationConfig) -> Result<String>;
}

/// Build the quote provider selected in the config.
pub fn build_provider(config: &Config) -> Arc<dyn QuoteProvider> {
    match config.provider {
        ProviderKind::Finnhub => Arc::new(FinnhubClient::new(
            &config.finnhub_key(),
            &config.fallback_sector,
            &config.fallback_industry,
            config.request_timeout(),
        )),
        ProviderKind::Yahoo => Arc::new(YahooClient::new(
            &config.fallback_sector,
            &config.fallback_industry,
            config.request_timeout(),
        )),
    }
}

//! Finnhub quote provider.
//!
//! A lookup is two requests: `/quote` for the price snapshot and
//! `/stock/profile2` for company metadata. The profile is optional; only the
//! quote decides whether live data exists.

use super::{QuoteProvider, USER_AGENT};
use crate::quote::{QuoteRecord, QuoteSource, percent_change, range_label, round2};
use crate::ticker::Ticker;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use std::time::Duration;

const FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteResponse {
    /// Current price
    #[serde(default)]
    c: Option<f64>,
    /// Percent change
    #[serde(default)]
    dp: Option<f64>,
    #[serde(default)]
    h: Option<f64>,
    #[serde(default)]
    l: Option<f64>,
    #[serde(default)]
    o: Option<f64>,
    /// Previous close
    #[serde(default)]
    pc: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProfileResponse {
    #[serde(default)]
    name: Option<String>,
    /// Millions of `currency`
    #[serde(rename = "marketCapitalization", default)]
    market_capitalization: Option<f64>,
    #[serde(rename = "finnhubIndustry", default)]
    finnhub_industry: Option<String>,
    #[serde(default)]
    gind: Option<String>,
    #[serde(default)]
    weburl: Option<String>,
    #[serde(rename = "employeeTotal", default)]
    employee_total: Option<f64>,
    #[serde(default)]
    exchange: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

pub struct FinnhubClient {
    client: Client,
    api_key: String,
    fallback_sector: String,
    fallback_industry: String,
}

impl FinnhubClient {
    pub fn new(api_key: &str, fallback_sector: &str, fallback_industry: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key: api_key.trim().to_string(),
            fallback_sector: fallback_sector.to_string(),
            fallback_industry: fallback_industry.to_string(),
        }
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Finnhub-Token",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| anyhow!("Invalid Finnhub API key format: {}", e))?,
        );
        Ok(headers)
    }

    async fn get_quote(&self, symbol: &Ticker) -> Result<QuoteResponse> {
        let url = format!("{}/quote", FINNHUB_BASE_URL);
        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol.as_str())])
            .headers(self.auth_headers()?)
            .send()
            .await
            .map_err(|e| anyhow!("Request failed for {}: {}", symbol, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Finnhub quote error for {}: {}", symbol, status));
        }

        response
            .json()
            .await
            .map_err(|e| anyhow!("Failed to parse Finnhub quote for {}: {}", symbol, e))
    }

    async fn get_profile(&self, symbol: &Ticker) -> Result<ProfileResponse> {
        let url = format!("{}/stock/profile2", FINNHUB_BASE_URL);
        let response = self
            .client
            .get(&url)
            .query(&[("symbol", symbol.as_str())])
            .headers(self.auth_headers()?)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("Finnhub profile error for {}: {}", symbol, response.status()));
        }

        Ok(response.json().await?)
    }

    /// Flatten a quote and (possibly empty) profile into a record.
    pub(crate) fn normalize(
        &self,
        symbol: &Ticker,
        quote: QuoteResponse,
        profile: ProfileResponse,
    ) -> Result<QuoteRecord> {
        let price = quote.c.unwrap_or(0.0);
        if !price.is_finite() || price <= 0.0 {
            return Err(anyhow!("No data found for {}", symbol));
        }

        let (change, changes_percentage) = match quote.pc.filter(|pc| *pc > 0.0) {
            Some(prev) => {
                let change = price - prev;
                (change, percent_change(change, prev))
            }
            None => (0.0, quote.dp.unwrap_or(0.0)),
        };

        let name = profile
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("{} Inc.", symbol));
        let range = match (quote.l, quote.h) {
            (Some(l), Some(h)) => Some(range_label(l, h)),
            _ => None,
        };

        Ok(QuoteRecord {
            symbol: symbol.clone(),
            description: format!("Live data from Finnhub for {}", name),
            name,
            price: round2(price),
            change: round2(change),
            changes_percentage: round2(changes_percentage),
            // Not part of the free quote endpoint
            pe: None,
            eps: None,
            market_cap: profile.market_capitalization.map(|m| m * 1e6),
            sector: profile
                .finnhub_industry
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| self.fallback_sector.clone()),
            industry: profile
                .gind
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| self.fallback_industry.clone()),
            beta: None,
            employees: profile.employee_total.map(|e| e as u64),
            high: quote.h,
            low: quote.l,
            open: quote.o,
            range,
            volume: None,
            avg_volume: None,
            exchange: profile.exchange.unwrap_or_else(|| "NASDAQ".to_string()),
            currency: profile.currency.unwrap_or_else(|| "USD".to_string()),
            country: profile.country.unwrap_or_else(|| "US".to_string()),
            website: profile.weburl.filter(|w| !w.is_empty()),
            source: QuoteSource::Live("finnhub".to_string()),
        })
    }
}

#[async_trait]
impl QuoteProvider for FinnhubClient {
    fn name(&self) -> &str {
        "finnhub"
    }

    async fn fetch_quote(&self, symbol: &Ticker) -> Result<QuoteRecord> {
        if self.api_key.is_empty() {
            return Err(anyhow!("Finnhub API key required"));
        }

        log::info!("Fetching Finnhub quote for {}", symbol);
        let quote = self.get_quote(symbol).await?;
        if quote.c.unwrap_or(0.0) <= 0.0 {
            return Err(anyhow!("No data found for {}", symbol));
        }

        let profile = match self.get_profile(symbol).await {
            Ok(p) => p,
            Err(e) => {
                log::debug!("Finnhub profile unavailable for {}: {}", symbol, e);
                ProfileResponse::default()
            }
        };

        self.normalize(symbol, quote, profile)
    }
}

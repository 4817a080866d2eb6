use super::{QuoteProvider, USER_AGENT};
use crate::quote::{QuoteRecord, QuoteSource, percent_change, range_label, round2};
use crate::ticker::Ticker;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, cookie::Jar};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

const YAHOO_BASE_URL: &str = "https://finance.yahoo.com";
const YAHOO_QUOTE_URL: &str = "https://query1.finance.yahoo.com/v7/finance/quote";

#[derive(Debug, Deserialize)]
pub(crate) struct YahooResponse {
    #[serde(rename = "quoteResponse")]
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    result: Vec<QuoteResult>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteResult {
    symbol: String,
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
    #[serde(rename = "longName", default)]
    long_name: Option<String>,
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<f64>,
    #[serde(rename = "regularMarketChange", default)]
    regular_market_change: Option<f64>,
    #[serde(rename = "regularMarketChangePercent", default)]
    regular_market_change_percent: Option<f64>,
    #[serde(rename = "regularMarketOpen", default)]
    regular_market_open: Option<f64>,
    #[serde(rename = "regularMarketDayHigh", default)]
    regular_market_day_high: Option<f64>,
    #[serde(rename = "regularMarketDayLow", default)]
    regular_market_day_low: Option<f64>,
    #[serde(rename = "regularMarketVolume", default)]
    regular_market_volume: Option<u64>,
    #[serde(rename = "regularMarketPreviousClose", default)]
    regular_market_previous_close: Option<f64>,
    // Fundamentals
    #[serde(rename = "trailingPE", default)]
    trailing_pe: Option<f64>,
    #[serde(rename = "epsTrailingTwelveMonths", default)]
    eps_trailing_twelve_months: Option<f64>,
    #[serde(rename = "marketCap", default)]
    market_cap: Option<f64>,
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    industry: Option<String>,
    #[serde(default)]
    beta: Option<f64>,
    #[serde(rename = "averageDailyVolume3Month", default)]
    average_volume: Option<u64>,
    // Listing
    #[serde(rename = "fullExchangeName", default)]
    exchange: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    region: Option<String>,
}

/// Yahoo Finance v7 quote provider. Yahoo requires a session cookie plus a
/// "crumb" token scraped from the landing page; the crumb is cached and
/// refreshed once on a 401.
pub struct YahooClient {
    client: Client,
    crumb: Mutex<Option<String>>,
    fallback_sector: String,
    fallback_industry: String,
}

impl YahooClient {
    pub fn new(fallback_sector: &str, fallback_industry: &str, timeout: Duration) -> Self {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_store(true)
            .cookie_provider(jar)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            crumb: Mutex::new(None),
            fallback_sector: fallback_sector.to_string(),
            fallback_industry: fallback_industry.to_string(),
        }
    }

    /// Fetch crumb and cookies from Yahoo Finance
    async fn fetch_crumb(&self) -> Result<String> {
        let response = self
            .client
            .get(YAHOO_BASE_URL)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.5")
            .send()
            .await?;

        let html = response.text().await?;
        extract_crumb(&html)
    }

    /// Cached crumb, fetched once even under concurrent lookups. Passing the
    /// crumb that was just rejected forces a refresh, unless another lookup
    /// already replaced it.
    async fn crumb(&self, rejected: Option<&str>) -> Result<String> {
        cached_or_fetch(&self.crumb, rejected, || self.fetch_crumb()).await
    }

    async fn request(&self, symbol: &Ticker, crumb: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(YAHOO_QUOTE_URL)
            .query(&[("symbols", symbol.as_str()), ("crumb", crumb)])
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/json")
            .header("Referer", "https://finance.yahoo.com/")
            .send()
            .await?)
    }

    pub(crate) fn parse_response(&self, symbol: &Ticker, data: YahooResponse) -> Result<QuoteRecord> {
        if let Some(err) = data.quote_response.error {
            return Err(anyhow!("Yahoo API error: {:?}", err));
        }

        let result = data
            .quote_response
            .result
            .into_iter()
            .find(|r| r.symbol.eq_ignore_ascii_case(symbol.as_str()))
            .ok_or_else(|| anyhow!("No data found for {}", symbol))?;

        self.normalize(symbol, result)
    }

    fn normalize(&self, symbol: &Ticker, q: QuoteResult) -> Result<QuoteRecord> {
        let price = q
            .regular_market_price
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| anyhow!("No price for {}", symbol))?;

        let change = q
            .regular_market_change
            .or_else(|| q.regular_market_previous_close.map(|pc| price - pc))
            .unwrap_or(0.0);
        let changes_percentage = q
            .regular_market_change_percent
            .unwrap_or_else(|| percent_change(change, price - change));

        let name = q
            .long_name
            .or(q.short_name)
            .unwrap_or_else(|| format!("{} Inc.", symbol));
        let range = match (q.regular_market_day_low, q.regular_market_day_high) {
            (Some(l), Some(h)) => Some(range_label(l, h)),
            _ => None,
        };

        Ok(QuoteRecord {
            symbol: symbol.clone(),
            description: format!("Live data from Yahoo Finance for {}", name),
            name,
            price: round2(price),
            change: round2(change),
            changes_percentage: round2(changes_percentage),
            pe: q.trailing_pe,
            eps: q.eps_trailing_twelve_months,
            market_cap: q.market_cap,
            sector: q.sector.unwrap_or_else(|| self.fallback_sector.clone()),
            industry: q.industry.unwrap_or_else(|| self.fallback_industry.clone()),
            beta: q.beta,
            employees: None,
            high: q.regular_market_day_high,
            low: q.regular_market_day_low,
            open: q.regular_market_open,
            range,
            volume: q.regular_market_volume,
            avg_volume: q.average_volume,
            exchange: q.exchange.unwrap_or_else(|| "NASDAQ".to_string()),
            currency: q.currency.unwrap_or_else(|| "USD".to_string()),
            country: q.region.unwrap_or_else(|| "US".to_string()),
            website: None,
            source: QuoteSource::Live("yahoo".to_string()),
        })
    }
}

async fn cached_or_fetch<F, Fut>(
    slot: &Mutex<Option<String>>,
    rejected: Option<&str>,
    fetch: F,
) -> Result<String>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<String>>,
{
    // Held across the fetch so concurrent callers wait for one fill.
    let mut cached = slot.lock().await;
    if let Some(crumb) = cached.as_deref() {
        if rejected != Some(crumb) {
            return Ok(crumb.to_string());
        }
    }
    let crumb = fetch().await?;
    *cached = Some(crumb.clone());
    Ok(crumb)
}

fn extract_crumb(html: &str) -> Result<String> {
    // "crumb":"value"
    if let Some(start) = html.find("\"crumb\":\"") {
        let start = start + 9;
        if let Some(end) = html[start..].find('"') {
            let crumb = &html[start..start + end];
            if !crumb.is_empty() {
                return Ok(crumb.to_string());
            }
        }
    }

    // "CrumbStore":{"crumb":"value"}
    if let Some(start) = html.find("\"CrumbStore\":{\"crumb\":\"") {
        let start = start + 23;
        if let Some(end) = html[start..].find('"') {
            let crumb = &html[start..start + end];
            if !crumb.is_empty() {
                return Ok(crumb.to_string());
            }
        }
    }

    Err(anyhow!("Could not extract crumb from Yahoo Finance"))
}

#[async_trait]
impl QuoteProvider for YahooClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_quote(&self, symbol: &Ticker) -> Result<QuoteRecord> {
        log::info!("Fetching Yahoo quote for {}", symbol);
        let crumb = self.crumb(None).await?;
        let mut response = self.request(symbol, &crumb).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let fresh = self.crumb(Some(&crumb)).await?;
            response = self.request(symbol, &fresh).await?;
        }

        if !response.status().is_success() {
            return Err(anyhow!("Yahoo API error: {}", response.status()));
        }

        let data: YahooResponse = response.json().await?;
        self.parse_response(symbol, data)
    }
}

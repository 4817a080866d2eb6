//! Plausible stand-in quotes for when no live provider answers.
//!
//! A record starts from a fixed base price per symbol and is perturbed by a
//! bounded random walk: the level moves within ±5% of base (a 10% band) and the
//! daily change within ±2.5% of price (a 5% band). Every optional field is
//! filled so renderers never have to branch on missing data.

use crate::quote::{QuoteRecord, QuoteSource, round2};
use crate::ticker::Ticker;
use rand::Rng;

/// Base price used for symbols missing from [`BASE_PRICES`].
pub const DEFAULT_BASE_PRICE: f64 = 100.0;

const BASE_PRICES: &[(&str, f64)] = &[
    ("AAPL", 175.0),
    ("MSFT", 350.0),
    ("GOOGL", 125.0),
    ("AMZN", 140.0),
    ("TSLA", 200.0),
    ("META", 280.0),
    ("NVDA", 450.0),
    ("NFLX", 400.0),
    ("AMD", 110.0),
    ("INTC", 45.0),
    ("CRM", 220.0),
    ("ORCL", 105.0),
    ("IBM", 140.0),
    ("CSCO", 50.0),
];

struct CompanyInfo {
    symbol: &'static str,
    name: &'static str,
    sector: &'static str,
    industry: &'static str,
}

const COMPANY_INFO: &[CompanyInfo] = &[
    CompanyInfo { symbol: "AAPL", name: "Apple Inc.", sector: "Technology", industry: "Consumer Electronics" },
    CompanyInfo { symbol: "MSFT", name: "Microsoft Corporation", sector: "Technology", industry: "Software" },
    CompanyInfo { symbol: "GOOGL", name: "Alphabet Inc.", sector: "Technology", industry: "Internet Services" },
    CompanyInfo { symbol: "AMZN", name: "Amazon.com Inc.", sector: "Consumer Discretionary", industry: "E-commerce" },
    CompanyInfo { symbol: "TSLA", name: "Tesla Inc.", sector: "Consumer Discretionary", industry: "Electric Vehicles" },
    CompanyInfo { symbol: "META", name: "Meta Platforms Inc.", sector: "Technology", industry: "Social Media" },
    CompanyInfo { symbol: "NVDA", name: "NVIDIA Corporation", sector: "Technology", industry: "Semiconductors" },
    CompanyInfo { symbol: "NFLX", name: "Netflix Inc.", sector: "Communication Services", industry: "Streaming" },
];

pub fn base_price(symbol: &str) -> f64 {
    BASE_PRICES
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, p)| *p)
        .unwrap_or(DEFAULT_BASE_PRICE)
}

/// Generator for synthetic records; holds the fallback classification used
/// for symbols without company info.
#[derive(Debug, Clone)]
pub struct SyntheticQuotes {
    pub fallback_sector: String,
    pub fallback_industry: String,
}

impl Default for SyntheticQuotes {
    fn default() -> Self {
        Self {
            fallback_sector: "Technology".to_string(),
            fallback_industry: "Software".to_string(),
        }
    }
}

impl SyntheticQuotes {
    pub fn new(fallback_sector: &str, fallback_industry: &str) -> Self {
        Self {
            fallback_sector: fallback_sector.to_string(),
            fallback_industry: fallback_industry.to_string(),
        }
    }

    pub fn generate(&self, symbol: &Ticker) -> QuoteRecord {
        let mut rng = rand::rng();
        self.generate_with(symbol, &mut rng)
    }

    pub fn generate_with<R: Rng>(&self, symbol: &Ticker, rng: &mut R) -> QuoteRecord {
        let code = symbol.as_str();
        let base = base_price(code);

        let price = round2(base + rng.random_range(-0.05..0.05) * base).max(0.01);
        let change = round2(rng.random_range(-0.025..0.025) * price);
        let changes_percentage = round2(change / (price - change) * 100.0);

        let (name, sector, industry) = match COMPANY_INFO.iter().find(|c| c.symbol == code) {
            Some(info) => (
                info.name.to_string(),
                info.sector.to_string(),
                info.industry.to_string(),
            ),
            None => (
                format!("{} Inc.", code),
                self.fallback_sector.clone(),
                self.fallback_industry.clone(),
            ),
        };

        let pe = round2(rng.random_range(15.0..35.0));
        let eps = round2(price / rng.random_range(15.0..35.0));
        let shares_out: f64 = rng.random_range(1e9..2.001e12);
        let market_cap = ((price * shares_out) / 1e6).round() * 1e6;
        let high = round2(price * (1.0 + rng.random_range(0.0..0.05)));
        let low = round2(price * (1.0 - rng.random_range(0.0..0.05)));
        let open = round2(price + rng.random_range(-0.01..0.01) * price);

        QuoteRecord {
            symbol: symbol.clone(),
            description: format!("Simulated data for {} (live provider unavailable)", name),
            name,
            price,
            change,
            changes_percentage,
            pe: Some(pe),
            eps: Some(eps),
            market_cap: Some(market_cap),
            sector,
            industry,
            beta: Some(round2(rng.random_range(0.5..2.0))),
            employees: Some(rng.random_range(50_000..200_000)),
            high: Some(high),
            low: Some(low),
            open: Some(open),
            range: Some(crate::quote::range_label(low, high)),
            volume: Some(rng.random_range(5_000_000..25_000_000)),
            avg_volume: Some(rng.random_range(10_000_000..60_000_000)),
            exchange: "NASDAQ".to_string(),
            currency: "USD".to_string(),
            country: "US".to_string(),
            website: Some(format!("https://{}.com", code.to_lowercase())),
            source: QuoteSource::Synthetic,
        }
    }
}

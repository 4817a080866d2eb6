use crate::resolver::Strategy;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const FINNHUB_KEY_ENV: &str = "FINNHUB_API_KEY";
pub const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Finnhub,
    Yahoo,
}

impl ProviderKind {
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::Finnhub => "finnhub",
            ProviderKind::Yahoo => "yahoo",
        }
    }
}

/// A position in the portfolio
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub shares: u32,
    pub avg_price: f64,
}

impl Holding {
    pub fn cost_basis(&self) -> f64 {
        self.shares as f64 * self.avg_price
    }

    /// (value, cost, P/L, P/L %) at the given market price
    pub fn pl_metrics(&self, current_price: f64) -> (f64, f64, f64, f64) {
        let value = current_price * self.shares as f64;
        let cost = self.cost_basis();
        let pl = value - cost;
        let pl_pct = if cost > 0.0 { (pl / cost) * 100.0 } else { 0.0 };
        (value, cost, pl, pl_pct)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default)]
    pub finnhub_api_key: String,
    #[serde(default)]
    pub gemini_api_key: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default)]
    pub resolver: Strategy,
    #[serde(default = "default_max_symbols")]
    pub max_symbols: usize,
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_model_timeout")]
    pub model_timeout_secs: u64,
    #[serde(default = "default_fallback_sector")]
    pub fallback_sector: String,
    #[serde(default = "default_fallback_industry")]
    pub fallback_industry: String,
    #[serde(default = "default_max_daily_usage")]
    pub max_daily_usage: u32,
    #[serde(default = "default_watchlist")]
    pub watchlist: Vec<String>,
    #[serde(default)]
    pub holdings: Vec<Holding>,
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_max_symbols() -> usize {
    5
}

fn default_fetch_timeout() -> u64 {
    10
}

fn default_model_timeout() -> u64 {
    30
}

fn default_fallback_sector() -> String {
    "Technology".to_string()
}

fn default_fallback_industry() -> String {
    "Software".to_string()
}

fn default_max_daily_usage() -> u32 {
    50
}

fn default_watchlist() -> Vec<String> {
    ["AAPL", "MSFT", "GOOGL", "AMZN", "NVDA"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            finnhub_api_key: String::new(),
            gemini_api_key: String::new(),
            gemini_model: default_gemini_model(),
            resolver: Strategy::default(),
            max_symbols: default_max_symbols(),
            fetch_timeout_secs: default_fetch_timeout(),
            model_timeout_secs: default_model_timeout(),
            fallback_sector: default_fallback_sector(),
            fallback_industry: default_fallback_industry(),
            max_daily_usage: default_max_daily_usage(),
            watchlist: default_watchlist(),
            holdings: Vec::new(),
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("market-chat");

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        Ok(config_dir.join("config.json"))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&content)?;
        config.sanitize();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Clamp values a hand-edited file may have broken.
    fn sanitize(&mut self) {
        if self.max_symbols == 0 {
            self.max_symbols = default_max_symbols();
        }
        if self.fetch_timeout_secs == 0 {
            self.fetch_timeout_secs = default_fetch_timeout();
        }
        if self.model_timeout_secs == 0 {
            self.model_timeout_secs = default_model_timeout();
        }
        if self.fallback_sector.trim().is_empty() {
            self.fallback_sector = default_fallback_sector();
        }
        if self.fallback_industry.trim().is_empty() {
            self.fallback_industry = default_fallback_industry();
        }
        for s in self.watchlist.iter_mut() {
            *s = s.trim().to_uppercase();
        }
        self.watchlist.retain(|s| !s.is_empty());
    }

    /// Key from the environment if set, otherwise from the file.
    pub fn finnhub_key(&self) -> String {
        key_with_env(FINNHUB_KEY_ENV, &self.finnhub_api_key)
    }

    pub fn gemini_key(&self) -> String {
        key_with_env(GEMINI_KEY_ENV, &self.gemini_api_key)
    }

    /// Copy safe to print: API keys become "set" or "missing".
    pub fn redacted(&self) -> Self {
        let mask = |key: String| {
            let state = if key.is_empty() { "missing" } else { "set" };
            state.to_string()
        };
        Self {
            finnhub_api_key: mask(self.finnhub_key()),
            gemini_api_key: mask(self.gemini_key()),
            ..self.clone()
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Per-HTTP-request timeout for quote providers. A lookup may chain
    /// two requests (Finnhub quote then profile), and both must settle
    /// inside the per-symbol deadline.
    pub fn request_timeout(&self) -> Duration {
        self.fetch_timeout() / 3
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }

    pub fn add_symbol(&mut self, symbol: &str) {
        let symbol = symbol.trim().to_uppercase();
        if !symbol.is_empty() && !self.watchlist.contains(&symbol) {
            self.watchlist.push(symbol);
        }
    }

    pub fn remove_symbol(&mut self, symbol: &str) {
        let symbol = symbol.trim().to_uppercase();
        self.watchlist.retain(|s| s != &symbol);
    }

    /// Add a new holding or merge into an existing one at the weighted
    /// average price. Returns false if the share count would overflow.
    pub fn add_holding(&mut self, symbol: &str, shares: u32, avg_price: f64) -> bool {
        let symbol = symbol.trim().to_uppercase();
        if let Some(holding) = self.holdings.iter_mut().find(|h| h.symbol == symbol) {
            let total_shares = match holding.shares.checked_add(shares) {
                Some(t) => t,
                None => return false,
            };
            let total_cost = holding.cost_basis() + shares as f64 * avg_price;
            holding.avg_price = total_cost / total_shares as f64;
            holding.shares = total_shares;
        } else {
            self.holdings.push(Holding {
                symbol,
                shares,
                avg_price,
            });
        }
        true
    }

    pub fn remove_holding(&mut self, symbol: &str) {
        let symbol = symbol.trim().to_uppercase();
        self.holdings.retain(|h| h.symbol != symbol);
    }

    pub fn holding_symbols(&self) -> Vec<String> {
        self.holdings.iter().map(|h| h.symbol.clone()).collect()
    }

    /// Default config with no environment or file I/O involved.
    pub fn test_config() -> Self {
        Self {
            watchlist: vec!["AAPL".to_string(), "MSFT".to_string()],
            ..Self::default()
        }
    }
}

fn key_with_env(var: &str, from_file: &str) -> String {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => from_file.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_holding_overflow_returns_false() {
        let mut config = Config::test_config();
        config.add_holding("AAPL", 3_000_000_000, 150.0);
        let ok = config.add_holding("AAPL", 2_000_000_000, 160.0);
        assert!(!ok, "add_holding should return false on u32 overflow");
        let h = config.holdings.iter().find(|h| h.symbol == "AAPL").unwrap();
        assert_eq!(h.shares, 3_000_000_000);
        assert_eq!(h.avg_price, 150.0);
    }

    #[test]
    fn add_holding_merges_at_weighted_average() {
        let mut config = Config::test_config();
        config.add_holding("msft", 100, 300.0);
        assert!(config.add_holding("MSFT", 100, 400.0));
        assert_eq!(config.holdings.len(), 1);
        let h = &config.holdings[0];
        assert_eq!(h.shares, 200);
        assert!((h.avg_price - 350.0).abs() < 0.01);
    }

    #[test]
    fn sanitize_repairs_zeroes_and_case() {
        let json = r#"{"max_symbols":0,"fetch_timeout_secs":0,"fallback_sector":" ",
                       "watchlist":[" tsla ",""]}"#;
        let mut config: Config = serde_json::from_str(json).unwrap();
        config.sanitize();
        assert_eq!(config.max_symbols, 5);
        assert_eq!(config.fetch_timeout_secs, 10);
        assert_eq!(config.fallback_sector, "Technology");
        assert_eq!(config.watchlist, vec!["TSLA".to_string()]);
    }

    #[test]
    fn request_timeout_fits_two_requests_in_deadline() {
        let config = Config::test_config();
        assert!(config.request_timeout() * 2 < config.fetch_timeout());
        assert!(config.request_timeout() > Duration::ZERO);
    }

    #[test]
    fn pl_metrics() {
        let h = Holding {
            symbol: "AAPL".to_string(),
            shares: 10,
            avg_price: 100.0,
        };
        let (value, cost, pl, pl_pct) = h.pl_metrics(120.0);
        assert_eq!(value, 1200.0);
        assert_eq!(cost, 1000.0);
        assert_eq!(pl, 200.0);
        assert!((pl_pct - 20.0).abs() < 1e-9);
    }
}

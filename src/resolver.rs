//! Free text → ticker symbols.
//!
//! Two strategies share one output contract: uppercase 1-5 letter symbols,
//! de-duplicated in first-seen order and capped at `max_symbols`. Neither ever
//! returns an error; the worst case is an empty list.

use crate::api::{GenerationConfig, LanguageModel};
use crate::ticker::Ticker;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Company names (uppercase) mapped to their canonical ticker.
pub const COMPANY_TICKERS: &[(&str, &str)] = &[
    ("APPLE", "AAPL"),
    ("MICROSOFT", "MSFT"),
    ("GOOGLE", "GOOGL"),
    ("ALPHABET", "GOOGL"),
    ("AMAZON", "AMZN"),
    ("TESLA", "TSLA"),
    ("META", "META"),
    ("FACEBOOK", "META"),
    ("NVIDIA", "NVDA"),
    ("NETFLIX", "NFLX"),
    ("AMD", "AMD"),
    ("INTEL", "INTC"),
    ("SALESFORCE", "CRM"),
    ("ORACLE", "ORCL"),
    ("IBM", "IBM"),
    ("CISCO", "CSCO"),
];

/// Bare tokens accepted by the lexical strategy.
pub const KNOWN_TICKERS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA", "NFLX", "AMD", "INTC", "CRM", "ORCL",
    "IBM", "CSCO",
];

/// Words a model tends to emit that look like tickers but are not.
pub const STOPLIST: &[&str] = &[
    "NONE", "NULL", "NA", "N", "EMPTY", "NO", "THE", "AND", "OR", "FOR", "WITH", "VS", "USD", "EUR",
    "CEO", "CFO", "ETF", "AI", "PE", "EPS", "IPO", "GDP", "API", "US", "USA", "STOCK", "TICKER",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Lexical,
    Model,
}

fn push_unique(code: &str, found: &mut Vec<Ticker>) {
    if let Some(t) = Ticker::parse(code) {
        if !found.contains(&t) {
            found.push(t);
        }
    }
}

/// Dictionary + allow-list extraction. Deterministic and offline.
///
/// Matches whole words only, so "intelligence" is not Intel and "metals" is
/// not Meta. Symbols come out in the order they are first mentioned.
pub fn extract_lexical(text: &str, max_symbols: usize) -> Vec<Ticker> {
    let normalized = text.to_uppercase();
    let mut found: Vec<Ticker> = Vec::new();

    for m in WORD.find_iter(&normalized) {
        let word = m.as_str();
        let code = COMPANY_TICKERS
            .iter()
            .find(|(company, _)| *company == word)
            .map(|(_, code)| *code)
            .or_else(|| KNOWN_TICKERS.iter().find(|k| **k == word).copied());
        if let Some(code) = code {
            push_unique(code, &mut found);
        }
    }

    found.truncate(max_symbols);
    found
}

/// Parse a model reply of comma-separated tickers.
///
/// Tokens are split on commas and semicolons only. Any prose around the
/// tickers leaves spaces inside a token, which then fails validation.
pub fn parse_model_symbols(reply: &str, max_symbols: usize) -> Vec<Ticker> {
    let cleaned: String = reply
        .trim()
        .to_uppercase()
        .chars()
        .filter(|c| !matches!(c, '"' | '\'' | '`' | '.' | '*'))
        .collect();

    if cleaned.trim().len() < 2 {
        return Vec::new();
    }

    let mut out: Vec<Ticker> = Vec::new();
    for token in cleaned.split([',', ';']) {
        let token = token.trim();
        if STOPLIST.contains(&token) {
            continue;
        }
        push_unique(token, &mut out);
    }

    out.truncate(max_symbols);
    out
}

fn extraction_prompt(text: &str) -> String {
    let mappings: Vec<String> = COMPANY_TICKERS
        .iter()
        .map(|(company, code)| format!("- \"{}\" -> {}", company.to_lowercase(), code))
        .collect();

    format!(
        "Extract ONLY the stock ticker symbols of publicly traded companies mentioned in the message below.\n\n\
         RULES:\n\
         1. Map well-known company names to their canonical ticker, for example:\n{}\n\
         2. Reply with nothing but the tickers, comma-separated (e.g. \"AAPL,MSFT\"). No explanations.\n\
         3. If no company or ticker is mentioned, reply with an empty string.\n\n\
         Message: \"{}\"",
        mappings.join("\n"),
        text
    )
}

/// Resolves user text to tickers with the configured strategy.
pub struct SymbolResolver {
    strategy: Strategy,
    max_symbols: usize,
    model: Option<Arc<dyn LanguageModel>>,
}

impl SymbolResolver {
    pub fn lexical(max_symbols: usize) -> Self {
        Self {
            strategy: Strategy::Lexical,
            max_symbols,
            model: None,
        }
    }

    pub fn model_assisted(model: Arc<dyn LanguageModel>, max_symbols: usize) -> Self {
        Self {
            strategy: Strategy::Model,
            max_symbols,
            model: Some(model),
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub async fn resolve(&self, text: &str) -> Vec<Ticker> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        match (self.strategy, &self.model) {
            (Strategy::Model, Some(model)) => {
                let prompt = extraction_prompt(text);
                match model.generate(&prompt, &GenerationConfig::EXTRACTION).await {
                    Ok(reply) => {
                        let symbols = parse_model_symbols(&reply, self.max_symbols);
                        log::debug!("Model reply {:?} -> {:?}", reply.trim(), symbols);
                        symbols
                    }
                    Err(e) => {
                        log::warn!("Symbol extraction via model failed, using lexical match: {}", e);
                        extract_lexical(text, self.max_symbols)
                    }
                }
            }
            _ => extract_lexical(text, self.max_symbols),
        }
    }
}

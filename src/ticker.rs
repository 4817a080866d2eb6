use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest symbol accepted anywhere in the pipeline.
pub const MAX_TICKER_LEN: usize = 5;

/// An uppercase ticker symbol of 1 to 5 ASCII letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Trim and uppercase `raw`, returning `None` unless it is 1-5 letters.
    pub fn parse(raw: &str) -> Option<Self> {
        let code = raw.trim().to_uppercase();
        if code.is_empty() || code.len() > MAX_TICKER_LEN {
            return None;
        }
        if !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        Some(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse a list, silently dropping invalid entries and duplicates.
    pub fn parse_all<S: AsRef<str>>(raw: &[S]) -> Vec<Ticker> {
        let mut out: Vec<Ticker> = Vec::new();
        for s in raw {
            if let Some(t) = Ticker::parse(s.as_ref()) {
                if !out.contains(&t) {
                    out.push(t);
                }
            }
        }
        out
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Ticker {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ticker::parse(&value).ok_or_else(|| format!("invalid ticker symbol: {:?}", value))
    }
}

impl From<Ticker> for String {
    fn from(t: Ticker) -> Self {
        t.0
    }
}

//! Prose analysis of fetched quotes via the language model.

use crate::api::{GenerationConfig, LanguageModel};
use crate::quote::QuoteRecord;
use crate::ui::formatters::{format_change, format_market_cap, format_optional, format_summary};
use std::sync::Arc;

fn or_na<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| "N/A".to_string())
}

/// Prompt embedding the user query and every field of every record.
pub fn build_prompt(query: &str, records: &[QuoteRecord]) -> String {
    let mut prompt = format!(
        "You are an expert financial advisor specialized in market analysis.\n\n\
         USER QUERY: \"{}\"\n\n",
        query
    );

    if records.is_empty() {
        prompt.push_str(
            "No specific financial data was found for this query.\n\n\
             Provide general educational information about the topic and explain the relevant financial concepts.",
        );
        return prompt;
    }

    prompt.push_str("AVAILABLE FINANCIAL DATA:\n");
    for q in records {
        prompt.push_str(&format!("\n**{} - {}:**\n", q.symbol, q.name));
        prompt.push_str(&format!("- Current price: ${:.2}\n", q.price));
        prompt.push_str(&format!(
            "- Daily change: {} ({:.2}%)\n",
            format_change(q.change),
            q.changes_percentage
        ));
        prompt.push_str(&format!("- P/E ratio: {}\n", format_optional(q.pe)));
        prompt.push_str(&format!("- EPS: {}\n", format_optional(q.eps)));
        prompt.push_str(&format!("- Market cap: {}\n", format_market_cap(q.market_cap)));
        prompt.push_str(&format!("- Sector: {}\n", q.sector));
        prompt.push_str(&format!("- Industry: {}\n", q.industry));
        prompt.push_str(&format!("- Beta: {}\n", format_optional(q.beta)));
        prompt.push_str(&format!("- Employees: {}\n", or_na(q.employees)));
        if q.is_synthetic() {
            prompt.push_str("- Note: simulated figures, live data unavailable\n");
        }
    }

    prompt.push_str(
        "\nINSTRUCTIONS:\n\
         Provide a complete financial analysis covering:\n\n\
         1. **Executive summary**: overview of the company or companies\n\
         2. **Price analysis**: interpretation of the current price and its change\n\
         3. **Fundamentals**: P/E, EPS and market capitalization\n\
         4. **Competitive position**: sector and industry context\n\
         5. **Recommendations**: suggestions grounded in the data\n\
         6. **Risk factors**: the main risks to consider\n\n\
         Use professional but accessible language.",
    );
    prompt
}

/// Prompt for a market-wide read over a watchlist snapshot.
pub fn build_market_prompt(records: &[QuoteRecord]) -> String {
    let mut prompt = String::from(
        "You are an expert financial advisor specialized in market analysis.\n\n\
         Analyze the current state of the market based on these stocks:\n\n",
    );
    for q in records {
        prompt.push_str(&format!(
            "- {} ({}): ${:.2} ({}, {:.2}%)\n",
            q.symbol,
            q.name,
            q.price,
            format_change(q.change),
            q.changes_percentage
        ));
    }
    prompt.push_str(
        "\nProvide a complete analysis covering:\n\
         1. Overall market sentiment\n\
         2. Best and worst performing sectors\n\
         3. General recommendations\n\
         4. Factors to monitor",
    );
    prompt
}

/// Fixed reply used when the model cannot be reached. Still carries the data.
pub fn fallback_commentary(records: &[QuoteRecord]) -> String {
    let mut text = String::from(
        "**Market analysis**\n\n\
         The AI analysis could not be generated because of a technical problem, \
         but the financial data that was retrieved is shown below.\n\n",
    );
    if !records.is_empty() {
        text.push_str(&format_summary(records));
    }
    text.push_str(
        "**Tip:** try again in a few moments.\n\n\
         **Note:** always consult a professional financial advisor before making investment decisions.",
    );
    text
}

pub struct CommentaryGenerator {
    model: Arc<dyn LanguageModel>,
}

impl CommentaryGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Model text verbatim, or [`fallback_commentary`] on any failure.
    pub async fn generate(&self, query: &str, records: &[QuoteRecord]) -> String {
        self.complete(build_prompt(query, records), records).await
    }

    pub async fn market_analysis(&self, records: &[QuoteRecord]) -> String {
        self.complete(build_market_prompt(records), records).await
    }

    async fn complete(&self, prompt: String, records: &[QuoteRecord]) -> String {
        match self.model.generate(&prompt, &GenerationConfig::COMMENTARY).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                log::warn!("Commentary model returned an empty reply");
                fallback_commentary(records)
            }
            Err(e) => {
                log::warn!("Commentary generation failed: {}", e);
                fallback_commentary(records)
            }
        }
    }
}

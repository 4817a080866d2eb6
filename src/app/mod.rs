mod market;
mod portfolio;
mod usage;

pub use market::{MOVERS_COUNT, MarketOverview, top_movers};
pub use portfolio::{PortfolioReport, Position};
pub use usage::DailyUsage;

use crate::aggregator::{Aggregate, Notice, QuoteAggregator};
use crate::api::{self, GeminiClient, LanguageModel, QuoteProvider};
use crate::commentary::CommentaryGenerator;
use crate::config::Config;
use crate::quote::QuoteRecord;
use crate::resolver::{Strategy, SymbolResolver};
use crate::synthetic::SyntheticQuotes;
use crate::ticker::Ticker;
use crate::ui::formatters::format_summary;
use anyhow::{Result, bail};
use chrono::Local;
use serde::Serialize;
use std::sync::Arc;

/// Result of one chat query.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub query: String,
    pub symbols: Vec<Ticker>,
    pub records: Vec<QuoteRecord>,
    pub summary: Option<String>,
    pub commentary: String,
    pub notice: Option<Notice>,
}

/// Application state owned by the caller and threaded through every command.
pub struct App {
    pub config: Config,
    pub usage: DailyUsage,
    pub status_message: Option<String>,
    pub last_updated: Option<String>,
    resolver: SymbolResolver,
    aggregator: QuoteAggregator,
    commentary: CommentaryGenerator,
}

impl App {
    pub fn with_config(config: Config) -> Self {
        let provider = api::build_provider(&config);
        let model: Arc<dyn LanguageModel> = Arc::new(GeminiClient::new(
            &config.gemini_key(),
            &config.gemini_model,
            config.model_timeout(),
        ));
        Self::with_parts(config, provider, model)
    }

    /// Wire the app from explicit collaborators.
    pub fn with_parts(
        config: Config,
        provider: Arc<dyn QuoteProvider>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        let resolver = match config.resolver {
            Strategy::Lexical => SymbolResolver::lexical(config.max_symbols),
            Strategy::Model => SymbolResolver::model_assisted(model.clone(), config.max_symbols),
        };
        let aggregator = QuoteAggregator::new(
            provider,
            SyntheticQuotes::new(&config.fallback_sector, &config.fallback_industry),
            config.fetch_timeout(),
        );
        let commentary = CommentaryGenerator::new(model);

        Self {
            usage: DailyUsage::new(config.max_daily_usage),
            config,
            status_message: None,
            last_updated: None,
            resolver,
            aggregator,
            commentary,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.aggregator.provider_name()
    }

    pub async fn resolve(&self, text: &str) -> Vec<Ticker> {
        self.resolver.resolve(text).await
    }

    pub async fn quotes(&mut self, symbols: &[Ticker]) -> Aggregate {
        let aggregate = self.aggregator.fetch(symbols).await;
        self.record_refresh(&aggregate);
        aggregate
    }

    /// Quotes for the configured watchlist.
    pub async fn market_overview(&mut self) -> Aggregate {
        let symbols = Ticker::parse_all(&self.config.watchlist);
        self.quotes(&symbols).await
    }

    /// Watchlist quotes with top movers. With `analyze`, also asks the model
    /// for a market-wide read, which counts against the daily budget.
    pub async fn market_report(&mut self, analyze: bool) -> Result<MarketOverview> {
        if analyze {
            self.consume_query()?;
        }
        let aggregate = self.market_overview().await;
        let mut overview = MarketOverview::from_aggregate(aggregate);
        if analyze && !overview.records.is_empty() {
            overview.analysis = Some(self.commentary.market_analysis(&overview.records).await);
        }
        Ok(overview)
    }

    pub async fn portfolio_report(&mut self) -> (PortfolioReport, Option<Notice>) {
        let symbols = Ticker::parse_all(&self.config.holding_symbols());
        let aggregate = self.quotes(&symbols).await;
        let report = PortfolioReport::build(&self.config.holdings, &aggregate.records);
        (report, aggregate.notice)
    }

    /// Full chat turn: resolve symbols, fetch quotes, generate commentary.
    pub async fn ask(&mut self, query: &str) -> Result<Answer> {
        let query = query.trim();
        if query.is_empty() {
            bail!("Query cannot be empty");
        }
        self.consume_query()?;

        let symbols = self.resolve(query).await;
        log::info!("Resolved {:?} -> {:?}", query, symbols);

        let (records, summary, notice) = if symbols.is_empty() {
            (Vec::new(), None, None)
        } else {
            let aggregate = self.quotes(&symbols).await;
            let summary = format_summary(&aggregate.records);
            (aggregate.records, Some(summary), aggregate.notice)
        };

        let commentary = self.commentary.generate(query, &records).await;

        Ok(Answer {
            query: query.to_string(),
            symbols,
            records,
            summary,
            commentary,
            notice,
        })
    }

    fn consume_query(&mut self) -> Result<()> {
        if !self.usage.try_consume() {
            bail!(
                "Daily query limit reached ({}/{})",
                self.usage.used,
                self.usage.limit
            );
        }
        Ok(())
    }

    fn record_refresh(&mut self, aggregate: &Aggregate) {
        if aggregate.records.is_empty() {
            return;
        }
        self.last_updated = Some(Local::now().format("%H:%M:%S").to_string());
        self.status_message = aggregate
            .notice
            .as_ref()
            .map(|n| format!("{}: {}", n.title, n.message));
    }
}

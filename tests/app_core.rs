mod common;

use common::{FlakyProvider, ScriptedModel, StubProvider, make_holding, test_app};
use market_chat::app::App;
use market_chat::commentary::fallback_commentary;
use market_chat::config::Config;
use market_chat::resolver::Strategy;
use std::sync::Arc;

// --- ask ---

#[tokio::test]
async fn ask_resolves_fetches_and_comments() {
    let provider = Arc::new(StubProvider::new(150.0));
    let model = Arc::new(ScriptedModel::new(vec![Ok("Both look strong.")]));
    let mut app = test_app(provider.clone(), model);

    let answer = app.ask("Analiza Apple vs Microsoft").await.unwrap();

    let symbols: Vec<&str> = answer.symbols.iter().map(|s| s.as_str()).collect();
    assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    assert_eq!(answer.records.len(), 2);
    assert_eq!(provider.calls(), 2);
    assert_eq!(answer.commentary, "Both look strong.");
    assert!(answer.summary.unwrap().contains("AAPL - AAPL Corp"));
    assert!(answer.notice.is_none());
    assert_eq!(app.usage.used, 1);
    assert!(app.last_updated.is_some());
}

#[tokio::test]
async fn ask_without_symbols_skips_quotes() {
    let provider = Arc::new(StubProvider::new(150.0));
    let model = Arc::new(ScriptedModel::new(vec![Ok("A P/E ratio compares price to earnings.")]));
    let mut app = test_app(provider.clone(), model.clone());

    let answer = app.ask("what is a p/e ratio?").await.unwrap();

    assert!(answer.symbols.is_empty());
    assert!(answer.records.is_empty());
    assert!(answer.summary.is_none());
    assert_eq!(provider.calls(), 0);
    assert!(model.prompts.lock().unwrap()[0].contains("No specific financial data"));
}

#[tokio::test]
async fn ask_rejects_empty_query() {
    let mut app = test_app(Arc::new(StubProvider::new(1.0)), Arc::new(ScriptedModel::failing()));
    let err = app.ask("   ").await.unwrap_err();
    assert!(err.to_string().contains("empty"));
    assert_eq!(app.usage.used, 0);
}

#[tokio::test]
async fn ask_enforces_daily_limit() {
    let mut config = Config::test_config();
    config.max_daily_usage = 2;
    let mut app = App::with_parts(
        config,
        Arc::new(StubProvider::new(1.0)),
        Arc::new(ScriptedModel::failing()),
    );

    assert!(app.ask("hello").await.is_ok());
    assert!(app.ask("hello").await.is_ok());
    let err = app.ask("hello").await.unwrap_err();
    assert!(err.to_string().contains("Daily query limit reached (2/2)"));
}

#[tokio::test]
async fn ask_survives_provider_and_model_failure() {
    let provider = Arc::new(FlakyProvider {
        failing: vec!["AAPL".to_string(), "MSFT".to_string()],
    });
    let mut app = test_app(provider, Arc::new(ScriptedModel::failing()));

    let answer = app.ask("Apple or Microsoft?").await.unwrap();

    assert_eq!(answer.records.len(), 2);
    assert!(answer.records.iter().all(|r| r.is_synthetic()));
    assert_eq!(answer.commentary, fallback_commentary(&answer.records));
    let notice = answer.notice.unwrap();
    assert_eq!(notice.title, "Simulated data");
    assert!(app.status_message.unwrap().starts_with("Simulated data"));
}

#[tokio::test]
async fn model_resolver_falls_back_to_lexical() {
    let mut config = Config::test_config();
    config.resolver = Strategy::Model;
    // First call (extraction) fails; second (commentary) answers.
    let model = Arc::new(ScriptedModel::new(vec![Err("quota"), Ok("ok")]));
    let mut app = App::with_parts(config, Arc::new(StubProvider::new(10.0)), model.clone());

    let answer = app.ask("Tell me about Tesla").await.unwrap();

    let symbols: Vec<&str> = answer.symbols.iter().map(|s| s.as_str()).collect();
    assert_eq!(symbols, vec!["TSLA"]);
    assert_eq!(answer.commentary, "ok");
    assert_eq!(model.prompt_count(), 2);
}

// --- market / portfolio ---

#[tokio::test]
async fn market_overview_uses_watchlist() {
    let provider = Arc::new(StubProvider::new(50.0));
    let mut app = test_app(provider.clone(), Arc::new(ScriptedModel::failing()));

    let aggregate = app.market_overview().await;
    let symbols: Vec<&str> = aggregate.records.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    assert_eq!(app.provider_name(), "stub");
    assert_eq!(app.usage.used, 0);
}

#[tokio::test]
async fn portfolio_report_values_holdings() {
    let mut config = Config::test_config();
    config.holdings = vec![make_holding("AAPL", 10, 40.0)];
    let mut app = App::with_parts(
        config,
        Arc::new(StubProvider::new(50.0)),
        Arc::new(ScriptedModel::failing()),
    );

    let (report, notice) = app.portfolio_report().await;
    assert!(notice.is_none());
    assert_eq!(report.positions.len(), 1);
    assert_eq!(report.total_value, 500.0);
    assert_eq!(report.total_pl, 100.0);
}

#[tokio::test]
async fn market_report_without_analysis_skips_model() {
    let model = Arc::new(ScriptedModel::failing());
    let mut app = test_app(Arc::new(StubProvider::new(50.0)), model.clone());

    let overview = app.market_report(false).await.unwrap();

    assert_eq!(overview.records.len(), 2);
    assert!(overview.analysis.is_none());
    assert_eq!(model.prompt_count(), 0);
    assert_eq!(app.usage.used, 0);
}

#[tokio::test]
async fn market_report_with_analysis_uses_model_and_budget() {
    let model = Arc::new(ScriptedModel::new(vec![Ok("Markets are calm.")]));
    let mut app = test_app(Arc::new(StubProvider::new(50.0)), model.clone());

    let overview = app.market_report(true).await.unwrap();

    assert_eq!(overview.analysis.as_deref(), Some("Markets are calm."));
    assert_eq!(app.usage.used, 1);
    let prompt = model.prompts.lock().unwrap()[0].clone();
    assert!(prompt.contains("AAPL (AAPL Corp)"));
    assert!(prompt.contains("Overall market sentiment"));
}

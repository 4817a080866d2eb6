mod common;

use common::{make_holding, make_record};
use market_chat::app::PortfolioReport;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn single_position_metrics() {
    let holdings = vec![make_holding("AAPL", 10, 150.0)];
    let records = vec![make_record("AAPL", 200.0, 5.0)];
    let report = PortfolioReport::build(&holdings, &records);

    assert_eq!(report.positions.len(), 1);
    let p = &report.positions[0];
    assert!(approx(p.value, 2000.0));
    assert!(approx(p.cost, 1500.0));
    assert!(approx(p.pl, 500.0));
    assert!(approx(p.pl_pct, 500.0 / 1500.0 * 100.0));
    assert!(approx(p.day_change, 50.0));
    assert!(approx(p.allocation, 100.0));
    assert!(!p.synthetic);
}

#[test]
fn totals_and_allocation() {
    let holdings = vec![make_holding("AAPL", 10, 100.0), make_holding("MSFT", 5, 200.0)];
    let records = vec![make_record("MSFT", 400.0, 0.0), make_record("AAPL", 200.0, 0.0)];
    let report = PortfolioReport::build(&holdings, &records);

    assert!(approx(report.total_value, 4000.0));
    assert!(approx(report.total_cost, 2000.0));
    assert!(approx(report.total_pl, 2000.0));
    assert!(approx(report.total_pl_pct, 100.0));
    assert!(approx(report.positions[0].allocation, 50.0));
    assert!(approx(report.positions[1].allocation, 50.0));
    assert_eq!(report.sectors.len(), 1);
    assert_eq!(report.sectors[0].0, "Technology");
    assert!(approx(report.sectors[0].1, 100.0));
}

#[test]
fn day_change_pct_uses_previous_value() {
    let holdings = vec![make_holding("AAPL", 10, 100.0)];
    let records = vec![make_record("AAPL", 110.0, 10.0)];
    let report = PortfolioReport::build(&holdings, &records);

    assert!(approx(report.day_change, 100.0));
    assert!(approx(report.day_change_pct, 10.0));
}

#[test]
fn holdings_without_quotes_are_skipped() {
    let holdings = vec![make_holding("AAPL", 1, 100.0), make_holding("IBM", 1, 100.0)];
    let records = vec![make_record("AAPL", 100.0, 0.0)];
    let report = PortfolioReport::build(&holdings, &records);
    assert_eq!(report.positions.len(), 1);
}

#[test]
fn empty_portfolio_is_zeroed() {
    let report = PortfolioReport::build(&[], &[]);
    assert!(report.positions.is_empty());
    assert_eq!(report.total_value, 0.0);
    assert_eq!(report.total_pl_pct, 0.0);
    assert!(report.sectors.is_empty());
}

// --- market movers ---

#[test]
fn movers_are_ranked_and_flat_records_excluded() {
    use market_chat::app::top_movers;

    let mut records = vec![
        make_record("AAPL", 100.0, 0.0),
        make_record("MSFT", 100.0, 0.0),
        make_record("NVDA", 100.0, 0.0),
        make_record("TSLA", 100.0, 0.0),
        make_record("IBM", 100.0, 0.0),
    ];
    for (record, pct) in records.iter_mut().zip([1.5, 4.0, -2.0, -6.5, 0.0]) {
        record.changes_percentage = pct;
    }

    let (gainers, losers) = top_movers(&records, 3);
    let up: Vec<&str> = gainers.iter().map(|q| q.symbol.as_str()).collect();
    let down: Vec<&str> = losers.iter().map(|q| q.symbol.as_str()).collect();
    assert_eq!(up, vec!["MSFT", "AAPL"]);
    assert_eq!(down, vec!["TSLA", "NVDA"]);

    let (gainers, _) = top_movers(&records, 1);
    assert_eq!(gainers.len(), 1);
}

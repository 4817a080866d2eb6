use crate::config::Holding;
use crate::quote::QuoteRecord;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Position {
    pub symbol: String,
    pub name: String,
    pub shares: u32,
    pub avg_price: f64,
    pub price: f64,
    pub value: f64,
    pub cost: f64,
    pub pl: f64,
    pub pl_pct: f64,
    pub day_change: f64,
    /// Share of total portfolio value, in percent
    pub allocation: f64,
    pub sector: String,
    pub synthetic: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PortfolioReport {
    pub positions: Vec<Position>,
    pub total_value: f64,
    pub total_cost: f64,
    pub total_pl: f64,
    pub total_pl_pct: f64,
    pub day_change: f64,
    pub day_change_pct: f64,
    /// (sector, percent of value), largest first
    pub sectors: Vec<(String, f64)>,
}

impl PortfolioReport {
    /// Value `holdings` at the prices in `records`. Holdings without a
    /// matching record are skipped.
    pub fn build(holdings: &[Holding], records: &[QuoteRecord]) -> Self {
        let mut report = PortfolioReport::default();

        for h in holdings {
            let Some(q) = records
                .iter()
                .find(|q| q.symbol.as_str().eq_ignore_ascii_case(&h.symbol))
            else {
                continue;
            };
            let (value, cost, pl, pl_pct) = h.pl_metrics(q.price);
            report.positions.push(Position {
                symbol: q.symbol.to_string(),
                name: q.name.clone(),
                shares: h.shares,
                avg_price: h.avg_price,
                price: q.price,
                value,
                cost,
                pl,
                pl_pct,
                day_change: q.change * h.shares as f64,
                allocation: 0.0,
                sector: q.sector.clone(),
                synthetic: q.is_synthetic(),
            });
        }

        report.total_value = report.positions.iter().map(|p| p.value).sum();
        report.total_cost = report.positions.iter().map(|p| p.cost).sum();
        report.total_pl = report.total_value - report.total_cost;
        report.total_pl_pct = if report.total_cost > 0.0 {
            report.total_pl / report.total_cost * 100.0
        } else {
            0.0
        };
        report.day_change = report.positions.iter().map(|p| p.day_change).sum();
        let prev_value = report.total_value - report.day_change;
        report.day_change_pct = if prev_value > 0.0 {
            report.day_change / prev_value * 100.0
        } else {
            0.0
        };

        if report.total_value > 0.0 {
            let total = report.total_value;
            for p in report.positions.iter_mut() {
                p.allocation = p.value / total * 100.0;
            }

            let mut sectors: Vec<(String, f64)> = Vec::new();
            for p in &report.positions {
                match sectors.iter_mut().find(|(s, _)| *s == p.sector) {
                    Some((_, pct)) => *pct += p.allocation,
                    None => sectors.push((p.sector.clone(), p.allocation)),
                }
            }
            sectors.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
            report.sectors = sectors;
        }

        report
    }
}

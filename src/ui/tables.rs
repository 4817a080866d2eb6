use super::formatters::*;
use crate::app::PortfolioReport;
use crate::quote::QuoteRecord;

pub(super) struct ColumnDef {
    pub name: &'static str,
    pub width: usize,
}

const QUOTE_COLUMNS: &[ColumnDef] = &[
    ColumnDef { name: "Symbol", width: 7 },
    ColumnDef { name: "Name", width: 24 },
    ColumnDef { name: "Price", width: 11 },
    ColumnDef { name: "Change", width: 9 },
    ColumnDef { name: "Change %", width: 9 },
    ColumnDef { name: "P/E", width: 7 },
    ColumnDef { name: "Mkt Cap", width: 9 },
    ColumnDef { name: "Sector", width: 22 },
    ColumnDef { name: "Src", width: 4 },
];

const PORTFOLIO_COLUMNS: &[ColumnDef] = &[
    ColumnDef { name: "Symbol", width: 7 },
    ColumnDef { name: "Shares", width: 8 },
    ColumnDef { name: "Avg", width: 10 },
    ColumnDef { name: "Price", width: 10 },
    ColumnDef { name: "Value", width: 10 },
    ColumnDef { name: "P/L", width: 10 },
    ColumnDef { name: "P/L %", width: 9 },
    ColumnDef { name: "Alloc", width: 7 },
];

fn header(columns: &[ColumnDef]) -> String {
    let cells: Vec<String> = columns
        .iter()
        .map(|c| format!("{:<width$}", c.name, width = c.width))
        .collect();
    let line = cells.join(" ");
    let rule = "-".repeat(line.trim_end().len());
    format!("{}\n{}\n", line.trim_end(), rule)
}

fn row(columns: &[ColumnDef], values: &[String]) -> String {
    let cells: Vec<String> = columns
        .iter()
        .zip(values)
        .map(|(c, v)| format!("{:<width$}", truncate_str(v, c.width), width = c.width))
        .collect();
    format!("{}\n", cells.join(" ").trim_end())
}

pub fn render_quotes(records: &[QuoteRecord]) -> String {
    if records.is_empty() {
        return "No quotes.\n".to_string();
    }
    let mut out = header(QUOTE_COLUMNS);
    for q in records {
        let values = [
            q.symbol.to_string(),
            q.name.clone(),
            format_price(q.price),
            format_change(q.change),
            format_percent(q.changes_percentage),
            format_optional(q.pe),
            q.market_cap.map(format_compact).unwrap_or_else(|| "N/A".to_string()),
            q.sector.clone(),
            if q.is_synthetic() { "sim" } else { "live" }.to_string(),
        ];
        out.push_str(&row(QUOTE_COLUMNS, &values));
    }
    out
}

pub fn render_portfolio(report: &PortfolioReport) -> String {
    if report.positions.is_empty() {
        return "Portfolio is empty. Add holdings to the config file.\n".to_string();
    }
    let mut out = header(PORTFOLIO_COLUMNS);
    for p in &report.positions {
        let values = [
            p.symbol.clone(),
            p.shares.to_string(),
            format_price(p.avg_price),
            format_price(p.price),
            format_compact(p.value),
            format_pl(p.pl),
            format_percent(p.pl_pct),
            format!("{:.1}%", p.allocation),
        ];
        out.push_str(&row(PORTFOLIO_COLUMNS, &values));
    }
    out.push_str(&format!(
        "\nTotal value {}  cost {}  P/L {} ({})  today {} ({})\n",
        format_compact(report.total_value),
        format_compact(report.total_cost),
        format_pl(report.total_pl),
        format_percent(report.total_pl_pct),
        format_pl(report.day_change),
        format_percent(report.day_change_pct),
    ));
    if !report.sectors.is_empty() {
        out.push_str("Sectors:");
        for (sector, pct) in &report.sectors {
            out.push_str(&format!(" {} {:.1}%", sector, pct));
        }
        out.push('\n');
    }
    out
}

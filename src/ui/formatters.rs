use crate::quote::QuoteRecord;

pub fn format_price(price: f64) -> String {
    let rounded = (price * 100.0).round() / 100.0;
    if rounded.abs() >= 1000.0 {
        let cents = (rounded.abs() * 100.0).round() as u64;
        let int_part = (cents / 100)
            .to_string()
            .as_bytes()
            .rchunks(3)
            .rev()
            .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(",");
        let sign = if rounded < 0.0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, int_part, cents % 100)
    } else {
        format!("{:.2}", rounded)
    }
}

pub fn format_change(change: f64) -> String {
    if change >= 0.0 {
        format!("+{:.2}", change)
    } else {
        format!("{:.2}", change)
    }
}

pub fn format_percent(pct: f64) -> String {
    if pct >= 0.0 {
        format!("+{:.2}%", pct)
    } else {
        format!("{:.2}%", pct)
    }
}

pub fn format_compact(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000_000_000.0 {
        format!("{:.2}T", abs / 1_000_000_000_000.0)
    } else if abs >= 1_000_000_000.0 {
        format!("{:.2}B", abs / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.2}M", abs / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.2}K", abs / 1_000.0)
    } else {
        format!("{:.0}", abs)
    }
}

pub fn format_pl(pl: f64) -> String {
    let prefix = if pl >= 0.0 { "+" } else { "-" };
    format!("{}{}", prefix, format_compact(pl))
}

/// Market cap in billions, as shown in summaries ("$2950.00B").
pub fn format_market_cap(cap: Option<f64>) -> String {
    match cap {
        Some(c) => format!("${:.2}B", c / 1e9),
        None => "N/A".to_string(),
    }
}

pub fn format_optional(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "N/A".to_string())
}

pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let end = s
            .char_indices()
            .nth(max_len.saturating_sub(3))
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        format!("{}...", &s[..end])
    } else {
        s.to_string()
    }
}

/// Markdown block per record, shown before the commentary.
pub fn format_summary(records: &[QuoteRecord]) -> String {
    if records.is_empty() {
        return "No financial data found for the requested symbols.".to_string();
    }

    let mut content = String::from("## Financial data\n\n");
    for q in records {
        let trend = if q.change > 0.0 { "up" } else { "down" };
        content.push_str(&format!("### **{} - {}**\n", q.symbol, q.name));
        content.push_str(&format!("- **Price:** ${:.2}\n", q.price));
        content.push_str(&format!(
            "- **Change ({}):** {} ({})\n",
            trend,
            format_change(q.change),
            format_percent(q.changes_percentage)
        ));
        content.push_str(&format!("- **P/E:** {}\n", format_optional(q.pe)));
        content.push_str(&format!("- **EPS:** {}\n", format_optional(q.eps)));
        content.push_str(&format!("- **Market cap:** {}\n", format_market_cap(q.market_cap)));
        content.push_str(&format!("- **Sector:** {}\n", q.sector));
        content.push_str(&format!("- **Industry:** {}\n", q.industry));
        if q.is_synthetic() {
            content.push_str("- _Simulated data_\n");
        }
        content.push('\n');
    }
    content
}

//! Formatting helpers shared by the CLI and the exporters

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

pub const DEFAULT_EXPORT_STEM: &str = "container-apps-cost-estimate";

/// `€12.35` style amount.
pub fn format_money(symbol: &str, amount: f64, decimals: usize) -> String {
    format!("{}{:.*}", symbol, decimals, amount)
}

/// Format a number without trailing zeros: 1 -> "1", 0.25 -> "0.25".
pub fn format_quantity(value: f64) -> String {
    format!("{}", value)
}

/// Per-second unit price with up to 8 decimals and no trailing zeros: `0.000004`.
pub fn format_unit_price(value: f64) -> String {
    let formatted = format!("{:.8}", value);
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("static pattern is valid"));

/// Lowercase file stem with every non-alphanumeric replaced by `-`.
pub fn sanitize_file_stem(name: &str) -> String {
    NON_ALPHANUMERIC.replace_all(name, "-").to_lowercase()
}

/// `<estimate-name>-YYYY-MM-DD.<ext>`, or the default stem if the name is blank.
pub fn export_file_name(estimate_name: Option<&str>, date: NaiveDate, extension: &str) -> String {
    let stem = match estimate_name.map(str::trim) {
        Some(name) if !name.is_empty() => sanitize_file_stem(name),
        _ => DEFAULT_EXPORT_STEM.to_string(),
    };
    format!("{}-{}.{}", stem, date.format("%Y-%m-%d"), extension)
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Quote a CSV field when it contains a separator, quote or line break.
pub fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

//! Searching and ordering rate tables for display.
use crate::core::currency::{RateTable, SymbolDirectory};

/// One row of a rate listing.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRow {
    pub code: String,
    pub description: String,
    pub rate: f64,
}

/// All known currencies as (code, description), sorted by code.
pub fn currency_options(symbols: &SymbolDirectory) -> Vec<(String, String)> {
    symbols
        .iter()
        .map(|(code, description)| (code.to_string(), description.to_string()))
        .collect()
}

/// Rows whose code or description contains `query`, ignoring case.
///
/// A blank query matches every row. Rows come back sorted by code.
pub fn filter_rates(rates: &RateTable, symbols: &SymbolDirectory, query: &str) -> Vec<RateRow> {
    let needle = query.trim().to_lowercase();
    rates
        .iter()
        .filter(|(code, _)| {
            needle.is_empty()
                || code.to_lowercase().contains(&needle)
                || symbols.description(code).to_lowercase().contains(&needle)
        })
        .map(|(code, rate)| RateRow {
            code: code.to_string(),
            description: symbols.description(code).to_string(),
            rate,
        })
        .collect()
}

//! Core business logic abstractions

pub mod config;
pub mod currency;
pub mod engine;
pub mod listing;
pub mod log;

// Re-export main types for cleaner imports
pub use currency::{
    ConversionDirection, CurrencyCode, MoneyEntry, RateSource, RateTable, RatesSnapshot,
    Selection, SymbolDirectory,
};
pub use engine::{SelectionTotals, aggregate_selection, convert_single, sum_entries};

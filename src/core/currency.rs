//! Currency abstractions and core types

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::str::FromStr;

/// Opaque currency identifier, e.g. "USD". Compared as an exact string.
pub type CurrencyCode = String;

/// Display names for currency codes. May not cover every code in a [`RateTable`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolDirectory {
    symbols: BTreeMap<CurrencyCode, String>,
}

impl SymbolDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<CurrencyCode>, description: impl Into<String>) {
        self.symbols.insert(code.into(), description.into());
    }

    /// Description for `code`, or an empty label when unknown.
    pub fn description(&self, code: &str) -> &str {
        self.symbols.get(code).map_or("", String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.symbols.iter().map(|(c, d)| (c.as_str(), d.as_str()))
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl<C: Into<CurrencyCode>, D: Into<String>> FromIterator<(C, D)> for SymbolDirectory {
    fn from_iter<I: IntoIterator<Item = (C, D)>>(iter: I) -> Self {
        Self {
            symbols: iter
                .into_iter()
                .map(|(c, d)| (c.into(), d.into()))
                .collect(),
        }
    }
}

/// Rates relative to one implicit base currency: one unit of base equals
/// `rate` units of the mapped currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    rates: BTreeMap<CurrencyCode, f64>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<CurrencyCode>, rate: f64) {
        self.rates.insert(code.into(), rate);
    }

    /// Looks up a usable rate. Non-finite entries count as missing.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied().filter(|r| r.is_finite())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    /// Entries in lexicographic code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.rates.iter().map(|(c, r)| (c.as_str(), *r))
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.rates.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl<C: Into<CurrencyCode>> FromIterator<(C, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (C, f64)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().map(|(c, r)| (c.into(), r)).collect(),
        }
    }
}

/// A rate table together with the base it was fetched for.
///
/// Data sources hand out whole snapshots so a table never mixes rates from
/// two different bases.
#[derive(Debug, Clone, PartialEq)]
pub struct RatesSnapshot {
    pub base: CurrencyCode,
    pub rates: RateTable,
    pub date: Option<NaiveDate>,
    pub fetched_at: DateTime<Utc>,
}

/// A user-entered quantity in some currency.
#[derive(Debug, Clone, PartialEq)]
pub struct MoneyEntry {
    pub amount: f64,
    pub currency: CurrencyCode,
}

impl MoneyEntry {
    pub fn new(amount: f64, currency: impl Into<CurrencyCode>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }

    /// Builds an entry from raw text input. Unparseable text yields a NaN
    /// amount, which the engine treats as a zero contribution.
    pub fn from_input(raw: &str, currency: impl Into<CurrencyCode>) -> Self {
        Self::new(parse_amount(raw), currency)
    }
}

/// Parses user-typed amount text. Blank input is zero, anything else that
/// fails to parse is NaN.
pub fn parse_amount(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Currencies picked from a rate table for partial sums.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    codes: BTreeSet<CurrencyCode>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(code)
    }

    /// Returns false if `code` was already selected.
    pub fn insert(&mut self, code: impl Into<CurrencyCode>) -> bool {
        self.codes.insert(code.into())
    }

    pub fn remove(&mut self, code: &str) -> bool {
        self.codes.remove(code)
    }

    pub fn toggle(&mut self, code: &str) {
        if !self.codes.remove(code) {
            self.codes.insert(code.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.codes.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl<C: Into<CurrencyCode>> Extend<C> for Selection {
    fn extend<I: IntoIterator<Item = C>>(&mut self, iter: I) {
        self.codes.extend(iter.into_iter().map(Into::into));
    }
}

impl<C: Into<CurrencyCode>> FromIterator<C> for Selection {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        let mut selection = Selection::new();
        selection.extend(iter);
        selection
    }
}

/// Whether an amount is scaled by a rate or by its reciprocal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConversionDirection {
    /// amount × rate (base → other)
    #[default]
    Forward,
    /// amount ÷ rate (other → base)
    Inverse,
}

impl ConversionDirection {
    pub fn toggled(self) -> Self {
        match self {
            ConversionDirection::Forward => ConversionDirection::Inverse,
            ConversionDirection::Inverse => ConversionDirection::Forward,
        }
    }
}

impl Display for ConversionDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ConversionDirection::Forward => "forward",
                ConversionDirection::Inverse => "inverse",
            }
        )
    }
}

impl FromStr for ConversionDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forward" | "atob" | "a-to-b" => Ok(ConversionDirection::Forward),
            "inverse" | "btoa" | "b-to-a" => Ok(ConversionDirection::Inverse),
            _ => Err(anyhow!("Invalid conversion direction: {}", s)),
        }
    }
}

/// Supplies symbol directories and rate tables, e.g. over HTTP.
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_symbols(&self) -> Result<SymbolDirectory>;
    async fn fetch_rates(&self, base: &str) -> Result<RatesSnapshot>;
}

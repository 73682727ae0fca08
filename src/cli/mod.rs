//! Command implementations and terminal presentation.

pub mod convert;
pub mod currencies;
pub mod rates;
pub mod setup;
pub mod sum;
pub mod ui;

use crate::core::{RateSource, RatesSnapshot, SymbolDirectory};
use anyhow::{Context, Result};
use tracing::warn;

/// Fetches the rate table for `base`, showing a spinner meanwhile.
pub(crate) async fn fetch_rates(source: &dyn RateSource, base: &str) -> Result<RatesSnapshot> {
    let pb = ui::new_spinner(&format!("Fetching {base} rates..."));
    let snapshot = source.fetch_rates(base).await;
    pb.finish_and_clear();
    snapshot.context("Could not fetch exchange rates")
}

/// Fetches the symbol directory and rate table together.
///
/// Descriptions are optional for display, so a failed symbols request only
/// leaves the directory empty.
pub(crate) async fn fetch_symbols_and_rates(
    source: &dyn RateSource,
    base: &str,
) -> Result<(SymbolDirectory, RatesSnapshot)> {
    let pb = ui::new_spinner(&format!("Fetching symbols and {base} rates..."));
    let (symbols, snapshot) = futures::join!(source.fetch_symbols(), source.fetch_rates(base));
    pb.finish_and_clear();

    let symbols = symbols.unwrap_or_else(|e| {
        warn!("Currency symbols unavailable: {e}");
        SymbolDirectory::new()
    });
    let snapshot = snapshot.context("Could not fetch exchange rates")?;
    Ok((symbols, snapshot))
}

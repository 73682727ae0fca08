use super::ui;
use crate::core::listing::currency_options;
use crate::core::{RateSource, SymbolDirectory};
use anyhow::{Context, Result};
use comfy_table::Cell;

pub fn display_as_table(symbols: &SymbolDirectory) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Code"), ui::header_cell("Description")]);
    for (code, description) in currency_options(symbols) {
        table.add_row(vec![Cell::new(code), Cell::new(description)]);
    }

    format!(
        "{}\n\n{}\n\n{} currencies",
        ui::style_text("Available currencies", ui::StyleType::Title),
        table,
        symbols.len()
    )
}

pub async fn render(source: &(dyn RateSource + Send + Sync)) -> Result<String> {
    let pb = ui::new_spinner("Fetching currency symbols...");
    let symbols = source.fetch_symbols().await;
    pb.finish_and_clear();

    let symbols = symbols.context("Could not fetch currency symbols")?;
    Ok(display_as_table(&symbols))
}

pub async fn run(source: &(dyn RateSource + Send + Sync)) -> Result<()> {
    println!("{}", render(source).await?);
    Ok(())
}

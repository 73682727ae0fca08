use super::ui;
use crate::core::engine::convert_rate;
use crate::core::listing::{RateRow, filter_rates};
use crate::core::{
    ConversionDirection, RateSource, RatesSnapshot, Selection, SelectionTotals, SymbolDirectory,
    aggregate_selection,
};
use anyhow::Result;
use comfy_table::{Cell, Color};
use tracing::{debug, warn};

/// Options for the rates listing.
#[derive(Debug, Clone, Default)]
pub struct RatesView {
    pub query: String,
    pub selected: Vec<String>,
    pub select_visible: bool,
    pub amount: f64,
    pub direction: ConversionDirection,
}

/// A filtered listing with the user's selection and its totals.
#[derive(Debug)]
pub struct RatesListing {
    pub rows: Vec<RateRow>,
    pub selection: Selection,
    pub totals: SelectionTotals,
    pub amount: f64,
    pub direction: ConversionDirection,
}

impl RatesListing {
    pub fn compute(view: &RatesView, symbols: &SymbolDirectory, snapshot: &RatesSnapshot) -> Self {
        let rows = filter_rates(&snapshot.rates, symbols, &view.query);

        let mut selection: Selection = view
            .selected
            .iter()
            .filter(|code| {
                let known = snapshot.rates.rate(code).is_some();
                if !known {
                    warn!("Ignoring selected currency {code}: no {} rate", snapshot.base);
                }
                known
            })
            .cloned()
            .collect();
        if view.select_visible {
            selection.extend(rows.iter().map(|row| row.code.clone()));
        }
        debug!(
            "Listing {} rates, {} selected",
            rows.len(),
            selection.len()
        );

        let totals = aggregate_selection(&selection, &snapshot.rates, view.amount, view.direction);
        RatesListing {
            rows,
            selection,
            totals,
            amount: view.amount,
            direction: view.direction,
        }
    }

    pub fn display_as_table(&self, snapshot: &RatesSnapshot) -> String {
        let base = &snapshot.base;
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Pick"),
            ui::header_cell("Currency"),
            ui::header_cell("Description"),
            ui::header_cell(&format!("Rate (1 {base})")),
            ui::header_cell("Converted"),
        ]);

        for row in &self.rows {
            let pick = if self.selection.contains(&row.code) {
                Cell::new("✔").fg(Color::Green)
            } else {
                Cell::new("")
            };
            let converted = convert_rate(self.amount, Some(row.rate), self.direction);
            table.add_row(vec![
                pick,
                Cell::new(&row.code),
                Cell::new(&row.description).fg(Color::DarkGrey),
                ui::number_cell(ui::format_rate(row.rate)),
                ui::number_cell(ui::format_amount(converted)),
            ]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text(&format!("Rates relative to {base}"), ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str("\n\n");
        output.push_str(&self.summary(snapshot));
        output
    }

    /// Selection summary shown under the table.
    pub fn summary(&self, snapshot: &RatesSnapshot) -> String {
        let base = &snapshot.base;
        let (from, to) = match self.direction {
            ConversionDirection::Forward => (base.as_str(), "selected"),
            ConversionDirection::Inverse => ("various", base.as_str()),
        };
        let updated = snapshot
            .date
            .map(|d| format!("{d} (fetched {})", snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")))
            .unwrap_or_else(|| snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());

        format!(
            "{}\nPicked {} currencies. Sum of rates: {}\nTotal converted for amount {} ({from}) → {to}: {}\n{}",
            ui::style_text("Selection summary", ui::StyleType::TotalLabel),
            self.selection.len(),
            ui::style_text(&ui::format_rate(self.totals.sum_of_rates), ui::StyleType::TotalValue),
            self.amount,
            ui::style_text(
                &ui::format_amount(self.totals.sum_of_converted),
                ui::StyleType::TotalValue
            ),
            ui::style_text(&format!("Last updated: {updated}"), ui::StyleType::Subtle),
        )
    }
}

pub async fn render(
    source: &(dyn RateSource + Send + Sync),
    base: &str,
    view: &RatesView,
) -> Result<String> {
    let (symbols, snapshot) = super::fetch_symbols_and_rates(source, base).await?;
    let listing = RatesListing::compute(view, &symbols, &snapshot);
    Ok(listing.display_as_table(&snapshot))
}

pub async fn run(
    source: &(dyn RateSource + Send + Sync),
    base: &str,
    view: &RatesView,
) -> Result<()> {
    println!("{}", render(source, base, view).await?);
    Ok(())
}

use super::ui;
use crate::core::{MoneyEntry, RateSource, RatesSnapshot, convert_single, sum_entries};
use anyhow::Result;
use comfy_table::Cell;

/// Parses `AMOUNT[:CODE]`; the code defaults to `base`.
pub fn parse_entry(raw: &str, base: &str) -> MoneyEntry {
    match raw.split_once(':') {
        Some((amount, code)) if !code.trim().is_empty() => {
            MoneyEntry::from_input(amount, code.trim())
        }
        Some((amount, _)) => MoneyEntry::from_input(amount, base),
        None => MoneyEntry::from_input(raw, base),
    }
}

/// Entries converted into a base currency, plus their total.
#[derive(Debug)]
pub struct SumSummary {
    pub base: String,
    pub entries: Vec<MoneyEntry>,
    pub total: f64,
}

impl SumSummary {
    pub fn compute(entries: Vec<MoneyEntry>, snapshot: &RatesSnapshot) -> Self {
        let total = sum_entries(&entries, &snapshot.base, &snapshot.rates);
        SumSummary {
            base: snapshot.base.clone(),
            entries,
            total,
        }
    }

    pub fn display_as_table(&self, snapshot: &RatesSnapshot) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Amount"),
            ui::header_cell("Currency"),
            ui::header_cell(&format!("Value ({})", self.base)),
        ]);

        for entry in &self.entries {
            let (amount, value) = if entry.amount.is_finite() {
                let converted = convert_single(
                    entry.amount,
                    &entry.currency,
                    &self.base,
                    &self.base,
                    &snapshot.rates,
                );
                (
                    ui::number_cell(ui::format_amount(entry.amount)),
                    ui::number_cell(ui::format_amount(converted)),
                )
            } else {
                (ui::na_cell(true), ui::na_cell(false))
            };
            table.add_row(vec![amount, Cell::new(&entry.currency), value]);
        }
        table.add_row(vec![
            Cell::new("Total"),
            Cell::new(&self.base),
            ui::total_cell(ui::format_amount(self.total)),
        ]);

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Sum Across Currencies", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\nTotal ({}): {}",
            ui::style_text(&self.base, ui::StyleType::TotalLabel),
            ui::style_text(&ui::format_amount(self.total), ui::StyleType::TotalValue)
        ));
        output
    }
}

pub async fn render(
    source: &(dyn RateSource + Send + Sync),
    raw_entries: &[String],
    base: &str,
) -> Result<String> {
    let entries: Vec<MoneyEntry> = raw_entries.iter().map(|e| parse_entry(e, base)).collect();
    let snapshot = super::fetch_rates(source, base).await?;
    let summary = SumSummary::compute(entries, &snapshot);
    Ok(summary.display_as_table(&snapshot))
}

pub async fn run(
    source: &(dyn RateSource + Send + Sync),
    raw_entries: &[String],
    base: &str,
) -> Result<()> {
    println!("{}", render(source, raw_entries, base).await?);
    Ok(())
}

use super::ui;
use crate::core::currency::parse_amount;
use crate::core::engine::finite_or_zero;
use crate::core::{RateSource, RatesSnapshot, convert_single};
use anyhow::Result;
use tracing::debug;

/// Result of converting one amount between two currencies.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub amount: f64,
    pub from: String,
    pub to: String,
    pub base: String,
    pub converted: f64,
}

impl Conversion {
    pub fn compute(amount: f64, from: &str, to: &str, snapshot: &RatesSnapshot) -> Self {
        let amount = finite_or_zero(amount);
        let converted = convert_single(amount, from, to, &snapshot.base, &snapshot.rates);
        debug!("Converted {amount} {from} to {converted} {to} via {}", snapshot.base);
        Conversion {
            amount,
            from: from.to_string(),
            to: to.to_string(),
            base: snapshot.base.clone(),
            converted,
        }
    }

    pub fn display(&self) -> String {
        let mut output = format!("{} {} equals\n", self.amount, self.from);
        output.push_str(&format!(
            "{} {}\n",
            ui::style_text(&ui::format_amount(self.converted), ui::StyleType::TotalValue),
            ui::style_text(&self.to, ui::StyleType::TotalLabel)
        ));
        output.push_str(&ui::style_text(
            &format!(
                "Conversion uses live {} base rates. For other pairs, we compute via base.",
                self.base
            ),
            ui::StyleType::Subtle,
        ));
        output
    }
}

pub async fn render(
    source: &(dyn RateSource + Send + Sync),
    amount: &str,
    from: &str,
    to: &str,
    base: &str,
) -> Result<String> {
    let snapshot = super::fetch_rates(source, base).await?;
    let conversion = Conversion::compute(parse_amount(amount), from, to, &snapshot);
    Ok(conversion.display())
}

pub async fn run(
    source: &(dyn RateSource + Send + Sync),
    amount: &str,
    from: &str,
    to: &str,
    base: &str,
) -> Result<()> {
    println!("{}", render(source, amount, from, to, base).await?);
    Ok(())
}

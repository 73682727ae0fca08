pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::rates::RatesView;
use crate::core::config::AppConfig;
use crate::providers::ExchangeRateHostProvider;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    /// Convert one amount between two currencies.
    Convert {
        amount: String,
        from: Option<String>,
        to: String,
        base: Option<String>,
    },
    /// Sum `AMOUNT[:CODE]` entries into a base currency.
    Sum {
        entries: Vec<String>,
        base: Option<String>,
    },
    /// List known currency codes and their names.
    Currencies,
    /// List rates and aggregate a selection of them.
    Rates {
        base: Option<String>,
        view: RatesView,
    },
}

/// Runs `command` and prints its output.
pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let output = render_command(command, config_path).await?;
    println!("{output}");
    Ok(())
}

/// Runs `command` and returns what it would print.
pub async fn render_command(command: AppCommand, config_path: Option<&str>) -> Result<String> {
    info!("fxstudio starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = ExchangeRateHostProvider::from_config(&config.exchangerate());
    let default_base = config.currency.as_str();

    match command {
        AppCommand::Convert {
            amount,
            from,
            to,
            base,
        } => {
            let base = base.as_deref().unwrap_or(default_base);
            let from = from.as_deref().unwrap_or(base);
            cli::convert::render(&provider, &amount, from, &to, base).await
        }
        AppCommand::Sum { entries, base } => {
            let base = base.as_deref().unwrap_or(default_base);
            cli::sum::render(&provider, &entries, base).await
        }
        AppCommand::Currencies => cli::currencies::render(&provider).await,
        AppCommand::Rates { base, view } => {
            let base = base.as_deref().unwrap_or(default_base);
            cli::rates::render(&provider, base, &view).await
        }
    }
}

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxstudio::cli::rates::RatesView;
use fxstudio::core::ConversionDirection;
use fxstudio::core::currency::parse_amount;
use fxstudio::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxstudio::AppCommand {
    fn from(cmd: Commands) -> fxstudio::AppCommand {
        match cmd {
            Commands::Convert {
                amount,
                from,
                to,
                base,
            } => fxstudio::AppCommand::Convert {
                amount,
                from,
                to,
                base,
            },
            Commands::Sum { entries, base } => fxstudio::AppCommand::Sum { entries, base },
            Commands::Currencies => fxstudio::AppCommand::Currencies,
            Commands::Rates {
                base,
                query,
                select,
                select_visible,
                amount,
                direction,
            } => fxstudio::AppCommand::Rates {
                base,
                view: RatesView {
                    query: query.unwrap_or_default(),
                    selected: select,
                    select_visible,
                    amount: parse_amount(&amount),
                    direction,
                },
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount from one currency to another
    Convert {
        /// Amount to convert
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Source currency (defaults to the base currency)
        #[arg(short, long)]
        from: Option<String>,
        /// Target currency
        #[arg(short, long)]
        to: String,
        /// Base currency of the rate table
        #[arg(short, long)]
        base: Option<String>,
    },
    /// Sum amounts given as AMOUNT[:CODE] into a base currency
    Sum {
        #[arg(required = true, allow_hyphen_values = true)]
        entries: Vec<String>,
        /// Currency to total in
        #[arg(short, long)]
        base: Option<String>,
    },
    /// List available currencies
    Currencies,
    /// List exchange rates and add up a selection of them
    Rates {
        /// Base currency of the rate table
        #[arg(short, long)]
        base: Option<String>,
        /// Filter by code or name
        #[arg(short, long)]
        query: Option<String>,
        /// Currency to pick, repeatable
        #[arg(short, long)]
        select: Vec<String>,
        /// Pick every currency matching the filter
        #[arg(long)]
        select_visible: bool,
        /// Amount converted by each rate
        #[arg(short, long, default_value = "1", allow_hyphen_values = true)]
        amount: String,
        /// forward (amount × rate) or inverse (amount ÷ rate)
        #[arg(short, long, default_value_t = ConversionDirection::Forward)]
        direction: ConversionDirection,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxstudio::cli::setup::setup(),
        Some(cmd) => fxstudio::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

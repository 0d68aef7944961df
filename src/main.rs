use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxq::core::CurrencyCode;
use fxq::core::log::init_logging;
use rust_decimal::Decimal;

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

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Quote an amount of one currency in one or more others
    Quote {
        /// Base currency, e.g. EUR
        from: CurrencyCode,
        /// Amount of the base currency
        #[arg(allow_hyphen_values = true)]
        amount: Decimal,
        /// Quote currencies, e.g. --to GBP --to USD
        #[arg(short, long, required = true)]
        to: Vec<CurrencyCode>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxq::cli::setup::setup(),
        Some(Commands::Quote { from, amount, to }) => {
            let request = fxq::QuoteRequest {
                base_currency: from,
                base_amount: amount,
                quote_currencies: to,
            };
            fxq::run_command(fxq::AppCommand::Quote(request), cli.config_path.as_deref()).await
        }
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

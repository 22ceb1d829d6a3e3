use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Extended help shown after `lendscore score --help` and `lendscore categorize --help`.
pub const TRANSACTIONS_AFTER_HELP: &str = "\
Transaction input:
  <path> is a local JSON or CSV file. Use `-` to read stdin.
  Example: cat statement.json | lendscore score - --loan-amount 300 --loan-term 3

  JSON example (one top-level array):
  [
    {
      \"description\": \"ACME CORP SALARY\",
      \"amount\": -2500.00,
      \"date\": \"2025-03-28\",
      \"merchant_name\": null,
      \"provider_category_primary\": \"INCOME\",
      \"provider_category_detailed\": \"INCOME_WAGES\",
      \"running_balance\": 2730.00
    }
  ]

  CSV example (header + rows):
  description,amount,date,merchant_name,provider_category_primary,provider_category_detailed,running_balance
  ACME CORP SALARY,-2500.00,2025-03-28,,INCOME,INCOME_WAGES,2730.00

Field rules:
  amount: negative = money in (credit), positive = money out (debit).
  date: exactly `YYYY-MM-DD`.
  description, amount and date are required. Other fields may be omitted.
  Rows that fail validation are reported under `issues` and skipped.

Configuration:
  Without --config, `$LENDSCORE_HOME/scoring.json` (default `~/.lendscore`) is used when
  present, otherwise the built-in policy. `pfc_mapping.csv` in the same directory is picked
  up the same way unless --pfc-mapping names a file.
";

#[derive(Debug, Parser)]
#[command(
    name = "lendscore",
    version,
    about = "short-term lending decisions from bank transactions",
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Categorize transactions, compute metrics and return a lending decision
    #[command(after_help = TRANSACTIONS_AFTER_HELP)]
    Score {
        /// Transactions file (JSON or CSV), or `-` for stdin
        path: String,
        /// Requested principal
        #[arg(long)]
        loan_amount: f64,
        /// Requested term in months
        #[arg(long)]
        loan_term: u32,
        /// Application reference; generated when omitted
        #[arg(long)]
        application_ref: Option<String>,
        #[command(flatten)]
        shared: SharedArgs,
    },
    /// Categorize transactions without scoring
    #[command(after_help = TRANSACTIONS_AFTER_HELP)]
    Categorize {
        /// Transactions file (JSON or CSV), or `-` for stdin
        path: String,
        #[command(flatten)]
        shared: SharedArgs,
    },
    /// Inspect or validate scoring configuration
    #[command(arg_required_else_help = true)]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Debug, Args)]
pub struct SharedArgs {
    /// Months of history the statement covers (1-24)
    #[arg(long = "months")]
    pub months_of_data: Option<u32>,
    /// Scoring configuration JSON file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Provider category mapping CSV file
    #[arg(long)]
    pub pfc_mapping: Option<PathBuf>,
    /// Output JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective scoring configuration and where it came from
    Show {
        /// Scoring configuration JSON file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Validate a scoring configuration file without using it
    Validate {
        /// Scoring configuration JSON file
        path: PathBuf,
        /// Output JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
pub fn parse_from<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

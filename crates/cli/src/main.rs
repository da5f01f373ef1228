// pricefill CLI - fill price columns in order workbooks from a pricelist

mod exit_codes;
mod price;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pricefill_pricing::PriceError;

use exit_codes::{price_exit_code, EXIT_IO, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "pricefill")]
#[command(about = "Fill price columns in order workbooks from a pricelist")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price one or more input workbooks against a pricelist
    #[command(after_help = "\
Examples:
  pricefill price order.xlsx --pricelist prices.xlsx
  pricefill price order.xlsx --pricelist prices.xlsx -o quote.xlsx
  pricefill price order.csv -o quote.csv --schema fcu-total
  pricefill price a.xlsx b.xlsx --schema-file heaters.toml --json
  PRICEFILL_PRICELIST=prices.xlsx pricefill price order.xlsx")]
    Price {
        /// Input workbooks (.xlsx/.xls/.ods) or CSV files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        pricelist: PricelistArgs,

        /// Output file; `.csv` writes CSV. Defaults to <input>_priced.xlsx
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Input sheet to price (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Print a JSON report to stdout
        #[arg(long)]
        json: bool,

        /// Suppress the human summary on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Load a pricelist and report the selected sheet and duplicate keys
    #[command(after_help = "\
Examples:
  pricefill check --pricelist prices.xlsx
  pricefill check --pricelist heaters.xlsx --schema fcu-device --json")]
    Check {
        #[command(flatten)]
        pricelist: PricelistArgs,

        /// Print diagnostics as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// List built-in schemas, or print one as TOML
    #[command(after_help = "\
Examples:
  pricefill schemas
  pricefill schemas --show fcu > my-schema.toml")]
    Schemas {
        /// Print this schema as TOML (a starting point for --schema-file)
        #[arg(long, value_name = "NAME")]
        show: Option<String>,

        /// Print every built-in schema as JSON
        #[arg(long, conflicts_with = "show")]
        json: bool,
    },
}

#[derive(Args)]
pub struct PricelistArgs {
    /// Pricelist workbook
    #[arg(long, short = 'p', env = "PRICEFILL_PRICELIST")]
    pub pricelist: PathBuf,

    /// Built-in schema name (see `pricefill schemas`)
    #[arg(long, default_value = "fcu", conflicts_with = "schema_file")]
    pub schema: String,

    /// Schema definition file (TOML)
    #[arg(long, value_name = "FILE")]
    pub schema_file: Option<PathBuf>,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("PRICEFILL_GIT_HASH"), ")",
        "\nengine:  pricefill-pricing ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("PRICEFILL_TARGET"),
    )
}

/// Logs go to stderr so `--json` stdout stays a single JSON value.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Price {
            inputs,
            pricelist,
            output,
            sheet,
            json,
            quiet,
        } => price::cmd_price(inputs, pricelist, output, sheet, json, quiet),
        Commands::Check { pricelist, json } => price::cmd_check(pricelist, json),
        Commands::Schemas { show, json } => price::cmd_schemas(show, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<PriceError> for CliError {
    fn from(err: PriceError) -> Self {
        let hint = match &err {
            PriceError::PricelistNotFound { .. } => {
                Some("pass --pricelist or set PRICEFILL_PRICELIST".to_string())
            }
            PriceError::SchemaNotFound { .. } => Some(
                "compare the pricelist headers with `pricefill schemas --show <name>`".to_string(),
            ),
            PriceError::UnknownSchema(_) => Some("run `pricefill schemas` to list them".to_string()),
            _ => None,
        };
        Self { code: price_exit_code(&err), message: err.to_string(), hint }
    }
}

//! Capitalist CLI - the Capitalist payment API from your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;
mod output;

use commands::{accounts, batch, fee, rates, setup};

/// Capitalist - payment API client
#[derive(Parser)]
#[command(name = "capitalist", version, about, long_about = None)]
struct Cli {
    /// Settings file (default: ~/.capitalist/settings.json)
    #[arg(long, global = true, env = "CAPITALIST_CONFIG")]
    config: Option<PathBuf>,

    /// Log requests and retries to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List accounts and balances
    Accounts {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show currency conversion rates
    Rates {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look up the fee for a document
    Fee {
        /// Document type, e.g. IMPORT_BATCH
        document_type: String,
        /// Account the amount is taken from
        source_account: String,
        /// Amount of the document
        amount: Decimal,
        /// Destination account
        #[arg(long)]
        dest_account: Option<String>,
        /// Wire tag
        #[arg(long)]
        wiretag: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show records of a submitted batch
    BatchInfo {
        /// Batch ID returned by import-batch
        batch_id: String,
        /// Records per page
        #[arg(long, default_value_t = 1)]
        page_size: u32,
        /// Offset of the first record
        #[arg(long, default_value_t = 0)]
        start_offset: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign and submit a batch of payments from a JSON file
    ImportBatch {
        /// JSON array of payments
        file: PathBuf,
        /// Settlement account for RUR payments
        #[arg(long, default_value = "")]
        rur: String,
        /// Settlement account for USD payments
        #[arg(long, default_value = "")]
        usd: String,
        /// Settlement account for EUR payments
        #[arg(long, default_value = "")]
        eur: String,
        /// Settlement account for BTC payments
        #[arg(long, default_value = "")]
        btc: String,
        /// Print the rendered batch without submitting
        #[arg(long)]
        dry_run: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Save credentials to the settings file
    Setup {
        /// Account login
        #[arg(long)]
        login: String,
        /// Account password
        #[arg(long, env = "CAPITALIST_PASSWORD", hide_env_values = true)]
        password: String,
        /// PEM private key used to sign batches
        #[arg(long)]
        private_key: Option<PathBuf>,
        /// API URL override
        #[arg(long)]
        api_url: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    commands::init_logging(cli.verbose);

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(commands::default_config_path);

    match cli.command {
        Commands::Accounts { json } => accounts::run(&config_path, json),
        Commands::Rates { json } => rates::run(&config_path, json),
        Commands::Fee {
            document_type,
            source_account,
            amount,
            dest_account,
            wiretag,
            json,
        } => fee::run(
            &config_path,
            &document_type,
            &source_account,
            amount,
            dest_account.as_deref(),
            wiretag.as_deref(),
            json,
        ),
        Commands::BatchInfo {
            batch_id,
            page_size,
            start_offset,
            json,
        } => batch::run_info(&config_path, &batch_id, page_size, start_offset, json),
        Commands::ImportBatch {
            file,
            rur,
            usd,
            eur,
            btc,
            dry_run,
            json,
        } => {
            let accounts = capitalist_core::BatchAccounts { rur, usd, eur, btc };
            batch::run_import(&config_path, &file, &accounts, dry_run, json)
        }
        Commands::Setup {
            login,
            password,
            private_key,
            api_url,
        } => setup::run(&config_path, &login, &password, private_key, api_url),
    }
}

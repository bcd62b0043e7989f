//! biscrape main entry point
//!
//! Command-line interface for the incremental resource harvester.

use biscrape::config::{self, parse_date_limit, Config, DecodePolicy};
use biscrape::crawl::{harvest, HarvestOutcome};
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// biscrape: incremental harvester for the BankInfoSecurity resource listing
///
/// Walks the paginated resource index newest-first, stops at the entry the
/// previous run ingested (or at the supplied date cutoff), and appends only
/// the new entries to the CSV table.
#[derive(Parser, Debug)]
#[command(name = "biscrape")]
#[command(version)]
#[command(about = "Incremental harvester for the BankInfoSecurity resource listing", long_about = None)]
struct Cli {
    /// Only ingest entries posted on or after this date (mm/dd/yyyy);
    /// replaces the cursor as the stop condition for this run
    #[arg(value_name = "DATE", value_parser = parse_date_arg)]
    date_limit: Option<NaiveDate>,

    /// Destination CSV table
    #[arg(long, value_name = "FILE", default_value = config::DEFAULT_TABLE_PATH)]
    table: PathBuf,

    /// Cursor file remembering the newest ingested entry
    #[arg(long, value_name = "FILE", default_value = config::DEFAULT_CURSOR_PATH)]
    cursor: PathBuf,

    /// Truncate the table and rewrite the header before harvesting
    #[arg(long)]
    reset_table: bool,

    /// Log and skip entries that fail to decode instead of aborting the run
    #[arg(long)]
    skip_bad: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

/// Validated by clap before anything touches the network
fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_date_limit(raw).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = Config {
        table_path: cli.table,
        cursor_path: cli.cursor,
        reset_table: cli.reset_table,
        date_limit: cli.date_limit,
        decode_policy: if cli.skip_bad {
            DecodePolicy::SkipAndLog
        } else {
            DecodePolicy::FailFast
        },
        ..Config::default()
    };

    match harvest(&config).await {
        Ok(HarvestOutcome::Saved { count, reason }) => {
            tracing::debug!("stopped on {:?}", reason);
            println!(
                "saved {} new articles under {}",
                count,
                config.table_path.display()
            );
            Ok(())
        }
        Ok(HarvestOutcome::NothingNew { .. }) => {
            println!("no new articles");
            Ok(())
        }
        Err(e) => {
            tracing::error!("harvest failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("biscrape=info,warn"),
            1 => EnvFilter::new("biscrape=debug,info"),
            2 => EnvFilter::new("biscrape=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

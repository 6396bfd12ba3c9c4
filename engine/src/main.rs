// stock-insight command line entry point
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use shared::models::ListingType;
use tracing::info;

use engine::config::{DataSourceKind, EngineSettings};
use engine::services::StockDataService;

#[derive(Parser)]
#[command(name = "stock-insight")]
#[command(about = "Daily bars, technical indicators and summaries by stock name", long_about = None)]
struct Cli {
    /// Settings file (JSON); built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Overrides the configured bar source
    #[arg(long, global = true, value_enum)]
    source: Option<DataSourceKind>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full result: bars, indicator rows and summary
    Get {
        name: String,
        #[arg(short, long)]
        days: Option<i64>,
    },
    /// Compact summary for quick checks
    Simple {
        name: String,
        #[arg(short, long)]
        days: Option<i64>,
    },
    /// Several names at once, results in the given order
    Batch {
        #[arg(required = true, num_args = 1..)]
        names: Vec<String>,
        #[arg(short, long)]
        days: Option<i64>,
    },
    /// Names or codes containing a keyword
    Search { keyword: String },
    /// The whole symbol table, optionally filtered
    List {
        #[arg(long)]
        search: Option<String>,
        /// a_share, hk_share or us_share
        #[arg(long = "type", value_parser = parse_listing_type)]
        listing_type: Option<ListingType>,
    },
}

fn parse_listing_type(raw: &str) -> Result<ListingType, String> {
    ListingType::parse(raw).ok_or_else(|| format!("unknown listing type '{}'", raw))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("failed to encode output")?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the JSON output, logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => EngineSettings::load(path)?,
        None => EngineSettings::load_default()?,
    };
    if let Some(source) = cli.source {
        settings.data_source = source;
    }
    let default_days = settings.default_days as i64;

    info!("Starting stock-insight...");
    let service = StockDataService::from_settings(settings)?;

    match cli.command {
        Commands::Get { name, days } => {
            print_json(&service.get_stock_data(&name, days.unwrap_or(default_days)).await)?;
        }
        Commands::Simple { name, days } => {
            print_json(&service.get_stock_simple(&name, days.unwrap_or(default_days)).await)?;
        }
        Commands::Batch { names, days } => {
            print_json(&service.get_multiple_stocks(&names, days.unwrap_or(default_days)).await)?;
        }
        Commands::Search { keyword } => {
            print_json(&service.search_stock(&keyword))?;
        }
        Commands::List { search, listing_type } => {
            print_json(&service.list_stocks(search.as_deref(), listing_type))?;
        }
    }

    Ok(())
}

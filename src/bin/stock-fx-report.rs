//! stock-fx-report CLI - closing prices in USD, written to a spreadsheet
//!
//! ## Example Usage
//!
//! ```bash
//! # Report the configured universe (default command)
//! EXCHANGERATE_API_KEY=... stock-fx-report
//!
//! # A few tickers, as CSV, into ./reports
//! stock-fx-report run --tickers 7011.T,WISE.L,TSM --format csv --output-dir reports
//!
//! # Show the universe with resolved currencies
//! stock-fx-report tickers
//!
//! # Print today's USD rates
//! stock-fx-report rates
//! ```

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process;
use stock_fx_report::config::{AppConfig, API_KEY_ENV};
use stock_fx_report::prelude::*;
use tokio::runtime::Runtime;

/// stock-fx-report: end-of-day closing prices converted to USD
#[derive(Parser)]
#[command(name = "stock-fx-report")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "End-of-day closing prices converted to USD", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// exchangerate-api.com key
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch prices, convert to USD and write the report (default)
    Run(RunArgs),

    /// List the ticker universe with resolved currencies
    Tickers,

    /// Fetch and print the current USD exchange rates
    Rates {
        /// Show every currency, not only those used by the universe
        #[arg(short, long)]
        all: bool,
    },
}

#[derive(Args, Default)]
struct RunArgs {
    /// Comma-separated tickers, replacing the configured list
    #[arg(short, long, value_delimiter = ',')]
    tickers: Option<Vec<String>>,

    /// Directory for the report file
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format (xlsx, csv, json)
    #[arg(short, long)]
    format: Option<String>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "warn,stock_fx_report=debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let result = load_config(&cli).and_then(|config| match cli.command {
        None => run_report(RunArgs::default(), config, cli.verbose),
        Some(Commands::Run(args)) => run_report(args, config, cli.verbose),
        Some(Commands::Tickers) => list_tickers(&config),
        Some(Commands::Rates { all }) => show_rates(&config, all),
    });

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(key) = &cli.api_key {
        config.fx.api_key = Some(key.clone());
    }

    if cli.verbose {
        println!(
            "{} v{}",
            "stock-fx-report".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!(
            "Tickers: {}  Output: {}",
            config.tickers.len(),
            config.output_dir.display().to_string().dimmed()
        );
    }
    Ok(config)
}

fn runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

fn rate_source(config: &AppConfig) -> Result<ExchangeRateApiSource> {
    Ok(ExchangeRateApiSource::with_base_url(
        config.api_key().map(str::to_string),
        &config.fx.base_url,
        config.timeout(),
    )?)
}

fn run_report(args: RunArgs, mut config: AppConfig, verbose: bool) -> Result<()> {
    if let Some(tickers) = args.tickers {
        config.tickers = tickers;
    }
    if let Some(dir) = args.output_dir {
        config.output_dir = dir;
    }
    if let Some(format) = args.format {
        config.format = format.parse()?;
    }

    if config.api_key().is_none() {
        eprintln!(
            "{} No exchange-rate API key set (use --api-key or {}); only USD prices will be converted",
            "Warning:".yellow(),
            API_KEY_ENV
        );
    }

    let prices = YahooChartSource::with_base_url(&config.market_data.base_url, config.timeout())?;
    let runner = BatchRunner::new(prices, rate_source(&config)?)
        .with_resolver(config.resolver())
        .with_converter(config.converter());

    let progress = if args.no_progress || verbose {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(config.tickers.len() as u64)
    };
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = runtime()?.block_on(runner.run_with(&config.tickers, |record| {
        progress.set_message(record.ticker.clone());
        progress.inc(1);
    }));
    progress.finish_and_clear();

    if let Some(reason) = &report.fx_error {
        eprintln!(
            "{} Exchange rates unavailable ({}); non-USD prices left unconverted",
            "Warning:".yellow(),
            reason
        );
    }

    let writer = ReportWriter::new(&config.output_dir, config.format);
    writer
        .publish(&report.records, Local::now().naive_local())
        .context("Failed to write report")?;

    print_summary(&report);
    Ok(())
}

fn print_summary(report: &BatchReport) {
    let summary = report.summary();
    println!();
    println!("{}", "Summary".green().bold());
    println!("{}", "=======".green());
    println!("  {} {}", "Tickers:".bold(), summary.total);
    println!(
        "  {} {}",
        "Converted:".bold(),
        summary.converted.to_string().bright_green()
    );
    if summary.missing_rate > 0 {
        println!(
            "  {} {}",
            "Missing FX rate:".bold(),
            summary.missing_rate.to_string().yellow()
        );
    }
    if summary.no_data + summary.fetch_failed > 0 {
        println!(
            "  {} {}",
            "No price:".bold(),
            (summary.no_data + summary.fetch_failed).to_string().red()
        );
        for record in report.failures() {
            println!("    {} {}", record.ticker, record.status.to_string().dimmed());
        }
    }
}

fn list_tickers(config: &AppConfig) -> Result<()> {
    let resolver = config.resolver();
    let converter = config.converter();

    println!("{}", "Ticker Universe".cyan().bold());
    println!("{}", "===============".cyan());
    for ticker in &config.tickers {
        let currency = resolver.resolve(ticker);
        let unit = converter.scale(1.0, currency);
        if unit < 1.0 {
            println!(
                "  {:<12} {} {}",
                ticker,
                currency,
                format!("(quoted in 1/{:.0})", 1.0 / unit).dimmed()
            );
        } else {
            println!("  {:<12} {}", ticker, currency);
        }
    }
    println!();
    println!("  {} {}", "Total:".bold(), config.tickers.len());
    Ok(())
}

fn show_rates(config: &AppConfig, all: bool) -> Result<()> {
    let source = rate_source(config)?;
    let table = runtime()?.block_on(source.fetch_rates())?;

    let resolver = config.resolver();
    let used: BTreeSet<&str> = config
        .tickers
        .iter()
        .map(|t| resolver.resolve(t).code())
        .collect();

    println!("{}", "Exchange Rates (1 USD =)".cyan().bold());
    println!("{}", "========================".cyan());
    for (code, rate) in table.sorted() {
        if all || used.contains(code) {
            println!("  {} {:>14.6}", code.bold(), rate);
        }
    }
    if !all {
        for code in used.iter().filter(|c| table.rate_for_code(c).is_none()) {
            println!("  {} {:>14}", code.bold(), "missing".red());
        }
    }
    Ok(())
}

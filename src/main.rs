//! # Company News Digger
//!
//! Periodically searches a news engine for a list of companies, pulls the
//! headline, source and link of every result, and appends a numbered report
//! block per company to a plain-text file.
//!
//! ## Usage
//!
//! ```sh
//! company_news_digger --interval 600 -o ./Data_Dig_Report.txt
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: defaults, optional YAML file, CLI overrides
//! 2. **Fetching**: one GET per company, with timeout and retry on transient errors
//! 3. **Extraction**: result cards parsed into aligned news items
//! 4. **Output**: report block appended per company, optional JSON-lines mirror
//! 5. **Scheduling**: cycles repeat on the interval until Ctrl-C

use clap::Parser;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod fetch;
mod models;
mod outputs;
mod scheduler;
mod scrapers;
mod utils;

use cli::Cli;
use config::DiggerConfig;
use fetch::{HttpFetcher, RetryFetch};
use scheduler::Scheduler;
use utils::ensure_writable_parent;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("company_news_digger starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = DiggerConfig::resolve(&args)?;
    info!(
        companies = config.companies.len(),
        output = %config.output_path.display(),
        mode = ?config.extraction,
        "Loaded configuration"
    );

    // Early check: ensure the report location is writable
    if let Err(e) = ensure_writable_parent(&config.output_path).await {
        error!(
            path = %config.output_path.display(),
            error = %e,
            "Report file location is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }
    if let Some(json_path) = &config.json_output_path {
        ensure_writable_parent(json_path).await?;
    }

    let interval = match config.interval_secs {
        Some(secs) => Duration::from_secs(secs),
        None => prompt_interval(io::stdin().lock(), io::stdout())?,
    };

    let fetcher = RetryFetch::new(
        HttpFetcher::new(&config.user_agent, config.timeout())?,
        config.max_retries,
        Duration::from_secs(1),
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received; stopping after the current company");
                on_signal.cancel();
            }
            Err(e) => warn!(error = %e, "Could not listen for Ctrl-C"),
        }
    });

    let scheduler = Scheduler::new(config, fetcher, interval, cancel);
    let cycles = scheduler.run().await.inspect_err(|e| {
        error!(error = %e, kind = %e.kind(), "Scheduler aborted");
    })?;

    let elapsed = start_time.elapsed();
    info!(cycles, secs = elapsed.as_secs(), "Digger stopped");
    Ok(())
}

/// Ask for the number of seconds between cycles.
///
/// # Arguments
///
/// * `input` - Where the answer is read from (stdin in production)
/// * `output` - Where the question is written (stdout in production)
///
/// # Returns
///
/// The interval, or an error if the answer is missing or not a whole number
/// of seconds.
fn prompt_interval(
    mut input: impl BufRead,
    mut output: impl Write,
) -> Result<Duration, Box<dyn Error>> {
    write!(output, "Please input second for period digging: ")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err("no interval entered".into());
    }
    let secs: u64 = line
        .trim()
        .parse()
        .map_err(|e| format!("invalid interval {:?}: {e}", line.trim()))?;
    Ok(Duration::from_secs(secs))
}

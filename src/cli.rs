//! Command-line interface definitions for the news digger.
//!
//! Flags override values from the optional YAML config file; see
//! [`DiggerConfig::resolve`](crate::config::DiggerConfig::resolve).

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the news digger.
///
/// # Examples
///
/// ```sh
/// # Dig the default company list every ten minutes
/// company_news_digger --interval 600
///
/// # Custom list, bounded run, JSON mirror
/// company_news_digger --company 腾讯 --company 京东 --max-cycles 3 --json-output digs.jsonl
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Report file to append to
    #[arg(short, long, env = "DIGGER_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Seconds between polling cycles (prompted for when omitted)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Company to search for; repeat to build the list
    #[arg(long)]
    pub company: Vec<String>,

    /// Also append each digest as a JSON line to this file
    #[arg(long)]
    pub json_output: Option<PathBuf>,

    /// Stop after this many cycles
    #[arg(long)]
    pub max_cycles: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

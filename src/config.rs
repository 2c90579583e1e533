//! Runtime configuration: YAML file, defaults, and CLI overrides.
//!
//! Every field is optional in the file. A missing file section falls back to
//! the defaults below, which reproduce the classic six-company Baidu News dig.
//!
//! ```yaml
//! companies: ["华能信托", "阿里巴巴"]
//! output_path: ./Data_Dig_Report.txt
//! interval_secs: 600
//! extraction: structured
//! selectors:
//!   title: 'h3[class*="news-title"]'
//! ```

use crate::cli::Cli;
use crate::error::DigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

pub const DEFAULT_BASE_URL: &str = "https://www.baidu.com/s";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/92.0.4515.131 Safari/537.36 Edg/92.0.902.67";
pub const DEFAULT_OUTPUT_PATH: &str = "Data_Dig_Report.txt";

fn default_companies() -> Vec<String> {
    ["华能信托", "阿里巴巴", "万科集团", "百度集团", "腾讯", "京东"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// How result markup is turned into [`NewsItem`](crate::models::NewsItem)s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// One pass over result cards; each item's fields come from the same card.
    #[default]
    Structured,
    /// Titles, sources and links selected independently, then zipped.
    /// Fails if the three columns differ in length.
    Columns,
}

/// CSS selectors used to locate results on the page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Selectors {
    /// Headline element of a result.
    pub title: String,
    /// Link element, searched for inside the headline element.
    pub link: String,
    /// Source/byline element.
    pub source: String,
    /// Result card; a headline's byline is only looked for inside its card.
    pub card: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            title: r#"h3[class*="news-title"]"#.to_string(),
            link: "a[href]".to_string(),
            source: r#"[class*="news-source"]"#.to_string(),
            card: r#"[class*="result"], [class*="c-container"]"#.to_string(),
        }
    }
}

/// Complete digger configuration, passed to the scheduler at construction.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiggerConfig {
    /// Search terms, dug in order every cycle.
    pub companies: Vec<String>,
    /// Plain-text report, appended to every cycle.
    pub output_path: PathBuf,
    /// Optional JSON-lines mirror of the report.
    pub json_output_path: Option<PathBuf>,
    /// Seconds to sleep between cycles. Prompted for when unset.
    pub interval_secs: Option<u64>,
    pub base_url: String,
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Extra attempts for transient request failures.
    pub max_retries: usize,
    pub extraction: ExtractionMode,
    pub selectors: Selectors,
    /// Stop the scheduler when writing a report fails.
    pub stop_on_io_error: bool,
    /// Stop after this many cycles. Runs until interrupted when unset.
    pub max_cycles: Option<u64>,
}

impl Default for DiggerConfig {
    fn default() -> Self {
        Self {
            companies: default_companies(),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            json_output_path: None,
            interval_secs: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            max_retries: 2,
            extraction: ExtractionMode::default(),
            selectors: Selectors::default(),
            stop_on_io_error: false,
            max_cycles: None,
        }
    }
}

impl DiggerConfig {
    /// Load configuration from a YAML file.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn from_file(path: &Path) -> Result<Self, DigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, DigError> {
        serde_yaml::from_str(raw).map_err(|e| DigError::Config(e.to_string()))
    }

    /// Build the effective configuration: file (if any), then CLI overrides.
    pub fn resolve(cli: &Cli) -> Result<Self, DigError> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_cli(cli);
        config.validate()?;
        debug!(?config, "Resolved configuration");
        Ok(config)
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(output) = &cli.output {
            self.output_path = output.clone();
        }
        if let Some(json) = &cli.json_output {
            self.json_output_path = Some(json.clone());
        }
        if cli.interval.is_some() {
            self.interval_secs = cli.interval;
        }
        if !cli.company.is_empty() {
            self.companies = cli.company.clone();
        }
        if let Some(timeout) = cli.timeout_secs {
            self.timeout_secs = timeout;
        }
        if cli.max_cycles.is_some() {
            self.max_cycles = cli.max_cycles;
        }
    }

    pub fn validate(&self) -> Result<(), DigError> {
        if self.companies.is_empty() {
            return Err(DigError::Config("company list is empty".into()));
        }
        if self.companies.iter().any(|c| c.trim().is_empty()) {
            return Err(DigError::Config("company names must not be blank".into()));
        }
        if self.timeout_secs == 0 {
            return Err(DigError::Config("timeout_secs must be positive".into()));
        }
        url::Url::parse(&self.base_url)?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

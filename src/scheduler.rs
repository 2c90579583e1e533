//! Polling scheduler.
//!
//! A cycle digs every configured company in order: fetch the search page,
//! extract items, render the report block, append it. Each company's failure
//! is captured as a [`DigError`] and the cycle moves on; the only failure that
//! ends the run is an I/O error while `stop_on_io_error` is set.
//!
//! Between cycles the scheduler sleeps for the configured interval, racing
//! a [`CancellationToken`] so shutdown never waits out a full interval.

use crate::config::DiggerConfig;
use crate::error::{DigError, ErrorKind};
use crate::fetch::FetchPage;
use crate::models::{CompanyDigest, CycleSummary};
use crate::outputs::{json, report};
use crate::scrapers::baidu;
use chrono::Local;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

pub struct Scheduler<F> {
    config: DiggerConfig,
    fetcher: F,
    interval: Duration,
    cancel: CancellationToken,
}

impl<F: FetchPage> Scheduler<F> {
    pub fn new(
        config: DiggerConfig,
        fetcher: F,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            fetcher,
            interval,
            cancel,
        }
    }

    /// Dig one company and append its block to the report.
    ///
    /// # Arguments
    ///
    /// * `company` - Search term to dig
    /// * `cycle` - 1-based polling cycle, recorded in the JSON mirror
    ///
    /// # Returns
    ///
    /// The number of items written to the report. A failure writing the JSON
    /// mirror is logged and does not fail the dig; the report file is the
    /// record of success.
    #[instrument(level = "info", skip(self))]
    pub async fn dig_company(&self, company: &str, cycle: u64) -> Result<usize, DigError> {
        let url = baidu::search_url(&self.config.base_url, company)?;
        let html = self.fetcher.fetch(&url).await?;
        let items = baidu::extract(
            &html,
            &url,
            self.config.extraction,
            &self.config.selectors,
        )?;

        let block = report::render_block(company, &items);
        report::append_block(&self.config.output_path, &block).await?;

        let count = items.len();
        if let Some(json_path) = &self.config.json_output_path {
            let digest = CompanyDigest::new(company, cycle, items);
            if let Err(e) = json::append_digest(json_path, &digest).await {
                warn!(
                    %company,
                    path = %json_path.display(),
                    error = %e,
                    "Failed to write JSON mirror; report block kept"
                );
            }
        }
        Ok(count)
    }

    /// Run one pass over the company list.
    ///
    /// # Returns
    ///
    /// A [`CycleSummary`] counting succeeded and failed companies. Returns
    /// `Err` only when an I/O error hits while `stop_on_io_error` is set.
    pub async fn run_cycle(&self, cycle: u64) -> Result<CycleSummary, DigError> {
        let mut succeeded = 0;
        let mut failures = Vec::new();

        for company in &self.config.companies {
            if self.cancel.is_cancelled() {
                warn!(cycle, "Cancelled mid-cycle");
                break;
            }
            match self.dig_company(company, cycle).await {
                Ok(items) => {
                    info!(%company, cycle, items, "News dig succeeded");
                    succeeded += 1;
                }
                Err(e) => {
                    let kind = e.kind();
                    warn!(%company, cycle, %kind, error = %e, "News dig failed");
                    if kind == ErrorKind::Io && self.config.stop_on_io_error {
                        return Err(e);
                    }
                    failures.push((company.clone(), e));
                }
            }
        }

        let summary = CycleSummary {
            cycle,
            succeeded,
            failures,
            finished_at: Local::now(),
        };
        info!(
            cycle = summary.cycle,
            succeeded = summary.succeeded,
            failed = summary.failed(),
            finished_at = %summary.finished_at.format("%Y-%m-%d %H:%M:%S"),
            "---------- news dig cycle finished ----------"
        );
        Ok(summary)
    }

    /// Loop cycles until cancelled or `max_cycles` is reached.
    ///
    /// Returns the number of cycles completed.
    #[instrument(level = "info", skip_all, fields(interval_secs = self.interval.as_secs()))]
    pub async fn run(&self) -> Result<u64, DigError> {
        let mut cycle = 0u64;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }
            cycle += 1;
            self.run_cycle(cycle).await?;

            if self.config.max_cycles.is_some_and(|max| cycle >= max) {
                info!(cycle, "Reached max cycles");
                break;
            }

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    info!(cycle, "Cancelled while waiting for next cycle");
                    break;
                }
                _ = sleep(self.interval) => {}
            }
        }
        Ok(cycle)
    }
}

//! Data models for dug news items and per-cycle bookkeeping.
//!
//! - [`NewsItem`]: one headline/source/link triple from a result page
//! - [`CompanyDigest`]: all items found for one company in one cycle
//! - [`CycleSummary`]: outcome of one pass over the company list

use crate::error::DigError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A single news result.
///
/// Title and source are already cleaned; `url` is absolute.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub url: String,
}

/// The items found for one company during one polling cycle.
///
/// This is what the JSON-lines output records, one line per digest.
#[derive(Debug, Deserialize, Serialize)]
pub struct CompanyDigest {
    /// The search term that produced these items.
    pub company: String,
    /// 1-based polling cycle number.
    pub cycle: u64,
    /// Local time the page was fetched, RFC 3339.
    pub fetched_at: String,
    pub items: Vec<NewsItem>,
}

impl CompanyDigest {
    pub fn new(company: &str, cycle: u64, items: Vec<NewsItem>) -> Self {
        Self {
            company: company.to_string(),
            cycle,
            fetched_at: Local::now().to_rfc3339(),
            items,
        }
    }
}

/// Aggregated outcome of one polling cycle.
#[derive(Debug)]
pub struct CycleSummary {
    pub cycle: u64,
    /// Companies whose block was written.
    pub succeeded: usize,
    /// Companies that failed, with the error that stopped them.
    pub failures: Vec<(String, DigError)>,
    pub finished_at: DateTime<Local>,
}

impl CycleSummary {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_digest_serialization() {
        let digest = CompanyDigest::new(
            "TestCo",
            3,
            vec![NewsItem {
                title: "Headline".to_string(),
                source: "Wire".to_string(),
                url: "https://example.com/a".to_string(),
            }],
        );

        let json = serde_json::to_string(&digest).unwrap();
        assert!(json.contains("\"company\":\"TestCo\""));
        assert!(json.contains("\"cycle\":3"));
        assert!(json.contains("https://example.com/a"));

        let back: CompanyDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.items.len(), 1);
        assert_eq!(back.items[0].source, "Wire");
    }

    #[test]
    fn test_cycle_summary_failed_count() {
        let summary = CycleSummary {
            cycle: 1,
            succeeded: 4,
            failures: vec![("Acme".to_string(), DigError::Config("bad".into()))],
            finished_at: Local::now(),
        };
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.succeeded, 4);
    }
}

//! Typed errors for a single company dig.
//!
//! Every step of a dig (request, extraction, report writing) maps its failure
//! into [`DigError`], so the scheduler can tell a flaky network apart from a
//! broken selector or an unwritable report file.

use std::fmt;
use thiserror::Error;

/// Errors raised while extracting news items from a result page.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A configured CSS selector failed to parse.
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    /// Independently selected columns disagree in length.
    #[error("misaligned columns: {titles} titles, {sources} sources, {links} links")]
    Misaligned {
        titles: usize,
        sources: usize,
        links: usize,
    },
}

/// Everything that can go wrong while digging one company.
#[derive(Debug, Error)]
pub enum DigError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Coarse classification used in logs and cycle summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Parse,
    Io,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Network => "network",
            ErrorKind::Parse => "parse",
            ErrorKind::Io => "io",
            ErrorKind::Config => "config",
        };
        f.write_str(s)
    }
}

impl DigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DigError::Network(_) | DigError::Status { .. } => ErrorKind::Network,
            DigError::Parse(_) => ErrorKind::Parse,
            DigError::Io(_) | DigError::Json(_) => ErrorKind::Io,
            DigError::Url(_) | DigError::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether another attempt at the same request might succeed.
    ///
    /// Transport failures, 5xx and 429 are transient. Everything else fails
    /// the same way on every attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            DigError::Network(_) => true,
            DigError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let status = DigError::Status {
            status: 503,
            url: "https://example.com".to_string(),
        };
        assert_eq!(status.kind(), ErrorKind::Network);

        let parse = DigError::from(ParseError::Misaligned {
            titles: 2,
            sources: 1,
            links: 2,
        });
        assert_eq!(parse.kind(), ErrorKind::Parse);

        let io = DigError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "nope",
        ));
        assert_eq!(io.kind(), ErrorKind::Io);
        assert_eq!(DigError::Config("x".into()).kind(), ErrorKind::Config);
    }

    #[test]
    fn test_transient_statuses() {
        let status = |s: u16| DigError::Status {
            status: s,
            url: String::new(),
        };
        assert!(status(500).is_transient());
        assert!(status(429).is_transient());
        assert!(!status(404).is_transient());
        assert!(!status(403).is_transient());
        assert!(!DigError::Config("bad".into()).is_transient());
    }

    #[test]
    fn test_misaligned_message() {
        let e = ParseError::Misaligned {
            titles: 3,
            sources: 2,
            links: 3,
        };
        assert_eq!(
            e.to_string(),
            "misaligned columns: 3 titles, 2 sources, 3 links"
        );
    }

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::Network.to_string(), "network");
        assert_eq!(ErrorKind::Io.to_string(), "io");
    }
}

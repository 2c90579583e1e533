//! Output writers for dug news.
//!
//! # Submodules
//!
//! - [`report`]: renders and appends the plain-text report blocks
//! - [`json`]: appends each digest as one JSON line (optional mirror)
//!
//! Both writers open their file in append mode per write and close it
//! again, so nothing is held open between companies.

pub mod json;
pub mod report;

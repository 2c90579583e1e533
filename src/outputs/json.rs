//! JSON-lines mirror of the report.
//!
//! Each [`CompanyDigest`] becomes one line, so the file can be tailed or
//! loaded line by line without re-parsing the text report.

use crate::error::DigError;
use crate::models::CompanyDigest;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

/// Append `digest` as a single JSON line.
#[instrument(level = "debug", skip_all, fields(path = %path.display(), company = %digest.company))]
pub async fn append_digest(path: &Path, digest: &CompanyDigest) -> Result<(), DigError> {
    let mut line = serde_json::to_string(digest)?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(line.as_bytes()).await?;
    file.flush().await?;
    debug!(items = digest.items.len(), "Appended JSON digest");
    Ok(())
}

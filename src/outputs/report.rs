//! Plain-text report blocks.
//!
//! One block per company per cycle:
//!
//! ```text
//! TestCo Data Digging Completed!
//!
//! 1.First headline (Outlet)
//! https://example.com/1
//! 2.Second headline (Other Outlet)
//! https://example.com/2
//! - - - - - - - - - - - - - - - -
//!
//! ```

use crate::models::NewsItem;
use std::fmt::Write as _;
use std::path::Path;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

pub const SEPARATOR: &str = "- - - - - - - - - - - - - - - -";

/// Render the report block for one company.
pub fn render_block(company: &str, items: &[NewsItem]) -> String {
    let mut block = String::new();
    // writing into a String cannot fail
    let _ = writeln!(block, "{company} Data Digging Completed!\n");
    for (i, item) in items.iter().enumerate() {
        let _ = writeln!(block, "{}.{} ({})", i + 1, item.title, item.source);
        let _ = writeln!(block, "{}", item.url);
    }
    let _ = writeln!(block, "{SEPARATOR}\n");
    block
}

/// Append a rendered block to the report file, creating it if needed.
#[instrument(level = "debug", skip_all, fields(path = %path.display(), bytes = block.len()))]
pub async fn append_block(path: &Path, block: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(block.as_bytes()).await?;
    file.flush().await?;
    debug!("Appended report block");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(n: usize) -> NewsItem {
        NewsItem {
            title: format!("Headline {n}"),
            source: format!("Outlet{n}"),
            url: format!("https://example.com/{n}"),
        }
    }

    #[test]
    fn test_render_block_layout() {
        let block = render_block("TestCo", &[item(1), item(2)]);
        let expected = "TestCo Data Digging Completed!\n\
                        \n\
                        1.Headline 1 (Outlet1)\n\
                        https://example.com/1\n\
                        2.Headline 2 (Outlet2)\n\
                        https://example.com/2\n\
                        - - - - - - - - - - - - - - - -\n\
                        \n";
        assert_eq!(block, expected);
    }

    #[test]
    fn test_render_block_numbers_every_item_in_order() {
        let items: Vec<NewsItem> = (1..=7).map(item).collect();
        let block = render_block("Acme", &items);

        let numbered: Vec<&str> = block
            .lines()
            .filter(|l| l.starts_with(|c: char| c.is_ascii_digit()))
            .collect();
        assert_eq!(numbered.len(), 7);
        for (i, line) in numbered.iter().enumerate() {
            assert!(line.starts_with(&format!("{}.Headline {}", i + 1, i + 1)));
        }
    }

    #[test]
    fn test_render_block_without_items() {
        let block = render_block("京东", &[]);
        assert_eq!(block, format!("京东 Data Digging Completed!\n\n{SEPARATOR}\n\n"));
    }

    #[tokio::test]
    async fn test_append_block_appends() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("report.txt");

        append_block(&path, "first\n").await.unwrap();
        append_block(&path, "second\n").await.unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }
}

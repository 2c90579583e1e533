//! News search scrapers.
//!
//! | Source | Module | Method |
//! |--------|--------|--------|
//! | Baidu News | [`baidu`] | HTML scraping of the news search results page |
//!
//! A scraper module exports:
//! - `search_url(base, company)`: the request target for one company
//! - `extract(html, page_url, mode, selectors)`: result page to `Vec<NewsItem>`

pub mod baidu;

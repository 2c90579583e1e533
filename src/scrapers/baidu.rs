//! Baidu News result page scraper.
//!
//! Builds the news search URL for a company and turns the returned result
//! page into [`NewsItem`]s. Result cards carry a headline (`h3.news-title_*`)
//! wrapping the article link, and a byline block (`div.news-source_*`) with
//! the outlet name and relative publish time. The hashed class suffixes
//! change over time, so the default selectors match on the stable prefix.

use crate::config::{ExtractionMode, Selectors};
use crate::error::{DigError, ParseError};
use crate::models::NewsItem;
use crate::utils::{clean_source, clean_title};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

/// Build the news search URL for `company`.
///
/// The company name is percent-encoded into the `wd` parameter.
pub fn search_url(base: &str, company: &str) -> Result<Url, DigError> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut()
        .clear()
        .append_pair("tn", "news")
        .append_pair("rtt", "4")
        .append_pair("bsst", "1")
        .append_pair("cl", "2")
        .append_pair("wd", company);
    Ok(url)
}

/// Compiled selectors for one extraction run.
struct Compiled {
    title: Selector,
    link: Selector,
    source: Selector,
    card: Selector,
}

fn compile(raw: &str) -> Result<Selector, ParseError> {
    Selector::parse(raw).map_err(|e| ParseError::Selector {
        selector: raw.to_string(),
        reason: e.to_string(),
    })
}

impl Compiled {
    fn new(selectors: &Selectors) -> Result<Self, ParseError> {
        Ok(Self {
            title: compile(&selectors.title)?,
            link: compile(&selectors.link)?,
            source: compile(&selectors.source)?,
            card: compile(&selectors.card)?,
        })
    }
}

/// Extract news items from a result page.
///
/// # Arguments
///
/// * `html` - Raw result page markup
/// * `page_url` - The URL the page was fetched from, used to resolve relative links
/// * `mode` - Structured (per result card) or column-wise extraction
/// * `selectors` - CSS selectors locating cards, headlines, links and bylines
///
/// # Returns
///
/// The items in page order, or a [`ParseError`] if a selector is invalid or
/// (in columns mode) the columns disagree in length.
pub fn extract(
    html: &str,
    page_url: &Url,
    mode: ExtractionMode,
    selectors: &Selectors,
) -> Result<Vec<NewsItem>, ParseError> {
    let compiled = Compiled::new(selectors)?;
    let document = Html::parse_document(html);
    let items = match mode {
        ExtractionMode::Structured => extract_structured(&document, page_url, &compiled),
        ExtractionMode::Columns => extract_columns(&document, page_url, &compiled)?,
    };
    debug!(count = items.len(), ?mode, "Extracted news items");
    Ok(items)
}

/// One pass over headlines; each item takes its link and byline from the
/// headline's own result card.
fn extract_structured(document: &Html, page_url: &Url, sel: &Compiled) -> Vec<NewsItem> {
    let mut items = Vec::new();
    for (index, title_el) in document.select(&sel.title).enumerate() {
        let Some(href) = first_href(title_el, sel) else {
            warn!(index, "Headline without a link; skipping");
            continue;
        };
        let Some(url) = resolve(page_url, href) else {
            warn!(index, href, "Unresolvable link; skipping");
            continue;
        };

        let source = card_source(title_el, sel)
            .map(|el| clean_source(&element_text(el)))
            .unwrap_or_default();

        items.push(NewsItem {
            title: clean_title(&element_text(title_el)),
            source,
            url,
        });
    }
    items
}

/// Byline for a headline: the first source element inside the headline's
/// nearest result card. A card holding more than one headline is not a
/// single result, so it yields no byline.
fn card_source<'a>(title_el: ElementRef<'a>, sel: &Compiled) -> Option<ElementRef<'a>> {
    let mut node = title_el.parent();
    let card = loop {
        let n = node?;
        if let Some(el) = ElementRef::wrap(n) {
            if sel.card.matches(&el) {
                break el;
            }
        }
        node = n.parent();
    };
    if card.select(&sel.title).nth(1).is_some() {
        return None;
    }
    card.select(&sel.source).next()
}

fn first_href<'a>(title_el: ElementRef<'a>, sel: &Compiled) -> Option<&'a str> {
    title_el
        .select(&sel.link)
        .next()
        .and_then(|a| a.value().attr("href"))
}

/// Select titles, sources and links independently, then zip them.
///
/// The three columns must be the same length; otherwise pairing by position
/// would attach bylines and links to the wrong headlines.
fn extract_columns(
    document: &Html,
    page_url: &Url,
    sel: &Compiled,
) -> Result<Vec<NewsItem>, ParseError> {
    let titles: Vec<String> = document
        .select(&sel.title)
        .map(|el| clean_title(&element_text(el)))
        .collect();
    let sources: Vec<String> = document
        .select(&sel.source)
        .map(|el| clean_source(&element_text(el)))
        .collect();
    let links: Vec<String> = document
        .select(&sel.title)
        .filter_map(|el| first_href(el, sel))
        .filter_map(|href| resolve(page_url, href))
        .collect();

    zip_columns(titles, sources, links)
}

/// Pair three positional columns into items, refusing unequal lengths.
pub fn zip_columns(
    titles: Vec<String>,
    sources: Vec<String>,
    links: Vec<String>,
) -> Result<Vec<NewsItem>, ParseError> {
    if titles.len() != sources.len() || titles.len() != links.len() {
        return Err(ParseError::Misaligned {
            titles: titles.len(),
            sources: sources.len(),
            links: links.len(),
        });
    }

    Ok(titles
        .into_iter()
        .zip(sources)
        .zip(links)
        .map(|((title, source), url)| NewsItem { title, source, url })
        .collect())
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>()
}

fn resolve(page_url: &Url, href: &str) -> Option<String> {
    page_url.join(href.trim()).ok().map(|u| u.to_string())
}

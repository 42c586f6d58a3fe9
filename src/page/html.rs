// src/page/html.rs
// =============================================================================
// This module pulls anchor targets out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser), so broken markup is fine
//
// The values are returned exactly as written in the page. Turning them into
// absolute URLs is the job of crawl::resolve, which knows the page URL.
// =============================================================================

use scraper::{Html, Selector};

// Extracts every <a href="..."> value from an HTML document
//
// Parameters:
//   html: the page body (treated as HTML whatever its content type)
//
// Returns: the raw href values in document order, duplicates included
//
// Example:
//   html = "<a href='/docs'>Docs</a><a href='#top'>Top</a>"
//   result = ["/docs", "#top"]
pub fn extract_hrefs(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    // "a[href]" is a constant selector, it only fails if scraper changes
    // its selector grammar
    let Ok(selector) = Selector::parse("a[href]") else {
        tracing::error!("anchor selector failed to parse");
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.trim().to_string())
        .collect()
}

// src/page/mod.rs
// =============================================================================
// Everything about a single page: downloading it and finding its links.
//
// Submodules:
// - fetch: HTTP client, retries, error classification
// - html: Extracts anchor hrefs from an HTML body
// =============================================================================

mod fetch;
mod html;

pub use fetch::{FetchError, Fetcher, Page, PageSource, PageStatus};
pub use html::extract_hrefs;

// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Fixed-size worker pool sharing one frontier (queue + visited set)
// - Same-host restriction (doesn't crawl external sites)
// - Optional depth limit
// - Ends by itself once every reachable page has been fetched
// - Per-page failures are recorded in the report, the crawl goes on
//
// Submodules:
// - queue: the shared Frontier and the termination rule
// - resolve: href -> absolute URL, same-host check
// - worker: the crawl loop itself
// - report: per-page results
// =============================================================================

mod queue;
mod report;
mod resolve;
mod worker;

pub use report::{CrawlReport, PageReport};
pub use worker::crawl_website;

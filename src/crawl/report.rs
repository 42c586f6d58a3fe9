// src/crawl/report.rs
// =============================================================================
// What a crawl produced: one entry per fetched page.
//
// The report is only printed (as a table or JSON), never stored.
// =============================================================================

use serde::Serialize;

use super::queue::CrawlItem;
use crate::page::{FetchError, PageStatus};

#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    /// The URL that was fetched
    pub url: String,
    pub depth: usize,
    #[serde(flatten)] // merges {"status": "..."} into this object
    pub status: PageStatus,
    /// Anchors on the page, before any filtering
    pub links_found: usize,
    /// Links that were new, on-site and within depth
    pub links_queued: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PageReport {
    pub fn fetched(item: &CrawlItem, links_found: usize, links_queued: usize) -> PageReport {
        PageReport {
            url: item.url.to_string(),
            depth: item.depth,
            status: PageStatus::Ok,
            links_found,
            links_queued,
            message: None,
        }
    }

    pub fn failed(item: &CrawlItem, error: &FetchError) -> PageReport {
        PageReport {
            url: item.url.to_string(),
            depth: item.depth,
            status: error.status(),
            links_found: 0,
            links_queued: 0,
            message: Some(error.to_string()),
        }
    }

    // A fetch that worked but whose body was not scanned
    pub fn skipped(item: &CrawlItem, status: PageStatus, message: String) -> PageReport {
        PageReport {
            url: item.url.to_string(),
            depth: item.depth,
            status,
            links_found: 0,
            links_queued: 0,
            message: Some(message),
        }
    }

    pub fn panicked(item: &CrawlItem) -> PageReport {
        PageReport {
            url: item.url.to_string(),
            depth: item.depth,
            status: PageStatus::Error,
            links_found: 0,
            links_queued: 0,
            message: Some("page handler panicked".to_string()),
        }
    }

    /// Redirects to known or off-site pages are not failures.
    pub fn is_ok(&self) -> bool {
        matches!(
            self.status,
            PageStatus::Ok | PageStatus::AlreadySeen | PageStatus::OffSite
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub seed: String,
    /// Crawl was stopped by Ctrl-C before the queue drained
    pub interrupted: bool,
    /// Pages discovered but never fetched because of the interruption
    pub unvisited: usize,
    /// Sorted by depth, then URL
    pub pages: Vec<PageReport>,
}

impl CrawlReport {
    pub fn ok_count(&self) -> usize {
        self.pages.iter().filter(|p| p.is_ok()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.pages.len() - self.ok_count()
    }
}

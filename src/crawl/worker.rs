// src/crawl/worker.rs
// =============================================================================
// The crawl loop: a fixed pool of workers sharing one Frontier.
//
// Each worker repeats:
// 1. Take the next item from the frontier (waits if others may add more)
// 2. Fetch the page; a failure is logged and recorded, never fatal
// 3. Resolve every href against the page URL, keep the same-host ones and
//    offer them back to the frontier (unless max depth is reached)
// 4. Tell the frontier the item is complete, even if step 2 or 3 panicked
//
// The number of workers is the number of requests in flight at most.
// =============================================================================

use futures::future::join_all;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::future::Future;
use std::sync::Arc;
use url::Url;

use super::queue::{CrawlItem, Frontier};
use super::report::{CrawlReport, PageReport};
use super::resolve::{is_same_host, resolve_link};
use crate::config::CrawlConfig;
use crate::page::{extract_hrefs, Page, PageSource, PageStatus};

// What every worker needs, shared behind one Arc
struct CrawlContext {
    seed: Url,
    max_depth: Option<usize>,
    print_progress: bool,
    source: Arc<dyn PageSource>,
    frontier: Arc<Frontier>,
}

// Crawls a website starting from config.seed
//
// Parameters:
//   config: validated crawl settings
//   source: where pages come from (the network in production)
//   shutdown: resolves when the user wants to stop early (Ctrl-C)
//
// Returns: one PageReport per fetched URL, sorted by depth then URL
pub async fn crawl_website(
    config: &CrawlConfig,
    source: Arc<dyn PageSource>,
    shutdown: impl Future<Output = ()>,
) -> CrawlReport {
    let frontier = Arc::new(Frontier::new(config.seed.clone()));
    let ctx = Arc::new(CrawlContext {
        seed: config.seed.clone(),
        max_depth: config.max_depth,
        print_progress: config.print_progress,
        source,
        frontier: frontier.clone(),
    });

    tracing::info!(seed = %config.seed, workers = config.workers, max_depth = ?config.max_depth, "starting crawl");

    let handles: Vec<_> = (0..config.workers)
        .map(|id| tokio::spawn(run_worker(id, ctx.clone())))
        .collect();
    let workers = join_all(handles);
    tokio::pin!(workers);

    let mut interrupted = false;
    let results = tokio::select! {
        results = &mut workers => results,
        _ = shutdown => {
            tracing::warn!("interrupted, waiting for pages in flight");
            interrupted = true;
            frontier.close();
            workers.await
        }
    };

    let mut pages = Vec::new();
    for result in results {
        match result {
            Ok(reports) => pages.extend(reports),
            Err(e) => tracing::error!(error = %e, "crawl worker panicked"),
        }
    }
    pages.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.url.cmp(&b.url)));

    tracing::info!(pages = pages.len(), seen = frontier.visited_count(), "crawl finished");

    CrawlReport {
        seed: config.seed.to_string(),
        interrupted,
        unvisited: frontier.pending_count(),
        pages,
    }
}

async fn run_worker(id: usize, ctx: Arc<CrawlContext>) -> Vec<PageReport> {
    let mut reports = Vec::new();

    while let Some(item) = ctx.frontier.next().await {
        // A panic must still end in complete(), or in_flight never drops to
        // zero and every other worker waits forever
        let report = match AssertUnwindSafe(visit(&ctx, &item)).catch_unwind().await {
            Ok(report) => report,
            Err(_) => {
                tracing::error!(worker = id, url = %item.url, "panic while visiting page");
                PageReport::panicked(&item)
            }
        };
        // only after the page's links are offered, otherwise idle workers
        // could see an empty queue with nothing in flight and quit early
        ctx.frontier.complete();
        reports.push(report);
    }

    tracing::debug!(worker = id, pages = reports.len(), "worker done");
    reports
}

// Fetches one page and queues its eligible links
async fn visit(ctx: &CrawlContext, item: &CrawlItem) -> PageReport {
    if ctx.print_progress {
        println!("  Crawling [depth {}]: {}", item.depth, item.url);
    }

    let page: Page = match ctx.source.fetch(&item.url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!(url = %item.url, error = %e, "failed to fetch page, skipping");
            return PageReport::failed(item, &e);
        }
    };

    if page.url != item.url {
        tracing::debug!(from = %item.url, to = %page.url, "followed redirect");

        if !is_same_host(&page.url, &ctx.seed) {
            return PageReport::skipped(
                item,
                PageStatus::OffSite,
                format!("redirects off-site to {}", page.url),
            );
        }
        // The target is queued or fetched by someone else; scanning it here
        // too would report its links twice
        if !ctx.frontier.mark_visited(&page.url) {
            return PageReport::skipped(
                item,
                PageStatus::AlreadySeen,
                format!("redirects to {}", page.url),
            );
        }
    }

    let hrefs = extract_hrefs(&page.body);

    // Depth 1 = just the starting page
    let follow = ctx.max_depth.map_or(true, |max| item.depth < max);
    let mut queued = 0;

    if follow {
        for href in &hrefs {
            // Relative links resolve against where the body came from
            let Some(link) = resolve_link(&page.url, href) else {
                continue;
            };
            if !is_same_host(&link, &ctx.seed) {
                tracing::trace!(%link, "off-site link, skipping");
                continue;
            }
            let next = CrawlItem {
                url: link,
                depth: item.depth + 1,
            };
            if ctx.frontier.offer(next) {
                queued += 1;
            }
        }
    }

    tracing::debug!(url = %item.url, found = hrefs.len(), queued, "page scanned");
    PageReport::fetched(item, hrefs.len(), queued)
}

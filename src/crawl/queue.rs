// src/crawl/queue.rs
// =============================================================================
// The crawl frontier: the queue of pages still to fetch, shared by all
// workers.
//
// How it works:
// 1. The queue starts with the seed URL at depth 1
// 2. Workers take items with next(); each taken item counts as "in flight"
// 3. Links found on a page are offer()ed back; a URL is accepted only the
//    first time it is seen, so every page is fetched at most once
// 4. When a worker is done with a page it calls complete()
// 5. Once the queue is empty and nothing is in flight, no new links can
//    appear, so next() returns None to every worker and the crawl ends
//
// All state sits behind one Mutex. The lock is never held across an
// .await; waiting for work goes through a tokio Notify instead.
// =============================================================================

use std::collections::{HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use url::Url;

// Represents a page in the crawl queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlItem {
    pub url: Url,
    pub depth: usize, // How many levels deep from the starting URL (seed = 1)
}

#[derive(Debug, Default)]
struct State {
    queue: VecDeque<CrawlItem>,
    // Every URL ever accepted into the queue, fetched or not
    visited: HashSet<String>,
    in_flight: usize,
    closed: bool,
}

#[derive(Debug)]
pub struct Frontier {
    state: Mutex<State>,
    notify: Notify,
}

impl Frontier {
    pub fn new(seed: Url) -> Frontier {
        let mut state = State::default();
        state.visited.insert(seed.to_string());
        state.queue.push_back(CrawlItem {
            url: seed,
            depth: 1,
        });

        Frontier {
            state: Mutex::new(state),
            notify: Notify::new(),
        }
    }

    // A panicking worker must not take the rest of the crawl down with it;
    // the state is still consistent because every update is a single step
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits for the next page to fetch.
    ///
    /// Returns None when the crawl is over: either the queue drained with
    /// nothing in flight, or close() was called.
    pub async fn next(&self) -> Option<CrawlItem> {
        loop {
            // Register for a wakeup *before* looking at the state, so an
            // offer() or complete() between the check and the await is not
            // missed
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if state.closed {
                    return None;
                }
                if let Some(item) = state.queue.pop_front() {
                    state.in_flight += 1;
                    return Some(item);
                }
                if state.in_flight == 0 {
                    state.closed = true;
                    drop(state);
                    self.notify.notify_waiters();
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Queues a discovered page unless its URL was seen before.
    ///
    /// Returns true if the item was queued.
    pub fn offer(&self, item: CrawlItem) -> bool {
        let mut state = self.lock();
        if state.closed || !state.visited.insert(item.url.to_string()) {
            return false;
        }
        state.queue.push_back(item);
        drop(state);

        self.notify.notify_waiters();
        true
    }

    /// Records a URL as visited without queueing it (e.g. a redirect target
    /// that was already fetched). Returns false if it was known already.
    pub fn mark_visited(&self, url: &Url) -> bool {
        self.lock().visited.insert(url.to_string())
    }

    /// Marks one item handed out by next() as finished.
    pub fn complete(&self) {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        drop(state);

        self.notify.notify_waiters();
    }

    /// Stops handing out work. Items already in flight still finish.
    pub fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_waiters();
    }

    pub fn visited_count(&self) -> usize {
        self.lock().visited.len()
    }

    /// Pages queued but never handed out (non-zero only after close()).
    pub fn pending_count(&self) -> usize {
        self.lock().queue.len()
    }
}

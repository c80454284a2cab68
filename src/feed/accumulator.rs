//! Growing, de-duplicated, order-preserving item sequence.
//!
//! The accumulator owns all aggregate state for one feed subscription and
//! is mutated only through the merge operations below. Every mutation is
//! synchronous; the epoch token discards results from fetches that a later
//! `reset` superseded.

use std::collections::HashSet;

use tracing::debug;

use crate::error::FeedError;
use crate::fetcher::{FeedItem, Page, PageInfo};

/// Monotonically increasing epoch marker.
///
/// A fetch captures the token when it starts; if a `reset` bumps the epoch
/// before the fetch resolves, its result no longer matches and is
/// discarded. This is a superseded-response guard, not a cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchToken(u64);

/// Where the current epoch stands in its fetch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// No fetch owned right now; more pages may remain.
    Idle,
    /// First page of the epoch is in flight.
    FetchingFirst,
    /// A subsequent page is in flight.
    FetchingMore,
    /// Last operation failed. Accumulated items are retained.
    Error,
    /// Nothing left to fetch for this epoch.
    Settled,
}

pub struct ResultAccumulator {
    items: Vec<FeedItem>,
    seen: HashSet<String>,
    page_info: Option<PageInfo>,
    status: FetchStatus,
    epoch: u64,
    dedupe: bool,
    last_error: Option<String>,
}

impl ResultAccumulator {
    pub fn new(dedupe: bool) -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            page_info: None,
            status: FetchStatus::Idle,
            epoch: 0,
            dedupe,
            last_error: None,
        }
    }

    /// Start a new epoch: clear everything, mark the first fetch as owned,
    /// and return the token that fetch must present when it completes.
    pub fn reset(&mut self) -> FetchToken {
        self.items.clear();
        self.seen.clear();
        self.page_info = None;
        self.status = FetchStatus::FetchingFirst;
        self.last_error = None;
        self.epoch += 1;
        FetchToken(self.epoch)
    }

    /// Token for the current epoch, captured before issuing a next-page fetch.
    pub fn token(&self) -> FetchToken {
        FetchToken(self.epoch)
    }

    fn is_stale(&self, token: FetchToken) -> bool {
        token.0 != self.epoch
    }

    /// Mark a next-page fetch as owned. Stale tokens are ignored.
    pub fn begin_next(&mut self, token: FetchToken) {
        if self.is_stale(token) {
            return;
        }
        self.status = FetchStatus::FetchingMore;
    }

    /// Replace the aggregate with the epoch's first page.
    pub fn apply_first_page(&mut self, page: Page, token: FetchToken) {
        if self.is_stale(token) {
            debug!(epoch = self.epoch, "Discarding stale first-page result");
            return;
        }
        self.items.clear();
        self.seen.clear();
        self.merge(page.items);
        self.finish_merge(page.page_info);
    }

    /// Append a subsequent page, preserving fetch order and skipping items
    /// whose id is already present (overlapping server cursors happen).
    pub fn apply_next_page(&mut self, page: Page, token: FetchToken) {
        if self.is_stale(token) {
            debug!(epoch = self.epoch, "Discarding stale next-page result");
            return;
        }
        let skipped = self.merge(page.items);
        if skipped > 0 {
            debug!(skipped, "Skipped duplicate items during merge");
        }
        self.finish_merge(page.page_info);
    }

    /// Record a fetch failure. Already-accumulated items are untouched.
    pub fn mark_error(&mut self, err: &FeedError, token: FetchToken) {
        if self.is_stale(token) {
            debug!(epoch = self.epoch, "Discarding stale fetch failure");
            return;
        }
        self.status = FetchStatus::Error;
        self.last_error = Some(err.to_string());
    }

    fn merge(&mut self, incoming: Vec<FeedItem>) -> usize {
        let mut skipped = 0;
        for item in incoming {
            if self.dedupe && !self.seen.insert(item.id.clone()) {
                skipped += 1;
                continue;
            }
            self.items.push(item);
        }
        skipped
    }

    fn finish_merge(&mut self, page_info: PageInfo) {
        self.page_info = Some(page_info);
        self.last_error = None;
        self.status = if self.exhausted() {
            FetchStatus::Settled
        } else {
            FetchStatus::Idle
        };
    }

    /// `next == None` is the authoritative termination signal; the count
    /// comparison is a secondary early-exit only (the server may revise
    /// `total_count` between pages).
    fn exhausted(&self) -> bool {
        match &self.page_info {
            Some(info) => {
                info.next.is_none() || self.items.len() as u64 >= info.total_count
            }
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn status(&self) -> FetchStatus {
        self.status
    }

    pub fn page_info(&self) -> Option<&PageInfo> {
        self.page_info.as_ref()
    }

    /// Cursor to resume from, for the next fetch.
    pub fn next_cursor(&self) -> Option<String> {
        self.page_info.as_ref().and_then(|info| info.next.clone())
    }

    /// True once any page has been applied in this epoch.
    pub fn loaded(&self) -> bool {
        self.page_info.is_some()
    }

    /// Whether a sentinel should render: a live cursor and items still
    /// outstanding.
    pub fn has_more(&self) -> bool {
        match &self.page_info {
            Some(info) => info.next.is_some() && !self.exhausted(),
            None => false,
        }
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

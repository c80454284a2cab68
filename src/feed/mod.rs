//! Feed aggregation engine.
//!
//! Turns a cursor-paginated remote resource into a continuously growing,
//! de-duplicated, order-preserving local sequence, safe under rapid and
//! concurrent trigger events.
//!
//! # Architecture
//!
//! ```text
//! VisibilityTrigger ──► FetchGate ──► PageFetcher (async round trip)
//!                                         │
//!                                         ▼
//!               FeedState ◄── ResultAccumulator ──► watch::Sender<FeedSnapshot>
//! ```
//!
//! All mutation runs synchronously under one mutex; the only suspension
//! point is the fetcher's round trip, during which the lock is released.
//! Results from fetches superseded by a parameter change are discarded via
//! the accumulator's epoch token.

pub mod accumulator;
pub mod gate;
pub mod state;
pub mod trigger;

pub use accumulator::{FetchStatus, FetchToken, ResultAccumulator};
pub use gate::FetchGate;
pub use state::FeedState;
pub use trigger::VisibilityTrigger;

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::config::FeedConfig;
use crate::fetcher::{FeedItem, PageFetcher, QueryParams};

/// Read-only view handed to the presentation layer on every mutation.
#[derive(Debug, Clone, Serialize)]
pub struct FeedSnapshot {
    pub state: FeedState,
    pub items: Vec<FeedItem>,
    pub has_more: bool,
    /// Server's best-known estimate; may be revised between pages.
    pub total_count: Option<u64>,
    /// Non-blocking failure notice: set when an incremental fetch failed
    /// while content is already showing.
    pub notice: Option<String>,
}

struct Inner {
    accumulator: ResultAccumulator,
    gate: FetchGate,
    trigger: VisibilityTrigger,
    params: QueryParams,
}

/// Composition root: owns the accumulator, gate and trigger behind one
/// mutex and publishes an immutable snapshot after every mutation.
///
/// The two inbound hooks mirror what a UI binds to: `on_params_changed`
/// (feed type or filter switched) and `on_sentinel_visible` (the
/// end-of-list marker scrolled into view).
pub struct FeedAggregator {
    fetcher: Arc<dyn PageFetcher>,
    inner: Mutex<Inner>,
    snapshot_tx: watch::Sender<FeedSnapshot>,
}

impl FeedAggregator {
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: &FeedConfig) -> Self {
        let inner = Inner {
            accumulator: ResultAccumulator::new(config.dedupe),
            gate: FetchGate::new(),
            trigger: VisibilityTrigger::new(),
            params: QueryParams::default(),
        };
        let (snapshot_tx, _) = watch::channel(Self::snapshot_of(&inner));
        Self {
            fetcher,
            inner: Mutex::new(inner),
            snapshot_tx,
        }
    }

    /// Subscribe to snapshot updates. The receiver always sees the latest
    /// state; intermediate snapshots may be skipped.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Snapshot updates as a `Stream`, for `while let Some(...)` loops.
    pub fn snapshots(&self) -> WatchStream<FeedSnapshot> {
        WatchStream::new(self.subscribe())
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> FeedSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    /// Start a new epoch with fresh query parameters and fetch its first
    /// page. A fetch still in flight from the previous epoch keeps running
    /// but its result will be discarded.
    pub async fn on_params_changed(&self, params: QueryParams) {
        let token = {
            let mut inner = self.lock();
            inner.params = params.clone();
            inner.gate.reset();
            let token = inner.accumulator.reset();
            // Claim the slot for the first fetch so sentinel events that
            // race the initial load are no-ops.
            inner.gate.try_begin();
            self.publish(&inner);
            info!(sort = ?params.sort_criteria, "Feed reset, fetching first page");
            token
        };

        let result = self.fetcher.fetch_page(None, &params).await;

        let mut inner = self.lock();
        if inner.accumulator.token() != token {
            debug!("First-page fetch superseded by a later reset");
            return;
        }
        inner.gate.finish();
        match result {
            Ok(page) => {
                info!(
                    fetched = page.items.len(),
                    total = page.page_info.total_count,
                    next = ?page.page_info.next,
                    "Fetched first page"
                );
                inner.accumulator.apply_first_page(page, token);
                let settled = inner.accumulator.status() == FetchStatus::Settled;
                inner.gate.set_exhausted(settled);
            }
            Err(err) => {
                warn!(error = %err, "First-page fetch failed");
                inner.accumulator.mark_error(&err, token);
            }
        }
        self.publish(&inner);
    }

    /// The sentinel entered the viewport: request the next page unless one
    /// is already in flight or the feed is exhausted.
    pub async fn on_sentinel_visible(&self) {
        let (token, cursor, params) = {
            let mut inner = self.lock();
            let acc = &inner.accumulator;
            let current = FeedState::derive(
                acc.status(),
                acc.item_count(),
                acc.has_more(),
                acc.loaded(),
            );
            if !inner.trigger.on_enter(current) {
                return;
            }
            if !inner.gate.try_begin() {
                return;
            }
            let token = inner.accumulator.token();
            inner.accumulator.begin_next(token);
            let cursor = inner.accumulator.next_cursor();
            self.publish(&inner);
            (token, cursor, inner.params.clone())
        };

        debug!(next = ?cursor, "Fetching next page");
        let result = self.fetcher.fetch_page(cursor, &params).await;

        let mut inner = self.lock();
        if inner.accumulator.token() != token {
            debug!("Next-page fetch superseded by a later reset");
            return;
        }
        inner.gate.finish();
        match result {
            Ok(page) => {
                info!(
                    fetched = page.items.len(),
                    total = page.page_info.total_count,
                    next = ?page.page_info.next,
                    "Fetched next page"
                );
                inner.accumulator.apply_next_page(page, token);
                let settled = inner.accumulator.status() == FetchStatus::Settled;
                inner.gate.set_exhausted(settled);
            }
            Err(err) => {
                // Content stays on screen; the gate reopened above, so the
                // next visibility trigger simply retries.
                warn!(error = %err, "Next-page fetch failed");
                inner.accumulator.mark_error(&err, token);
            }
        }
        self.publish(&inner);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("feed state lock poisoned")
    }

    fn publish(&self, inner: &Inner) {
        self.snapshot_tx.send_replace(Self::snapshot_of(inner));
    }

    fn snapshot_of(inner: &Inner) -> FeedSnapshot {
        let acc = &inner.accumulator;
        FeedSnapshot {
            state: FeedState::derive(
                acc.status(),
                acc.item_count(),
                acc.has_more(),
                acc.loaded(),
            ),
            items: acc.items().to_vec(),
            has_more: acc.has_more(),
            total_count: acc.page_info().map(|info| info.total_count),
            notice: if acc.item_count() > 0 {
                acc.last_error().map(str::to_string)
            } else {
                None
            },
        }
    }
}

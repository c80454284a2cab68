// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use pagefeed::{
    Cursor, FeedError, FeedItem, FeedResult, FeedSnapshot, ItemKind, Page, PageFetcher, PageInfo,
    QueryParams,
};

/// One scripted fetcher response.
pub enum Step {
    Page(Page),
    /// Resolve with the page only after the paired `Notify` fires.
    Held(Page, Arc<Notify>),
    Fail(FeedError),
    /// Fail, but only after the paired `Notify` fires.
    HeldFail(FeedError, Arc<Notify>),
}

/// In-memory `PageFetcher` that replays a script and records every call,
/// including how many ran concurrently.
#[derive(Default)]
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<Option<Cursor>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_page(&self, ids: &[&str], next: Option<&str>, total_count: u64) {
        self.script
            .lock()
            .unwrap()
            .push_back(Step::Page(page(ids, next, total_count)));
    }

    /// Queue a page that blocks until the returned handle is notified.
    pub fn push_held_page(
        &self,
        ids: &[&str],
        next: Option<&str>,
        total_count: u64,
    ) -> Arc<Notify> {
        let release = Arc::new(Notify::new());
        self.script
            .lock()
            .unwrap()
            .push_back(Step::Held(page(ids, next, total_count), release.clone()));
        release
    }

    pub fn push_error(&self, err: FeedError) {
        self.script.lock().unwrap().push_back(Step::Fail(err));
    }

    /// Queue a failure that blocks until the returned handle is notified.
    pub fn push_held_error(&self, err: FeedError) -> Arc<Notify> {
        let release = Arc::new(Notify::new());
        self.script
            .lock()
            .unwrap()
            .push_back(Step::HeldFail(err, release.clone()));
        release
    }

    /// Cursors of every fetch issued so far, in call order.
    pub fn calls(&self) -> Vec<Option<Cursor>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(&self, cursor: Option<Cursor>, _params: &QueryParams) -> FeedResult<Page> {
        self.calls.lock().unwrap().push(cursor);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let step = self.script.lock().unwrap().pop_front();
        let result = match step {
            Some(Step::Page(page)) => Ok(page),
            Some(Step::Held(page, release)) => {
                release.notified().await;
                Ok(page)
            }
            Some(Step::Fail(err)) => Err(err),
            Some(Step::HeldFail(err, release)) => {
                release.notified().await;
                Err(err)
            }
            None => Err(FeedError::Transport("script exhausted".into())),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

pub fn page(ids: &[&str], next: Option<&str>, total_count: u64) -> Page {
    Page {
        items: ids
            .iter()
            .map(|id| FeedItem::new(*id, ItemKind::Post))
            .collect(),
        page_info: PageInfo {
            next: next.map(str::to_string),
            total_count,
        },
    }
}

pub fn item_ids(snapshot: &FeedSnapshot) -> Vec<String> {
    snapshot.items.iter().map(|item| item.id.clone()).collect()
}

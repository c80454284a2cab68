//! Page fetching seam and the wire-level data model.
//!
//! The aggregation engine only ever talks to the remote through the
//! [`PageFetcher`] trait: one round trip per call, cursor in, page out.
//! Serialization of calls is the engine's job, not the fetcher's; a fetcher
//! must merely be safe to call concurrently and idempotent per
//! `(cursor, params)` pair so a failed request can be re-issued.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FeedResult;

/// Opaque token identifying the position to resume pagination from.
pub type Cursor = String;

/// Discriminant for the feed item union.
///
/// The engine never branches on this (items are merged purely by `id`),
/// but consumers need it to pick a renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ItemKind {
    Post,
    Comment,
    Mirror,
}

/// One unit of feed content.
///
/// Identity is `id` alone; `payload` is an opaque blob the engine never
/// inspects. An item's positional origin is its index in the aggregate,
/// which is stable because the aggregate is append-only within an epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    #[serde(rename = "__typename")]
    pub kind: ItemKind,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, Value>,
}

impl FeedItem {
    pub fn new(id: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: id.into(),
            kind,
            payload: serde_json::Map::new(),
        }
    }
}

/// Pagination metadata returned with every page.
///
/// Once `next` is `None`, no further fetch is attempted regardless of what
/// `total_count` claims; the server may revise the count between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub next: Option<Cursor>,
    #[serde(rename = "totalCount")]
    pub total_count: u64,
}

/// Result of one fetch: an ordered list of items plus pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    pub items: Vec<FeedItem>,
    #[serde(rename = "pageInfo")]
    pub page_info: PageInfo,
}

/// Caller-defined query configuration, passed through to the fetcher.
///
/// The engine treats this as opaque: it clones it, hands it to
/// [`PageFetcher::fetch_page`], and compares nothing. Viewer identity rides
/// here explicitly (for reaction resolution on the remote) rather than in
/// any ambient store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    #[serde(rename = "sortCriteria")]
    pub sort_criteria: Option<String>,
    /// Profile id of the viewing user, if any.
    pub viewer: Option<String>,
    #[serde(rename = "noRandomize", default)]
    pub no_randomize: bool,
    /// Extra fetcher-specific knobs (filters etc.).
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, Value>,
}

impl QueryParams {
    pub fn sorted_by(criteria: impl Into<String>) -> Self {
        let criteria = criteria.into();
        Self {
            no_randomize: criteria == "LATEST",
            sort_criteria: Some(criteria),
            ..Self::default()
        }
    }
}

/// One paginated round trip to the remote.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a single page. `cursor == None` requests the first page.
    ///
    /// Fails with [`FeedError::Transport`](crate::error::FeedError) on
    /// network/protocol failure and
    /// [`FeedError::Query`](crate::error::FeedError) when the remote signals
    /// a semantic error. No side effects beyond the remote call itself.
    async fn fetch_page(&self, cursor: Option<Cursor>, params: &QueryParams) -> FeedResult<Page>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_decodes_from_wire_json() {
        let raw = serde_json::json!({
            "items": [
                {"id": "0x01-0x01", "__typename": "Post", "content": "hello"},
                {"id": "0x01-0x02", "__typename": "Mirror"}
            ],
            "pageInfo": {"next": "cur1", "totalCount": 10}
        });
        let page: Page = serde_json::from_value(raw).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].kind, ItemKind::Post);
        assert_eq!(page.items[0].payload.get("content").unwrap(), "hello");
        assert_eq!(page.page_info.next.as_deref(), Some("cur1"));
        assert_eq!(page.page_info.total_count, 10);
    }

    #[test]
    fn page_info_tolerates_null_cursor() {
        let raw = serde_json::json!({"next": null, "totalCount": 0});
        let info: PageInfo = serde_json::from_value(raw).unwrap();
        assert!(info.next.is_none());
    }

    #[test]
    fn latest_sort_disables_randomization() {
        assert!(QueryParams::sorted_by("LATEST").no_randomize);
        assert!(!QueryParams::sorted_by("TOP_COMMENTED").no_randomize);
    }
}

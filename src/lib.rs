// src/lib.rs

pub mod config;
pub mod error;
pub mod feed;
pub mod fetcher;

pub use config::FeedConfig;
pub use error::{FeedError, FeedResult};
pub use feed::{FeedAggregator, FeedSnapshot, FeedState};
pub use fetcher::{Cursor, FeedItem, ItemKind, Page, PageFetcher, PageInfo, QueryParams};

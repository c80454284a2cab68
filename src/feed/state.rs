//! Discrete UI state derivation.
//!
//! Turns accumulator status + item count into exactly one presentation
//! state, first match wins. The presentation layer gets a single enum to
//! branch on instead of re-deriving overlapping boolean conditions.

use serde::{Deserialize, Serialize};

use super::accumulator::FetchStatus;

/// Exactly one of these is active for any reachable aggregate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FeedState {
    /// First fetch in flight (or about to start), nothing accumulated yet.
    Loading,
    /// Last operation failed with nothing to show. Failures with content
    /// already present stay in `Content` and surface as a notice instead.
    Error,
    /// First fetch completed and returned zero items.
    Empty,
    /// One or more items present; `has_more` controls sentinel rendering.
    Content { has_more: bool },
    /// Items present and nothing left to fetch.
    ContentExhausted,
}

impl FeedState {
    /// Derive the state from the accumulator's observable facts.
    ///
    /// `loaded` is true once any page has been applied in the current
    /// epoch; it separates "still waiting for the first page" from
    /// "first page arrived empty".
    ///
    /// Precedence: Loading > Error > Empty > Content/ContentExhausted.
    pub fn derive(status: FetchStatus, item_count: usize, has_more: bool, loaded: bool) -> Self {
        if !loaded && matches!(status, FetchStatus::Idle | FetchStatus::FetchingFirst) {
            return Self::Loading;
        }
        if status == FetchStatus::Error && item_count == 0 {
            return Self::Error;
        }
        if item_count == 0 {
            return Self::Empty;
        }
        if has_more {
            return Self::Content { has_more: true };
        }
        Self::ContentExhausted
    }

    pub fn has_more(self) -> bool {
        matches!(self, Self::Content { has_more: true })
    }
}

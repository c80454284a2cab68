// src/error.rs
// Error taxonomy for the aggregation core

/// Failures surfaced by a [`PageFetcher`](crate::fetcher::PageFetcher) round trip.
///
/// Both variants are treated identically by the aggregation core: they reach
/// the accumulator's `mark_error`, which never clears already-accumulated
/// items. Retry policy is external: the gate reopens on failure so the next
/// visibility trigger may simply try again.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Network-level failure: timeout, connection refused, malformed response.
    #[error("transport error: {0}")]
    Transport(String),

    /// Well-formed response signaling a semantic failure from the remote,
    /// e.g. an invalid cursor or an authorization denial.
    #[error("query error: {0}")]
    Query(String),
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        FeedError::Transport(err.to_string())
    }
}

pub type FeedResult<T> = Result<T, FeedError>;

//! Reqwest-backed page fetcher for JSON feed endpoints.
//!
//! Posts `{request, reactionRequest}` and decodes `{items, pageInfo}`.
//! HTTP and decode failures map to `FeedError::Transport`; a well-formed
//! error envelope from the remote maps to `FeedError::Query`.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::FeedConfig;
use crate::error::{FeedError, FeedResult};
use crate::fetcher::{Cursor, Page, PageFetcher, QueryParams};

pub struct HttpPageFetcher {
    client: HttpClient,
    endpoint: String,
    page_size: u32,
    timeout: Duration,
}

impl HttpPageFetcher {
    pub fn new(endpoint: impl Into<String>, config: &FeedConfig) -> Self {
        Self {
            client: HttpClient::new(),
            endpoint: endpoint.into(),
            page_size: config.page_size,
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, cursor: Option<Cursor>, params: &QueryParams) -> FeedResult<Page> {
        let request = FeedRequest {
            request: FeedRequestInner {
                sort_criteria: params.sort_criteria.clone(),
                cursor,
                limit: self.page_size,
                no_randomize: params.no_randomize,
                extra: params.extra.clone(),
            },
            reaction_request: params
                .viewer
                .as_ref()
                .map(|id| ReactionRequest { profile_id: id.clone() }),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            // 4xx means the remote understood us and said no; that is a
            // semantic failure, not a transport one.
            if status.is_client_error() {
                return Err(FeedError::Query(format!("{} - {}", status, body)));
            }
            return Err(FeedError::Transport(format!("{} - {}", status, body)));
        }

        let envelope: FeedResponse = response.json().await?;
        if let Some(error) = envelope.error {
            return Err(FeedError::Query(error.message));
        }
        envelope
            .page
            .ok_or_else(|| FeedError::Transport("response carried neither page nor error".into()))
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct FeedRequest {
    request: FeedRequestInner,
    #[serde(rename = "reactionRequest", skip_serializing_if = "Option::is_none")]
    reaction_request: Option<ReactionRequest>,
}

#[derive(Serialize)]
struct FeedRequestInner {
    #[serde(rename = "sortCriteria", skip_serializing_if = "Option::is_none")]
    sort_criteria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<Cursor>,
    limit: u32,
    #[serde(rename = "noRandomize")]
    no_randomize: bool,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize)]
struct ReactionRequest {
    #[serde(rename = "profileId")]
    profile_id: String,
}

#[derive(Deserialize)]
struct FeedResponse {
    #[serde(flatten)]
    page: Option<Page>,
    error: Option<RemoteError>,
}

#[derive(Deserialize)]
struct RemoteError {
    message: String,
}

//! Live poll results.
//!
//! Poll blocks only carry questions and answers; vote counts live behind a
//! separate results endpoint keyed by blog, post id and poll client id.
//! Fetching is best-effort: one attempt, and every failure degrades to an
//! empty tally so the poll renders with zero votes.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::ApiMeta;

/// Votes per answer client id.
pub type VoteTally = HashMap<String, u64>;

/// Sum of all votes in a tally, saturating at `u64::MAX`.
#[must_use]
pub fn total_votes(tally: &VoteTally) -> u64 {
    tally.values().fold(0u64, |acc, v| acc.saturating_add(*v))
}

/// Tallies for the polls of one chain link, keyed by poll client id.
#[derive(Debug, Clone, Default)]
pub struct PollResults {
    tallies: HashMap<String, VoteTally>,
}

impl PollResults {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, poll_client_id: impl Into<String>, tally: VoteTally) {
        self.tallies.insert(poll_client_id.into(), tally);
    }

    #[must_use]
    pub fn tally(&self, poll_client_id: Option<&str>) -> Option<&VoteTally> {
        poll_client_id.and_then(|id| self.tallies.get(id))
    }
}

/// Source of live poll results.
#[async_trait]
pub trait PollSource: Send + Sync {
    /// Fetch the vote tally of one poll.
    ///
    /// Never fails: missing identifiers, missing credentials and any
    /// transport or payload problem yield an empty tally.
    async fn fetch_results(&self, blog_name: &str, post_id: &str, poll_client_id: &str)
        -> VoteTally;
}

#[derive(Debug, Error)]
enum PollFetchError {
    #[error("missing blog name, post id or poll client id")]
    MissingIdentifier,
    #[error("no API key configured")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),
    #[error("API status {status}: {msg}")]
    ApiStatus { status: i64, msg: String },
    #[error("malformed response: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct PollResultsResponse {
    meta: ApiMeta,
    #[serde(default)]
    response: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PollResultsBody {
    #[serde(default)]
    results: VoteTally,
}

/// HTTP client for the poll results endpoint.
#[derive(Debug, Clone)]
pub struct PollClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
}

impl PollClient {
    /// Create a poll client.
    ///
    /// `client` should carry the request timeout; `api_base` is the API root,
    /// e.g. `https://www.tumblr.com/api/v2`.
    #[must_use]
    pub fn new(client: Client, api_base: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            api_key,
        }
    }

    fn results_url(&self, blog_name: &str, post_id: &str, poll_client_id: &str) -> String {
        format!(
            "{}/polls/{}/{}/{}/results",
            self.api_base.trim_end_matches('/'),
            urlencoding::encode(blog_name),
            urlencoding::encode(post_id),
            urlencoding::encode(poll_client_id)
        )
    }

    async fn try_fetch(
        &self,
        blog_name: &str,
        post_id: &str,
        poll_client_id: &str,
    ) -> Result<VoteTally, PollFetchError> {
        if blog_name.is_empty() || post_id.is_empty() || poll_client_id.is_empty() {
            return Err(PollFetchError::MissingIdentifier);
        }
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(PollFetchError::MissingApiKey)?;

        let response = self
            .client
            .get(self.results_url(blog_name, post_id, poll_client_id))
            .query(&[("api_key", api_key)])
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(PollFetchError::Status(status));
        }

        let body = response.text().await?;
        let parsed: PollResultsResponse = serde_json::from_str(&body)?;
        if parsed.meta.status != 200 {
            return Err(PollFetchError::ApiStatus {
                status: parsed.meta.status,
                msg: parsed.meta.msg.unwrap_or_default(),
            });
        }

        if parsed.response.is_null() {
            return Ok(VoteTally::new());
        }
        let body: PollResultsBody = serde_json::from_value(parsed.response)?;
        Ok(body.results)
    }
}

#[async_trait]
impl PollSource for PollClient {
    async fn fetch_results(
        &self,
        blog_name: &str,
        post_id: &str,
        poll_client_id: &str,
    ) -> VoteTally {
        match self.try_fetch(blog_name, post_id, poll_client_id).await {
            Ok(tally) => {
                debug!(
                    blog = %blog_name,
                    post_id = %post_id,
                    poll = %poll_client_id,
                    total_votes = total_votes(&tally),
                    "Fetched poll results"
                );
                tally
            }
            Err(e @ (PollFetchError::MissingIdentifier | PollFetchError::MissingApiKey)) => {
                debug!(
                    blog = %blog_name,
                    post_id = %post_id,
                    poll = %poll_client_id,
                    "Skipping live poll results: {e}"
                );
                VoteTally::new()
            }
            Err(e) => {
                warn!(
                    blog = %blog_name,
                    post_id = %post_id,
                    poll = %poll_client_id,
                    "Poll results unavailable, showing zero votes: {e}"
                );
                VoteTally::new()
            }
        }
    }
}

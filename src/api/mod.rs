//! Client for the blog posts listing endpoint.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::npf::Post;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),
    #[error("API status {status}: {msg}")]
    Meta { status: i64, msg: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The `meta` envelope every API response carries.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMeta {
    pub status: i64,
    #[serde(default)]
    pub msg: Option<String>,
}

/// Error responses carry `"response": []`, so the body is only decoded once
/// `meta` reports success.
#[derive(Debug, Deserialize)]
struct PostsEnvelope {
    meta: ApiMeta,
    #[serde(default)]
    response: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PostsBody {
    #[serde(default)]
    posts: Vec<serde_json::Value>,
}

/// Which posts to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostQuery {
    /// Posts carrying the given tag.
    Tag(String),
    /// The most recent posts.
    Latest { limit: u32 },
}

/// Blog posts listing client.
#[derive(Debug, Clone)]
pub struct TumblrClient {
    client: Client,
    api_base: String,
    api_key: String,
}

impl TumblrClient {
    /// `api_base` is the API root, e.g. `https://api.tumblr.com/v2`.
    #[must_use]
    pub fn new(client: Client, api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            api_key: api_key.into(),
        }
    }

    fn posts_url(&self, blog: &str) -> String {
        format!(
            "{}/blog/{}/posts",
            self.api_base.trim_end_matches('/'),
            urlencoding::encode(blog)
        )
    }

    /// Fetch one page of posts in NPF with reblog info.
    ///
    /// Posts that fail to decode are skipped with a warning rather than
    /// failing the whole page.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success HTTP status, a
    /// non-200 API status, or an undecodable envelope.
    pub async fn fetch_posts(&self, blog: &str, query: &PostQuery) -> Result<Vec<Post>, ApiError> {
        let mut params: Vec<(&str, String)> = vec![
            ("api_key", self.api_key.clone()),
            ("reblog_info", "true".to_string()),
            ("npf", "true".to_string()),
        ];
        match query {
            PostQuery::Tag(tag) => params.push(("tag", tag.clone())),
            PostQuery::Latest { limit } => params.push(("limit", limit.to_string())),
        }

        debug!(blog = %blog, query = ?query, "Fetching posts");

        let response = self
            .client
            .get(self.posts_url(blog))
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        let body = response.text().await?;
        let envelope: PostsEnvelope = serde_json::from_str(&body)?;
        if envelope.meta.status != 200 {
            return Err(ApiError::Meta {
                status: envelope.meta.status,
                msg: envelope.meta.msg.unwrap_or_default(),
            });
        }

        let raw_posts = if envelope.response.is_null() {
            Vec::new()
        } else {
            serde_json::from_value::<PostsBody>(envelope.response)?.posts
        };
        let mut posts = Vec::with_capacity(raw_posts.len());
        for raw in raw_posts {
            match serde_json::from_value::<Post>(raw) {
                Ok(post) => posts.push(post),
                Err(e) => warn!(blog = %blog, "Skipping undecodable post: {e}"),
            }
        }
        Ok(posts)
    }
}

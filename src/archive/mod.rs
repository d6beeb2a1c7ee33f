//! One archiving pass over a blog.

pub mod store;

use std::collections::HashSet;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::api::{PostQuery, TumblrClient};
use crate::assemble::PostAssembler;
use crate::config::Config;
use crate::constants::USER_AGENT;
use crate::npf::Post;
use crate::polls::{PollClient, PollSource};

pub use store::ArchiveStore;

/// Counts from one [`Archiver::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Posts returned by the listing endpoint, across all queries.
    pub fetched: usize,
    /// Posts written this run.
    pub archived: usize,
    /// Posts already archived or not eligible.
    pub skipped: usize,
    /// Listing requests or writes that failed.
    pub failed: usize,
}

/// Fetches a blog's posts and writes every new one to the archive.
pub struct Archiver<P = PollClient> {
    config: Config,
    client: TumblrClient,
    assembler: PostAssembler<P>,
    store: ArchiveStore,
}

impl Archiver<PollClient> {
    /// Build an archiver with live HTTP clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        let polls = PollClient::new(
            http.clone(),
            config.poll_api_base.clone(),
            Some(config.api_key.clone()),
        );
        Ok(Self::with_poll_source(config, http, polls))
    }
}

impl<P: PollSource> Archiver<P> {
    /// Build an archiver around an existing HTTP client and poll source.
    #[must_use]
    pub fn with_poll_source(config: Config, http: reqwest::Client, polls: P) -> Self {
        let client = TumblrClient::new(http, config.api_base.clone(), config.api_key.clone());
        let store = ArchiveStore::new(&config.output_dir, &config.blog_identifier);
        Self {
            config,
            client,
            assembler: PostAssembler::new(polls),
            store,
        }
    }

    #[must_use]
    pub fn store(&self) -> &ArchiveStore {
        &self.store
    }

    /// Run one pass.
    ///
    /// With tags configured, every new post listed under each tag is archived.
    /// Without tags, the latest posts are listed and only those carrying at
    /// least one tag are archived. A failing tag query or post write is logged
    /// and counted; the pass continues.
    ///
    /// # Errors
    ///
    /// Returns an error only if the existing archive cannot be scanned.
    pub async fn run(&self) -> Result<ArchiveSummary> {
        let blog = self.config.blog_identifier.as_str();
        let mut seen = self
            .store
            .archived_ids()
            .await
            .context("Failed to scan existing archive")?;
        let mut summary = ArchiveSummary::default();

        info!(
            blog = %blog,
            already_archived = seen.len(),
            tags = ?self.config.tags_to_archive,
            "Starting archive run"
        );

        if self.config.tags_to_archive.is_empty() {
            let query = PostQuery::Latest {
                limit: self.config.latest_posts_limit,
            };
            match self.client.fetch_posts(blog, &query).await {
                Ok(posts) => {
                    let fetched = posts.len();
                    summary.fetched += fetched;
                    let tagged: Vec<Post> = posts
                        .into_iter()
                        .filter(|post| {
                            let keep = !post.tags.is_empty();
                            if !keep {
                                debug!(post_id = %post.id, "Skipping untagged post");
                            }
                            keep
                        })
                        .collect();
                    summary.skipped += fetched - tagged.len();
                    self.archive_batch(&tagged, &mut seen, &mut summary).await;
                }
                Err(e) => {
                    error!(blog = %blog, "Failed to fetch latest posts: {e}");
                    summary.failed += 1;
                }
            }
        } else {
            for tag in &self.config.tags_to_archive {
                let query = PostQuery::Tag(tag.clone());
                match self.client.fetch_posts(blog, &query).await {
                    Ok(posts) => {
                        debug!(blog = %blog, tag = %tag, count = posts.len(), "Fetched tagged posts");
                        summary.fetched += posts.len();
                        self.archive_batch(&posts, &mut seen, &mut summary).await;
                    }
                    Err(e) => {
                        warn!(blog = %blog, tag = %tag, "Failed to fetch posts for tag: {e}");
                        summary.failed += 1;
                    }
                }
            }
        }

        info!(
            blog = %blog,
            fetched = summary.fetched,
            archived = summary.archived,
            skipped = summary.skipped,
            failed = summary.failed,
            "Archive run complete"
        );
        Ok(summary)
    }

    async fn archive_batch(
        &self,
        posts: &[Post],
        seen: &mut HashSet<String>,
        summary: &mut ArchiveSummary,
    ) {
        for post in posts {
            if seen.contains(&post.id) {
                debug!(post_id = %post.id, "Already archived");
                summary.skipped += 1;
                continue;
            }

            match self.archive_post(post).await {
                Ok(()) => {
                    seen.insert(post.id.clone());
                    summary.archived += 1;
                }
                Err(e) => {
                    error!(post_id = %post.id, "Failed to archive post: {e:#}");
                    summary.failed += 1;
                }
            }
        }
    }

    async fn archive_post(&self, post: &Post) -> Result<()> {
        let archived = self.assembler.assemble(post, Utc::now()).await;
        let path = self
            .store
            .write_post(&archived.post_id, &archived.render_page())
            .await?;
        info!(post_id = %archived.post_id, path = %path.display(), "Archived post");
        Ok(())
    }
}

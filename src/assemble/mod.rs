//! Turns a post and its reblog trail into an archived HTML document.
//!
//! The chain is walked once, oldest link first. The root link gets the op
//! header and either its content or an ask/answer pair; every later link
//! becomes a reblog block. Poll results are fetched per link before rendering,
//! concurrently, and merged back by poll id, so fragment order never depends
//! on fetch completion order.

pub mod dates;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use tracing::{debug, info};

use crate::components::{
    answer_block, ask_block, op_content, op_header, reblog_block, PageLayout, PostMetadata,
};
use crate::constants::ANONYMOUS_ASKER;
use crate::npf::{ask_layout, ChainLink, ContentBlock, Post};
use crate::polls::{PollResults, PollSource};
use crate::render::text::display_text;
use crate::render::{compose, Rendered};

use self::dates::{display_date_string, display_timestamp, format_display};

/// A rendered post, ready to be written out.
#[derive(Debug, Clone)]
pub struct ArchivedPost {
    pub post_id: String,
    pub blog_name: String,
    pub title: String,
    pub body_html: String,
    pub metadata_html: String,
    /// Media URLs referenced by the body, first occurrence first.
    pub media: Vec<String>,
}

impl ArchivedPost {
    /// The complete HTML document.
    #[must_use]
    pub fn render_page(&self) -> String {
        PageLayout::new(&self.title)
            .with_metadata(&self.metadata_html)
            .render(&self.body_html)
            .into_string()
    }
}

/// Renders posts, fetching live poll results through `P`.
pub struct PostAssembler<P> {
    polls: P,
}

impl<P: PollSource> PostAssembler<P> {
    #[must_use]
    pub fn new(polls: P) -> Self {
        Self { polls }
    }

    /// Render `post` into an [`ArchivedPost`] stamped with `archived_at`.
    pub async fn assemble(&self, post: &Post, archived_at: DateTime<Utc>) -> ArchivedPost {
        let body = self.render_body(post).await;

        let blog_name = if post.blog_name.is_empty() {
            "N/A"
        } else {
            post.blog_name.as_str()
        };
        let metadata_html = PostMetadata {
            blog_name,
            post_id: &post.id,
            archived_at: &format_display(&archived_at),
            tags: &post.tags,
        }
        .render()
        .into_string();

        info!(
            blog = %blog_name,
            post_id = %post.id,
            media = body.media.len(),
            "Rendered post"
        );

        ArchivedPost {
            post_id: post.id.clone(),
            blog_name: blog_name.to_string(),
            title: format!("{blog_name} - post {}", post.id),
            body_html: body.html.trim().to_string(),
            metadata_html,
            media: body.media,
        }
    }

    /// Render the post body: every chain link's fragment, in chain order.
    pub async fn render_body(&self, post: &Post) -> Rendered {
        let has_trail = !post.trail.is_empty();
        let is_answer = post.is_answer();
        let chain = post.chain();
        let last = chain.len().saturating_sub(1);

        let mut html = String::new();
        let mut media = Vec::new();

        for (i, link) in chain.iter().enumerate() {
            let is_root = i == 0;
            let Some(author) = link.author else {
                debug!(post_id = %post.id, link = i, "Skipping chain link without author");
                continue;
            };
            if !is_root && link.content.is_empty() {
                continue;
            }

            let link_post_id = link.post_id.unwrap_or_else(|| {
                debug!(
                    post_id = %post.id,
                    link = i,
                    "No post id for chain link, using the archived post's id for polls"
                );
                post.id.as_str()
            });
            let polls = self.fetch_polls(author, link_post_id, link.content).await;

            if is_root {
                html.push_str(
                    &op_header(author, &display_timestamp(post.root_timestamp())).into_string(),
                );
                let fragment = if is_answer {
                    render_answer(post, link, author, has_trail, &polls)
                } else {
                    let rendered = compose(link.content, link.layout, None, &polls);
                    Rendered {
                        html: op_content(&rendered.html).into_string(),
                        media: rendered.media,
                    }
                };
                html.push_str(&fragment.html);
                media.extend(fragment.media);
            } else {
                let rendered = compose(link.content, link.layout, None, &polls);
                // A final reblog that only added tags gets no block.
                if i == last && rendered.html.trim().is_empty() {
                    continue;
                }
                let date = display_date_string(link.date);
                html.push_str(&reblog_block(author, &date, &rendered.html).into_string());
                media.extend(rendered.media);
            }
        }

        let mut seen = HashSet::new();
        media.retain(|url: &String| seen.insert(url.clone()));
        Rendered { html, media }
    }

    /// Fetch results for every poll in `content`, concurrently.
    async fn fetch_polls(
        &self,
        blog_name: &str,
        post_id: &str,
        content: &[ContentBlock],
    ) -> PollResults {
        let mut poll_ids: Vec<&str> = Vec::new();
        for block in content {
            if let ContentBlock::Poll(poll) = block {
                match poll.client_id.as_deref().filter(|id| !id.is_empty()) {
                    Some(id) if !poll_ids.contains(&id) => poll_ids.push(id),
                    Some(_) => {}
                    None => debug!(
                        blog = %blog_name,
                        post_id = %post_id,
                        "Poll block without client id, showing zero votes"
                    ),
                }
            }
        }

        let tallies = join_all(
            poll_ids
                .iter()
                .map(|id| self.polls.fetch_results(blog_name, post_id, id)),
        )
        .await;

        let mut results = PollResults::new();
        for (id, tally) in poll_ids.into_iter().zip(tallies) {
            results.insert(id, tally);
        }
        results
    }
}

/// Ask and answer fragments for the root link of an answer post.
fn render_answer(
    post: &Post,
    link: &ChainLink<'_>,
    author: &str,
    has_trail: bool,
    polls: &PollResults,
) -> Rendered {
    if let Some(ask) = ask_layout(link.layout) {
        let ask_indices: HashSet<usize> = ask.blocks.iter().copied().collect();
        let answer_indices: Vec<usize> = (0..link.content.len())
            .filter(|i| !ask_indices.contains(i))
            .collect();

        let question = compose(link.content, link.layout, Some(ask.blocks.as_slice()), polls);
        let answer = compose(link.content, link.layout, Some(answer_indices.as_slice()), polls);

        let mut html = ask_block(ask.asker(), &question.html).into_string();
        html.push_str(&answer_block(author, &answer.html, has_trail).into_string());

        let mut media = question.media;
        media.extend(answer.media);
        return Rendered { html, media };
    }

    // Legacy ask: the question lives in plain post fields.
    let answer = compose(link.content, link.layout, None, polls);
    let question = format!(
        "<blockquote>{}</blockquote>",
        display_text(post.question.as_deref().unwrap_or_default())
    );
    let asker = post
        .asking_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(ANONYMOUS_ASKER);

    let mut html = ask_block(asker, &question).into_string();
    html.push_str(&answer_block(author, &answer.html, has_trail).into_string());
    Rendered {
        html,
        media: answer.media,
    }
}

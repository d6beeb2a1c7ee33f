//! Archive metadata shown in the footer of every archived post.

use maud::{html, Markup};

/// Blog, post id, archive time and tags of an archived post.
#[derive(Debug, Clone)]
pub struct PostMetadata<'a> {
    pub blog_name: &'a str,
    pub post_id: &'a str,
    pub archived_at: &'a str,
    pub tags: &'a [String],
}

impl PostMetadata<'_> {
    #[must_use]
    pub fn render(&self) -> Markup {
        html! {
            p { strong { (self.blog_name) } " | post id " strong { (self.post_id) } }
            p { strong { "archived:" } " " (self.archived_at) }
            @if !self.tags.is_empty() {
                div class="tags-container" {
                    @for tag in self.tags {
                        a href="#" class="tag" { "#" (tag) }
                    }
                }
            }
        }
    }
}

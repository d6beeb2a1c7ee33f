//! Typed model of the Tumblr API's structured post format (NPF).
//!
//! Everything here is plain response data: deserialized once at the API
//! boundary and read-only afterwards. Content blocks are addressed by their
//! position in a post's flat content list; layout blocks and ask/answer
//! partitions refer to those positions, so block indices are never renumbered.

use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::constants::{ANONYMOUS_ASKER, DEFAULT_ALT_TEXT};

/// One typed content block.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Text(TextBlock),
    Image(ImageBlock),
    Poll(PollBlock),
    /// Block types we don't render (audio, video, link cards, ...).
    #[serde(other)]
    Unknown,
}

impl ContentBlock {
    /// List kind if this block is a list item.
    #[must_use]
    pub fn list_kind(&self) -> Option<ListKind> {
        match self {
            Self::Text(text) => text.subtype.and_then(TextSubtype::list_kind),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub subtype: Option<TextSubtype>,
    #[serde(default)]
    pub formatting: Vec<FormatSpan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextSubtype {
    Heading1,
    Heading2,
    Quote,
    Indented,
    Chat,
    Quirky,
    OrderedListItem,
    UnorderedListItem,
    #[serde(other)]
    Unknown,
}

impl TextSubtype {
    #[must_use]
    pub fn list_kind(self) -> Option<ListKind> {
        match self {
            Self::OrderedListItem => Some(ListKind::Ordered),
            Self::UnorderedListItem => Some(ListKind::Unordered),
            _ => None,
        }
    }
}

/// The kind of list element a run of list-item blocks is gathered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Ordered => "ol",
            Self::Unordered => "ul",
        }
    }
}

/// An inline formatting range over a text block.
///
/// Offsets count characters, not bytes. Spans may overlap arbitrarily.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FormatSpan {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: FormatKind,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatKind {
    Bold,
    Italic,
    Small,
    Strikethrough,
    Link,
    /// Colors, mentions and other kinds we render as plain text.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageBlock {
    #[serde(default)]
    pub media: Vec<MediaObject>,
    #[serde(default)]
    pub alt_text: Option<String>,
}

impl ImageBlock {
    /// URL of the primary media rendition.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.media
            .first()
            .map(|m| m.url.as_str())
            .filter(|u| !u.is_empty())
    }

    #[must_use]
    pub fn alt_text(&self) -> &str {
        self.alt_text.as_deref().unwrap_or(DEFAULT_ALT_TEXT)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaObject {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollBlock {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub answers: Vec<PollAnswer>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollAnswer {
    #[serde(default)]
    pub answer_text: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
}

/// One entry of a post's `layout` list.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayoutBlock {
    Rows(RowLayout),
    Ask(AskLayout),
    #[serde(other)]
    Unknown,
}

/// Groups block indices into visual rows and marks the "read more" point.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RowLayout {
    #[serde(default)]
    pub display: Vec<Row>,
    /// Rows whose smallest block index is greater than this are folded.
    #[serde(default)]
    pub truncate_after: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub blocks: Vec<usize>,
}

/// Marks the content blocks that make up an ask.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskLayout {
    #[serde(default)]
    pub blocks: Vec<usize>,
    #[serde(default)]
    pub attribution: Option<Attribution>,
}

impl AskLayout {
    /// Name of the asking blog, or "Anonymous".
    #[must_use]
    pub fn asker(&self) -> &str {
        match &self.attribution {
            Some(Attribution::Blog { blog }) => blog
                .name
                .as_deref()
                .filter(|n| !n.is_empty())
                .unwrap_or(ANONYMOUS_ASKER),
            _ => ANONYMOUS_ASKER,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Attribution {
    Blog { blog: BlogRef },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogRef {
    #[serde(default)]
    pub name: Option<String>,
}

/// The `rows` layout block, if present.
#[must_use]
pub fn row_layout(layout: &[LayoutBlock]) -> Option<&RowLayout> {
    layout.iter().find_map(|block| match block {
        LayoutBlock::Rows(rows) => Some(rows),
        _ => None,
    })
}

/// The `ask` layout block, if present.
#[must_use]
pub fn ask_layout(layout: &[LayoutBlock]) -> Option<&AskLayout> {
    layout.iter().find_map(|block| match block {
        LayoutBlock::Ask(ask) => Some(ask),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Text,
    Photo,
    Quote,
    Link,
    Chat,
    Audio,
    Video,
    Answer,
    Blocks,
    #[serde(other)]
    Unknown,
}

/// A post as returned by the blog posts listing endpoint (`npf=true`).
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub blog_name: String,
    #[serde(default, rename = "type")]
    pub post_type: Option<PostType>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub reblogged_root_timestamp: Option<i64>,
    #[serde(default)]
    pub date: Option<String>,
    /// Legacy ask text.
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub asking_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_blocks")]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub layout: Vec<LayoutBlock>,
    /// Reblog history, oldest first.
    #[serde(default)]
    pub trail: Vec<TrailLink>,
}

/// One entry of a reblog trail.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrailLink {
    #[serde(default)]
    pub blog: Option<BlogRef>,
    #[serde(default)]
    pub blog_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_blocks")]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub layout: Vec<LayoutBlock>,
    #[serde(default)]
    pub post: Option<TrailPost>,
}

impl TrailLink {
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.blog_name
            .as_deref()
            .or_else(|| self.blog.as_ref().and_then(|b| b.name.as_deref()))
            .filter(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrailPost {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// One link of a post's reblog chain, borrowed from either a trail entry or
/// the post itself.
#[derive(Debug, Clone, Copy)]
pub struct ChainLink<'a> {
    pub author: Option<&'a str>,
    pub content: &'a [ContentBlock],
    pub layout: &'a [LayoutBlock],
    pub post_id: Option<&'a str>,
    pub date: Option<&'a str>,
}

impl Post {
    /// The full reblog chain: trail links oldest first, then the post itself.
    #[must_use]
    pub fn chain(&self) -> Vec<ChainLink<'_>> {
        let mut chain: Vec<ChainLink<'_>> = self
            .trail
            .iter()
            .map(|link| ChainLink {
                author: link.author(),
                content: &link.content,
                layout: &link.layout,
                post_id: link
                    .post
                    .as_ref()
                    .and_then(|p| p.id.as_deref())
                    .filter(|id| !id.is_empty()),
                date: link.post.as_ref().and_then(|p| p.date.as_deref()),
            })
            .collect();
        chain.push(ChainLink {
            author: Some(self.blog_name.as_str()).filter(|n| !n.is_empty()),
            content: &self.content,
            layout: &self.layout,
            post_id: Some(self.id.as_str()),
            date: self.date.as_deref(),
        });
        chain
    }

    /// Whether the post is an ask/answer pair.
    ///
    /// The ask layout block is looked up on the chain root: the oldest trail
    /// entry for reblogs, the post itself otherwise.
    #[must_use]
    pub fn is_answer(&self) -> bool {
        let has_question = self.question.as_deref().is_some_and(|q| !q.is_empty());
        if self.post_type == Some(PostType::Answer) || has_question {
            return true;
        }
        let root_layout = self.trail.first().map_or(&self.layout, |t| &t.layout);
        ask_layout(root_layout).is_some()
    }

    /// Unix timestamp of the original post.
    #[must_use]
    pub fn root_timestamp(&self) -> Option<i64> {
        self.reblogged_root_timestamp.or(self.timestamp)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(u64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    StringOrNumber::deserialize(deserializer).map(String::from)
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(String::from))
}

/// Decode a content list block by block. A block that fails to decode
/// becomes [`ContentBlock::Unknown`] in place, so later indices stay valid.
fn lenient_blocks<'de, D>(deserializer: D) -> Result<Vec<ContentBlock>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            ContentBlock::deserialize(value).unwrap_or_else(|e| {
                warn!(index, "Skipping unreadable content block: {e}");
                ContentBlock::Unknown
            })
        })
        .collect())
}

//! Renders a single content block to an HTML fragment.
//!
//! Consecutive list-item blocks share one `<ul>`/`<ol>`, so rendering threads
//! the currently open list through each call: the caller passes the list kind
//! returned by the previous call and gets the updated one back.

use super::spans::format_spans;
use super::text::{display_text, escape_attr, group_thousands};
use crate::npf::{ContentBlock, ImageBlock, ListKind, PollBlock, TextBlock, TextSubtype};
use crate::polls::{total_votes, PollResults, VoteTally};

/// HTML plus the media URLs it references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    pub media: Vec<String>,
}

/// Render one block.
///
/// `open_list` is the list element left open by the previous block. A list is
/// closed before any block that is not a list item, and when the list kind
/// changes. Returns the fragment and the list left open after this block.
/// Unknown block types render nothing.
#[must_use]
pub fn render_block(
    block: &ContentBlock,
    open_list: Option<ListKind>,
    polls: &PollResults,
) -> (Rendered, Option<ListKind>) {
    let mut out = Rendered::default();
    let mut open_list = open_list;

    if let Some(kind) = open_list {
        if block.list_kind().is_none() {
            close_list(&mut out.html, kind);
            open_list = None;
        }
    }

    match block {
        ContentBlock::Text(text) => {
            open_list = render_text(&mut out.html, text, open_list);
        }
        ContentBlock::Image(image) => render_image(&mut out, image),
        ContentBlock::Poll(poll) => {
            let empty = VoteTally::new();
            let tally = polls.tally(poll.client_id.as_deref()).unwrap_or(&empty);
            render_poll(&mut out.html, poll, tally);
        }
        ContentBlock::Unknown => {}
    }

    (out, open_list)
}

/// Closing tag for an open list, with its trailing newline.
#[must_use]
pub fn list_close_tag(kind: ListKind) -> String {
    format!("</{}>\n", kind.tag())
}

fn close_list(html: &mut String, kind: ListKind) {
    html.push_str(&list_close_tag(kind));
}

fn render_text(html: &mut String, block: &TextBlock, open_list: Option<ListKind>) -> Option<ListKind> {
    let text = format_spans(&block.text, &block.formatting);

    if let Some(kind) = block.subtype.and_then(TextSubtype::list_kind) {
        if open_list != Some(kind) {
            if let Some(previous) = open_list {
                close_list(html, previous);
            }
            html.push_str(&format!("<{}>\n", kind.tag()));
        }
        html.push_str(&format!("<li>{text}</li>\n"));
        return Some(kind);
    }

    let (tag, class) = match block.subtype {
        Some(TextSubtype::Heading1) => ("h1", None),
        Some(TextSubtype::Heading2) => ("h2", None),
        Some(TextSubtype::Quote | TextSubtype::Indented) => ("blockquote", None),
        Some(TextSubtype::Chat) => ("p", Some("chat-style")),
        Some(TextSubtype::Quirky) => ("p", Some("quirky-style")),
        Some(
            TextSubtype::OrderedListItem | TextSubtype::UnorderedListItem | TextSubtype::Unknown,
        )
        | None => ("p", None),
    };

    match class {
        Some(class) => html.push_str(&format!(r#"<{tag} class="{class}">{text}</{tag}>"#)),
        None => html.push_str(&format!("<{tag}>{text}</{tag}>")),
    }
    html.push('\n');
    open_list
}

fn render_image(out: &mut Rendered, image: &ImageBlock) {
    let Some(url) = image.url() else {
        return;
    };
    out.media.push(url.to_string());
    out.html.push_str(&format!(
        "<img src=\"{}\" alt=\"{}\">\n",
        escape_attr(url),
        escape_attr(image.alt_text())
    ));
}

/// Percentage of `votes` in `total`, rounded to the nearest integer.
#[must_use]
pub fn vote_percentage(votes: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (votes as f64 / total as f64 * 100.0).round() as u64
}

fn render_poll(html: &mut String, poll: &PollBlock, tally: &VoteTally) {
    let total = total_votes(tally);

    html.push_str("<div class=\"poll-block\">\n");
    html.push_str(&format!(
        "  <p class=\"poll-question\"><strong>{}</strong></p>\n",
        display_text(poll.question.as_deref().unwrap_or("Poll"))
    ));

    if !poll.answers.is_empty() {
        html.push_str("  <ul class=\"poll-options\">\n");
        for answer in &poll.answers {
            let votes = answer
                .client_id
                .as_deref()
                .and_then(|id| tally.get(id))
                .copied()
                .unwrap_or(0);
            let pct = vote_percentage(votes, total);
            html.push_str(&format!(
                "    <li style=\"background: linear-gradient(to right, #f0f0f0 {pct}%, transparent {pct}%); \
                 padding: 0.25em 0.5em;\" data-percentage=\"{pct}\">{} \
                 <span class=\"poll-percentage\">({pct}%)</span></li>\n",
                display_text(answer.answer_text.as_deref().unwrap_or("..."))
            ));
        }
        html.push_str("  </ul>\n");
    }

    if total > 0 {
        html.push_str(&format!(
            "  <p class=\"poll-total-votes\">{} votes total</p>\n",
            group_thousands(total)
        ));
    }
    html.push_str("</div>\n");
}

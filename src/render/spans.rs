//! Inline formatting: turns a text run plus its formatting spans into HTML.
//!
//! Spans arrive unordered and may overlap without nesting. Each span
//! contributes an opening tag at its start offset and a closing tag at its end
//! offset. At a shared offset closing tags come before opening tags, and
//! closings are emitted newest-first so tags opened later close first.

use std::collections::BTreeMap;

use super::text::{escape_attr, escape_text, substitute_arrows};
use crate::npf::{FormatKind, FormatSpan};

/// Render `text` with `spans` applied.
///
/// Offsets are character offsets; offsets past the end of the text clamp to
/// it. Literal text is always escaped, and arrow substitution is applied to
/// the final output.
#[must_use]
pub fn format_spans(text: &str, spans: &[FormatSpan]) -> String {
    let mut markers: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    for span in spans {
        let Some((open, close)) = span_tags(span) else {
            continue;
        };
        markers.entry(span.start).or_default().push(open);
        markers
            .entry(span.end)
            .or_default()
            .insert(0, close.to_string());
    }

    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (offset, tags) in markers {
        let at = boundaries
            .get(offset)
            .copied()
            .unwrap_or(text.len())
            .max(last);
        out.push_str(&escape_text(&text[last..at]));
        for tag in tags {
            out.push_str(&tag);
        }
        last = at;
    }
    out.push_str(&escape_text(&text[last..]));

    substitute_arrows(&out)
}

fn span_tags(span: &FormatSpan) -> Option<(String, &'static str)> {
    let tags = match span.kind {
        FormatKind::Bold => ("<strong>".to_string(), "</strong>"),
        FormatKind::Italic => ("<em>".to_string(), "</em>"),
        FormatKind::Small => ("<small>".to_string(), "</small>"),
        FormatKind::Strikethrough => ("<s>".to_string(), "</s>"),
        FormatKind::Link => (
            format!(
                r#"<a href="{}">"#,
                escape_attr(span.url.as_deref().unwrap_or("#"))
            ),
            "</a>",
        ),
        FormatKind::Unknown => return None,
    };
    Some(tags)
}

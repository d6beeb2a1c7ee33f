//! Composes a post's blocks into rows, honoring the "read more" fold.

use std::collections::{BTreeSet, HashSet};

use super::block::{list_close_tag, render_block, Rendered};
use crate::constants::KEEP_READING_LABEL;
use crate::npf::{row_layout, ContentBlock, LayoutBlock, ListKind};
use crate::polls::PollResults;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Visible,
    Folded,
}

struct Composer<'a> {
    blocks: &'a [ContentBlock],
    polls: &'a PollResults,
    open_list: Option<ListKind>,
    visible: String,
    folded: String,
    last_section: Section,
    media: Vec<String>,
}

impl<'a> Composer<'a> {
    fn new(blocks: &'a [ContentBlock], polls: &'a PollResults) -> Self {
        Self {
            blocks,
            polls,
            open_list: None,
            visible: String::new(),
            folded: String::new(),
            last_section: Section::Visible,
            media: Vec::new(),
        }
    }

    fn render_index(&mut self, index: usize) -> String {
        let Some(block) = self.blocks.get(index) else {
            return String::new();
        };
        let (rendered, open_list) = render_block(block, self.open_list, self.polls);
        self.open_list = open_list;
        self.media.extend(rendered.media);
        rendered.html
    }

    fn render_row(&mut self, indices: &[usize]) -> String {
        if let [index] = indices {
            return self.render_index(*index);
        }
        let mut html = format!("<div class=\"image-row-{}\">\n", indices.len());
        for &index in indices {
            html.push_str(&self.render_index(index));
        }
        html.push_str("</div>\n");
        html
    }

    fn push(&mut self, section: Section, html: &str) {
        match section {
            Section::Visible => self.visible.push_str(html),
            Section::Folded => self.folded.push_str(html),
        }
        self.last_section = section;
    }

    fn finish(mut self) -> Rendered {
        if let Some(kind) = self.open_list.take() {
            let target = match self.last_section {
                Section::Visible => &mut self.visible,
                Section::Folded => &mut self.folded,
            };
            let trimmed = target.trim_end_matches('\n').len();
            target.truncate(trimmed);
            target.push_str(&list_close_tag(kind));
        }

        let mut html = self.visible;
        if !self.folded.is_empty() {
            html.push_str(&format!(
                "<details>\n  <summary>{KEEP_READING_LABEL}</summary>\n{}</details>\n",
                self.folded
            ));
        }

        Rendered {
            html,
            media: dedup_preserving_order(self.media),
        }
    }
}

/// Render `blocks` according to `layout`.
///
/// `subset` restricts rendering to the given block indices (used to split an
/// ask from its answer); `None` renders every block. Without a rows layout the
/// selected blocks render in ascending index order. With one, rows render in
/// layout order, multi-block rows are wrapped in an `image-row-N` container,
/// and rows whose smallest selected index lies past `truncate_after` go
/// behind a single "Keep Reading" disclosure. Media URLs are deduplicated,
/// keeping first occurrences.
#[must_use]
pub fn compose(
    blocks: &[ContentBlock],
    layout: &[LayoutBlock],
    subset: Option<&[usize]>,
    polls: &PollResults,
) -> Rendered {
    if blocks.is_empty() {
        return Rendered::default();
    }

    // Indices past the end of `blocks` are dropped here, so rows never count them.
    let selected: BTreeSet<usize> = match subset {
        Some(indices) => indices.iter().copied().filter(|&i| i < blocks.len()).collect(),
        None => (0..blocks.len()).collect(),
    };

    let mut composer = Composer::new(blocks, polls);

    if let Some(rows) = row_layout(layout) {
        let last_visible = rows.truncate_after.unwrap_or(usize::MAX);
        for row in &rows.display {
            let indices: Vec<usize> = row
                .blocks
                .iter()
                .copied()
                .filter(|i| selected.contains(i))
                .collect();
            let Some(&first) = indices.iter().min() else {
                continue;
            };
            let html = composer.render_row(&indices);
            let section = if first > last_visible {
                Section::Folded
            } else {
                Section::Visible
            };
            composer.push(section, &html);
        }
    } else {
        for index in selected {
            let html = composer.render_index(index);
            composer.push(Section::Visible, &html);
        }
    }

    composer.finish()
}

fn dedup_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

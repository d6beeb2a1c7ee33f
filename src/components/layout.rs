//! Page layout for archived post files.
//!
//! Archived pages are self-contained HTML files living in
//! `{blog}/posts/{id}.html`; the shared stylesheet sits one directory up.

use maud::{html, Markup, PreEscaped, DOCTYPE};

/// Stylesheet path relative to an archived post file.
const STYLESHEET_HREF: &str = "../style.css";

/// Archived post page builder.
///
/// # Example
///
/// ```ignore
/// use crate::components::layout::PageLayout;
///
/// let page = PageLayout::new("staff - post 1")
///     .with_metadata(metadata_html)
///     .render(&body_html);
/// ```
#[derive(Debug, Clone)]
pub struct PageLayout<'a> {
    title: &'a str,
    metadata: Option<&'a str>,
}

impl<'a> PageLayout<'a> {
    /// Create a new page layout with the given page title.
    #[must_use]
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            metadata: None,
        }
    }

    /// Set the pre-rendered metadata fragment shown in the footer.
    #[must_use]
    pub fn with_metadata(mut self, metadata: &'a str) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Render the complete HTML document around an already rendered body.
    #[must_use]
    pub fn render(self, body_html: &str) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (self.title) }
                    link rel="stylesheet" href=(STYLESHEET_HREF);
                }
                body {
                    div class="container" {
                        main class="archive-post" {
                            (PreEscaped(body_html))
                        }
                        footer class="post-meta" {
                            @if let Some(metadata) = self.metadata {
                                (PreEscaped(metadata))
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_layout_basic_structure() {
        let page = PageLayout::new("staff - post 42")
            .with_metadata("<p>meta</p>")
            .render("<div class=\"op-block\"></div>");
        let html = page.into_string();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="en">"#));
        assert!(html.contains(r#"<meta charset="UTF-8">"#));
        assert!(html.contains("<title>staff - post 42</title>"));
        assert!(html.contains(r#"<link rel="stylesheet" href="../style.css">"#));
        assert!(html.contains(
            r#"<main class="archive-post"><div class="op-block"></div></main>"#
        ));
        assert!(html.contains(r#"<footer class="post-meta"><p>meta</p></footer>"#));
    }

    #[test]
    fn test_title_is_escaped() {
        let html = PageLayout::new("<b>x</b>").render("").into_string();
        assert!(html.contains("<title>&lt;b&gt;x&lt;/b&gt;</title>"));
    }
}

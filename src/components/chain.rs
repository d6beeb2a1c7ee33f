//! Fragments for each link of a reblog chain.
//!
//! Content passed in is already rendered HTML and is inserted verbatim after
//! trimming surrounding whitespace; user and blog names are escaped.

use maud::{html, Markup, PreEscaped};

/// Header naming the original poster.
#[must_use]
pub fn op_header(username: &str, date: &str) -> Markup {
    html! {
        div class="op-block" {
            p class="user-info" { (username) }
            p class="posted" { "Posted · " span { (date) } }
        }
    }
}

/// Body of the original post.
#[must_use]
pub fn op_content(content_html: &str) -> Markup {
    html! {
        div class="op-content" { (PreEscaped(content_html.trim())) }
    }
}

/// One reblog with its added content.
#[must_use]
pub fn reblog_block(username: &str, date: &str, content_html: &str) -> Markup {
    html! {
        div class="reblog-block" {
            p class="user-info" { (username) }
            p class="reblogged" { "Reblogged · " span { (date) } }
            div class="reblog-content" { (PreEscaped(content_html.trim())) }
        }
    }
}

/// The question half of an ask.
#[must_use]
pub fn ask_block(asker: &str, question_html: &str) -> Markup {
    html! {
        div class="ask-block" {
            p class="asker" { span { (asker) } " asked:" }
            div class="question" { (PreEscaped(question_html)) }
        }
    }
}

/// The answer half of an ask.
///
/// The "X answered:" header is optional: a direct answer is already named by
/// the op header.
#[must_use]
pub fn answer_block(username: &str, answer_html: &str, include_header: bool) -> Markup {
    html! {
        div class="answer-block" {
            @if include_header {
                p class="answerer" { span { (username) } " answered:" }
            }
            div class="answer-content" { (PreEscaped(answer_html.trim())) }
        }
    }
}

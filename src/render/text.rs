//! Escaping and display substitutions shared by the block renderers.

use crate::constants::{LEFT_ARROW, RIGHT_ARROW};

/// HTML-escape text content. Quotes are left alone.
#[must_use]
pub fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// HTML-escape a string for use inside a quoted attribute value.
#[must_use]
pub fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;").replace('\'', "&#x27;")
}

/// Replace escaped `<-` / `->` with arrow glyphs.
///
/// Operates on already-escaped HTML, so only the escaped forms match.
#[must_use]
pub fn substitute_arrows(escaped: &str) -> String {
    escaped
        .replace("&lt;-", LEFT_ARROW)
        .replace("-&gt;", RIGHT_ARROW)
}

/// Escape plain text and apply arrow substitution.
#[must_use]
pub fn display_text(s: &str) -> String {
    substitute_arrows(&escape_text(s))
}

/// Format an integer with comma thousands separators.
#[must_use]
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

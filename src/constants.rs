//! Shared constants used across the application.

/// User agent string sent with every API request.
pub const USER_AGENT: &str = concat!("tumblr-post-archiver/", env!("CARGO_PKG_VERSION"));

/// Label of the disclosure element wrapping folded ("read more") content.
pub const KEEP_READING_LABEL: &str = "Keep Reading";

/// Asker shown when an ask carries no blog attribution.
pub const ANONYMOUS_ASKER: &str = "Anonymous";

/// Alt text used for images that don't provide their own.
pub const DEFAULT_ALT_TEXT: &str = "Tumblr Image";

/// Display value for dates that are missing or fail to parse.
pub const DATE_PLACEHOLDER: &str = "???";

/// Glyph substituted for `<-` in rendered text.
pub const LEFT_ARROW: &str = "\u{1F850}";

/// Glyph substituted for `->` in rendered text.
pub const RIGHT_ARROW: &str = "\u{1F852}";

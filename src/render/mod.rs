//! NPF content to HTML.
//!
//! Leaves first: [`spans`] applies inline formatting to a text run,
//! [`block`] renders one content block, and [`layout`] composes a whole
//! content list into rows with an optional "Keep Reading" fold.

pub mod block;
pub mod layout;
pub mod spans;
pub mod text;

pub use block::{render_block, Rendered};
pub use layout::compose;
pub use spans::format_spans;

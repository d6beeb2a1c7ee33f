//! Maud HTML components for archived post pages.
//!
//! - `chain`: op header, reblog, ask and answer fragments
//! - `metadata`: archive metadata footer
//! - `layout`: the page shell around a rendered post body

pub mod chain;
pub mod layout;
pub mod metadata;

pub use chain::{answer_block, ask_block, op_content, op_header, reblog_block};
pub use layout::PageLayout;
pub use metadata::PostMetadata;

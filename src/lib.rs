//! Tumblr post archiver library.
//!
//! Fetches a blog's posts in the Neue Post Format (NPF), renders each post
//! together with its reblog trail, asks and live poll results into a
//! self-contained HTML page, and writes one page per post.

// Raw string hashes keep HTML test fixtures readable.
#![allow(clippy::needless_raw_string_hashes)]

pub mod api;
pub mod archive;
pub mod assemble;
pub mod components;
pub mod config;
pub mod constants;
pub mod npf;
pub mod polls;
pub mod render;

//! The library code for `postsplice`, which turns a directory of Markdown
//! posts into HTML and splices it into an existing `index.html`. A build is a
//! straight pipeline:
//!
//! 1. Parsing posts from source files on disk ([`crate::parser`]), which
//!    splits off each file's frontmatter ([`crate::frontmatter`]) and converts
//!    the body to HTML ([`crate::markdown`])
//! 2. Rendering the posts into a single HTML fragment ([`crate::render`])
//! 3. Splicing the fragment into the index page's "Recent Posts" section
//!    ([`crate::patch`])
//!
//! [`crate::build::build_site`] runs all three and reports progress.
//!
//! Markdown conversion comes in two flavors: `pulldown-cmark` (behind the
//! default `pulldown` feature) and a small regex-based fallback
//! ([`crate::fallback`]). The choice is made once per build.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod fallback;
pub mod frontmatter;
pub mod markdown;
pub mod parser;
pub mod patch;
pub mod post;
pub mod render;

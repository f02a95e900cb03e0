//! A small regex-based Markdown converter used when the full Markdown library
//! isn't compiled in (or isn't wanted). Rules run over the whole text in a
//! fixed order:
//!
//! 1. `#`, `##`, and `###` headings
//! 2. `**bold**`
//! 3. `*italic*` (after bold, so bold markers are never read as italics)
//! 4. `[label](url)` links
//! 5. `` `code` `` spans
//! 6. Blocks separated by a blank line become paragraphs or flat lists;
//!    blocks already starting with a tag pass through untouched.
//!
//! Nested lists, block quotes, images, tables, and fenced code are not
//! recognized. They come out as paragraph text with the inline rules applied.

use crate::markdown::Converter;
use once_cell::sync::Lazy;
use regex::Regex;

static H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^# (.*?)$").unwrap());
static H2: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^## (.*?)$").unwrap());
static H3: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^### (.*?)$").unwrap());
static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[(.+?)\]\((.+?)\)").unwrap());
static CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`(.+?)`").unwrap());
static ORDERED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.").unwrap());
static LIST_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[\d-]+\.\s*|- )").unwrap());

/// The regex-based [`Converter`].
#[derive(Clone, Copy, Debug, Default)]
pub struct FallbackConverter;

impl Converter for FallbackConverter {
    fn to_html(&self, markdown: &str) -> String {
        let text = H1.replace_all(markdown, "<h1>${1}</h1>");
        let text = H2.replace_all(&text, "<h2>${1}</h2>");
        let text = H3.replace_all(&text, "<h3>${1}</h3>");
        let text = BOLD.replace_all(&text, "<strong>${1}</strong>");
        let text = ITALIC.replace_all(&text, "<em>${1}</em>");
        let text = LINK.replace_all(&text, r#"<a href="${2}">${1}</a>"#);
        let text = CODE.replace_all(&text, "<code>${1}</code>");

        text.split("\n\n")
            .map(str::trim)
            .filter(|block| !block.is_empty())
            .map(|block| {
                if block.starts_with('<') {
                    block.to_owned()
                } else if ORDERED.is_match(block) || block.starts_with("- ") {
                    list(block)
                } else {
                    format!("<p>{}</p>", block)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// The first line decides the list type; every line becomes an item.
fn list(block: &str) -> String {
    let tag = match block.lines().next() {
        Some(first) if ORDERED.is_match(first) => "ol",
        _ => "ul",
    };
    let items: String = block
        .lines()
        .map(|line| format!("<li>{}</li>", LIST_MARKER.replace(line, "")))
        .collect();
    format!("<{tag}>{items}</{tag}>", tag = tag, items = items)
}

#[cfg(test)]
mod test {
    use super::*;

    fn convert(markdown: &str) -> String {
        FallbackConverter.to_html(markdown)
    }

    #[test]
    fn test_headings() {
        assert_eq!(
            "<h1>One</h1>\n<h2>Two</h2>\n<h3>Three</h3>",
            convert("# One\n\n## Two\n\n### Three")
        );
    }

    #[test]
    fn test_heading_requires_space() {
        assert_eq!("<p>#hashtag</p>", convert("#hashtag"));
    }

    #[test]
    fn test_headings_in_one_block() {
        assert_eq!("<h1>Title</h1>\n<h2>Sub</h2>", convert("# Title\n## Sub"));
    }

    #[test]
    fn test_bold() {
        assert!(convert("**bold**").contains("<strong>bold</strong>"));
    }

    #[test]
    fn test_italic() {
        assert!(convert("*italic*").contains("<em>italic</em>"));
    }

    #[test]
    fn test_bold_before_italic() {
        let html = convert("**a** *b*");
        assert_eq!("<strong>a</strong> <em>b</em>", html);
        assert!(!html.contains("<em>*"));
    }

    #[test]
    fn test_link_and_code() {
        assert_eq!(
            r#"<p>See <a href="https://example.org">the site</a> and <code>cargo</code>.</p>"#,
            convert("See [the site](https://example.org) and `cargo`.")
        );
    }

    #[test]
    fn test_ordered_list() {
        assert_eq!("<ol><li>x</li><li>y</li></ol>", convert("1. x\n2. y"));
    }

    #[test]
    fn test_unordered_list() {
        assert_eq!(
            "<ul><li>apples</li><li>pears</li></ul>",
            convert("- apples\n- pears")
        );
    }

    #[test]
    fn test_list_marker_only_stripped_at_start() {
        assert_eq!(
            "<ul><li>left - right</li></ul>",
            convert("- left - right")
        );
    }

    #[test]
    fn test_paragraphs_and_empty_blocks() {
        assert_eq!(
            "<p>First</p>\n<p>Second\nline</p>",
            convert("\n\nFirst\n\n\n\n\nSecond\nline\n\n")
        );
    }

    #[test]
    fn test_block_starting_with_tag_passes_through() {
        assert_eq!(
            "<strong>Lead</strong> sentence",
            convert("**Lead** sentence")
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!("", convert(""));
        assert_eq!("", convert("\n\n\n"));
    }
}

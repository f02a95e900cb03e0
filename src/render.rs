//! Renders [`Post`]s into the HTML fragment that is spliced into the index
//! page's "Recent Posts" section.

use crate::post::Post;
use chrono::NaiveDate;
use std::borrow::Cow;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DISPLAY_DATE_FORMAT: &str = "%B %d, %Y";

/// Renders `posts` in order, one `<article>` block per post, separated by a
/// blank line.
pub fn render_posts(posts: &[Post]) -> String {
    posts
        .iter()
        .map(render_post)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_post(post: &Post) -> String {
    format!(
        r#"                <article class="blog-post">
                    <h3>{title}</h3>
                    <time datetime="{iso_date}">{display_date}</time>
                    <div class="post-content">
                        {content}
                    </div>
                </article>"#,
        title = post.title,
        iso_date = post.date,
        display_date = display_date(&post.date),
        content = post.content,
    )
}

/// Formats a `YYYY-MM-DD` date for humans (e.g., `January 05, 2024`). Dates
/// in any other shape are returned as-is.
pub fn display_date(date: &str) -> Cow<str> {
    match NaiveDate::parse_from_str(date, DATE_FORMAT) {
        Ok(parsed) => Cow::Owned(parsed.format(DISPLAY_DATE_FORMAT).to_string()),
        Err(_) => Cow::Borrowed(date),
    }
}

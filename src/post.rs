use crate::frontmatter::Frontmatter;

/// The title given to posts whose frontmatter doesn't define one.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Represents a blog post, parsed and converted to HTML.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The title of the post.
    pub title: String,

    /// The date of the post, nominally `YYYY-MM-DD`. Posts are ordered by
    /// comparing this string, which is chronological for that format.
    pub date: String,

    /// A short summary of the post. Empty when not provided.
    pub excerpt: String,

    /// The post body as an HTML fragment.
    pub content: String,

    /// The base name of the source file without its extension.
    pub filename: String,
}

impl Post {
    /// Builds a [`Post`] from parsed frontmatter, substituting defaults for
    /// missing fields: [`DEFAULT_TITLE`] for the title, `today` for the date,
    /// and an empty excerpt.
    pub fn new(
        frontmatter: &Frontmatter,
        content: String,
        filename: String,
        today: &str,
    ) -> Post {
        let field = |key: &str, default: &str| {
            frontmatter.get(key).unwrap_or(default).to_owned()
        };
        Post {
            title: field("title", DEFAULT_TITLE),
            date: field("date", today),
            excerpt: field("excerpt", ""),
            content,
            filename,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frontmatter;

    #[test]
    fn test_defaults() {
        let (frontmatter, _) = frontmatter::split("No frontmatter here");
        let post = Post::new(
            &frontmatter,
            String::from("<p>body</p>"),
            String::from("hello"),
            "2024-03-01",
        );
        assert_eq!(
            Post {
                title: String::from("Untitled"),
                date: String::from("2024-03-01"),
                excerpt: String::new(),
                content: String::from("<p>body</p>"),
                filename: String::from("hello"),
            },
            post
        );
    }

    #[test]
    fn test_frontmatter_fields() {
        let (frontmatter, _) = frontmatter::split(
            "---\ntitle: Hello\ndate: 2024-01-05\nexcerpt: A greeting\nauthor: ignored\n---\n",
        );
        let post = Post::new(&frontmatter, String::new(), String::from("hello"), "2099-12-31");
        assert_eq!("Hello", post.title);
        assert_eq!("2024-01-05", post.date);
        assert_eq!("A greeting", post.excerpt);
    }

    #[test]
    fn test_empty_value_is_kept() {
        let (frontmatter, _) = frontmatter::split("---\ntitle:\n---\n");
        let post = Post::new(&frontmatter, String::new(), String::from("x"), "2024-01-01");
        assert_eq!("", post.title);
    }
}

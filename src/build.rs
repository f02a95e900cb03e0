//! Exports the [`build_site`] function which stitches together the high-level
//! steps of a build: parsing the posts ([`crate::parser`]), rendering them
//! ([`crate::render`]), and splicing the result into the index page
//! ([`crate::patch`]). Progress is reported as plain console lines written to
//! a caller-supplied writer.

use crate::config::Config;
use crate::markdown::ConverterKind;
use crate::parser::{Error as ParseError, Parser as PostParser};
use crate::patch::{self, Error as PatchError, Outcome};
use crate::render::render_posts;
use std::fmt;
use std::io::Write;

/// What a finished build did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Summary {
    /// No posts were found, so the index page wasn't touched.
    NoPosts,

    /// The index page was rewritten. `posts` is the number of posts found.
    /// This is also reported when the page had no posts section and was
    /// rewritten unchanged.
    Updated { posts: usize },

    /// The index page doesn't exist.
    IndexMissing,
}

/// Builds the site from a [`Config`], writing progress lines to `out`.
pub fn build_site<W: Write>(config: &Config, out: &mut W) -> Result<Summary> {
    writeln!(out, "Building blog posts...\n")?;

    let converter_kind = config.converter.resolve();
    if converter_kind != config.converter {
        writeln!(
            out,
            "Note: Markdown library not available. Using basic converter."
        )?;
    }
    let converter = converter_kind.converter();

    if !config.posts_directory.is_dir() {
        writeln!(
            out,
            "No {}/ directory found",
            config.posts_directory.display()
        )?;
    }
    let posts = PostParser::new(&*converter).parse_posts(&config.posts_directory)?;
    writeln!(out, "Found {} post(s)", posts.len())?;

    if posts.is_empty() {
        writeln!(out, "No posts to process")?;
        return Ok(Summary::NoPosts);
    }

    for post in &posts {
        writeln!(out, "  - {} ({})", post.title, post.date)?;
    }

    let fragment = render_posts(&posts);
    let index_file = config.index_file.display();
    match patch::patch_file(&config.index_file, &fragment)? {
        Outcome::Patched | Outcome::NoSection => {
            writeln!(out, "\n✓ Successfully updated {}", index_file)?;
            writeln!(out, "Your blog is ready to view!")?;
            Ok(Summary::Updated { posts: posts.len() })
        }
        Outcome::TargetMissing => {
            writeln!(out, "Error: {} not found", index_file)?;
            writeln!(out, "\n✗ Failed to update {}", index_file)?;
            Ok(Summary::IndexMissing)
        }
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing,
/// patching, or writing progress to the console.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors during parsing.
    Parse(ParseError),

    /// Returned for errors reading or writing the index page.
    Patch(PatchError),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Patch(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Patch(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<PatchError> for Error {
    /// Converts [`PatchError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: PatchError) -> Error {
        Error::Patch(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use std::path::Path;

    const INDEX: &str = "<html>
<body>
    <section id=\"blog\">
        <div class=\"container\">
            <h2>Recent Blog Posts</h2>
            <p>Nothing yet.</p>
        </div>
    </section>
</body>
</html>
";

    type TestResult = std::result::Result<(), Box<dyn std::error::Error>>;

    fn site(dir: &Path) -> std::io::Result<Config> {
        let posts = dir.join("posts");
        fs::create_dir(&posts)?;
        fs::write(
            posts.join("2024-01-01-hello.md"),
            "---\ntitle: Hello\ndate: 2024-01-01\n---\nFirst **post**.\n",
        )?;
        fs::write(
            posts.join("2024-01-02-again.md"),
            "---\ntitle: Again\ndate: 2024-01-02\n---\n- one\n- two\n",
        )?;
        fs::write(dir.join("index.html"), INDEX)?;
        Ok(Config {
            converter: ConverterKind::Fallback,
            ..Config::defaults(dir)
        })
    }

    fn build(config: &Config) -> std::result::Result<(Summary, String), Box<dyn std::error::Error>> {
        let mut out = Vec::new();
        let summary = build_site(config, &mut out)?;
        Ok((summary, String::from_utf8(out)?))
    }

    #[test]
    fn test_build_site() -> TestResult {
        let dir = tempfile::tempdir()?;
        let config = site(dir.path())?;

        let (summary, console) = build(&config)?;
        assert_eq!(Summary::Updated { posts: 2 }, summary);
        assert_eq!(
            format!(
                "Building blog posts...\n\n\
                 Found 2 post(s)\n  - Again (2024-01-02)\n  - Hello (2024-01-01)\n\n\
                 ✓ Successfully updated {}\nYour blog is ready to view!\n",
                config.index_file.display()
            ),
            console
        );

        let index = fs::read_to_string(&config.index_file)?;
        let wanted = "<html>
<body>
    <section id=\"blog\">
        <div class=\"container\">
            <h2>Recent Blog Posts</h2>
                <article class=\"blog-post\">
                    <h3>Again</h3>
                    <time datetime=\"2024-01-02\">January 02, 2024</time>
                    <div class=\"post-content\">
                        <ul><li>one</li><li>two</li></ul>
                    </div>
                </article>

                <article class=\"blog-post\">
                    <h3>Hello</h3>
                    <time datetime=\"2024-01-01\">January 01, 2024</time>
                    <div class=\"post-content\">
                        <p>First <strong>post</strong>.</p>
                    </div>
                </article>
        </div>
    </section>
</body>
</html>
";
        assert_eq!(wanted, index);
        Ok(())
    }

    #[test]
    fn test_build_site_twice_is_idempotent() -> TestResult {
        let dir = tempfile::tempdir()?;
        let config = site(dir.path())?;

        build(&config)?;
        let first = fs::read(&config.index_file)?;
        build(&config)?;
        let second = fs::read(&config.index_file)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn test_build_site_without_posts_directory() -> TestResult {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("index.html"), INDEX)?;
        let config = Config::defaults(dir.path());

        let (summary, console) = build(&config)?;
        assert_eq!(Summary::NoPosts, summary);
        assert!(console.contains(&format!(
            "No {}/ directory found\nFound 0 post(s)\nNo posts to process\n",
            config.posts_directory.display()
        )));
        assert_eq!(INDEX, fs::read_to_string(&config.index_file)?);
        Ok(())
    }

    #[test]
    fn test_build_site_without_index() -> TestResult {
        let dir = tempfile::tempdir()?;
        let config = site(dir.path())?;
        fs::remove_file(&config.index_file)?;

        let (summary, console) = build(&config)?;
        assert_eq!(Summary::IndexMissing, summary);
        let index_file = config.index_file.display();
        assert!(console.ends_with(&format!(
            "Error: {} not found\n\n✗ Failed to update {}\n",
            index_file, index_file
        )));
        assert!(!config.index_file.exists());
        Ok(())
    }

    #[test]
    fn test_build_site_without_section() -> TestResult {
        let dir = tempfile::tempdir()?;
        let config = site(dir.path())?;
        let page = "<html><body><h1>No blog here</h1></body></html>\n";
        fs::write(&config.index_file, page)?;

        let (summary, _) = build(&config)?;
        assert_eq!(Summary::Updated { posts: 2 }, summary);
        assert_eq!(page, fs::read_to_string(&config.index_file)?);
        Ok(())
    }
}

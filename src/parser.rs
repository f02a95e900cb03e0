//! Defines the [`Parser`] and [`Error`] types: the logic for reading post
//! source files from the posts directory into [`Post`] objects.

use std::{
    cmp::Ordering,
    fmt,
    fs,
    path::{Path, PathBuf},
};

use log::debug;
use walkdir::{DirEntry, WalkDir};

use crate::{frontmatter, markdown::Converter, post::Post};

const MARKDOWN_EXTENSION: &str = "md";

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// `converter` turns each post body into HTML.
    converter: &'a dyn Converter,

    /// `today` is the date (`YYYY-MM-DD`) given to posts whose frontmatter
    /// has none.
    today: String,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser which dates undated posts with the current
    /// local date.
    pub fn new(converter: &'a dyn Converter) -> Parser<'a> {
        Parser::with_today(
            converter,
            chrono::Local::now().format("%Y-%m-%d").to_string(),
        )
    }

    /// Constructs a new parser which dates undated posts with `today`.
    pub fn with_today(
        converter: &'a dyn Converter,
        today: impl Into<String>,
    ) -> Parser<'a> {
        Parser {
            converter,
            today: today.into(),
        }
    }

    /// Builds a single [`Post`] from the source text of the file whose base
    /// name (less the extension) is `filename`.
    pub fn parse_str(&self, filename: &str, input: &str) -> Post {
        let (frontmatter, body) = frontmatter::split(input);
        Post::new(
            &frontmatter,
            self.converter.to_html(body),
            filename.to_owned(),
            &self.today,
        )
    }

    fn parse_post(&self, path: &Path) -> Result<Post> {
        match self._parse_post(path) {
            Ok(p) => Ok(p),
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{}`", path.display()),
                Box::new(e),
            )),
        }
    }

    fn _parse_post(&self, path: &Path) -> Result<Post> {
        let filename = path
            .file_stem()
            .ok_or_else(|| Error::InvalidFileName(path.to_owned()))?
            .to_string_lossy();
        let contents = fs::read_to_string(path)?;
        let post = self.parse_str(&filename, &contents);
        debug!("parsed post `{}` ({}, {})", post.filename, post.title, post.date);
        Ok(post)
    }

    /// Searches `source_directory` (but not its subdirectories) for post
    /// files (extension = `.md`, symlinks followed) and returns a list of [`Post`] objects
    /// sorted by date, most recent first. Posts sharing a date are ordered
    /// by file name, descending. A missing directory yields no posts.
    ///
    /// Each post file may begin with a frontmatter block:
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// date: 2024-01-05
    /// excerpt: Saying hello
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Vec<Post>> {
        if !source_directory.is_dir() {
            debug!(
                "posts directory `{}` not found",
                source_directory.display()
            );
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();
        for result in WalkDir::new(source_directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by(by_file_name_descending)
        {
            let entry = result?;
            if is_post_file(&entry) {
                posts.push(self.parse_post(entry.path())?);
            }
        }

        // `sort_by` is stable, so equal dates keep their file name order.
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(posts)
    }
}

fn by_file_name_descending(a: &DirEntry, b: &DirEntry) -> Ordering {
    b.file_name().cmp(a.file_name())
}

fn is_post_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry
            .path()
            .extension()
            .map_or(false, |ext| ext == MARKDOWN_EXTENSION)
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O errors reading a post, including source files that
    /// aren't valid UTF-8.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// Returned when a post's file name has no base name.
    InvalidFileName(PathBuf),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::InvalidFileName(path) => {
                write!(f, "invalid file name: {:?}", path)
            }
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::InvalidFileName(_) => None,
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator while listing the posts directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

//! Splices a rendered fragment into the "Recent Posts" section of an existing
//! HTML page. The page is streamed through `lol_html` twice: a read-only scan
//! which finds the section, then a rewrite which replaces its contents. The
//! rewriter passes every untouched byte through as-is, so everything outside
//! the section is left exactly as it was.

use log::{debug, warn};
use lol_html::errors::RewritingError;
use lol_html::html_content::{ContentType, EndTag};
use lol_html::{
    comments, element, rewrite_str, text, ElementContentHandlers, HandlerResult,
    RewriteStrSettings, Selector,
};
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// The heading texts which mark the posts section.
pub const HEADINGS: &[&str] = &["Recent Posts", "Recent Blog Posts"];

/// Selectors for a posts heading. An `<h2>` start tag closes an open `<p>`,
/// so a heading after an unclosed paragraph is still a child of the
/// container even though the rewriter nests it inside the `<p>`.
const HEADING_SELECTORS: &[&str] = &["section > div > h2", "section > div > p > h2"];

const CONTAINER_SELECTOR: &str = "section > div";

type Handler = (Cow<'static, Selector>, ElementContentHandlers<'static>);

/// The outcome of [`patch_file`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The file was rewritten with the new fragment in place.
    Patched,

    /// The file has no posts section. It was rewritten unchanged.
    NoSection,

    /// The target file doesn't exist. Nothing was written.
    TargetMissing,
}

/// The posts section of a page, identified by the position of its heading
/// among all heading matches and of its container among all container
/// matches. Both rewriter passes see the same matches in the same order.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Region {
    heading: usize,
    container: usize,
    closing_whitespace: String,
}

#[derive(Default)]
struct Heading {
    text: String,
    container: Option<usize>,
    closed: bool,
    qualifies: bool,
}

#[derive(Default)]
struct Container {
    section: Option<usize>,

    /// Text seen since the last tag or comment inside the container.
    tail: String,
    closing_whitespace: Option<String>,
}

#[derive(Default)]
struct Section {
    /// The child container that closed most recently, as long as nothing
    /// but whitespace has followed it.
    closed_container: Option<usize>,
}

/// State collected by the scanning pass.
#[derive(Default)]
struct Scan {
    headings: Vec<Heading>,
    containers: Vec<Container>,
    sections: Vec<Section>,
    open_heading: Option<usize>,
    open_containers: Vec<usize>,
    open_sections: Vec<usize>,
}

impl Scan {
    fn open_section(&mut self) -> usize {
        let id = self.sections.len();
        self.sections.push(Section::default());
        self.open_sections.push(id);
        id
    }

    fn close_section(&mut self, id: usize) {
        self.open_sections.retain(|&s| s != id);
        if let Some(container) = self.sections[id].closed_container {
            for heading in self
                .headings
                .iter_mut()
                .filter(|h| h.container == Some(container))
            {
                heading.qualifies = heading.closed && HEADINGS.contains(&heading.text.trim());
            }
        }
    }

    fn open_container(&mut self) -> usize {
        let id = self.containers.len();
        self.containers.push(Container {
            section: self.open_sections.last().copied(),
            ..Container::default()
        });
        self.open_containers.push(id);
        id
    }

    fn close_container(&mut self, id: usize) {
        self.open_containers.retain(|&c| c != id);
        let container = &mut self.containers[id];
        let tail = &container.tail;
        container.closing_whitespace = Some(tail[tail.trim_end().len()..].to_owned());
        if let Some(section) = container.section {
            self.sections[section].closed_container = Some(id);
        }
    }

    fn open_heading(&mut self) -> usize {
        let id = self.headings.len();
        self.headings.push(Heading {
            container: self.open_containers.last().copied(),
            ..Heading::default()
        });
        self.open_heading = Some(id);
        id
    }

    fn close_heading(&mut self, id: usize) {
        self.headings[id].closed = true;
        if self.open_heading == Some(id) {
            self.open_heading = None;
        }
    }

    /// A start tag or a comment. Anything of the sort after a container's
    /// end tag disqualifies the enclosing sections.
    fn markup(&mut self) {
        self.interrupt_sections();
        self.end_tag();
    }

    fn end_tag(&mut self) {
        if let Some(&c) = self.open_containers.last() {
            self.containers[c].tail.clear();
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(h) = self.open_heading {
            self.headings[h].text.push_str(text);
        }
        if let Some(&c) = self.open_containers.last() {
            self.containers[c].tail.push_str(text);
        }
        if !text.trim().is_empty() {
            self.interrupt_sections();
        }
    }

    fn interrupt_sections(&mut self) {
        for &s in &self.open_sections {
            self.sections[s].closed_container = None;
        }
    }

    /// The first qualifying heading in document order.
    fn region(&self) -> Option<Region> {
        let (heading, h) = self.headings.iter().enumerate().find(|(_, h)| h.qualifies)?;
        let container = h.container?;
        Some(Region {
            heading,
            container,
            closing_whitespace: self.containers[container].closing_whitespace.clone()?,
        })
    }
}

/// Runs `on_end` when `el`'s end tag is reached. Void elements have no end
/// tag, so nothing is registered for them.
macro_rules! on_end_tag {
    ($el:expr, $on_end:expr) => {
        if let Some(handlers) = $el.end_tag_handlers() {
            let handler: lol_html::EndTagHandler<'static> = Box::new($on_end);
            handlers.push(handler);
        }
    };
}

/// Finds the posts section of `document`: the first `<h2>` whose trimmed
/// text is one of [`HEADINGS`], sitting directly inside a `<div>` that in
/// turn sits directly inside a `<section>`, where the `</div>` and
/// `</section>` tags are separated by nothing but whitespace.
fn find_region(document: &str) -> Result<Option<Region>> {
    let scan = Rc::new(RefCell::new(Scan::default()));

    // Handlers for one element run in the order they are listed, so the
    // structural handlers see an end tag before the generic one does.
    let mut handlers = vec![scan_section(&scan), scan_container(&scan)];
    for &selector in HEADING_SELECTORS {
        handlers.push(scan_heading(selector, &scan));
    }
    handlers.push(scan_any(&scan));
    handlers.push(scan_text(&scan));
    handlers.push(scan_comments(&scan));

    rewrite_str(
        document,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::new()
        },
    )?;
    let region = scan.borrow().region();
    Ok(region)
}

fn scan_section(scan: &Rc<RefCell<Scan>>) -> Handler {
    let scan = Rc::clone(scan);
    element!("section", move |el| {
        let id = scan.borrow_mut().open_section();
        let scan = Rc::clone(&scan);
        on_end_tag!(el, move |_: &mut EndTag<'_>| -> HandlerResult {
            scan.borrow_mut().close_section(id);
            Ok(())
        });
        Ok(())
    })
}

fn scan_container(scan: &Rc<RefCell<Scan>>) -> Handler {
    let scan = Rc::clone(scan);
    element!(CONTAINER_SELECTOR, move |el| {
        let id = scan.borrow_mut().open_container();
        let scan = Rc::clone(&scan);
        on_end_tag!(el, move |_: &mut EndTag<'_>| -> HandlerResult {
            scan.borrow_mut().close_container(id);
            Ok(())
        });
        Ok(())
    })
}

fn scan_heading(selector: &str, scan: &Rc<RefCell<Scan>>) -> Handler {
    let scan = Rc::clone(scan);
    element!(selector, move |el| {
        let id = scan.borrow_mut().open_heading();
        let scan = Rc::clone(&scan);
        on_end_tag!(el, move |_: &mut EndTag<'_>| -> HandlerResult {
            scan.borrow_mut().close_heading(id);
            Ok(())
        });
        Ok(())
    })
}

fn scan_any(scan: &Rc<RefCell<Scan>>) -> Handler {
    let scan = Rc::clone(scan);
    element!("*", move |el| {
        scan.borrow_mut().markup();
        let scan = Rc::clone(&scan);
        on_end_tag!(el, move |_: &mut EndTag<'_>| -> HandlerResult {
            scan.borrow_mut().end_tag();
            Ok(())
        });
        Ok(())
    })
}

fn scan_text(scan: &Rc<RefCell<Scan>>) -> Handler {
    let scan = Rc::clone(scan);
    text!("section", move |chunk| {
        scan.borrow_mut().text(chunk.as_str());
        Ok(())
    })
}

fn scan_comments(scan: &Rc<RefCell<Scan>>) -> Handler {
    let scan = Rc::clone(scan);
    comments!("section", move |_| {
        scan.borrow_mut().markup();
        Ok(())
    })
}

/// Where the rewriting pass is.
#[derive(Default)]
struct Cursor {
    headings: usize,
    containers: usize,
    removing: bool,
}

impl Cursor {
    fn next_heading(&mut self) -> usize {
        self.headings += 1;
        self.headings - 1
    }

    fn next_container(&mut self) -> usize {
        self.containers += 1;
        self.containers - 1
    }
}

/// Rewrites `region` of `document`: everything between the heading's end tag
/// and the container's end tag is dropped, `insert` goes right after the
/// heading and the old closing whitespace goes back before `</div>`.
fn rewrite_region(document: &str, region: Region, insert: String) -> Result<String> {
    let cursor = Rc::new(RefCell::new(Cursor::default()));

    let mut handlers = Vec::new();
    for &selector in HEADING_SELECTORS {
        handlers.push(rewrite_heading(selector, &cursor, region.heading, &insert));
    }
    handlers.push(rewrite_container(
        &cursor,
        region.container,
        &region.closing_whitespace,
    ));
    handlers.push(remove_elements(&cursor));
    handlers.push(remove_text(&cursor));
    handlers.push(remove_comments(&cursor));

    let patched = rewrite_str(
        document,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::new()
        },
    )?;
    Ok(patched)
}

fn rewrite_heading(
    selector: &str,
    cursor: &Rc<RefCell<Cursor>>,
    target: usize,
    insert: &str,
) -> Handler {
    let cursor = Rc::clone(cursor);
    let insert = insert.to_owned();
    element!(selector, move |el| {
        if cursor.borrow_mut().next_heading() != target {
            return Ok(());
        }
        let cursor = Rc::clone(&cursor);
        let insert = insert.clone();
        on_end_tag!(el, move |end: &mut EndTag<'_>| -> HandlerResult {
            end.after(&insert, ContentType::Html);
            cursor.borrow_mut().removing = true;
            Ok(())
        });
        Ok(())
    })
}

fn rewrite_container(
    cursor: &Rc<RefCell<Cursor>>,
    target: usize,
    closing_whitespace: &str,
) -> Handler {
    let cursor = Rc::clone(cursor);
    let closing_whitespace = closing_whitespace.to_owned();
    element!(CONTAINER_SELECTOR, move |el| {
        if cursor.borrow_mut().next_container() != target {
            return Ok(());
        }
        let cursor = Rc::clone(&cursor);
        let closing_whitespace = closing_whitespace.clone();
        on_end_tag!(el, move |end: &mut EndTag<'_>| -> HandlerResult {
            end.before(&closing_whitespace, ContentType::Html);
            cursor.borrow_mut().removing = false;
            Ok(())
        });
        Ok(())
    })
}

fn remove_elements(cursor: &Rc<RefCell<Cursor>>) -> Handler {
    let cursor = Rc::clone(cursor);
    element!("section > div *", move |el| {
        if cursor.borrow().removing {
            el.remove();
        }
        Ok(())
    })
}

fn remove_text(cursor: &Rc<RefCell<Cursor>>) -> Handler {
    let cursor = Rc::clone(cursor);
    text!(CONTAINER_SELECTOR, move |chunk| {
        if cursor.borrow().removing {
            chunk.remove();
        }
        Ok(())
    })
}

fn remove_comments(cursor: &Rc<RefCell<Cursor>>) -> Handler {
    let cursor = Rc::clone(cursor);
    comments!(CONTAINER_SELECTOR, move |comment| {
        if cursor.borrow().removing {
            comment.remove();
        }
        Ok(())
    })
}

/// Replaces the posts section of `document` with `fragment`. The section
/// becomes a newline, the fragment, and whatever whitespace preceded the
/// closing `</div>` (so the closing tags keep their indentation and splicing
/// the same fragment twice yields the same document). Returns `None` when
/// `document` has no posts section.
pub fn splice(document: &str, fragment: &str) -> Result<Option<String>> {
    let region = match find_region(document)? {
        Some(region) => region,
        None => return Ok(None),
    };

    let fragment = fragment.trim_end();
    let insert = if fragment.trim_start().is_empty() {
        String::new()
    } else {
        format!("\n{}", fragment)
    };
    rewrite_region(document, region, insert).map(Some)
}

/// Splices `fragment` into the posts section of the HTML file at `path` and
/// writes the result back in place. A missing file is reported as
/// [`Outcome::TargetMissing`] rather than as an error.
pub fn patch_file(path: &Path, fragment: &str) -> Result<Outcome> {
    if !path.is_file() {
        return Ok(Outcome::TargetMissing);
    }

    let document = fs::read_to_string(path).map_err(|err| Error::Read {
        path: path.to_owned(),
        err,
    })?;
    let spliced = splice(&document, fragment).map_err(|err| {
        Error::Annotated(format!("patching `{}`", path.display()), Box::new(err))
    })?;
    let (contents, outcome) = match spliced {
        Some(patched) => {
            debug!("patched posts section of `{}`", path.display());
            (patched, Outcome::Patched)
        }
        None => {
            warn!(
                "no `Recent Posts` section found in `{}`; leaving it unchanged",
                path.display()
            );
            (document, Outcome::NoSection)
        }
    };

    fs::write(path, contents).map_err(|err| Error::Write {
        path: path.to_owned(),
        err,
    })?;
    Ok(outcome)
}

/// Represents the result of a patch operation.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for patching the target file.
#[derive(Debug)]
pub enum Error {
    /// Returned when the target file exists but couldn't be read.
    Read { path: PathBuf, err: std::io::Error },

    /// Returned when the patched file couldn't be written.
    Write { path: PathBuf, err: std::io::Error },

    /// Returned when the HTML rewriter gives up on a document.
    Rewrite(RewritingError),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read { path, err } => {
                write!(f, "Reading '{}': {}", path.display(), err)
            }
            Error::Write { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
            Error::Rewrite(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { path: _, err } => Some(err),
            Error::Write { path: _, err } => Some(err),
            Error::Rewrite(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<RewritingError> for Error {
    /// Converts [`RewritingError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: RewritingError) -> Error {
        Error::Rewrite(err)
    }
}

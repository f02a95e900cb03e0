//! Defines the [`Converter`] capability (Markdown in, HTML fragment out) and
//! its two strategies: [`LibraryConverter`], backed by `pulldown-cmark`, and
//! [`crate::fallback::FallbackConverter`], a small regex-based converter. The
//! strategy is chosen once per run via [`ConverterKind`] and the resulting
//! converter is handed to the post parser.

use crate::fallback::FallbackConverter;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Converts a post body from Markdown into an HTML fragment.
pub trait Converter {
    fn to_html(&self, markdown: &str) -> String;
}

/// Selects a [`Converter`] strategy.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConverterKind {
    /// Full CommonMark conversion via `pulldown-cmark`. Only available when
    /// the crate is built with the `pulldown` feature.
    Library,

    /// The built-in converter which handles headings, emphasis, links,
    /// inline code, flat lists, and paragraphs.
    Fallback,
}

impl ConverterKind {
    /// Whether the library strategy was compiled into this build.
    pub const LIBRARY_AVAILABLE: bool = cfg!(feature = "pulldown");

    /// The strategy used when nothing else is configured.
    pub fn available() -> ConverterKind {
        if Self::LIBRARY_AVAILABLE {
            ConverterKind::Library
        } else {
            ConverterKind::Fallback
        }
    }

    /// Downgrades [`ConverterKind::Library`] to [`ConverterKind::Fallback`]
    /// when the library is not compiled in.
    pub fn resolve(self) -> ConverterKind {
        match self {
            ConverterKind::Library if !Self::LIBRARY_AVAILABLE => ConverterKind::Fallback,
            kind => kind,
        }
    }

    /// Builds the converter for the resolved strategy.
    pub fn converter(self) -> Box<dyn Converter> {
        match self.resolve() {
            #[cfg(feature = "pulldown")]
            ConverterKind::Library => Box::new(LibraryConverter),
            _ => Box::new(FallbackConverter),
        }
    }
}

impl Default for ConverterKind {
    fn default() -> Self {
        ConverterKind::available()
    }
}

impl fmt::Display for ConverterKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConverterKind::Library => write!(f, "library"),
            ConverterKind::Fallback => write!(f, "fallback"),
        }
    }
}

impl FromStr for ConverterKind {
    type Err = UnknownConverterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "library" => Ok(ConverterKind::Library),
            "fallback" => Ok(ConverterKind::Fallback),
            _ => Err(UnknownConverterError(s.to_owned())),
        }
    }
}

/// Returned when a converter name is neither `library` nor `fallback`.
#[derive(Debug)]
pub struct UnknownConverterError(String);

impl fmt::Display for UnknownConverterError {
    /// Displays an [`UnknownConverterError`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "unknown converter `{}` (expected `library` or `fallback`)",
            self.0
        )
    }
}

impl std::error::Error for UnknownConverterError {}

/// Converts Markdown with `pulldown-cmark`.
#[cfg(feature = "pulldown")]
pub struct LibraryConverter;

#[cfg(feature = "pulldown")]
impl Converter for LibraryConverter {
    fn to_html(&self, markdown: &str) -> String {
        use pulldown_cmark::{html, Options, Parser};

        let mut options = Options::empty();
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);

        let mut html_out = String::new();
        html::push_html(&mut html_out, Parser::new_ext(markdown, options));
        html_out
    }
}

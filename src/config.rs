//! Loads the build [`Config`]: built-in defaults, optionally refined by a
//! `postsplice.yaml` project file and then by command-line overrides.

use crate::markdown::ConverterKind;
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// The name of the project file looked up in the working directory.
pub const PROJECT_FILE: &str = "postsplice.yaml";

const DEFAULT_POSTS_DIRECTORY: &str = "posts";
const DEFAULT_INDEX_FILE: &str = "index.html";

#[derive(Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct Project {
    #[serde(default)]
    posts_directory: Option<PathBuf>,

    #[serde(default)]
    index_file: Option<PathBuf>,

    #[serde(default)]
    converter: Option<ConverterKind>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The directory whose `.md` files are the posts.
    pub posts_directory: PathBuf,

    /// The HTML file whose posts section gets rewritten.
    pub index_file: PathBuf,

    /// The requested Markdown strategy. See [`ConverterKind::resolve`] for
    /// the one actually used.
    pub converter: ConverterKind,
}

impl Config {
    /// The configuration for a project rooted at `dir` without a project
    /// file.
    pub fn defaults(dir: &Path) -> Config {
        Config {
            posts_directory: dir.join(DEFAULT_POSTS_DIRECTORY),
            index_file: dir.join(DEFAULT_INDEX_FILE),
            converter: ConverterKind::default(),
        }
    }

    /// Loads `{dir}/postsplice.yaml` if it exists, else falls back to
    /// [`Config::defaults`].
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.is_file() {
            Config::from_project_file(&path)
        } else {
            Ok(Config::defaults(dir))
        }
    }

    /// Loads the project file at `path`. Relative paths in the file are
    /// resolved against the file's directory.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let project_root = path.parent().ok_or_else(|| {
            anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )
        })?;
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let project: Project = if contents.trim().is_empty() {
            Project::default()
        } else {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Loading configuration from `{}`", path.display()))?
        };

        let defaults = Config::defaults(project_root);
        Ok(Config {
            posts_directory: project
                .posts_directory
                .map_or(defaults.posts_directory, |p| project_root.join(p)),
            index_file: project
                .index_file
                .map_or(defaults.index_file, |p| project_root.join(p)),
            converter: project.converter.unwrap_or(defaults.converter),
        })
    }

    /// Applies command-line overrides. Paths are taken as given.
    pub fn with_overrides(
        mut self,
        posts_directory: Option<PathBuf>,
        index_file: Option<PathBuf>,
        converter: Option<ConverterKind>,
    ) -> Config {
        if let Some(posts_directory) = posts_directory {
            self.posts_directory = posts_directory;
        }
        if let Some(index_file) = index_file {
            self.index_file = index_file;
        }
        if let Some(converter) = converter {
            self.converter = converter;
        }
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_without_project_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config = Config::from_directory(dir.path())?;
        assert_eq!(dir.path().join("posts"), config.posts_directory);
        assert_eq!(dir.path().join("index.html"), config.index_file);
        assert_eq!(ConverterKind::available(), config.converter);
        Ok(())
    }

    #[test]
    fn test_project_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join(PROJECT_FILE),
            "posts_directory: content/posts\nconverter: fallback\n",
        )?;

        let config = Config::from_directory(dir.path())?;
        assert_eq!(dir.path().join("content/posts"), config.posts_directory);
        assert_eq!(dir.path().join("index.html"), config.index_file);
        assert_eq!(ConverterKind::Fallback, config.converter);
        Ok(())
    }

    #[test]
    fn test_empty_project_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(PROJECT_FILE), "")?;
        assert_eq!(Config::defaults(dir.path()), Config::from_directory(dir.path())?);
        Ok(())
    }

    #[test]
    fn test_malformed_project_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(PROJECT_FILE), "converter: markdown-it\n")?;
        assert!(Config::from_directory(dir.path()).is_err());

        fs::write(dir.path().join(PROJECT_FILE), "post_dir: typo\n")?;
        assert!(Config::from_directory(dir.path()).is_err());
        Ok(())
    }

    #[test]
    fn test_missing_explicit_project_file() {
        assert!(Config::from_project_file(Path::new("./testdata/nope.yaml")).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::defaults(Path::new("site")).with_overrides(
            Some(PathBuf::from("drafts")),
            None,
            Some(ConverterKind::Fallback),
        );
        assert_eq!(PathBuf::from("drafts"), config.posts_directory);
        assert_eq!(PathBuf::from("site/index.html"), config.index_file);
        assert_eq!(ConverterKind::Fallback, config.converter);
    }
}

//! Inputs to config location: what is being asked for, where to look, and
//! which file format to expect.

use std::fmt;
use std::path::{Path, PathBuf};

/// One directory pattern probed at every ancestor level.
///
/// For an ancestor directory `dir`, the candidate directory is:
///
/// | Root | Candidate directory |
/// |------|---------------------|
/// | `Here` | `dir` |
/// | `Nested(&["config", "app"])` | `dir/config/app/<app>` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchRoot {
    /// The ancestor directory itself (the `.` fragment).
    ///
    /// No `<app>` directory is appended, so the file sits at
    /// `<dir>/<app>.<env>.<ext>`. Layouts that keep it in `<dir>/<app>/`
    /// instead can use `Nested(&[])`.
    Here,
    /// A relative fragment below the ancestor, followed by an `<app>` directory.
    Nested(&'static [&'static str]),
}

impl SearchRoot {
    /// The directory this root points at, for a given ancestor level and app.
    pub fn dir_for(&self, level: &Path, app: &str) -> PathBuf {
        match self {
            SearchRoot::Here => level.to_path_buf(),
            SearchRoot::Nested(fragment) => {
                let mut dir = level.to_path_buf();
                dir.extend(fragment.iter());
                dir.push(app);
                dir
            }
        }
    }
}

impl fmt::Display for SearchRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchRoot::Here => write!(f, "."),
            SearchRoot::Nested(fragment) => write!(f, "{}", fragment.join("/")),
        }
    }
}

/// Search roots in priority order. Every level tries these before ascending.
pub const DEFAULT_SEARCH_ROOTS: &[SearchRoot] = &[
    SearchRoot::Here,
    SearchRoot::Nested(&["config", "app"]),
    SearchRoot::Nested(&["common", "config", "app"]),
];

/// Structured text format of a config file. Determines both the file
/// extension and the parser used to read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    #[default]
    Toml,
    Json,
}

impl ConfigFormat {
    /// The format assumed when the caller doesn't choose one.
    pub const DEFAULT: ConfigFormat = ConfigFormat::Toml;

    /// File extension, without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

/// What the caller wants located.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorRequest {
    pub app: String,
    pub env: String,
    /// When set (and non-empty), used verbatim and no search happens.
    pub explicit_path: Option<PathBuf>,
}

impl LocatorRequest {
    pub fn new(app: &str, env: &str) -> Self {
        Self {
            app: app.to_string(),
            env: env.to_string(),
            explicit_path: None,
        }
    }

    pub fn with_explicit_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_path = Some(path.into());
        self
    }

    /// The explicit path, if one was given and it isn't empty.
    pub fn explicit(&self) -> Option<&Path> {
        self.explicit_path
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

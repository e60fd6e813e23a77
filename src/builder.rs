use std::path::{Path, PathBuf};

use confique::Config;
use serde::Deserialize;
use toml::Value;

use crate::error::AppfigError;
use crate::locate;
use crate::store::{self, ConfigReader, ConfigStore};
use crate::types::{ConfigFormat, DEFAULT_SEARCH_ROOTS, LocatorRequest, SearchRoot};

/// Locates a config file and hands it to a [`ConfigReader`].
pub trait Loader {
    /// Returns the path that was read.
    fn load_into(&self, reader: &mut dyn ConfigReader) -> Result<PathBuf, AppfigError>;
}

/// Entry point for locating and loading an app's config file.
pub struct Appfig;

impl Appfig {
    pub fn builder() -> AppfigBuilder {
        AppfigBuilder::new()
    }
}

/// Builder describing which config file to find and how to read it.
///
/// `app` and `env` are required. Everything else has a default:
///
/// - **format**: [`ConfigFormat::DEFAULT`] (TOML).
/// - **search roots**: [`DEFAULT_SEARCH_ROOTS`].
/// - **start directory**: the current working directory.
///
/// Setting [`config_file()`](Self::config_file) bypasses the search entirely.
#[derive(Debug, Clone)]
pub struct AppfigBuilder {
    app: Option<String>,
    env: Option<String>,
    config_file: Option<PathBuf>,
    format: ConfigFormat,
    search_roots: Option<Vec<SearchRoot>>,
    start_dir: Option<PathBuf>,
}

impl AppfigBuilder {
    fn new() -> Self {
        Self {
            app: None,
            env: None,
            config_file: None,
            format: ConfigFormat::DEFAULT,
            search_roots: None,
            start_dir: None,
        }
    }

    /// Application name: the file name prefix and the `<app>` directory segment.
    pub fn app(mut self, name: &str) -> Self {
        self.app = Some(name.to_string());
        self
    }

    /// Deployment environment, e.g. `"test"` or `"prod"`.
    pub fn env(mut self, env: &str) -> Self {
        self.env = Some(env.to_string());
        self
    }

    /// Use this file instead of searching. Not checked for existence until load.
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    pub fn format(mut self, format: ConfigFormat) -> Self {
        self.format = format;
        self
    }

    /// Replace the search roots. Order is priority order.
    pub fn search_roots(mut self, roots: Vec<SearchRoot>) -> Self {
        self.search_roots = Some(roots);
        self
    }

    /// Start the upward walk here instead of the working directory.
    pub fn start_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.start_dir = Some(dir.into());
        self
    }

    /// The request this builder describes, or an error if `app`/`env` are missing.
    pub fn request(&self) -> Result<LocatorRequest, AppfigError> {
        let app = self.app.as_deref().ok_or(AppfigError::AppNameRequired)?;
        let env = self.env.as_deref().ok_or(AppfigError::EnvRequired)?;
        let mut request = LocatorRequest::new(app, env);
        request.explicit_path = self.config_file.clone();
        Ok(request)
    }

    fn effective_search_roots(&self) -> &[SearchRoot] {
        self.search_roots.as_deref().unwrap_or(DEFAULT_SEARCH_ROOTS)
    }

    /// Resolve the config file path without reading it.
    pub fn locate(&self) -> Result<PathBuf, AppfigError> {
        let request = self.request()?;
        locate::resolve_with(
            &request,
            self.format,
            self.start_dir.as_deref(),
            self.effective_search_roots(),
        )
    }

    /// Locate the file and parse it into a fresh [`ConfigStore`].
    pub fn load(&self) -> Result<ConfigStore, AppfigError> {
        let mut store = ConfigStore::new();
        self.load_into(&mut store)?;
        Ok(store)
    }

    /// Locate the file and load it into a typed confique config.
    ///
    /// Keys missing from the file fall back to the struct's
    /// `#[config(default = ...)]` values.
    pub fn load_config<C: Config>(&self) -> Result<C, AppfigError>
    where
        C::Layer: for<'de> Deserialize<'de>,
    {
        let path = self.locate()?;
        let layer: C::Layer = read_layer(&path, self.format)?;
        C::builder()
            .preloaded(layer)
            .load()
            .map_err(AppfigError::from)
    }
}

impl Loader for AppfigBuilder {
    fn load_into(&self, reader: &mut dyn ConfigReader) -> Result<PathBuf, AppfigError> {
        let path = self.locate()?;
        reader.read(&path, self.format)?;
        Ok(path)
    }
}

fn read_layer<L>(path: &Path, format: ConfigFormat) -> Result<L, AppfigError>
where
    L: for<'de> Deserialize<'de>,
{
    let content = std::fs::read_to_string(path).map_err(|e| AppfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let table = store::parse_table(&content, path, format)?;
    Value::Table(table)
        .try_into()
        .map_err(|e: toml::de::Error| AppfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
}

//! Find and load an application's per-environment config file.
//!
//! Appfig looks for a file named `<app>.<env>.toml` by walking up from the
//! current working directory, probing a few conventional layouts at each
//! level, and parses the first one it finds into a key/value store.
//!
//! ```ignore
//! let store = Appfig::builder()
//!     .app("billing")
//!     .env("prod")
//!     .load()?;
//!
//! let url = store.get_str("database.url");
//! ```
//!
//! # Search layout
//!
//! At every directory from the working directory up to the filesystem root,
//! these candidates are tried in order:
//!
//! ```text
//! <dir>/<app>.<env>.toml
//! <dir>/config/app/<app>/<app>.<env>.toml
//! <dir>/common/config/app/<app>/<app>.<env>.toml
//! ```
//!
//! All three are tried at one level before moving to the parent, and the first
//! file that exists wins. A service nested deep inside a monorepo therefore
//! picks up its own config before a shared one further up.
//!
//! The roots live in [`DEFAULT_SEARCH_ROOTS`]; pass a different list with
//! [`search_roots()`](AppfigBuilder::search_roots).
//!
//! # Explicit paths
//!
//! [`config_file()`](AppfigBuilder::config_file) skips the search. The path
//! is used exactly as given: it isn't checked during location, so a bad path
//! surfaces as [`AppfigError::IoError`] when the file is read.
//!
//! # Reading
//!
//! Location and parsing are separate. [`AppfigBuilder::locate`] only returns
//! a path. [`Loader::load_into`] passes that path to any [`ConfigReader`];
//! [`ConfigStore`] is the built-in one. Errors from the reader are returned
//! as-is.
//!
//! For typed access there are two routes:
//!
//! - [`ConfigStore::unmarshal`] deserializes the store into any serde type.
//! - [`AppfigBuilder::load_config`] loads a [confique](https://docs.rs/confique)
//!   struct, so keys missing from the file fall back to
//!   `#[config(default = ...)]` values.
//!
//! # Formats
//!
//! TOML by default. [`ConfigFormat::Json`] switches both the extension and the
//! parser.
//!
//! # Errors
//!
//! Everything returns [`AppfigError`]. Not finding a file is an ordinary
//! [`ConfigDirNotFound`](AppfigError::ConfigDirNotFound) value carrying the app
//! and env that were asked for. Filesystem errors while probing (permissions,
//! mostly) count as a miss and the walk keeps going.
//!
//! # Logging
//!
//! Appfig emits [`tracing`](https://docs.rs/tracing) events: `trace` for each
//! probe, `debug` for the resolved path. Install a subscriber to see them.

pub mod error;
pub mod types;

mod builder;
mod locate;
mod store;

#[cfg(test)]
mod fixtures;

pub use builder::{Appfig, AppfigBuilder, Loader};
pub use error::AppfigError;
pub use locate::{
    config_file_name, find_config_dir, find_config_dir_in, is_filesystem_root, resolve,
    resolve_from,
};
pub use store::{ConfigReader, ConfigStore};
pub use types::{ConfigFormat, DEFAULT_SEARCH_ROOTS, LocatorRequest, SearchRoot};

//! Config file location: build the file name and walk up to find it.
//!
//! The file is always named `<app>.<env>.<ext>`. Starting at the working
//! directory, each [`SearchRoot`] is probed in order; if none of them holds the
//! file, the walk moves to the parent directory and tries again, all the way to
//! the filesystem root. The first hit wins.
//!
//! ```text
//! <dir>/<app>.<env>.toml
//! <dir>/config/app/<app>/<app>.<env>.toml
//! <dir>/common/config/app/<app>/<app>.<env>.toml
//! <dir>/../<app>.<env>.toml
//! ...
//! ```
//!
//! Nothing is cached. Every call re-probes the filesystem.

use std::path::{Component, Path, PathBuf};

use crate::error::AppfigError;
use crate::types::{ConfigFormat, DEFAULT_SEARCH_ROOTS, LocatorRequest, SearchRoot};

/// The conventional config file name: `<app>.<env>.<ext>`.
pub fn config_file_name(app: &str, env: &str, format: ConfigFormat) -> String {
    [app, env, format.extension()].join(".")
}

/// Resolve the config file for `request`, searching from the working directory.
///
/// A non-empty explicit path is returned as-is, without checking that it exists.
pub fn resolve(request: &LocatorRequest, format: ConfigFormat) -> Result<PathBuf, AppfigError> {
    resolve_with(request, format, None, DEFAULT_SEARCH_ROOTS)
}

/// Like [`resolve`] but starting the walk at `start` instead of the working directory.
pub fn resolve_from(
    request: &LocatorRequest,
    format: ConfigFormat,
    start: &Path,
) -> Result<PathBuf, AppfigError> {
    resolve_with(request, format, Some(start), DEFAULT_SEARCH_ROOTS)
}

/// Shared implementation behind [`resolve`], [`resolve_from`] and the builder.
pub(crate) fn resolve_with(
    request: &LocatorRequest,
    format: ConfigFormat,
    start: Option<&Path>,
    roots: &[SearchRoot],
) -> Result<PathBuf, AppfigError> {
    if let Some(path) = request.explicit() {
        tracing::debug!("using explicit config file {}", path.display());
        return Ok(path.to_path_buf());
    }

    let file_name = config_file_name(&request.app, &request.env, format);
    let dir = match start {
        Some(start) => find_config_dir_in(start, roots, &request.app, &file_name),
        None => find_config_dir(&request.app, &file_name),
    };

    match dir {
        Some(dir) => {
            let path = dir.join(&file_name);
            tracing::debug!("resolved config file {}", path.display());
            Ok(path)
        }
        None => Err(AppfigError::ConfigDirNotFound {
            app: request.app.clone(),
            env: request.env.clone(),
        }),
    }
}

/// Find the directory holding `file_name`, walking up from the working directory
/// with [`DEFAULT_SEARCH_ROOTS`].
///
/// Returns `None` when nothing matches up to the filesystem root, or when the
/// working directory can't be determined.
pub fn find_config_dir(app: &str, file_name: &str) -> Option<PathBuf> {
    let Ok(cwd) = std::env::current_dir() else {
        return None;
    };
    find_config_dir_in(&cwd, DEFAULT_SEARCH_ROOTS, app, file_name)
}

/// Like [`find_config_dir`] but with an explicit start directory and root list.
///
/// A relative `start` is taken relative to the working directory.
pub fn find_config_dir_in(
    start: &Path,
    roots: &[SearchRoot],
    app: &str,
    file_name: &str,
) -> Option<PathBuf> {
    let mut level = clean(&std::path::absolute(start).ok()?);

    loop {
        for root in roots {
            let dir = root.dir_for(&level, app);
            if probe(&dir.join(file_name)) {
                return Some(dir);
            }
        }

        if is_filesystem_root(&level) {
            return None;
        }

        match level.parent() {
            Some(parent) => level = parent.to_path_buf(),
            None => return None,
        }
    }
}

/// Lexically drop `.` and fold `..` into its parent, so the walk only ever
/// moves up. `..` at the root stays at the root.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Existence check for one candidate. Errors count as a miss.
fn probe(candidate: &Path) -> bool {
    tracing::trace!("probing {}", candidate.display());
    match candidate.try_exists() {
        Ok(found) => found,
        Err(e) => {
            tracing::debug!("skipping {}: {}", candidate.display(), e);
            false
        }
    }
}

/// Whether `path` is the top of its filesystem (`/`, `C:\`, `\\server\share\`).
#[cfg(windows)]
pub fn is_filesystem_root(path: &Path) -> bool {
    path.parent().is_none()
        || path
            .components()
            .all(|c| matches!(c, Component::Prefix(_) | Component::RootDir))
}

/// Whether `path` is the top of its filesystem (`/`).
#[cfg(not(windows))]
pub fn is_filesystem_root(path: &Path) -> bool {
    path.parent().is_none()
}

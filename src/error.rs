use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppfigError {
    #[error("config dir not found, app: {app}, env: {env}")]
    ConfigDirNotFound { app: String, env: String },

    #[error("Failed to parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    JsonParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] confique::Error),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("App name is required — call .app() on the builder")]
    AppNameRequired,

    #[error("Environment is required — call .env() on the builder")]
    EnvRequired,
}

//! Error types for the nageru library
//!
//! Library errors are a `thiserror` enum; the binary adds context with
//! `anyhow` on top.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the nageru library
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the nageru library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The current user's home directory cannot be determined
    #[error("unable to find home directory")]
    HomeDirNotFound,

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A config file exists but does not hold a valid record
    #[error("Invalid config file {path}: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    /// TOML serialization error
    #[error("TOML error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// File not found
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Directory archiving failed
    #[error("Failed to archive {path}: {reason}")]
    Archive { path: PathBuf, reason: String },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Slack API rejected a call
    #[error("Slack API error ({method}): {message}")]
    Slack { method: String, message: String },

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a new invalid config error
    pub fn invalid_config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Creates a new archive error
    pub fn archive(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Archive {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a new Slack API error for the given API method
    pub fn slack(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Slack {
            method: method.into(),
            message: message.into(),
        }
    }
}

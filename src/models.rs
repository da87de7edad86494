//! Data models for the nageru library
//!
//! This module contains the persisted configuration record, the immutable
//! per-run options and the upload request handed to the Slack client.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persisted configuration record
///
/// Stored as TOML. The on-disk keys are `SlackToken` and `Channels`;
/// snake_case spellings are accepted when reading.
///
/// ```toml
/// SlackToken = "xoxb-..."
/// Channels = ["general", "eng"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Slack token allowed to upload files
    #[serde(rename = "SlackToken", alias = "slack_token", alias = "token")]
    pub slack_token: String,
    /// Channels a file is shared to when `--channel` is not given
    #[serde(rename = "Channels", alias = "channels", default)]
    pub channels: Vec<String>,
}

impl Config {
    /// Creates a new configuration with explicit values
    pub fn new(slack_token: impl Into<String>, channels: Vec<String>) -> Self {
        Self {
            slack_token: slack_token.into(),
            channels,
        }
    }

    /// Parses a TOML document into a validated configuration
    ///
    /// # Errors
    ///
    /// Returns the parser or validation message so callers can attach the
    /// path they read it from.
    pub fn from_toml(content: &str) -> std::result::Result<Self, String> {
        let config: Config = toml::from_str(content).map_err(|e| e.message().to_string())?;
        config.validate().map_err(|e| match e {
            Error::Config { message } => message,
            other => other.to_string(),
        })?;
        Ok(config)
    }

    /// Serializes the configuration to TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The Slack token is empty
    /// - A default channel is blank
    pub fn validate(&self) -> Result<()> {
        if self.slack_token.trim().is_empty() {
            return Err(Error::config("Slack token cannot be empty"));
        }

        if self.channels.iter().any(|c| c.trim().is_empty()) {
            return Err(Error::config("channel names cannot be blank"));
        }

        Ok(())
    }
}

/// Options for a single run, built once from the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Config file to import over the canonical one before loading
    pub config_import: Option<PathBuf>,
    /// Initial comment posted with the file
    pub message: Option<String>,
    /// Single channel replacing the configured defaults
    pub channel: Option<String>,
    /// Title of the uploaded file
    pub title: Option<String>,
    /// File or directory to upload; `None` reads standard input
    pub file: Option<PathBuf>,
    /// Keep the buffered stdin file or zip archive after the run
    pub keep_temp: bool,
}

/// A single file upload, ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub channels: Vec<String>,
    pub filename: String,
    pub comment: Option<String>,
    pub title: Option<String>,
    pub content: Vec<u8>,
}

/// What the remote side reported back after a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub file_id: String,
    pub filename: String,
    pub channels: Vec<String>,
}

/// Picks the channels a file goes to.
///
/// An explicit channel replaces the defaults entirely.
pub fn resolve_channels(explicit: Option<&str>, defaults: &[String]) -> Vec<String> {
    match explicit {
        Some(channel) => vec![channel.to_string()],
        None => defaults.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = Config::new("xoxb-token", vec!["general".to_string()]);

        assert_eq!(config.slack_token, "xoxb-token");
        assert_eq!(config.channels, vec!["general".to_string()]);
    }

    #[test]
    fn test_config_validation() {
        let valid = Config::new("xoxb-token", vec![]);
        assert!(valid.validate().is_ok());

        let empty_token = Config::new("  ", vec!["general".to_string()]);
        assert!(empty_token.validate().is_err());

        let blank_channel = Config::new("xoxb-token", vec!["".to_string()]);
        assert!(blank_channel.validate().is_err());
    }

    #[test]
    fn test_config_serialization_keys() {
        let config = Config::new("xoxb-token", vec!["general".to_string(), "eng".to_string()]);

        let toml = config.to_toml().unwrap();
        assert!(toml.contains("SlackToken = \"xoxb-token\""));
        assert!(toml.contains("Channels = ["));

        let parsed = Config::from_toml(&toml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_config_accepts_snake_case_keys() {
        let parsed = Config::from_toml("slack_token = \"abc\"\nchannels = [\"dev\"]\n").unwrap();
        assert_eq!(parsed.slack_token, "abc");
        assert_eq!(parsed.channels, vec!["dev".to_string()]);
    }

    #[test]
    fn test_config_channels_default_to_empty() {
        let parsed = Config::from_toml("SlackToken = \"abc\"\n").unwrap();
        assert!(parsed.channels.is_empty());
    }

    #[test]
    fn test_config_rejects_malformed() {
        assert!(Config::from_toml("SlackToken = ").is_err());
        assert!(Config::from_toml("Channels = [\"general\"]\n").is_err());
        assert!(Config::from_toml("SlackToken = 42\n").is_err());

        let reason = Config::from_toml("SlackToken = \"\"\n").unwrap_err();
        assert!(reason.contains("empty"));
    }

    #[test]
    fn test_resolve_channels_explicit_wins() {
        let defaults = vec!["general".to_string(), "eng".to_string()];
        assert_eq!(resolve_channels(Some("foo"), &defaults), vec!["foo".to_string()]);
        assert_eq!(resolve_channels(Some("foo"), &[]), vec!["foo".to_string()]);
    }

    #[test]
    fn test_resolve_channels_defaults() {
        let defaults = vec!["general".to_string(), "eng".to_string()];
        assert_eq!(resolve_channels(None, &defaults), defaults);
        assert!(resolve_channels(None, &[]).is_empty());
    }
}

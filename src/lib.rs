//! nageru: throw files into Slack
//!
//! A library behind the `nageru` command, which uploads a file, a zipped
//! directory or piped standard input to Slack channels using a token and
//! default channels stored in `~/.config/nageru/config.toml`.
//!
//! ## Features
//!
//! - Upload a single file with an optional comment and title
//! - Zip a directory on the fly and upload the archive
//! - Upload whatever is piped into standard input
//! - Create the config interactively on first run, or import one with `--config`
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nageru::{Nageru, Result, UploadOptions};
//! use nageru::config::{ConfigStore, TerminalPrompt};
//! use nageru::slack::SlackClient;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<()> {
//!     let nageru = Nageru::new(ConfigStore::locate()?, SlackClient::new());
//!     let options = UploadOptions {
//!         file: Some("report.pdf".into()),
//!         channel: Some("C0123456789".to_string()),
//!         ..Default::default()
//!     };
//!
//!     nageru.run(&options, &mut TerminalPrompt, std::io::stdin()).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod output;
pub mod slack;

pub use error::{Error, Result};
pub use models::{Config, UploadOptions, UploadReceipt, UploadRequest};

use config::{ConfigStore, CredentialProvider};
use input::{InputKind, InputResolver};
use output::{FORMATTER, OutputFormatter, UploadFormatter};
use slack::FileUploader;
use std::io::Read;
use std::path::PathBuf;
use tracing::info;

/// One upload run: config, input resolution and the upload call
pub struct Nageru<U> {
    store: ConfigStore,
    uploader: U,
    temp_dir: PathBuf,
}

impl<U: FileUploader> Nageru<U> {
    /// Creates a runner storing generated files in the system temp directory
    pub fn new(store: ConfigStore, uploader: U) -> Self {
        Self {
            store,
            uploader,
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Uses `temp_dir` for the stdin copy and zip archives
    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// The config store this runner reads from
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// The uploader this runner sends to
    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    /// Uploads one file according to `options`
    ///
    /// Steps run strictly in order and the first failure ends the run:
    /// config import, config load (asking `credentials` on first run), input
    /// resolution, channel resolution, upload. Generated files are removed
    /// when this returns unless `keep_temp` is set.
    ///
    /// # Arguments
    ///
    /// * `options` - Parsed command-line options
    /// * `credentials` - Answers the first-run questions
    /// * `stdin` - Upload content when no file is given
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails; no upload is attempted after a
    /// failed step.
    pub async fn run(
        &self,
        options: &UploadOptions,
        credentials: &mut impl CredentialProvider,
        stdin: impl Read,
    ) -> Result<UploadReceipt> {
        if let Some(source) = &options.config_import {
            self.store.import(source)?;
        }

        if !self.store.exists() {
            FORMATTER.print_info(&FORMATTER.format_first_run(self.store.path()));
        }
        let config = self.store.load(credentials)?;

        let resolver = InputResolver::new(self.temp_dir.clone()).keep_temp(options.keep_temp);
        let mut input = resolver.resolve(options.file.as_deref(), stdin)?;
        if options.keep_temp && input.kind() != InputKind::File {
            FORMATTER.print_info(&FORMATTER.format_kept_file(input.path()));
        }

        let channels = models::resolve_channels(options.channel.as_deref(), &config.channels);
        if channels.is_empty() {
            return Err(Error::config(format!(
                "no channel to upload to: pass --channel or add Channels to {}",
                self.store.path().display()
            )));
        }

        let request = UploadRequest {
            channels,
            filename: input.display_name(),
            comment: options.message.clone(),
            title: options.title.clone(),
            content: input.read_content()?,
        };
        info!(
            "Uploading {} ({} bytes)",
            request.filename,
            request.content.len()
        );
        FORMATTER.print_progress(&FORMATTER.format_uploading(&request.filename, &request.channels));

        self.uploader.upload(&config.slack_token, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LinePrompt;
    use std::io::{self, Cursor};
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingUploader {
        calls: Mutex<Vec<(String, UploadRequest)>>,
    }

    #[async_trait::async_trait]
    impl FileUploader for RecordingUploader {
        async fn upload(&self, token: &str, request: UploadRequest) -> Result<UploadReceipt> {
            let receipt = UploadReceipt {
                file_id: "F1".to_string(),
                filename: request.filename.clone(),
                channels: request.channels.clone(),
            };
            self.calls
                .lock()
                .unwrap()
                .push((token.to_string(), request));
            Ok(receipt)
        }
    }

    struct FailingUploader;

    #[async_trait::async_trait]
    impl FileUploader for FailingUploader {
        async fn upload(&self, _token: &str, _request: UploadRequest) -> Result<UploadReceipt> {
            Err(Error::slack("files.completeUploadExternal", "channel_not_found"))
        }
    }

    fn no_answers() -> LinePrompt<Cursor<Vec<u8>>, Vec<u8>> {
        LinePrompt::new(Cursor::new(Vec::new()), Vec::new())
    }

    #[tokio::test]
    async fn test_run_uploads_stdin_with_configured_channels() {
        let home = TempDir::new().unwrap();
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::with_dir(home.path()).unwrap();
        store
            .save(&Config::new(
                "xoxb-token",
                vec!["general".to_string(), "eng".to_string()],
            ))
            .unwrap();

        let nageru = Nageru::new(store, RecordingUploader::default()).with_temp_dir(temp.path());
        let options = UploadOptions {
            message: Some("fyi".to_string()),
            ..Default::default()
        };

        let receipt = nageru
            .run(&options, &mut no_answers(), Cursor::new(b"hello".to_vec()))
            .await
            .unwrap();
        assert_eq!(receipt.channels, vec!["general".to_string(), "eng".to_string()]);

        let calls = nageru.uploader().calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (token, request) = &calls[0];
        assert_eq!(token, "xoxb-token");
        assert_eq!(request.content, b"hello");
        assert_eq!(request.comment.as_deref(), Some("fyi"));
        assert!(request.title.is_none());

        // The stdin copy is gone once the run is over
        assert!(fs_is_empty(temp.path()));
    }

    #[tokio::test]
    async fn test_run_without_channels_fails_before_upload() {
        let home = TempDir::new().unwrap();
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::with_dir(home.path()).unwrap();
        store.save(&Config::new("xoxb-token", vec![])).unwrap();

        let nageru = Nageru::new(store, RecordingUploader::default()).with_temp_dir(temp.path());
        let result = nageru
            .run(&UploadOptions::default(), &mut no_answers(), io::empty())
            .await;

        assert!(matches!(result, Err(Error::Config { .. })));
        assert!(nageru.uploader().calls.lock().unwrap().is_empty());
        assert!(fs_is_empty(temp.path()));
    }

    #[tokio::test]
    async fn test_failed_upload_removes_stdin_copy() {
        let home = TempDir::new().unwrap();
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::with_dir(home.path()).unwrap();
        store.save(&Config::new("xoxb-token", vec!["C01".to_string()])).unwrap();

        let nageru = Nageru::new(store, FailingUploader).with_temp_dir(temp.path());
        let result = nageru
            .run(
                &UploadOptions::default(),
                &mut no_answers(),
                Cursor::new(b"log line".to_vec()),
            )
            .await;

        assert!(matches!(result, Err(Error::Slack { .. })));
        assert!(fs_is_empty(temp.path()));
    }

    #[tokio::test]
    async fn test_failed_upload_removes_archive() {
        let home = TempDir::new().unwrap();
        let temp = TempDir::new().unwrap();
        let source = TempDir::new().unwrap();
        let photos = source.path().join("photos");
        std::fs::create_dir(&photos).unwrap();
        std::fs::write(photos.join("cat.jpg"), b"meow").unwrap();

        let store = ConfigStore::with_dir(home.path()).unwrap();
        store.save(&Config::new("xoxb-token", vec!["C01".to_string()])).unwrap();

        let nageru = Nageru::new(store, FailingUploader).with_temp_dir(temp.path());
        let options = UploadOptions {
            file: Some(photos.clone()),
            ..Default::default()
        };
        let result = nageru.run(&options, &mut no_answers(), io::empty()).await;

        assert!(matches!(result, Err(Error::Slack { .. })));
        assert!(fs_is_empty(temp.path()));
        assert!(photos.join("cat.jpg").exists());
    }

    fn fs_is_empty(path: &std::path::Path) -> bool {
        std::fs::read_dir(path).unwrap().next().is_none()
    }
}

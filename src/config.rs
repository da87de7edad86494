//! Per-user configuration storage
//!
//! The configuration lives at `~/.config/nageru/config.toml`. It is read on
//! every run, replaced wholesale by `--config`, and created interactively the
//! first time nageru runs without one.

use crate::error::{Error, Result};
use crate::models::Config;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Directory under the home directory holding the config file
pub const CONFIG_DIR: &str = ".config/nageru";

/// Name of the config file inside [`CONFIG_DIR`]
pub const CONFIG_FILE: &str = "config.toml";

/// Source of answers for the first-run setup questions
pub trait CredentialProvider {
    /// Asks for a single value and returns the answer without its line ending
    fn prompt(&mut self, label: &str) -> Result<String>;
}

/// Asks on the terminal, reading answers from the process stdin
///
/// Stdin is locked per question only, so whatever follows the answers stays
/// readable as upload content.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompt;

impl CredentialProvider for TerminalPrompt {
    fn prompt(&mut self, label: &str) -> Result<String> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        ask(&mut input, &mut output, label)
    }
}

/// Asks over any reader/writer pair
#[derive(Debug)]
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Returns what was written to the output so far
    pub fn output(&self) -> &W {
        &self.output
    }
}

impl<R: BufRead, W: Write> CredentialProvider for LinePrompt<R, W> {
    fn prompt(&mut self, label: &str) -> Result<String> {
        ask(&mut self.input, &mut self.output, label)
    }
}

fn ask(input: &mut impl BufRead, output: &mut impl Write, label: &str) -> Result<String> {
    write!(output, "{}: ", label)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(Error::config(format!("no answer for {}", label)));
    }

    Ok(line.trim().to_string())
}

/// Location of the canonical configuration file
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Locates the store under the current user's home directory
    ///
    /// The config directory is created if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// directory cannot be created
    pub fn locate() -> Result<Self> {
        let home_dir = home::home_dir().ok_or(Error::HomeDirNotFound)?;
        Self::with_dir(home_dir.join(CONFIG_DIR))
    }

    /// Uses `dir` as the config directory, creating it if needed
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            path: dir.join(CONFIG_FILE),
        })
    }

    /// Path of the config file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a config file has been written
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Replaces the stored config with the file at `source`
    ///
    /// The file is validated first and then copied byte for byte. Nothing is
    /// written when validation fails.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `source` cannot be read
    /// - `source` is not a valid config record
    /// - The canonical file cannot be written
    pub fn import(&self, source: &Path) -> Result<Config> {
        let content = fs::read(source).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::file_not_found(source),
            _ => Error::Io(e),
        })?;

        let text = std::str::from_utf8(&content)
            .map_err(|e| Error::invalid_config(source, e.to_string()))?;
        let config = Config::from_toml(text).map_err(|reason| Error::invalid_config(source, reason))?;

        self.write_atomic(&content)?;
        info!(
            "Imported config from {} into {}",
            source.display(),
            self.path.display()
        );

        Ok(config)
    }

    /// Loads the stored config, running first-time setup if there is none
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The stored file is not a valid config record
    /// - The setup answers are unusable or cannot be saved
    pub fn load(&self, credentials: &mut impl CredentialProvider) -> Result<Config> {
        if !self.exists() {
            info!("No config at {}, running first-time setup", self.path.display());
            return self.bootstrap(credentials);
        }

        let content = fs::read_to_string(&self.path)?;
        let config =
            Config::from_toml(&content).map_err(|reason| Error::invalid_config(&self.path, reason))?;
        debug!(
            "Loaded config from {} with {} default channel(s)",
            self.path.display(),
            config.channels.len()
        );

        Ok(config)
    }

    /// Writes `config` to the canonical path
    pub fn save(&self, config: &Config) -> Result<()> {
        config.validate()?;
        self.write_atomic(config.to_toml()?.as_bytes())
    }

    fn bootstrap(&self, credentials: &mut impl CredentialProvider) -> Result<Config> {
        let token = credentials.prompt("Token")?;
        if token.is_empty() {
            return Err(Error::config(
                "a Slack token allowed to upload files is required",
            ));
        }

        let channel = credentials.prompt("Channel")?;
        let channels = if channel.is_empty() {
            Vec::new()
        } else {
            vec![channel]
        };

        let config = Config::new(token, channels);
        self.save(&config)?;
        info!("Saved new config to {}", self.path.display());

        Ok(config)
    }

    fn write_atomic(&self, content: &[u8]) -> Result<()> {
        let dir = self
            .path
            .parent()
            .ok_or_else(|| Error::config("config path has no parent directory"))?;

        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(content)?;
        staged.flush()?;
        staged
            .persist(&self.path)
            .map_err(|e| Error::Io(e.error))?;

        Ok(())
    }
}

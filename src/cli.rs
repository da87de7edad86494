//! Command-line interface for the nageru application
//!
//! This module handles argument parsing, logging setup and CLI-specific
//! functionality for the uploader.

use crate::models::UploadOptions;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the nageru application
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Throw a file, a directory or piped output into a Slack channel",
    long_about = "nageru uploads a file to Slack. Directories are zipped first, and without a FILE \
argument standard input is uploaded instead.

CONFIGURATION:
  The Slack token and default channels live in ~/.config/nageru/config.toml:
    SlackToken = \"xoxb-...\"
    Channels = [\"C0123456789\"]
  Channels are Slack channel IDs, not names.
  On first run nageru asks for both and writes the file.
  Use --config to replace it with another file.

EXAMPLES:
  nageru report.pdf                           # Share with the default channels
  nageru -c C0123456789 -m 'look' photo.png   # Share to one channel with a comment
  nageru ./project                       # Zip and share a directory
  make 2>&1 | nageru -t 'build log'      # Share piped output",
    color = clap::ColorChoice::Auto,
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default())
        .usage(clap::builder::styling::AnsiColor::Green.on_default())
        .literal(clap::builder::styling::AnsiColor::Green.on_default())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default())
)]
pub struct Args {
    /// File or directory to upload; reads standard input when omitted
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Config file (TOML) replacing the stored configuration
    #[arg(long = "config", value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Comment attached to the file
    #[arg(short = 'm', long = "message", value_name = "MESSAGE")]
    pub message: Option<String>,

    /// Channel ID the file is sent to, instead of the configured defaults
    #[arg(short = 'c', long = "channel", value_name = "CHANNEL")]
    pub channel: Option<String>,

    /// Title attached to the file
    #[arg(short = 't', long = "title", value_name = "TITLE")]
    pub title: Option<String>,

    /// Keep the zip archive or stdin copy after the upload
    #[arg(long = "keep-temp")]
    pub keep_temp: bool,

    /// Enable verbose logging with detailed tracing information
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Builds the options a run works from
    pub fn to_options(&self) -> UploadOptions {
        UploadOptions {
            config_import: self.config.clone(),
            message: non_blank(&self.message),
            channel: non_blank(&self.channel).map(|channel| channel.trim().to_string()),
            title: non_blank(&self.title),
            file: self.file.clone(),
            keep_temp: self.keep_temp,
        }
    }
}

/// A blank flag value counts as not given; other values are kept verbatim
fn non_blank(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.trim().is_empty())
}

/// Validates command-line arguments
///
/// Only the `--config` flag is checked here. The upload path is resolved
/// after the config import so a missing file cannot skip it.
pub fn validate_args(args: &Args) -> Result<(), String> {
    if let Some(config_file) = &args.config {
        if !config_file.exists() {
            return Err(format!(
                "Configuration file does not exist: {}",
                config_file.display()
            ));
        }
        if !config_file.is_file() {
            return Err(format!(
                "Configuration path must be a file: {}",
                config_file.display()
            ));
        }
    }

    Ok(())
}

/// Initializes logging based on the verbose flag
///
/// Logs go to stderr so piped output stays clean. `RUST_LOG` refines the
/// filter when set.
pub fn init_logging(verbose: bool) {
    if verbose {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Display startup banner with configuration information
pub fn display_banner(args: &Args) {
    if !args.verbose {
        return;
    }

    eprintln!();
    eprintln!("{}", "nageru".bright_cyan().bold());
    eprintln!("{}", "=".repeat(40).bright_black());

    match &args.file {
        Some(path) => {
            eprintln!("Source: {}", path.display().to_string().bright_white());
            eprintln!(
                "Mode: {}",
                if path.is_dir() {
                    "Directory (zipped)"
                } else {
                    "Single file"
                }
                .bright_green()
            );
        }
        None => eprintln!("Source: {}", "standard input".bright_white()),
    }

    if let Some(config_file) = &args.config {
        eprintln!(
            "Import config: {}",
            config_file.display().to_string().bright_magenta()
        );
    }

    match &args.channel {
        Some(channel) => eprintln!("Channel: {}", channel.bright_blue()),
        None => eprintln!("Channel: {}", "configured defaults".bright_blue()),
    }

    eprintln!("{}", "=".repeat(40).bright_black());
    eprintln!();
}

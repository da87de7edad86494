//! Output formatting utilities
//!
//! This module provides centralized formatting for console output to ensure
//! consistent styling across the application.

use crate::models::UploadReceipt;
use colored::*;
use std::path::Path;

/// Trait for formatting console output with consistent styling
pub trait OutputFormatter {
    /// Formats a success message with green checkmark
    fn success(&self, message: &str) -> String;

    /// Formats an error message with red X
    fn error(&self, message: &str) -> String;

    /// Formats a warning message with yellow warning symbol
    fn warning(&self, message: &str) -> String;

    /// Formats an info message with blue info symbol
    fn info(&self, message: &str) -> String;

    /// Formats a progress message with blue arrow
    fn progress(&self, message: &str) -> String;

    /// Prints a success message
    fn print_success(&self, message: &str) {
        println!("{}", self.success(message));
    }

    /// Prints an error message
    fn print_error(&self, message: &str) {
        eprintln!("{}", self.error(message));
    }

    /// Prints a warning message
    fn print_warning(&self, message: &str) {
        eprintln!("{}", self.warning(message));
    }

    /// Prints an info message
    fn print_info(&self, message: &str) {
        eprintln!("{}", self.info(message));
    }

    /// Prints a progress message
    fn print_progress(&self, message: &str) {
        eprintln!("{}", self.progress(message));
    }
}

/// Standard console output formatter with colored output
#[derive(Debug, Clone, Copy)]
pub struct ConsoleFormatter;

impl OutputFormatter for ConsoleFormatter {
    fn success(&self, message: &str) -> String {
        format!("{} {}", "✓".bright_green(), message.green())
    }

    fn error(&self, message: &str) -> String {
        format!("{} {}", "✗".bright_red(), message.red())
    }

    fn warning(&self, message: &str) -> String {
        format!("{} {}", "⚠".bright_yellow(), message.yellow())
    }

    fn info(&self, message: &str) -> String {
        format!("{} {}", "ℹ".bright_blue(), message.dimmed())
    }

    fn progress(&self, message: &str) -> String {
        format!("{} {}", "→".bright_blue(), message.bright_white())
    }
}

/// Messages about the upload itself
pub trait UploadFormatter {
    /// Formats the line printed before uploading
    fn format_uploading(&self, filename: &str, channels: &[String]) -> String;

    /// Formats an upload success message
    fn format_upload_success(&self, receipt: &UploadReceipt) -> String;

    /// Formats an upload failure message
    fn format_upload_failure(&self, error: &str) -> String;

    /// Formats the first-run notice shown before asking for credentials
    fn format_first_run(&self, config_path: &Path) -> String;

    /// Formats the notice for a kept temporary file
    fn format_kept_file(&self, path: &Path) -> String;
}

impl<T: OutputFormatter> UploadFormatter for T {
    fn format_uploading(&self, filename: &str, channels: &[String]) -> String {
        self.progress(&format!(
            "uploading {} to {}",
            filename,
            format_channels(channels)
        ))
    }

    fn format_upload_success(&self, receipt: &UploadReceipt) -> String {
        self.success(&format!(
            "uploaded: {} → {}",
            receipt.filename,
            format_channels(&receipt.channels)
        ))
    }

    fn format_upload_failure(&self, error: &str) -> String {
        self.error(&format!("failed: {}", error))
    }

    fn format_first_run(&self, config_path: &Path) -> String {
        self.info(&format!(
            "no config found at {}, enter a Slack token allowed to upload files",
            config_path.display()
        ))
    }

    fn format_kept_file(&self, path: &Path) -> String {
        self.info(&format!("kept: {}", path.display()))
    }
}

/// Channels as `#a, #b`
pub fn format_channels(channels: &[String]) -> String {
    channels
        .iter()
        .map(|c| format!("#{}", c.trim_start_matches('#')))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Global formatter instance for consistent usage across the application
pub const FORMATTER: ConsoleFormatter = ConsoleFormatter;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_console_formatter_success() {
        let formatter = ConsoleFormatter;
        let message = formatter.success("Operation completed");
        assert!(message.contains("✓"));
        assert!(message.contains("Operation completed"));
    }

    #[test]
    fn test_console_formatter_error() {
        let formatter = ConsoleFormatter;
        let message = formatter.error("Operation failed");
        assert!(message.contains("✗"));
        assert!(message.contains("Operation failed"));
    }

    #[test]
    fn test_console_formatter_warning() {
        let formatter = ConsoleFormatter;
        let message = formatter.warning("Warning message");
        assert!(message.contains("⚠"));
        assert!(message.contains("Warning message"));
    }

    #[test]
    fn test_format_channels() {
        let channels = vec!["general".to_string(), "#eng".to_string()];
        assert_eq!(format_channels(&channels), "#general, #eng");
        assert_eq!(format_channels(&[]), "");
    }

    #[test]
    fn test_upload_formatter() {
        let formatter = ConsoleFormatter;
        let receipt = UploadReceipt {
            file_id: "F123".to_string(),
            filename: "report.txt".to_string(),
            channels: vec!["general".to_string()],
        };

        let uploading = formatter.format_uploading("report.txt", &receipt.channels);
        assert!(uploading.contains("uploading"));
        assert!(uploading.contains("#general"));

        let success = formatter.format_upload_success(&receipt);
        assert!(success.contains("uploaded"));
        assert!(success.contains("report.txt"));

        let failure = formatter.format_upload_failure("invalid_auth");
        assert!(failure.contains("failed"));
        assert!(failure.contains("invalid_auth"));
    }

    #[test]
    fn test_path_messages() {
        let formatter = ConsoleFormatter;
        let path = PathBuf::from("/home/me/.config/nageru/config.toml");

        let first_run = formatter.format_first_run(&path);
        assert!(first_run.contains("config.toml"));
        assert!(first_run.contains("Slack token"));

        let kept = formatter.format_kept_file(Path::new("/tmp/project-ab.zip"));
        assert!(kept.contains("project-ab.zip"));
    }
}

//! nageru
//!
//! A command-line tool for throwing files into Slack channels.

use anyhow::{Context, Result};
use clap::Parser;
use nageru::config::{ConfigStore, TerminalPrompt};
use nageru::output::{FORMATTER, OutputFormatter, UploadFormatter};
use nageru::slack::SlackClient;
use nageru::{Nageru, cli};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = cli::Args::parse();

    // Validate arguments before anything touches the disk
    if let Err(error_msg) = cli::validate_args(&args) {
        FORMATTER.print_error(&error_msg);
        std::process::exit(1);
    }

    cli::init_logging(args.verbose);
    cli::display_banner(&args);

    if let Err(error) = run(&args).await {
        eprintln!("{}", FORMATTER.format_upload_failure(&format!("{:#}", error)));
        std::process::exit(1);
    }
}

async fn run(args: &cli::Args) -> Result<()> {
    let store = ConfigStore::locate().context("Failed to locate the config directory")?;
    let nageru = Nageru::new(store, SlackClient::new());

    let receipt = nageru
        .run(&args.to_options(), &mut TerminalPrompt, std::io::stdin())
        .await?;

    FORMATTER.print_success(&FORMATTER.format_upload_success(&receipt));
    Ok(())
}

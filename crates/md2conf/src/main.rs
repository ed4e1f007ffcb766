//! md2conf CLI - publish markdown files to Confluence.
//!
//! Converts a markdown file to Confluence storage format and creates or
//! updates the page with the same title in the given space. `--simulate`
//! prints the converted markup instead, and `--delete` removes the page.

mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::PublishArgs;
use output::Output;

/// md2conf - Markdown to Confluence publisher.
///
/// `-v/--version` selects the Confluence editor version, so clap's own
/// version flag is disabled.
#[derive(Parser)]
#[command(name = "md2conf", about, disable_version_flag = true)]
struct Cli {
    #[command(flatten)]
    publish: PublishArgs,
}

/// Translate a `--loglevel` value into a tracing filter directive.
///
/// Accepts the classic level names in any case (`WARNING` and `CRITICAL`
/// map to `warn` and `error`); anything else is used as a filter as-is.
fn log_directive(level: &str) -> String {
    match level.to_ascii_uppercase().as_str() {
        "DEBUG" => "debug".to_owned(),
        "INFO" => "info".to_owned(),
        "WARN" | "WARNING" => "warn".to_owned(),
        "ERROR" | "CRITICAL" => "error".to_owned(),
        _ => level.to_owned(),
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let filter = EnvFilter::try_new(log_directive(&cli.publish.loglevel))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli.publish.execute() {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

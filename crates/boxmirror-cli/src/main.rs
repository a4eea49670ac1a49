//! BoxMirror CLI - Mirror a Box folder tree onto the local filesystem
//!
//! ```text
//! boxmirror [OPTIONS] <FOLDER_ID> <DESTINATION>
//! ```
//!
//! Exits 0 when every item is mirrored or up to date, 1 when any item or
//! folder failed, the run was interrupted, or a fatal error occurred.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use boxmirror_core::config::Config;
use commands::download::DownloadCommand;
use output::{get_formatter, OutputFormat};

#[derive(Debug, Parser)]
#[command(
    name = "boxmirror",
    version,
    about = "Mirror a Box folder tree into a local directory"
)]
pub struct Cli {
    /// Output the summary in JSON format
    #[arg(long)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long)]
    config: Option<String>,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(flatten)]
    download: DownloadCommand,
}

/// Loads the config named on the command line, or the default one
///
/// A missing or unreadable default file falls back to defaults; an explicit
/// path must load.
fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => Config::load(Path::new(path))
            .with_context(|| format!("Failed to load config from {path}")),
        None => Ok(Config::load_or_default(&Config::default_path())),
    }
}

/// Log filter for the given flags; `RUST_LOG` takes precedence
fn log_filter(verbose: u8, quiet: bool, configured: &str) -> String {
    if quiet {
        return "warn".to_string();
    }
    match verbose {
        0 => configured.to_string(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let format = OutputFormat::from_json_flag(cli.json);
    let formatter = get_formatter(format);

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            return ExitCode::FAILURE;
        }
    };

    // Setup tracing
    let filter = log_filter(cli.verbose, cli.quiet, &config.logging.level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.download.execute(config, format).await {
        Ok(report) if report.is_clean() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            formatter.error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

//! Download command - Mirror a Box folder into a local directory
//!
//! 1. Applies command-line overrides to the loaded configuration and validates it
//! 2. Resolves the access token (config, then `BOX_ACCESS_TOKEN`)
//! 3. Creates and canonicalizes the destination directory
//! 4. Wires the Box adapter and the local filesystem into the sync engine
//! 5. Runs the engine, cancelling it on Ctrl+C, and renders the report

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use boxmirror_box::provider::BoxRemoteTree;
use boxmirror_core::config::{Config, ConfigBuilder};
use boxmirror_core::domain::RemoteId;
use boxmirror_core::ports::{ILocalFileSystem, IRemoteTree};
use boxmirror_sync::engine::{SyncReport, TreeSyncEngine};
use boxmirror_sync::filesystem::LocalFileSystemAdapter;

use crate::output::{format_duration_ms, get_formatter, plural, OutputFormat, OutputFormatter};

/// Environment variable consulted when the config carries no token
pub const ACCESS_TOKEN_ENV: &str = "BOX_ACCESS_TOKEN";

#[derive(Debug, Args)]
pub struct DownloadCommand {
    /// Box folder to mirror ("0" is the account root)
    #[arg(value_name = "FOLDER_ID")]
    pub folder_id: String,

    /// Local directory to mirror into (created if absent)
    #[arg(value_name = "DESTINATION")]
    pub destination: PathBuf,

    /// Maximum simultaneous downloads
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Skip locked files instead of unlocking them
    #[arg(long)]
    pub no_unlock: bool,
}

impl DownloadCommand {
    /// Layers the command-line flags over `config`
    pub fn apply_overrides(&self, config: Config) -> Config {
        let mut builder = ConfigBuilder::from_config(config);
        if let Some(n) = self.concurrency {
            builder = builder.sync_max_concurrent_downloads(n);
        }
        if self.no_unlock {
            builder = builder.sync_unlock_locked_files(false);
        }
        builder.build()
    }

    /// Runs the mirror and renders its report
    ///
    /// Returns the report so the caller can pick the exit status.
    pub async fn execute(&self, config: Config, format: OutputFormat) -> Result<SyncReport> {
        let formatter = get_formatter(format);

        let config = self.apply_overrides(config);
        let problems = config.validate();
        if !problems.is_empty() {
            let list: Vec<String> = problems.iter().map(ToString::to_string).collect();
            bail!("Invalid configuration: {}", list.join("; "));
        }

        let root = RemoteId::new(self.folder_id.as_str())
            .with_context(|| format!("Invalid folder id '{}'", self.folder_id))?;

        let token = resolve_token(
            config.remote.access_token.as_deref(),
            std::env::var(ACCESS_TOKEN_ENV).ok(),
        )?;

        tokio::fs::create_dir_all(&self.destination)
            .await
            .with_context(|| format!("Failed to create {}", self.destination.display()))?;
        let destination = tokio::fs::canonicalize(&self.destination)
            .await
            .with_context(|| format!("Failed to resolve {}", self.destination.display()))?;

        let remote: Arc<dyn IRemoteTree> =
            Arc::new(BoxRemoteTree::from_config(&config.remote, token));
        let local: Arc<dyn ILocalFileSystem> = Arc::new(LocalFileSystemAdapter::new());

        let cancel = CancellationToken::new();
        let engine = TreeSyncEngine::new(remote, local, &config).with_cancellation(cancel.clone());

        let signal_task = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping after the current folder");
                cancel.cancel();
            }
        });

        info!(folder = %root, destination = %destination.display(), "Mirroring");
        formatter.info(&format!(
            "Mirroring folder {} into {}",
            root,
            destination.display()
        ));

        let result = engine.run(&root, &destination).await;
        signal_task.abort();
        let report = result.context("Mirror aborted")?;

        render_report(&report, format, formatter.as_ref());
        Ok(report)
    }
}

/// Picks the configured token, falling back to the environment
fn resolve_token(configured: Option<&str>, from_env: Option<String>) -> Result<String> {
    configured
        .map(str::to_string)
        .filter(|t| !t.trim().is_empty())
        .or_else(|| from_env.filter(|t| !t.trim().is_empty()))
        .ok_or_else(|| {
            anyhow!(
                "No access token: set remote.access_token in {} or {}",
                Config::default_path().display(),
                ACCESS_TOKEN_ENV
            )
        })
}

fn render_report(report: &SyncReport, format: OutputFormat, formatter: &dyn OutputFormatter) {
    if format == OutputFormat::Json {
        match serde_json::to_value(report) {
            Ok(value) => formatter.print_json(&value),
            Err(e) => formatter.error(&format!("Failed to serialize report: {e}")),
        }
        return;
    }

    let duration = format_duration_ms(report.duration_ms);
    if report.cancelled {
        formatter.warn(&format!("Mirror cancelled after {duration}"));
    } else if report.files_downloaded == 0 && report.is_clean() {
        formatter.success("Already up to date");
    } else {
        formatter.success(&format!("Mirror completed in {duration}"));
    }

    formatter.info(&format!(
        "Folders:     {}",
        plural(report.containers_listed, "folder")
    ));
    formatter.info(&format!(
        "Downloaded:  {}",
        plural(report.files_downloaded, "item")
    ));
    formatter.info(&format!("Up to date:  {}", plural(report.up_to_date, "item")));
    if report.skipped_locked > 0 {
        formatter.info(&format!(
            "Locked:      {} skipped",
            plural(report.skipped_locked, "file")
        ));
    }

    if !report.errors.is_empty() {
        formatter.error(&format!(
            "{} failed:",
            plural(report.errors.len() as u32, "item")
        ));
        for err in &report.errors {
            formatter.info(&format!("  - {err}"));
        }
    }
}

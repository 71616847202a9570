//! # Datadog On-Call Sync Binary
//!
//! Entry point for the CI step. Configuration comes from the GitHub Actions
//! environment; a failed run is reported with an `::error::` workflow
//! command and a non-zero exit status.

use anyhow::{Context, Result};
use std::process::ExitCode;
use tracing::{error, info};

use datadog_oncall_sync::{CiEvent, DatadogClient, GitHubClient, OnCallSync, SyncConfig};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize logging with environment filter
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("datadog_oncall_sync=info".parse()?),
        )
        .init();

    match run().await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            error!("On-call sync failed: {:#}", e);
            // Marks the step as failed in the Actions UI
            println!("::error::{}", escape_workflow_data(&format!("{:#}", e)));
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn run() -> Result<()> {
    let config = SyncConfig::from_env().context("Failed to load on-call sync configuration")?;
    info!(
        "Syncing contributors for {} into monitors tagged {}",
        config.repository, config.monitor_tag
    );

    let event = CiEvent::from_path(&config.event_path)
        .await
        .context("Failed to read CI event")?;

    let github = GitHubClient::new(config.github_api_url.clone(), config.github_token.clone())
        .context("Failed to create GitHub client")?;
    let datadog = DatadogClient::new(
        config.datadog_api_url.clone(),
        config.datadog_api_key.clone(),
        config.datadog_app_key.clone(),
    )
    .context("Failed to create Datadog client")?;

    let report = OnCallSync::new(config, github, datadog)
        .run(&event)
        .await
        .context("On-call contributor sync aborted")?;

    info!(
        "Synced {} monitors with {} new contributors from {}",
        report.monitors.len(),
        report.new_contributors.len(),
        report.release.as_deref().unwrap_or("<no release>")
    );
    Ok(())
}

/// Percent-encode the characters the runner treats specially in command data
fn escape_workflow_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

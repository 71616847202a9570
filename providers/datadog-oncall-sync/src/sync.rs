//! Run loop: release -> contributors -> monitors -> merge -> write back
//!
//! Monitors are updated one at a time in the order Datadog returns them. The
//! first failure aborts the run; monitors written before it keep their new
//! message (there is no rollback).

use chrono::{DateTime, Utc};
use oncall_common::{
    extract_contributors, merge_contributors, ContributorMap, Monitor, Release, Result,
};
use tracing::{debug, info};

use crate::config::{RepositoryId, SyncConfig};
use crate::event::{CiEvent, EventKind};
use crate::formatter::format_monitor_message;
use crate::traits::{MonitorStore, ReleaseSource};

/// Find the release this run is about.
///
/// Deployment-status events look the release up by the deployment ref;
/// release events carry it; anything else yields `None`.
pub async fn resolve_release(
    event: &CiEvent,
    source: &dyn ReleaseSource,
    repository: &RepositoryId,
) -> Result<Option<Release>> {
    match event.kind()? {
        EventKind::DeploymentStatus { git_ref } => {
            info!("Looking up release for deployed ref {} in {}", git_ref, repository);
            source.release_by_tag(repository, &git_ref).await.map(Some)
        }
        EventKind::Release(release) => Ok(Some(release)),
        EventKind::Other => {
            info!("Event carries neither a release nor a deployment status");
            Ok(None)
        }
    }
}

/// Outcome for one monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorUpdate {
    pub id: i64,
    pub name: String,
    pub expired: usize,
    pub added: usize,
    pub contributors: ContributorMap,
}

/// Summary of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub release: Option<String>,
    pub new_contributors: ContributorMap,
    pub monitors: Vec<MonitorUpdate>,
}

/// On-call contributor sync over a release source and a monitor store
pub struct OnCallSync<R, M> {
    config: SyncConfig,
    releases: R,
    monitors: M,
}

impl<R: ReleaseSource, M: MonitorStore> OnCallSync<R, M> {
    pub fn new(config: SyncConfig, releases: R, monitors: M) -> Self {
        Self {
            config,
            releases,
            monitors,
        }
    }

    pub async fn run(&self, event: &CiEvent) -> Result<SyncReport> {
        self.run_at(event, Utc::now()).await
    }

    /// Run with an explicit clock reading used for both extraction and expiry
    pub async fn run_at(&self, event: &CiEvent, now: DateTime<Utc>) -> Result<SyncReport> {
        let release = resolve_release(event, &self.releases, &self.config.repository).await?;
        let new_contributors =
            extract_contributors(release.as_ref(), self.config.contributor_on_call, now)?;
        info!(
            "Found {} new contributors in {}",
            new_contributors.len(),
            release.as_ref().map(Release::label).unwrap_or("<no release>")
        );

        let monitors = self.monitors.fetch_monitors(&self.config.monitor_tag).await?;
        info!(
            "Syncing {} monitors tagged {}",
            monitors.len(),
            self.config.monitor_tag
        );

        let mut report = SyncReport {
            release: release.as_ref().map(|r| r.label().to_string()),
            new_contributors,
            monitors: Vec::with_capacity(monitors.len()),
        };

        for monitor in monitors {
            let update = self
                .sync_monitor(monitor, &report.new_contributors, now)
                .await?;
            report.monitors.push(update);
        }

        Ok(report)
    }

    async fn sync_monitor(
        &self,
        monitor: Monitor,
        new_contributors: &ContributorMap,
        now: DateTime<Utc>,
    ) -> Result<MonitorUpdate> {
        let live = monitor.contributors.without_expired(now);
        let expired = monitor.contributors.len() - live.len();
        let added = new_contributors
            .handles()
            .filter(|handle| !live.contains(handle))
            .count();
        let contributors = merge_contributors(&monitor.contributors, new_contributors, now);

        let message = format_monitor_message(
            &monitor.description,
            &contributors,
            &self.config.alert_channel,
            &self.config.slack_user_lookup,
        )?;
        debug!(
            "Monitor {} now has {} contributors ({} expired, {} added)",
            monitor.id,
            contributors.len(),
            expired,
            added
        );

        self.monitors.update_monitor(monitor.id, &message).await?;
        info!("Updated monitor '[{}] {}'", monitor.id, monitor.name);

        Ok(MonitorUpdate {
            id: monitor.id,
            name: monitor.name,
            expired,
            added,
            contributors,
        })
    }
}

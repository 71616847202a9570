//! Seams between the orchestrator and the two external services

use async_trait::async_trait;
use oncall_common::{Monitor, Release, Result};

use crate::config::RepositoryId;

/// Source-control host that can look up a release by tag
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Fetch the release published for `tag`; a tag without a release is
    /// `SyncError::NotFound`.
    async fn release_by_tag(&self, repository: &RepositoryId, tag: &str) -> Result<Release>;
}

/// Monitoring backend holding the tagged monitors
#[async_trait]
pub trait MonitorStore: Send + Sync {
    /// All monitors carrying `tag`, with their messages decoded
    async fn fetch_monitors(&self, tag: &str) -> Result<Vec<Monitor>>;

    /// Replace the monitor's message
    async fn update_monitor(&self, id: i64, message: &str) -> Result<()>;
}

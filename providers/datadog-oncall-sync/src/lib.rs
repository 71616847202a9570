//! Datadog on-call contributor sync
//!
//! Reads the CI event that triggered the run, resolves the release it refers
//! to, and attaches the contributors mentioned in its notes to every Datadog
//! monitor carrying the configured tag, each for a bounded on-call window.

pub mod config;
pub mod datadog_client;
pub mod event;
pub mod formatter;
pub mod github_client;
pub mod sync;
pub mod traits;

pub use config::{RepositoryId, SyncConfig};
pub use datadog_client::DatadogClient;
pub use event::{CiEvent, EventKind};
pub use github_client::GitHubClient;
pub use sync::{resolve_release, MonitorUpdate, OnCallSync, SyncReport};
pub use traits::{MonitorStore, ReleaseSource};

//! CI event payload reader
//!
//! Only the fields needed to find the release are decoded; the rest of the
//! webhook payload is ignored.

use oncall_common::{Release, Result, SyncError};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Raw event payload as written by the runner to `GITHUB_EVENT_PATH`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CiEvent {
    #[serde(default)]
    pub deployment_status: Option<serde_json::Value>,
    #[serde(default)]
    pub deployment: Option<Deployment>,
    #[serde(default)]
    pub release: Option<Release>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Deployment {
    #[serde(rename = "ref")]
    pub git_ref: String,
}

/// What the event tells us about the release
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// `release` event: the release is embedded
    Release(Release),
    /// `deployment_status` event: the release must be looked up by tag
    DeploymentStatus { git_ref: String },
    /// Any other trigger; no contributors this run
    Other,
}

impl CiEvent {
    pub async fn from_path(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            SyncError::decode(format!("failed to read event file {}: {}", path.display(), e))
        })?;
        debug!("Read {} bytes of event payload from {}", raw.len(), path.display());
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| SyncError::decode(format!("invalid event payload: {}", e)))
    }

    /// Classify the payload; deployment status wins when both shapes are present.
    pub fn kind(&self) -> Result<EventKind> {
        if self.deployment_status.is_some() {
            let deployment = self.deployment.as_ref().ok_or_else(|| {
                SyncError::decode("deployment_status event carries no deployment ref")
            })?;
            return Ok(EventKind::DeploymentStatus {
                git_ref: deployment.git_ref.clone(),
            });
        }

        Ok(match &self.release {
            Some(release) => EventKind::Release(release.clone()),
            None => EventKind::Other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_release_event() {
        let event =
            CiEvent::from_json(r#"{"action":"published","release":{"body":"@carol fixed it"}}"#)
                .unwrap();

        assert_eq!(
            event.kind().unwrap(),
            EventKind::Release(Release::with_body("@carol fixed it"))
        );
    }

    #[test]
    fn test_deployment_status_event() {
        let event = CiEvent::from_json(
            r#"{"deployment_status":{"state":"success"},"deployment":{"ref":"v1.2.3","sha":"abc"}}"#,
        )
        .unwrap();

        assert_eq!(
            event.kind().unwrap(),
            EventKind::DeploymentStatus {
                git_ref: "v1.2.3".to_string()
            }
        );
    }

    #[test]
    fn test_deployment_status_takes_priority() {
        let event = CiEvent::from_json(
            r#"{"deployment_status":{},"deployment":{"ref":"v2"},"release":{"body":"@x"}}"#,
        )
        .unwrap();

        assert!(matches!(
            event.kind().unwrap(),
            EventKind::DeploymentStatus { .. }
        ));
    }

    #[test]
    fn test_deployment_status_without_ref_is_error() {
        let event = CiEvent::from_json(r#"{"deployment_status":{}}"#).unwrap();
        assert!(matches!(event.kind(), Err(SyncError::Decode(_))));
    }

    #[test]
    fn test_other_event() {
        let event = CiEvent::from_json(r#"{"push":{"ref":"refs/heads/main"}}"#).unwrap();
        assert_eq!(event.kind().unwrap(), EventKind::Other);
    }

    #[test]
    fn test_malformed_payload() {
        assert!(matches!(
            CiEvent::from_json("{"),
            Err(SyncError::Decode(_))
        ));
    }
}

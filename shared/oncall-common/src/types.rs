use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Contributor handle (`@login`) mapped to the epoch-millisecond instant
/// until which it should be mentioned in alerts.
///
/// Serialized as a plain JSON object, which is the form stored in the
/// monitor message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributorMap(BTreeMap<String, i64>);

impl ContributorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, handle: impl Into<String>, expires_at_ms: i64) -> Option<i64> {
        self.0.insert(handle.into(), expires_at_ms)
    }

    pub fn get(&self, handle: &str) -> Option<i64> {
        self.0.get(handle).copied()
    }

    pub fn contains(&self, handle: &str) -> bool {
        self.0.contains_key(handle)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn handles(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Entries whose expiry is strictly after `now`.
    pub fn without_expired(&self, now: DateTime<Utc>) -> Self {
        let now_ms = now.timestamp_millis();
        self.0
            .iter()
            .filter(|(_, expiry)| **expiry > now_ms)
            .map(|(handle, expiry)| (handle.clone(), *expiry))
            .collect()
    }

    /// Overlay `overlay` on top of `self`; on collision the overlay's expiry wins.
    pub fn merge(mut self, overlay: &ContributorMap) -> Self {
        for (handle, expiry) in &overlay.0 {
            self.0.insert(handle.clone(), *expiry);
        }
        self
    }
}

impl FromIterator<(String, i64)> for ContributorMap {
    fn from_iter<T: IntoIterator<Item = (String, i64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// GitHub release, reduced to the fields this step reads
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Release {
    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    /// Label used in log lines: tag, then name, then a placeholder
    pub fn label(&self) -> &str {
        self.tag_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("<untagged release>")
    }
}

/// Datadog monitor with its message decoded into description and stored contributors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monitor {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub contributors: ContributorMap,
}

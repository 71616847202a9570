//! Monitor message wire format
//!
//! The Datadog monitor message is the only place contributor state survives
//! between runs. It is laid out as three `---`-delimited segments:
//!
//! ```text
//! <description>
//!
//! ---
//!
//! {"@alice":1700003600000}
//!
//! ---
//!
//! @slack-alerts <@U01ALICE>
//! ```
//!
//! The last segment is regenerated on every write and ignored when decoding.

use crate::error::SyncError;
use crate::types::ContributorMap;
use crate::Result;

pub const SEGMENT_DELIMITER: &str = "---";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorMessage {
    pub description: String,
    pub contributors: ContributorMap,
}

impl MonitorMessage {
    pub fn new(description: impl Into<String>, contributors: ContributorMap) -> Self {
        Self {
            description: description.into(),
            contributors,
        }
    }

    /// Split a stored message into description and contributor map.
    ///
    /// A missing or blank second segment decodes to an empty map; a
    /// malformed one is an error so the stored state is never silently lost.
    pub fn decode(message: &str) -> Result<Self> {
        let mut segments = message.split(SEGMENT_DELIMITER).map(str::trim);

        let description = segments.next().unwrap_or_default().to_string();
        let contributors = match segments.next() {
            Some(raw) if !raw.is_empty() => serde_json::from_str(raw).map_err(|e| {
                SyncError::decode(format!("invalid contributor map in monitor message: {e}"))
            })?,
            _ => ContributorMap::new(),
        };

        Ok(Self {
            description,
            contributors,
        })
    }

    /// Render the full message, with `mentions_line` as the trailing segment.
    pub fn encode(&self, mentions_line: &str) -> Result<String> {
        let contributors = serde_json::to_string(&self.contributors)?;
        Ok(format!(
            "{}\n\n{delim}\n\n{}\n\n{delim}\n\n{}",
            self.description,
            contributors,
            mentions_line,
            delim = SEGMENT_DELIMITER
        ))
    }
}

/// Alert channel followed by the rendered mentions, space separated
pub fn mentions_line(alert_channel: &str, mentions: &str) -> String {
    format!("{} {}", alert_channel, mentions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn contributors(entries: &[(&str, i64)]) -> ContributorMap {
        entries
            .iter()
            .map(|(handle, expiry)| (handle.to_string(), *expiry))
            .collect()
    }

    #[test]
    fn test_encode_layout() {
        let message = MonitorMessage::new(
            "CPU is high on {{host.name}}",
            contributors(&[("@alice", 42)]),
        );

        let encoded = message
            .encode(&mentions_line("@slack-alerts", "<@U1>"))
            .unwrap();

        assert_eq!(
            encoded,
            "CPU is high on {{host.name}}\n\n---\n\n{\"@alice\":42}\n\n---\n\n@slack-alerts <@U1>"
        );
    }

    #[test]
    fn test_round_trip() {
        let original = MonitorMessage::new(
            "Error rate above 5%",
            contributors(&[("@alice", 1), ("@bob", 2)]),
        );

        let decoded = MonitorMessage::decode(&original.encode("@oncall ").unwrap()).unwrap();

        assert_eq!(decoded, original);
    }

    #[test]
    fn test_plain_description_has_no_contributors() {
        let decoded = MonitorMessage::decode("  Disk almost full \n").unwrap();

        assert_eq!(decoded.description, "Disk almost full");
        assert!(decoded.contributors.is_empty());
    }

    #[test]
    fn test_blank_second_segment_has_no_contributors() {
        let decoded = MonitorMessage::decode("Latency\n\n---\n\n   \n\n---\n\n@chan").unwrap();

        assert_eq!(decoded.description, "Latency");
        assert!(decoded.contributors.is_empty());
    }

    #[test]
    fn test_malformed_contributors_is_error() {
        let result = MonitorMessage::decode("Latency\n---\n{\"@alice\":");
        assert!(matches!(result, Err(SyncError::Decode(_))));
    }

    #[test]
    fn test_empty_message() {
        let decoded = MonitorMessage::decode("").unwrap();
        assert_eq!(decoded, MonitorMessage::default());
    }
}

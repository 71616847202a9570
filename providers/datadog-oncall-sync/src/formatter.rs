use oncall_common::{mentions_line, ContributorMap, MonitorMessage, Result};
use std::collections::HashMap;
use tracing::warn;

/// Render the Slack mentions for every contributor that has a lookup entry.
///
/// Handles without an entry are left out of the text but stay in the stored
/// contributor map, so they render once the lookup learns about them. They
/// are skipped rather than rendered as empty strings, so the line never has
/// doubled spaces; the mentions segment is discarded on decode either way.
pub fn format_mentions(
    contributors: &ContributorMap,
    slack_user_lookup: &HashMap<String, String>,
) -> String {
    contributors
        .handles()
        .filter_map(|handle| match slack_user_lookup.get(handle) {
            Some(slack_id) => Some(format!("<@{}>", slack_id)),
            None => {
                warn!("No Slack user mapped for contributor {}", handle);
                None
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full monitor message for `description` and `contributors`
pub fn format_monitor_message(
    description: &str,
    contributors: &ContributorMap,
    alert_channel: &str,
    slack_user_lookup: &HashMap<String, String>,
) -> Result<String> {
    let mentions = format_mentions(contributors, slack_user_lookup);
    MonitorMessage::new(description, contributors.clone())
        .encode(&mentions_line(alert_channel, &mentions))
}

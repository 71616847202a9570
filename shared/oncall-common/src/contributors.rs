//! Contributor extraction from release notes and expiry-aware merging

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use tracing::debug;

use crate::error::SyncError;
use crate::types::{ContributorMap, Release};
use crate::Result;

pub const MILLISECONDS_IN_MINUTE: i64 = 60_000;

/// GitHub mention: `@` followed by ASCII word characters
const MENTION_PATTERN: &str = r"@[A-Za-z0-9_]+";

/// Collect every `@handle` in the release body, each expiring `on_call`
/// after `now`.
///
/// An absent release, an absent body and a body without mentions all yield
/// an empty map.
pub fn extract_contributors(
    release: Option<&Release>,
    on_call: Duration,
    now: DateTime<Utc>,
) -> Result<ContributorMap> {
    let body = match release.and_then(|r| r.body.as_deref()) {
        Some(body) => body,
        None => return Ok(ContributorMap::new()),
    };

    let handles = extract_mentions(body)?;
    if handles.is_empty() {
        debug!("Release body contains no contributor mentions");
        return Ok(ContributorMap::new());
    }

    let expires_at = expiry_after(now, on_call)?;
    Ok(handles
        .into_iter()
        .map(|handle| (handle, expires_at))
        .collect())
}

/// All mention tokens in `text`, in order of appearance, duplicates included
pub fn extract_mentions(text: &str) -> Result<Vec<String>> {
    let re = Regex::new(MENTION_PATTERN)
        .map_err(|e| SyncError::decode(format!("invalid mention regex: {e}")))?;
    Ok(re
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect())
}

/// Epoch milliseconds `on_call` after `now`
pub fn expiry_after(now: DateTime<Utc>, on_call: Duration) -> Result<i64> {
    now.checked_add_signed(on_call)
        .map(|expires_at| expires_at.timestamp_millis())
        .ok_or_else(|| {
            SyncError::configuration(format!(
                "on-call window of {} ms from {} is out of range",
                on_call.num_milliseconds(),
                now
            ))
        })
}

/// Drop stored contributors whose expiry is not after `now`, then overlay
/// the newly extracted ones.
pub fn merge_contributors(
    existing: &ContributorMap,
    new_contributors: &ContributorMap,
    now: DateTime<Utc>,
) -> ContributorMap {
    existing.without_expired(now).merge(new_contributors)
}

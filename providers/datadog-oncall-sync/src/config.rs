//! Configuration for the on-call sync step
//!
//! Inputs arrive as GitHub Actions environment variables (`INPUT_*` plus the
//! runner's `GITHUB_*` variables). They are gathered into a flat property map
//! and parsed once by [`SyncConfig::from_properties`]; nothing downstream
//! reads the environment.

use chrono::Duration;
use oncall_common::{Result, SyncError, MILLISECONDS_IN_MINUTE};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_DATADOG_API_URL: &str = "https://api.datadoghq.com";

/// Longest accepted on-call window (100 years)
pub const MAX_ON_CALL_MINUTES: f64 = 100.0 * 365.0 * 24.0 * 60.0;

/// Environment variable -> property key
const ENV_PROPERTIES: &[(&str, &str)] = &[
    ("INPUT_GITHUBSLACKUSERLOOKUP", "github_slack_user_lookup"),
    ("INPUT_DATADOGAPIKEY", "datadog_api_key"),
    ("INPUT_DATADOGAPPKEY", "datadog_app_key"),
    ("INPUT_DATADOGMONITORTAG", "datadog_monitor_tag"),
    ("INPUT_CONTRIBUTORONCALLDURATION", "contributor_on_call_duration"),
    ("INPUT_ALERTSLACKCHANNEL", "alert_slack_channel"),
    ("INPUT_DATADOGAPIURL", "datadog_api_url"),
    ("GITHUB_REPOSITORY", "github_repository"),
    ("GITHUB_EVENT_PATH", "github_event_path"),
    ("GITHUB_API_URL", "github_api_url"),
    ("GITHUB_TOKEN", "github_token"),
];

/// `owner/repo` pair identifying the repository whose releases are read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryId {
    pub owner: String,
    pub repo: String,
}

impl FromStr for RepositoryId {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(Self {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                })
            }
            _ => Err(SyncError::configuration(format!(
                "GITHUB_REPOSITORY must look like 'owner/repo', got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Immutable run configuration
#[derive(Clone)]
pub struct SyncConfig {
    /// GitHub handle (`@login`) -> Slack member ID
    pub slack_user_lookup: HashMap<String, String>,
    pub datadog_api_key: String,
    pub datadog_app_key: String,
    /// Monitors carrying this tag take part in the rotation
    pub monitor_tag: String,
    /// How long a release contributor stays on call
    pub contributor_on_call: Duration,
    /// Channel handle prefixed to the rendered mentions (e.g. `@slack-alerts`)
    pub alert_channel: String,
    pub repository: RepositoryId,
    pub event_path: PathBuf,
    pub github_api_url: String,
    pub github_token: Option<String>,
    pub datadog_api_url: String,
}

impl SyncConfig {
    /// Create configuration from a flat properties map
    pub fn from_properties(props: &HashMap<String, String>) -> Result<Self> {
        let lookup_json = required(props, "github_slack_user_lookup")?;
        let slack_user_lookup: HashMap<String, String> = serde_json::from_str(lookup_json)
            .map_err(|e| {
                SyncError::decode(format!(
                    "github_slack_user_lookup must be a JSON object of strings: {}",
                    e
                ))
            })?;

        let contributor_on_call =
            parse_on_call_duration(required(props, "contributor_on_call_duration")?)?;

        Ok(Self {
            slack_user_lookup,
            datadog_api_key: required(props, "datadog_api_key")?.to_string(),
            datadog_app_key: required(props, "datadog_app_key")?.to_string(),
            monitor_tag: required(props, "datadog_monitor_tag")?.to_string(),
            contributor_on_call,
            alert_channel: required(props, "alert_slack_channel")?.to_string(),
            repository: required(props, "github_repository")?.parse()?,
            event_path: PathBuf::from(required(props, "github_event_path")?),
            github_api_url: optional(props, "github_api_url")
                .map(trim_trailing_slash)
                .unwrap_or_else(default_github_api_url),
            github_token: optional(props, "github_token").map(str::to_string),
            datadog_api_url: optional(props, "datadog_api_url")
                .map(trim_trailing_slash)
                .unwrap_or_else(default_datadog_api_url),
        })
    }

    /// Load configuration from the GitHub Actions environment
    pub fn from_env() -> Result<Self> {
        Self::from_properties(&properties_from_vars(std::env::vars()))
    }
}

impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("slack_user_lookup", &self.slack_user_lookup.len())
            .field("datadog_api_key", &"<redacted>")
            .field("datadog_app_key", &"<redacted>")
            .field("monitor_tag", &self.monitor_tag)
            .field("contributor_on_call", &self.contributor_on_call)
            .field("alert_channel", &self.alert_channel)
            .field("repository", &self.repository)
            .field("event_path", &self.event_path)
            .field("github_api_url", &self.github_api_url)
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field("datadog_api_url", &self.datadog_api_url)
            .finish()
    }
}

/// Map known environment variables onto property keys, skipping empty values
/// (the runner exports unset inputs as empty strings).
pub fn properties_from_vars(
    vars: impl IntoIterator<Item = (String, String)>,
) -> HashMap<String, String> {
    let env: HashMap<String, String> = vars.into_iter().collect();
    ENV_PROPERTIES
        .iter()
        .filter_map(|(var, key)| {
            env.get(*var)
                .filter(|value| !value.trim().is_empty())
                .map(|value| (key.to_string(), value.clone()))
        })
        .collect()
}

/// Minutes, fractions allowed, rounded to whole milliseconds
fn parse_on_call_duration(raw: &str) -> Result<Duration> {
    let minutes = raw
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|minutes| minutes.is_finite() && *minutes >= 0.0)
        .ok_or_else(|| {
            SyncError::configuration(format!(
                "contributor_on_call_duration must be a non-negative number of minutes, got '{}'",
                raw
            ))
        })?;

    if minutes > MAX_ON_CALL_MINUTES {
        return Err(SyncError::configuration(format!(
            "contributor_on_call_duration must be at most {} minutes, got '{}'",
            MAX_ON_CALL_MINUTES, raw
        )));
    }

    let millis = (minutes * MILLISECONDS_IN_MINUTE as f64).round() as i64;
    Ok(Duration::milliseconds(millis))
}

fn required<'a>(props: &'a HashMap<String, String>, key: &str) -> Result<&'a str> {
    optional(props, key).ok_or_else(|| SyncError::configuration(format!("{} is required", key)))
}

fn optional<'a>(props: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    props
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.trim().is_empty())
}

fn trim_trailing_slash(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn default_github_api_url() -> String {
    DEFAULT_GITHUB_API_URL.to_string()
}

fn default_datadog_api_url() -> String {
    DEFAULT_DATADOG_API_URL.to_string()
}

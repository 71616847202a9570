use async_trait::async_trait;
use oncall_common::{Release, Result, SyncError};
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, error};

use crate::config::RepositoryId;
use crate::traits::ReleaseSource;

const SERVICE: &str = "GitHub";
const USER_AGENT: &str = concat!("datadog-oncall-sync/", env!("CARGO_PKG_VERSION"));

/// GitHub REST client for release lookups
pub struct GitHubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                SyncError::transport(SERVICE, format!("failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token,
        })
    }

    fn release_url(&self, repository: &RepositoryId, tag: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            SyncError::configuration(format!("invalid GitHub API URL '{}': {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                SyncError::configuration(format!(
                    "GitHub API URL '{}' cannot be a base",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(&[
                "repos",
                repository.owner.as_str(),
                repository.repo.as_str(),
                "releases",
                "tags",
                tag,
            ]);
        Ok(url)
    }
}

#[async_trait]
impl ReleaseSource for GitHubClient {
    async fn release_by_tag(&self, repository: &RepositoryId, tag: &str) -> Result<Release> {
        let url = self.release_url(repository, tag)?;
        debug!("Fetching release for tag {} from {}", tag, repository);

        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            error!("Failed to send GitHub release request: {}", e);
            SyncError::transport(SERVICE, e)
        })?;

        match response.status() {
            status if status.is_success() => response.json::<Release>().await.map_err(|e| {
                error!("Failed to parse GitHub release: {}", e);
                SyncError::decode(format!("invalid GitHub release response: {}", e))
            }),
            StatusCode::NOT_FOUND => Err(SyncError::NotFound(format!(
                "no release tagged '{}' in {}",
                tag, repository
            ))),
            status => {
                let body = response.text().await.unwrap_or_default();
                error!("GitHub release lookup failed with status {}", status);
                Err(SyncError::Api {
                    service: SERVICE.to_string(),
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

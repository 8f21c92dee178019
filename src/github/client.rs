use crate::config::Config;
use crate::github::types::{Branch, ErrorBody, RepoCoordinates};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, LINK, USER_AGENT};
use std::time::Duration;
use thiserror::Error;

const PER_PAGE: u32 = 100;
const MAX_PAGES: usize = 50;
const API_VERSION: &str = "2022-11-28";

/// Errors that can occur while talking to GitHub
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("GitHub returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed branch list response: {0}")]
    MalformedResponse(String),

    #[error("GitHub repository not configured: {0}")]
    NotConfigured(String),

    #[error("Branch list still had more pages after {0} requests")]
    TooManyPages(usize),
}

/// Source of the remote branch list
#[async_trait]
pub trait BranchLister: Send + Sync {
    /// Every branch name on the remote, in the order the remote reports them
    async fn list_branches(&self) -> Result<Vec<String>, GitHubError>;
}

/// Decode a branch-list body into names, in document order.
///
/// Extra fields are ignored; anything that is not an array of objects with a
/// string `name` is rejected.
pub fn extract_branch_names(body: &str) -> Result<Vec<String>, GitHubError> {
    let branches: Vec<Branch> =
        serde_json::from_str(body).map_err(|e| GitHubError::MalformedResponse(e.to_string()))?;
    Ok(branches.into_iter().map(|b| b.name).collect())
}

/// Extract the `rel="next"` target from a Link header
pub fn next_page_link(link_header: &str) -> Option<String> {
    link_header.split(',').find_map(|part| {
        let mut sections = part.split(';');
        let target = sections.next()?.trim();
        let is_next = sections.any(|s| s.trim() == "rel=\"next\"");
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

/// Lists branches through the GitHub REST API
pub struct GitHubClient {
    http_client: Client,
    api_url: String,
    coordinates: RepoCoordinates,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(
        api_url: impl Into<String>,
        coordinates: RepoCoordinates,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GitHubError> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            coordinates,
            token,
        })
    }

    /// Build a client from config for the given repository
    pub fn from_config(config: &Config, coordinates: RepoCoordinates) -> Result<Self, GitHubError> {
        let token = config.get_token();
        if token.is_none() {
            log::warn!(
                "no GitHub token found in ${} or config; private repositories will fail",
                config.github.token_env
            );
        }

        Self::new(
            config.github.api_url.clone(),
            coordinates,
            token,
            Duration::from_secs(config.github.timeout_seconds),
        )
    }

    /// URL of the first page of the branch list
    pub fn branches_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/branches?per_page={}",
            self.api_url, self.coordinates.owner, self.coordinates.repo, PER_PAGE
        )
    }

    /// Fetch one page, returning its names and the next page URL
    async fn fetch_page(&self, url: &str) -> Result<(Vec<String>, Option<String>), GitHubError> {
        let mut request = self
            .http_client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header(USER_AGENT, concat!("gitpanel/", env!("CARGO_PKG_VERSION")));

        if let Some(ref token) = self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();

        let next = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_page_link);

        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or_else(|_| body.chars().take(200).collect());
            return Err(GitHubError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok((extract_branch_names(&body)?, next))
    }
}

#[async_trait]
impl BranchLister for GitHubClient {
    async fn list_branches(&self) -> Result<Vec<String>, GitHubError> {
        let mut names = Vec::new();
        let mut url = Some(self.branches_url());
        let mut pages = 0;

        while let Some(current) = url {
            if pages == MAX_PAGES {
                log::warn!("branch list of {} exceeds {} pages", self.coordinates, MAX_PAGES);
                return Err(GitHubError::TooManyPages(MAX_PAGES));
            }
            let (page, next) = self.fetch_page(&current).await?;
            names.extend(page);
            pages += 1;
            url = next;
        }

        log::info!("{} remote branches on {}", names.len(), self.coordinates);
        Ok(names)
    }
}

/// Stand-in used when no GitHub repository could be determined
pub struct UnconfiguredLister {
    reason: String,
}

impl UnconfiguredLister {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }
}

#[async_trait]
impl BranchLister for UnconfiguredLister {
    async fn list_branches(&self) -> Result<Vec<String>, GitHubError> {
        Err(GitHubError::NotConfigured(self.reason.clone()))
    }
}

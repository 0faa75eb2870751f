//! Repository-hosting API client for tier 3.
//!
//! [`RepositoryActivitySource`] is the seam the tracker depends on;
//! [`GitHubClient`] implements it against the GitHub REST API (or any
//! server exposing the same routes under `api_base`).
//!
//! ## Endpoints
//!
//! | Count | Route |
//! |-------|-------|
//! | commits | `GET /repos/{repo}/commits?since=` |
//! | merged / open PRs | `GET /repos/{repo}/pulls?state=all` |
//! | open / closed issues | `GET /repos/{repo}/issues?state=all&since=` (PRs excluded) |
//! | releases | `GET /repos/{repo}/releases` |
//! | roadmap checklist | `GET /repos/{repo}/contents/{path}` (raw) |
//!
//! Listings are paginated 100 per page up to `max_pages`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::activity::parse_checklist;
use super::ActivityCounts;
use crate::config::RepositoryConfig;
use crate::error::{Result, RoadmapError};

const PER_PAGE: usize = 100;
const USER_AGENT: &str = concat!("u-roadmap/", env!("CARGO_PKG_VERSION"));

/// Source of repository activity.
#[async_trait]
pub trait RepositoryActivitySource: Send + Sync {
    /// Activity in `repository` (`owner/name`) since `since`.
    async fn fetch_activity(&self, repository: &str, since: NaiveDate) -> Result<ActivityCounts>;
}

#[derive(Debug, Deserialize)]
struct PullRequest {
    state: String,
    #[serde(default)]
    merged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct Issue {
    state: String,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Release {
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
}

/// GitHub REST client.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    api_base: String,
    token: String,
    max_pages: u32,
    roadmap_path: Option<String>,
}

impl GitHubClient {
    /// Creates a client from repository settings and an access token.
    pub fn new(config: &RepositoryConfig, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| RoadmapError::config_with_source("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: token.into(),
            max_pages: config.max_pages.max(1),
            roadmap_path: config.roadmap_path.clone(),
        })
    }

    async fn get(&self, repository: &str, route: &str, query: &[(&str, String)]) -> Result<reqwest::Response> {
        let url = format!("{}/repos/{}/{}", self.api_base, repository, route);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .query(query)
            .send()
            .await
            .map_err(|e| RoadmapError::repository(repository, format!("request to {route} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RoadmapError::repository(
                repository,
                format!("HTTP {} from {route}", status.as_u16()),
            ));
        }
        Ok(response)
    }

    /// Fetches up to `max_pages` pages of a listing.
    async fn list<T: DeserializeOwned>(
        &self,
        repository: &str,
        route: &str,
        mut query: Vec<(&str, String)>,
    ) -> Result<Vec<T>> {
        query.push(("per_page", PER_PAGE.to_string()));
        let mut items = Vec::new();
        for page in 1..=self.max_pages {
            let mut paged = query.clone();
            paged.push(("page", page.to_string()));
            let batch: Vec<T> = self
                .get(repository, route, &paged)
                .await?
                .json()
                .await
                .map_err(|e| RoadmapError::repository(repository, format!("invalid {route} payload: {e}")))?;
            let len = batch.len();
            items.extend(batch);
            if len < PER_PAGE {
                break;
            }
        }
        debug!(repository, route, count = items.len(), "fetched listing");
        Ok(items)
    }

    /// Roadmap checklist contents; `None` when the file is absent or unreadable.
    async fn roadmap(&self, repository: &str) -> Option<String> {
        let path = self.roadmap_path.as_deref()?;
        let url = format!("{}/repos/{}/contents/{}", self.api_base, repository, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github.raw+json")
            .send()
            .await
            .ok()?;
        match response.status() {
            s if s.is_success() => response.text().await.ok(),
            StatusCode::NOT_FOUND => None,
            s => {
                debug!(repository, status = s.as_u16(), "roadmap file unavailable");
                None
            }
        }
    }
}

#[async_trait]
impl RepositoryActivitySource for GitHubClient {
    async fn fetch_activity(&self, repository: &str, since: NaiveDate) -> Result<ActivityCounts> {
        let since_ts = since
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .ok_or_else(|| RoadmapError::repository(repository, format!("invalid start date {since}")))?;
        let since_param = since_ts.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

        let commits: Vec<serde_json::Value> = self
            .list(repository, "commits", vec![("since", since_param.clone())])
            .await?;
        let pulls: Vec<PullRequest> = self
            .list(repository, "pulls", vec![("state", "all".to_string())])
            .await?;
        let issues: Vec<Issue> = self
            .list(
                repository,
                "issues",
                vec![("state", "all".to_string()), ("since", since_param)],
            )
            .await?;
        let releases: Vec<Release> = self.list(repository, "releases", Vec::new()).await?;
        let roadmap = self.roadmap(repository).await.map(|text| parse_checklist(&text));

        let issues: Vec<&Issue> = issues.iter().filter(|i| i.pull_request.is_none()).collect();
        Ok(ActivityCounts {
            commits: commits.len(),
            merged_prs: pulls
                .iter()
                .filter(|p| p.merged_at.is_some_and(|at| at >= since_ts))
                .count(),
            open_prs: pulls.iter().filter(|p| p.state == "open").count(),
            open_issues: issues.iter().filter(|i| i.state == "open").count(),
            closed_issues: issues.iter().filter(|i| i.state == "closed").count(),
            releases: releases
                .iter()
                .filter(|r| r.published_at.is_some_and(|at| at >= since_ts))
                .count(),
            roadmap,
        })
    }
}

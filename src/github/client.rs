//! GitHub GraphQL client for per-repository issue and release activity.

use crate::github::{ActivitySource, RepositoryActivity};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.github.com/graphql";
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

const ISSUES_AND_RELEASES_QUERY: &str = r#"
query ($owner: String!, $name: String!, $since: DateTime!) {
  repository(owner: $owner, name: $name) {
    issues(first: 100, states: CLOSED, filterBy: {since: $since}) {
      nodes {
        title
        number
        url
        closedAt
      }
    }
    refs(refPrefix: "refs/tags/", last: 100) {
      nodes {
        name
        target {
          ... on Tag {
            message
            target {
              ... on Commit {
                committedDate
              }
            }
          }
        }
      }
    }
  }
}
"#;

/// GraphQL client for the GitHub API.
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'static str,
    variables: QueryVariables<'a>,
}

#[derive(Serialize)]
struct QueryVariables<'a> {
    owner: &'a str,
    name: &'a str,
    since: &'a str,
}

#[derive(Deserialize)]
struct GraphQlResponse {
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct ResponseData {
    repository: Option<RepositoryActivity>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

impl GithubClient {
    pub fn new(token: impl Into<String>, api_url: impl Into<String>) -> Result<Self> {
        Self::with_builder(reqwest::Client::builder(), token, api_url)
    }

    fn with_builder(
        builder: reqwest::ClientBuilder,
        token: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Result<Self> {
        let http = builder
            .user_agent(concat!("notodiff/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            api_url: api_url.into(),
            token: token.into(),
        })
    }

    /// Build a client with the token from `GITHUB_TOKEN`.
    pub fn from_env(api_url: impl Into<String>) -> Result<Self> {
        let token = read_token(std::env::var(TOKEN_ENV).ok())?;
        Self::new(token, api_url)
    }
}

fn read_token(value: Option<String>) -> Result<String> {
    value
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| anyhow!("{TOKEN_ENV} must be set to query the GitHub API"))
}

fn parse_response(body: &str, owner: &str, repo: &str) -> Result<RepositoryActivity> {
    let response: GraphQlResponse =
        serde_json::from_str(body).context("Failed to parse GitHub GraphQL response")?;

    if !response.errors.is_empty() {
        let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
        return Err(anyhow!(
            "GitHub query for {owner}/{repo} failed: {}",
            messages.join("; ")
        ));
    }

    response
        .data
        .and_then(|data| data.repository)
        .ok_or_else(|| anyhow!("Repository {owner}/{repo} not found"))
}

impl ActivitySource for GithubClient {
    async fn fetch(&self, owner: &str, repo: &str, since: &str) -> Result<RepositoryActivity> {
        debug!("Querying {owner}/{repo} for activity since {since}");
        let request = GraphQlRequest {
            query: ISSUES_AND_RELEASES_QUERY,
            variables: QueryVariables {
                owner,
                name: repo,
                since,
            },
        };

        let body = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Failed to query GitHub for {owner}/{repo}"))?
            .error_for_status()
            .with_context(|| format!("GitHub rejected the query for {owner}/{repo}"))?
            .text()
            .await
            .context("Failed to read GitHub response")?;

        let activity = parse_response(&body, owner, repo)?;
        if activity.may_be_truncated() {
            debug!("{owner}/{repo} returned a full page, results may be truncated");
        }
        Ok(activity)
    }
}

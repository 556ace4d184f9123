//! Upstream activity on GitHub
//!
//! Closed issues and tagged releases of a notofonts repository, fetched once
//! per family and then narrowed down locally to what happened after the
//! installed font was built.

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod client;

pub use client::GithubClient;

/// Page size used for both issues and tags. Anything beyond is not fetched.
pub const PAGE_SIZE: usize = 100;

/// Something that can answer the issues-and-releases query.
#[allow(async_fn_in_trait)]
pub trait ActivitySource {
    /// Closed issues since `since` and the latest tags of `owner/repo`.
    async fn fetch(&self, owner: &str, repo: &str, since: &str) -> Result<RepositoryActivity>;
}

/// The `repository` object of the GraphQL response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryActivity {
    pub issues: Connection<Issue>,
    pub refs: Connection<TagRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub title: String,
    pub number: u64,
    pub url: String,
    #[serde(rename = "closedAt")]
    pub closed_at: Option<String>,
}

/// A `refs/tags/` reference.
#[derive(Debug, Clone, Deserialize)]
pub struct TagRef {
    pub name: String,
    /// Empty for lightweight tags, which have no tag object
    #[serde(default)]
    pub target: Option<TagObject>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagObject {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub target: Option<TaggedCommit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaggedCommit {
    #[serde(rename = "committedDate", default)]
    pub committed_date: Option<String>,
}

impl TagRef {
    fn committed_date(&self) -> Option<&str> {
        self.target
            .as_ref()
            .and_then(|tag| tag.target.as_ref())
            .and_then(|commit| commit.committed_date.as_deref())
    }

    fn message(&self) -> &str {
        self.target
            .as_ref()
            .and_then(|tag| tag.message.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseNote {
    pub version: String,
    pub notes: String,
    pub url: String,
}

/// Activity relevant to one family after filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpstreamActivity {
    pub release_notes: Vec<ReleaseNote>,
    pub issues: Vec<Issue>,
}

impl RepositoryActivity {
    /// Keep what happened strictly after `threshold` and belongs to `family_name`.
    ///
    /// `threshold` is an ISO-8601 UTC timestamp such as `2024-01-01T00:00:00Z`;
    /// GitHub timestamps share that fixed-width format, so plain string
    /// comparison orders them correctly.
    pub fn filter(
        self,
        threshold: &str,
        family_name: &str,
        owner: &str,
        repo: &str,
    ) -> UpstreamActivity {
        let issues = self
            .issues
            .nodes
            .into_iter()
            .filter(|issue| issue.closed_at.as_deref().is_some_and(|at| at > threshold))
            .collect();

        let tag_prefix = format!("{}-", family_name.replace(' ', ""));
        let release_notes = self
            .refs
            .nodes
            .iter()
            .filter(|tag| tag.committed_date().is_some_and(|date| date > threshold))
            .filter(|tag| tag.name.contains(&tag_prefix))
            .map(|tag| ReleaseNote {
                version: tag.name.clone(),
                notes: tag.message().to_string(),
                url: release_url(owner, repo, &tag.name),
            })
            .collect();

        UpstreamActivity {
            release_notes,
            issues,
        }
    }

    pub fn may_be_truncated(&self) -> bool {
        self.issues.nodes.len() >= PAGE_SIZE || self.refs.nodes.len() >= PAGE_SIZE
    }
}

pub fn release_url(owner: &str, repo: &str, tag: &str) -> String {
    format!("https://github.com/{owner}/{repo}/releases/tag/{tag}")
}

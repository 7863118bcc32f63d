//! Octocrab-backed implementation of [`GitHubApi`].
//!
//! The commit, branch, and contents endpoints are called through octocrab's
//! raw `get` with locally defined response structs, since octocrab doesn't
//! model the combined author/branch/since commit filters we need. Query
//! values are URL-encoded; branch names in particular may contain `/`.

use chrono::{DateTime, SecondsFormat, Utc};
use octocrab::Octocrab;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::types::{CommitSha, DiffStats, FileChange, FileStatus, RepoRef};

use super::error::GitHubApiError;
use super::{Branch, CommitDetail, CommitQuery, GitHubApi, ListedCommit, RepoOverview, UserProfile};

/// An authenticated GitHub REST client.
///
/// The credential is an opaque bearer token; no validation is performed
/// beyond passing it along. This client holds no cache and performs no
/// retries.
#[derive(Clone)]
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// Creates a client from a personal access token.
    pub fn from_token(token: impl Into<String>) -> Result<Self, GitHubApiError> {
        let client = Octocrab::builder()
            .personal_token(token.into())
            .build()
            .map_err(GitHubApiError::from_octocrab)?;
        Ok(Self { client })
    }

    /// Creates a client from a pre-configured Octocrab instance.
    pub fn from_octocrab(client: Octocrab) -> Self {
        Self { client }
    }

    async fn get_json<R: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<R, GitHubApiError> {
        self.client
            .get(url, None::<&()>)
            .await
            .map_err(GitHubApiError::from_octocrab)
    }
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient").finish_non_exhaustive()
    }
}

// ─── Response Types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
    name: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepoResponse {
    description: Option<String>,
    default_branch: Option<String>,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    private: bool,
}

#[derive(Debug, Deserialize)]
struct TopicsResponse {
    #[serde(default)]
    names: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ContentEntryResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ListedCommitResponse {
    sha: String,
    commit: GitCommitResponse,
    /// The linked GitHub account, when identity linking succeeded remotely.
    author: Option<LinkedAccountResponse>,
}

#[derive(Debug, Deserialize)]
struct GitCommitResponse {
    message: String,
    author: Option<GitIdentityResponse>,
}

#[derive(Debug, Deserialize)]
struct GitIdentityResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct LinkedAccountResponse {
    login: String,
}

#[derive(Debug, Deserialize)]
struct CommitDetailResponse {
    stats: Option<StatsResponse>,
    #[serde(default)]
    files: Vec<FileResponse>,
}

#[derive(Debug, Deserialize)]
struct StatsResponse {
    #[serde(default)]
    additions: u32,
    #[serde(default)]
    deletions: u32,
    #[serde(default)]
    total: u32,
}

#[derive(Debug, Deserialize)]
struct FileResponse {
    filename: String,
    #[serde(default)]
    status: String,
}

fn listed_commit_from_response(item: ListedCommitResponse) -> Option<ListedCommit> {
    // Commits with no author identity at all can't be dated or attributed;
    // skip them rather than inventing a timestamp.
    let identity = match item.commit.author {
        Some(identity) => identity,
        None => {
            tracing::warn!(sha = %item.sha, "skipping commit without author identity");
            return None;
        }
    };

    Some(ListedCommit {
        sha: CommitSha::new(item.sha),
        message: item.commit.message,
        author_login: item.author.map(|a| a.login),
        author_name: identity.name,
        author_email: identity.email,
        authored_at: identity.date,
    })
}

// ─── GitHubApi Implementation ─────────────────────────────────────────────────

impl GitHubApi for GitHubClient {
    async fn authenticated_user(&self) -> Result<UserProfile, GitHubApiError> {
        let user: UserResponse = self.get_json("/user").await?;
        Ok(UserProfile {
            login: user.login,
            name: user.name,
            email: user.email,
        })
    }

    async fn repo_overview(&self, repo: &RepoRef) -> Result<RepoOverview, GitHubApiError> {
        let url = format!("/repos/{}/{}", repo.owner, repo.name);
        let data: RepoResponse = self.get_json(&url).await?;
        Ok(RepoOverview {
            description: data.description,
            default_branch: data.default_branch.unwrap_or_else(|| "main".to_string()),
            size: data.size,
            stars: data.stargazers_count,
            forks: data.forks_count,
            private: data.private,
        })
    }

    async fn repo_languages(&self, repo: &RepoRef) -> Result<BTreeMap<String, u64>, GitHubApiError> {
        let url = format!("/repos/{}/{}/languages", repo.owner, repo.name);
        self.get_json(&url).await
    }

    async fn repo_topics(&self, repo: &RepoRef) -> Result<Vec<String>, GitHubApiError> {
        let url = format!("/repos/{}/{}/topics", repo.owner, repo.name);
        let topics: TopicsResponse = self.get_json(&url).await?;
        Ok(topics.names)
    }

    async fn root_entries(&self, repo: &RepoRef) -> Result<Vec<String>, GitHubApiError> {
        let url = format!("/repos/{}/{}/contents/", repo.owner, repo.name);
        let entries: Vec<ContentEntryResponse> = self.get_json(&url).await?;
        Ok(entries.into_iter().map(|e| e.name).collect())
    }

    async fn list_branches(&self, repo: &RepoRef) -> Result<Vec<Branch>, GitHubApiError> {
        let url = format!("/repos/{}/{}/branches?per_page=100", repo.owner, repo.name);
        let branches: Vec<BranchResponse> = self.get_json(&url).await?;
        Ok(branches
            .into_iter()
            .map(|b| Branch { name: b.name })
            .collect())
    }

    async fn list_commits(
        &self,
        repo: &RepoRef,
        query: &CommitQuery,
    ) -> Result<Vec<ListedCommit>, GitHubApiError> {
        let mut params = vec![
            format!("per_page={}", query.per_page),
            format!("page={}", query.page),
        ];
        if let Some(since) = query.since {
            params.push(format!(
                "since={}",
                urlencoding::encode(&since.to_rfc3339_opts(SecondsFormat::Secs, true))
            ));
        }
        if let Some(ref author) = query.author {
            params.push(format!("author={}", urlencoding::encode(author)));
        }
        if let Some(ref branch) = query.branch {
            params.push(format!("sha={}", urlencoding::encode(branch)));
        }

        let url = format!(
            "/repos/{}/{}/commits?{}",
            repo.owner,
            repo.name,
            params.join("&")
        );
        let items: Vec<ListedCommitResponse> = self.get_json(&url).await?;
        Ok(items
            .into_iter()
            .filter_map(listed_commit_from_response)
            .collect())
    }

    async fn commit_detail(
        &self,
        repo: &RepoRef,
        sha: &CommitSha,
    ) -> Result<CommitDetail, GitHubApiError> {
        let url = format!("/repos/{}/{}/commits/{}", repo.owner, repo.name, sha);
        let detail: CommitDetailResponse = self.get_json(&url).await?;
        Ok(CommitDetail {
            stats: detail.stats.map(|s| DiffStats {
                additions: s.additions,
                deletions: s.deletions,
                total: s.total,
            }),
            files: detail
                .files
                .into_iter()
                .map(|f| FileChange::new(f.filename, FileStatus::parse(&f.status)))
                .collect(),
        })
    }
}

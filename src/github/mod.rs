//! GitHub REST API access.
//!
//! The [`GitHubApi`] trait is the seam between business logic and the
//! network: the analyzer and sync orchestrator are generic over it, so tests
//! run against an in-memory fake while production uses the octocrab-backed
//! [`GitHubClient`].
//!
//! This layer carries no business logic and does not retry; any retry policy
//! belongs to the caller.

pub mod client;
pub mod error;

pub use client::GitHubClient;
pub use error::{GitHubApiError, GitHubErrorKind};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;

use crate::types::{CommitSha, DiffStats, FileChange, RepoRef};

/// The authenticated user's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Repository metadata used for classification and display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoOverview {
    pub description: Option<String>,
    pub default_branch: String,
    /// Repository size in kilobytes, as reported by the API.
    pub size: u64,
    pub stars: u64,
    pub forks: u64,
    pub private: bool,
}

/// A branch as returned by the branch-listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
}

/// One commit from the commit-listing endpoint (no diff detail).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedCommit {
    pub sha: CommitSha,
    pub message: String,
    pub author_login: Option<String>,
    pub author_name: String,
    pub author_email: String,
    pub authored_at: DateTime<Utc>,
}

/// Diff detail for a single commit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitDetail {
    pub stats: Option<DiffStats>,
    pub files: Vec<FileChange>,
}

/// Filters for a page of the commit-listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitQuery {
    /// GitHub login to filter by, server-side.
    pub author: Option<String>,
    /// Branch to list; `None` lists the repository's default branch.
    pub branch: Option<String>,
    /// Only commits authored after this instant.
    pub since: Option<DateTime<Utc>>,
    /// 1-based page number.
    pub page: u32,
    pub per_page: u8,
}

/// Operations this engine needs from the GitHub REST API.
///
/// Every operation fails with [`GitHubApiError`] on a non-success response.
/// Callers must treat permanent (4xx) errors as non-retryable; transient
/// handling is the caller's concern.
pub trait GitHubApi {
    /// Fetches the profile behind the configured credential.
    fn authenticated_user(&self)
        -> impl Future<Output = Result<UserProfile, GitHubApiError>> + Send;

    /// Fetches repository metadata.
    fn repo_overview(
        &self,
        repo: &RepoRef,
    ) -> impl Future<Output = Result<RepoOverview, GitHubApiError>> + Send;

    /// Fetches the language byte-count map for a repository.
    fn repo_languages(
        &self,
        repo: &RepoRef,
    ) -> impl Future<Output = Result<BTreeMap<String, u64>, GitHubApiError>> + Send;

    /// Fetches the repository's topic names.
    fn repo_topics(
        &self,
        repo: &RepoRef,
    ) -> impl Future<Output = Result<Vec<String>, GitHubApiError>> + Send;

    /// Lists the entry names in the repository root.
    fn root_entries(
        &self,
        repo: &RepoRef,
    ) -> impl Future<Output = Result<Vec<String>, GitHubApiError>> + Send;

    /// Lists the repository's branches.
    fn list_branches(
        &self,
        repo: &RepoRef,
    ) -> impl Future<Output = Result<Vec<Branch>, GitHubApiError>> + Send;

    /// Fetches one page of commits matching the query.
    fn list_commits(
        &self,
        repo: &RepoRef,
        query: &CommitQuery,
    ) -> impl Future<Output = Result<Vec<ListedCommit>, GitHubApiError>> + Send;

    /// Fetches diff statistics and the touched-file list for one commit.
    fn commit_detail(
        &self,
        repo: &RepoRef,
        sha: &CommitSha,
    ) -> impl Future<Output = Result<CommitDetail, GitHubApiError>> + Send;
}

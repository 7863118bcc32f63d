//! Shared test fixtures: commit builders and an in-memory [`GitHubApi`]
//! implementation.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::github::{
    Branch, CommitDetail, CommitQuery, GitHubApi, GitHubApiError, ListedCommit, RepoOverview,
    UserProfile,
};
use crate::types::{
    CommitRecord, CommitSha, DiffStats, FileChange, Project, RepoRef, Species,
};

/// A fixed instant for deterministic tests.
pub fn now() -> DateTime<Utc> {
    "2026-07-09T12:00:00Z".parse().unwrap()
}

/// A minimal commit record.
pub fn commit(sha: &str, authored_at: &str) -> CommitRecord {
    CommitRecord {
        sha: CommitSha::new(sha),
        message: "add feature".to_string(),
        author_login: Some("octocat".to_string()),
        author_name: "Octo Cat".to_string(),
        author_email: "octo@example.com".to_string(),
        authored_at: authored_at.parse().unwrap(),
        branch: "main".to_string(),
        stats: None,
        files: None,
    }
}

/// A minimal listed commit, authored by "octocat".
pub fn listed(sha: &str, authored_at: &str) -> ListedCommit {
    ListedCommit {
        sha: CommitSha::new(sha),
        message: "add feature".to_string(),
        author_login: Some("octocat".to_string()),
        author_name: "Octo Cat".to_string(),
        author_email: "octo@example.com".to_string(),
        authored_at: authored_at.parse().unwrap(),
    }
}

/// A fresh project tracking octocat/hello-world.
pub fn new_project() -> Project {
    Project::new(
        RepoRef::new("octocat", "hello-world"),
        None,
        Species::CommitCat,
        "Pixel",
        now(),
    )
}

/// Copies an error's categorization, dropping the unclonable source.
fn replay_error(err: &GitHubApiError) -> GitHubApiError {
    GitHubApiError {
        kind: err.kind,
        status: err.status,
        message: err.message.clone(),
        source: None,
    }
}

#[derive(Default)]
struct CallCounts {
    list_calls: HashMap<String, u32>,
    detail_calls: u32,
}

/// An in-memory GitHub double with scriptable responses and call counting.
#[derive(Default)]
pub struct FakeGitHub {
    branches: Vec<String>,
    branch_error: Option<GitHubApiError>,
    branch_commits: HashMap<String, Vec<ListedCommit>>,
    unfiltered_commits: Vec<ListedCommit>,
    list_error: Option<GitHubApiError>,
    details: HashMap<String, Result<CommitDetail, GitHubApiError>>,
    description: Option<String>,
    topics: Vec<String>,
    entries: Vec<String>,
    private: bool,
    overview_error: Option<GitHubApiError>,
    counts: Mutex<CallCounts>,
}

impl FakeGitHub {
    /// Key under which commits are served when no branch filter is given.
    pub const DEFAULT_BRANCH: &'static str = "__default__";

    pub fn new() -> Self {
        FakeGitHub::default()
    }

    pub fn with_branches(mut self, names: Vec<&str>) -> Self {
        self.branches = names.into_iter().map(String::from).collect();
        self
    }

    pub fn with_branch_error(mut self, err: GitHubApiError) -> Self {
        self.branch_error = Some(err);
        self
    }

    pub fn with_branch_commits(mut self, branch: &str, commits: Vec<ListedCommit>) -> Self {
        self.branch_commits.insert(branch.to_string(), commits);
        self
    }

    pub fn with_unfiltered_commits(mut self, commits: Vec<ListedCommit>) -> Self {
        self.unfiltered_commits = commits;
        self
    }

    pub fn with_list_error(mut self, err: GitHubApiError) -> Self {
        self.list_error = Some(err);
        self
    }

    pub fn with_detail(mut self, sha: &str, total: u32, files: Vec<FileChange>) -> Self {
        self.details.insert(
            sha.to_string(),
            Ok(CommitDetail {
                stats: Some(DiffStats {
                    additions: total,
                    deletions: 0,
                    total,
                }),
                files,
            }),
        );
        self
    }

    pub fn with_detail_error(mut self, sha: &str, err: GitHubApiError) -> Self {
        self.details.insert(sha.to_string(), Err(err));
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_topics(mut self, topics: Vec<&str>) -> Self {
        self.topics = topics.into_iter().map(String::from).collect();
        self
    }

    pub fn with_entries(mut self, entries: Vec<&str>) -> Self {
        self.entries = entries.into_iter().map(String::from).collect();
        self
    }

    pub fn with_overview_error(mut self, err: GitHubApiError) -> Self {
        self.overview_error = Some(err);
        self
    }

    pub fn list_calls_for_branch(&self, branch: &str) -> u32 {
        let counts = self.counts.lock().unwrap();
        counts.list_calls.get(branch).copied().unwrap_or(0)
    }

    pub fn detail_calls(&self) -> u32 {
        self.counts.lock().unwrap().detail_calls
    }
}

impl GitHubApi for FakeGitHub {
    async fn authenticated_user(&self) -> Result<UserProfile, GitHubApiError> {
        Ok(UserProfile {
            login: "octocat".to_string(),
            name: Some("Octo Cat".to_string()),
            email: None,
        })
    }

    async fn repo_overview(&self, _repo: &RepoRef) -> Result<RepoOverview, GitHubApiError> {
        if let Some(ref err) = self.overview_error {
            return Err(replay_error(err));
        }
        Ok(RepoOverview {
            description: self.description.clone(),
            default_branch: "main".to_string(),
            size: 123,
            stars: 4,
            forks: 1,
            private: self.private,
        })
    }

    async fn repo_languages(
        &self,
        _repo: &RepoRef,
    ) -> Result<BTreeMap<String, u64>, GitHubApiError> {
        Ok(BTreeMap::new())
    }

    async fn repo_topics(&self, _repo: &RepoRef) -> Result<Vec<String>, GitHubApiError> {
        Ok(self.topics.clone())
    }

    async fn root_entries(&self, _repo: &RepoRef) -> Result<Vec<String>, GitHubApiError> {
        Ok(self.entries.clone())
    }

    async fn list_branches(&self, _repo: &RepoRef) -> Result<Vec<Branch>, GitHubApiError> {
        if let Some(ref err) = self.branch_error {
            return Err(replay_error(err));
        }
        Ok(self
            .branches
            .iter()
            .map(|name| Branch { name: name.clone() })
            .collect())
    }

    async fn list_commits(
        &self,
        _repo: &RepoRef,
        query: &CommitQuery,
    ) -> Result<Vec<ListedCommit>, GitHubApiError> {
        let key = if query.author.is_none() {
            None
        } else {
            Some(
                query
                    .branch
                    .clone()
                    .unwrap_or_else(|| Self::DEFAULT_BRANCH.to_string()),
            )
        };

        {
            let mut counts = self.counts.lock().unwrap();
            let label = key.clone().unwrap_or_else(|| "__unfiltered__".to_string());
            *counts.list_calls.entry(label).or_insert(0) += 1;
        }

        if let Some(ref err) = self.list_error {
            return Err(replay_error(err));
        }

        let source = match key {
            None => &self.unfiltered_commits,
            Some(ref branch) => match self.branch_commits.get(branch) {
                Some(commits) => commits,
                None => return Ok(Vec::new()),
            },
        };

        let start = (query.page.saturating_sub(1) as usize) * query.per_page as usize;
        let end = (start + query.per_page as usize).min(source.len());
        if start >= source.len() {
            return Ok(Vec::new());
        }
        Ok(source[start..end].to_vec())
    }

    async fn commit_detail(
        &self,
        _repo: &RepoRef,
        sha: &CommitSha,
    ) -> Result<CommitDetail, GitHubApiError> {
        self.counts.lock().unwrap().detail_calls += 1;

        match self.details.get(sha.as_str()) {
            Some(Ok(detail)) => Ok(detail.clone()),
            Some(Err(err)) => Err(replay_error(err)),
            None => Err(GitHubApiError::from_status(404, "Not Found")),
        }
    }
}

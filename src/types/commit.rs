//! Commit data as observed through the GitHub API.
//!
//! Commits are immutable once fetched. Uniqueness is by SHA: the same commit
//! may be listed on several branches, and the analyzer deduplicates so each
//! SHA appears once, tagged with the branch it was first seen on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::CommitSha;

/// Diff statistics for a single commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffStats {
    pub additions: u32,
    pub deletions: u32,
    /// Total changed lines (additions + deletions), as reported by the API.
    pub total: u32,
}

/// The change status of one file within a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Added,
    Modified,
    Removed,
}

impl FileStatus {
    /// Parses the GitHub API's file status string.
    ///
    /// The API also reports `renamed`, `copied`, `changed`, and `unchanged`;
    /// those carry no bonus semantics here and fold into `Modified`.
    pub fn parse(s: &str) -> FileStatus {
        match s {
            "added" => FileStatus::Added,
            "removed" => FileStatus::Removed,
            _ => FileStatus::Modified,
        }
    }
}

/// One touched file within a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    /// Repository-relative path.
    pub path: String,
    pub status: FileStatus,
}

impl FileChange {
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        FileChange {
            path: path.into(),
            status,
        }
    }
}

/// A single logical commit after branch merge and deduplication.
///
/// `stats` and `files` are present only for commits whose per-commit detail
/// was fetched; the analyzer caps detail fetches, and a failed detail fetch
/// leaves both absent without failing the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: CommitSha,
    pub message: String,
    /// The GitHub login of the commit author, when the API could link one.
    pub author_login: Option<String>,
    /// Free-text author name from the git commit itself.
    pub author_name: String,
    /// Free-text author email from the git commit itself.
    pub author_email: String,
    pub authored_at: DateTime<Utc>,
    /// The branch this commit was first seen on during analysis.
    pub branch: String,
    pub stats: Option<DiffStats>,
    pub files: Option<Vec<FileChange>>,
}

impl CommitRecord {
    /// Returns true if diff statistics were fetched for this commit.
    pub fn has_detail(&self) -> bool {
        self.stats.is_some()
    }

    /// The commit's author date as a UTC calendar day.
    pub fn authored_on(&self) -> chrono::NaiveDate {
        self.authored_at.date_naive()
    }
}

//! Multi-branch commit history collection.
//!
//! This module produces a consistent, deduplicated commit set for an
//! (owner, repo, author, lookback window) tuple, plus the resulting streak.
//! Degradation is the theme: a partial remote outage yields a
//! partial-but-useful result, and an unusable remote yields an empty one,
//! never corrupted state.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::github::{CommitQuery, GitHubApi, GitHubApiError, ListedCommit};
use crate::types::{CommitRecord, CommitSha, RepoRef};

use super::streak::current_streak;

/// Branch tag applied to commits found via the repository's default branch,
/// either because branch listing failed or via the author-fallback fetch.
const DEFAULT_BRANCH_TAG: &str = "default";

/// API call volume ceilings.
///
/// These are explicit, documented ceilings chosen to cap call volume against
/// rate limits, not completeness guarantees: at most `max_branches` branches,
/// `max_pages` pages of `page_size` commits per branch, and diff detail for
/// the first `detail_cap` merged commits.
#[derive(Debug, Clone, Copy)]
pub struct AnalyzerLimits {
    pub max_branches: usize,
    pub max_pages: u32,
    pub page_size: u8,
    pub detail_cap: usize,
    /// Page size for the unfiltered author-fallback fetch.
    pub fallback_page_size: u8,
}

impl Default for AnalyzerLimits {
    fn default() -> Self {
        AnalyzerLimits {
            max_branches: 5,
            max_pages: 3,
            page_size: 50,
            detail_cap: 50,
            fallback_page_size: 100,
        }
    }
}

/// The analyzer's output: a deduplicated, branch-tagged, date-bucketed
/// commit set and the streak it implies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitHistory {
    /// Consecutive days with commit activity, ending today (or yesterday).
    pub streak: u32,
    /// Merge-order commit list, deduplicated by SHA.
    pub commits: Vec<CommitRecord>,
    /// The most recent commit's author timestamp.
    pub last_commit: Option<DateTime<Utc>>,
    /// Commit SHAs bucketed by UTC calendar day.
    pub by_date: BTreeMap<NaiveDate, Vec<CommitSha>>,
}

impl CommitHistory {
    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

/// Collects the commit history for one author in one repository.
///
/// `now` anchors both the lookback window and the streak walk, keeping the
/// computation deterministic for tests.
///
/// # Degradation
///
/// - Branch listing failure falls back to the repository's default branch,
///   except a credential rejection (401 / non-rate-limit 403), which is
///   surfaced: every subsequent call would fail the same way, and the caller
///   must be able to report a failed sync rather than an empty one.
/// - A failed page fetch ends that branch's paging; other branches continue.
/// - If the author-filtered listing finds nothing, one unfiltered fetch is
///   made and filtered client-side by login, or failing that by substring
///   match of the username against the author's free-text name or email.
///   This covers remote identity-linking mismatches; it is best-effort.
/// - A failed per-commit detail fetch keeps the commit without detail.
pub async fn collect_history<G: GitHubApi>(
    github: &G,
    repo: &RepoRef,
    username: &str,
    lookback_days: i64,
    now: DateTime<Utc>,
    limits: AnalyzerLimits,
) -> Result<CommitHistory, GitHubApiError> {
    let since = now - Duration::days(lookback_days);

    // Step 1: resolve the branch list, degrading to the default branch.
    let branches: Vec<Option<String>> = match github.list_branches(repo).await {
        Ok(branches) => branches
            .into_iter()
            .take(limits.max_branches)
            .map(|b| Some(b.name))
            .collect(),
        Err(err) if err.is_credential_failure() => return Err(err),
        Err(err) => {
            tracing::warn!(repo = %repo, error = %err, "branch listing failed, using default branch");
            vec![None]
        }
    };

    // Steps 2-3: page through each branch in listing order, deduplicating by
    // SHA as we merge. First sighting wins the branch tag, so the result is
    // independent of how page fetches interleave in time.
    let mut seen: HashSet<CommitSha> = HashSet::new();
    let mut commits: Vec<CommitRecord> = Vec::new();

    for branch in &branches {
        let tag = branch.as_deref().unwrap_or(DEFAULT_BRANCH_TAG);

        for page in 1..=limits.max_pages {
            let query = CommitQuery {
                author: Some(username.to_string()),
                branch: branch.clone(),
                since: Some(since),
                page,
                per_page: limits.page_size,
            };

            let page_commits = match github.list_commits(repo, &query).await {
                Ok(page_commits) => page_commits,
                Err(err) => {
                    tracing::warn!(
                        repo = %repo,
                        branch = tag,
                        page,
                        error = %err,
                        "page fetch failed, moving to next branch"
                    );
                    break;
                }
            };

            let fetched = page_commits.len();
            for listed in page_commits {
                if seen.insert(listed.sha.clone()) {
                    commits.push(record_from_listed(listed, tag));
                }
            }

            // A short or empty page is the end of this branch's history.
            if fetched < limits.page_size as usize {
                break;
            }
        }
    }

    // Step 4: author-filter fallback. The author query parameter silently
    // returns nothing when the remote can't link the username to commit
    // identities; retry unfiltered and match client-side.
    if commits.is_empty() {
        let query = CommitQuery {
            author: None,
            branch: None,
            since: Some(since),
            page: 1,
            per_page: limits.fallback_page_size,
        };
        match github.list_commits(repo, &query).await {
            Ok(unfiltered) => {
                let total = unfiltered.len();
                for listed in unfiltered {
                    if !authored_by(&listed, username) {
                        continue;
                    }
                    if seen.insert(listed.sha.clone()) {
                        commits.push(record_from_listed(listed, DEFAULT_BRANCH_TAG));
                    }
                }
                tracing::debug!(
                    repo = %repo,
                    username,
                    total,
                    matched = commits.len(),
                    "applied client-side author fallback"
                );
            }
            Err(err) => {
                tracing::warn!(repo = %repo, error = %err, "author fallback fetch failed");
            }
        }
    }

    if commits.is_empty() {
        return Ok(CommitHistory::default());
    }

    // Step 5: fetch diff detail for the head of the list. One commit's
    // failure must not abort the batch.
    let detail_count = commits.len().min(limits.detail_cap);
    for commit in commits.iter_mut().take(detail_count) {
        match github.commit_detail(repo, &commit.sha).await {
            Ok(detail) => {
                commit.stats = detail.stats;
                commit.files = Some(detail.files);
            }
            Err(err) => {
                tracing::warn!(sha = %commit.sha.short(), error = %err, "detail fetch failed, keeping commit without stats");
            }
        }
    }

    // Step 6: bucket by day and compute the streak.
    let mut by_date: BTreeMap<NaiveDate, Vec<CommitSha>> = BTreeMap::new();
    for commit in &commits {
        by_date
            .entry(commit.authored_on())
            .or_default()
            .push(commit.sha.clone());
    }
    let days: BTreeSet<NaiveDate> = by_date.keys().copied().collect();
    let streak = current_streak(&days, now.date_naive());

    let last_commit = commits.iter().map(|c| c.authored_at).max();

    Ok(CommitHistory {
        streak,
        commits,
        last_commit,
        by_date,
    })
}

fn record_from_listed(listed: ListedCommit, branch: &str) -> CommitRecord {
    CommitRecord {
        sha: listed.sha,
        message: listed.message,
        author_login: listed.author_login,
        author_name: listed.author_name,
        author_email: listed.author_email,
        authored_at: listed.authored_at,
        branch: branch.to_string(),
        stats: None,
        files: None,
    }
}

/// Client-side author matching for the fallback path.
fn authored_by(listed: &ListedCommit, username: &str) -> bool {
    if listed.author_login.as_deref() == Some(username) {
        return true;
    }
    listed.author_name.contains(username) || listed.author_email.contains(username)
}

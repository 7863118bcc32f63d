//! The sync orchestrator: analyzer → XP calculator → progression, exactly
//! once per newly observed commit.
//!
//! A sync never partially applies: history recording, crediting, and ledger
//! updates each go through the state store's atomic operations, and the
//! credit+ledger step is a single operation, so a commit SHA is converted to
//! XP at most once no matter how many syncs observe it.
//!
//! Syncs for the same project are mutually exclusive; a second request while
//! one is in flight is rejected rather than interleaved. Different projects
//! may sync concurrently.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analyzer::{collect_history, detect_kind, AnalyzerLimits, CommitHistory};
use crate::github::{GitHubApi, GitHubApiError, UserProfile};
use crate::state::{StateError, StateStore};
use crate::types::{
    CommitSha, InvalidRepoUrl, Project, ProjectId, ProjectKind, RepoRef, Species,
};
use crate::xp;

/// How far back a sync looks for commits, in days.
const LOOKBACK_DAYS: i64 = 90;

/// Errors surfaced to the caller from a sync.
///
/// A failed sync leaves all persisted pet/project state untouched.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The commit-history API rejected the sync outright (bad credential,
    /// unreachable at the top level).
    #[error(transparent)]
    Remote(#[from] GitHubApiError),

    /// A repository reference could not be parsed.
    #[error(transparent)]
    InvalidReference(#[from] InvalidRepoUrl),

    /// No login has been performed, so there is no author to sync for.
    #[error("not authenticated: no user profile stored")]
    NotAuthenticated,

    /// A sync for this project is already in flight.
    #[error("sync already in progress for project {0}")]
    SyncInProgress(ProjectId),

    /// State mutation or persistence failed.
    #[error(transparent)]
    State(#[from] StateError),
}

/// What a successful sync accomplished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// There is no active project; nothing to do.
    NoProject,

    /// The analyzer found no commits (empty-success, distinct from failure).
    NoCommits,

    /// History was recorded, and any new commits were credited.
    Synced(SyncSummary),
}

/// Summary of a completed sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSummary {
    pub project: ProjectId,
    /// Consecutive-day streak computed from the fetched history.
    pub streak: u32,
    /// Commits observed in the lookback window.
    pub total_commits: usize,
    /// Commits that were not yet in the processed ledger.
    pub new_commits: usize,
    /// XP credited for the new commits (zero when all were already seen).
    pub credited_xp: u32,
    /// The project's classification, detected on first sync if unset.
    pub kind: Option<ProjectKind>,
}

/// Drives syncs against one GitHub backend and one state store.
pub struct SyncEngine<G> {
    github: G,
    limits: AnalyzerLimits,
    in_flight: Mutex<HashSet<ProjectId>>,
}

impl<G: GitHubApi> SyncEngine<G> {
    pub fn new(github: G) -> Self {
        SyncEngine {
            github,
            limits: AnalyzerLimits::default(),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Overrides the analyzer's API call ceilings.
    pub fn with_limits(mut self, limits: AnalyzerLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Verifies the credential and stores the authenticated identity.
    ///
    /// The token itself is opaque: the only validation is that the remote
    /// accepts it for a profile fetch.
    pub async fn login(
        &self,
        store: &StateStore,
        token: impl Into<String>,
    ) -> Result<UserProfile, SyncError> {
        let user = self.github.authenticated_user().await?;
        store.set_token(token).await?;
        store.set_user(user.clone()).await?;
        info!(login = %user.login, "authenticated");
        Ok(user)
    }

    /// Parses a repository URL and starts tracking it with a fresh pet.
    ///
    /// An unparseable URL fails here, before any network or state mutation.
    pub async fn track_repository(
        &self,
        store: &StateStore,
        url: &str,
        kind: Option<ProjectKind>,
        species: Species,
        pet_name: impl Into<String>,
    ) -> Result<ProjectId, SyncError> {
        let repo = RepoRef::parse_url(url)?;
        let id = store.add_project(repo, kind, species, pet_name).await?;
        Ok(id)
    }

    /// Syncs the currently selected project.
    pub async fn sync_current(&self, store: &StateStore) -> Result<SyncOutcome, SyncError> {
        let Some(project) = store.current_project().await else {
            debug!("no active project, sync is a no-op");
            return Ok(SyncOutcome::NoProject);
        };
        self.sync_project(store, project).await
    }

    /// Syncs one project by id.
    pub async fn sync_by_id(
        &self,
        store: &StateStore,
        id: &ProjectId,
    ) -> Result<SyncOutcome, SyncError> {
        let project = store
            .snapshot()
            .await
            .project(id)
            .cloned()
            .ok_or_else(|| StateError::UnknownProject(id.clone()))?;
        self.sync_project(store, project).await
    }

    async fn sync_project(
        &self,
        store: &StateStore,
        project: Project,
    ) -> Result<SyncOutcome, SyncError> {
        let user = store.user().await.ok_or(SyncError::NotAuthenticated)?;

        let _permit = self.claim(project.id.clone())?;
        let now = Utc::now();

        info!(project = %project.id, repo = %project.repo, author = %user.login, "starting sync");

        let history = collect_history(
            &self.github,
            &project.repo,
            &user.login,
            LOOKBACK_DAYS,
            now,
            self.limits,
        )
        .await?;

        if history.is_empty() {
            info!(project = %project.id, "sync found no commits");
            return Ok(SyncOutcome::NoCommits);
        }

        // Record what we saw regardless of whether anything is newly
        // creditable: streak and recent commits reflect the latest fetch even
        // when every commit was already processed.
        store
            .record_history(
                &project.id,
                history.commits.clone(),
                history.streak,
                history.last_commit,
            )
            .await?;

        let (credited_xp, new_shas) = tally_new_xp(&project, &history);
        let new_commits = new_shas.len();

        if credited_xp > 0 {
            store
                .apply_commit_credit(&project.id, credited_xp, new_shas)
                .await?;
        } else {
            debug!(project = %project.id, "no new commits to credit");
        }

        // Classify on first sync; a failure here falls back inside
        // detect_kind and never fails the sync.
        let kind = match project.kind {
            Some(kind) => Some(kind),
            None => {
                let detected = detect_kind(&self.github, &project.repo).await;
                store.set_project_kind(&project.id, detected).await?;
                Some(detected)
            }
        };

        info!(
            project = %project.id,
            streak = history.streak,
            new_commits,
            credited_xp,
            "sync complete"
        );

        Ok(SyncOutcome::Synced(SyncSummary {
            project: project.id,
            streak: history.streak,
            total_commits: history.commits.len(),
            new_commits,
            credited_xp,
            kind,
        }))
    }

    /// Claims the per-project sync slot, rejecting concurrent syncs.
    fn claim(&self, id: ProjectId) -> Result<SyncPermit<'_>, SyncError> {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(id.clone()) {
            warn!(project = %id, "rejecting concurrent sync");
            return Err(SyncError::SyncInProgress(id));
        }
        Ok(SyncPermit {
            registry: &self.in_flight,
            id,
        })
    }
}

/// Sums XP over commits absent from the processed ledger.
///
/// Commits carrying diff statistics go through the XP calculator; detail-free
/// commits get the fixed estimate instead.
fn tally_new_xp(project: &Project, history: &CommitHistory) -> (u32, Vec<CommitSha>) {
    let mut total = 0u32;
    let mut new_shas = Vec::new();

    for commit in &history.commits {
        if project.is_processed(&commit.sha) {
            continue;
        }

        let awarded = match commit.stats {
            Some(ref stats) => {
                xp::commit_xp(stats, commit.files.as_deref().unwrap_or(&[]), &commit.message)
            }
            None => xp::DETAIL_FREE_ESTIMATE,
        };

        total += awarded;
        new_shas.push(commit.sha.clone());
    }

    (total, new_shas)
}

/// Releases the per-project sync slot on drop, however the sync ended.
struct SyncPermit<'a> {
    registry: &'a Mutex<HashSet<ProjectId>>,
    id: ProjectId,
}

impl Drop for SyncPermit<'_> {
    fn drop(&mut self) {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

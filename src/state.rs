//! The state store: single owner of all mutable engine state.
//!
//! Every mutation goes through a documented operation here; nothing else
//! writes pet or project fields directly, which is what keeps the derived
//! level/stage invariant and the at-most-once crediting invariant intact.
//! Each mutating operation persists the document before returning, so the
//! durable copy never lags by more than the operation in flight.
//!
//! Operations serialize on an internal async mutex: a decay tick and a sync
//! touching the same project cannot interleave mid-mutation.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::github::UserProfile;
use crate::persistence::{save_document_atomic, try_load_document, StateDocument, StateDocumentError};
use crate::progression;
use crate::types::{
    CommitRecord, CommitSha, MemoryId, PetMemory, Project, ProjectId, ProjectKind, RepoRef,
    Species,
};

/// Errors from state store operations.
#[derive(Debug, Error)]
pub enum StateError {
    /// Persistence failed; in-memory state may be ahead of the durable copy.
    #[error("persistence error: {0}")]
    Persistence(#[from] StateDocumentError),

    /// The referenced project doesn't exist.
    #[error("unknown project: {0}")]
    UnknownProject(ProjectId),

    /// The referenced pet memory doesn't exist.
    #[error("unknown pet memory: {0}")]
    UnknownMemory(MemoryId),
}

/// Result type for state store operations.
pub type Result<T> = std::result::Result<T, StateError>;

/// Owns the state document and its storage path.
pub struct StateStore {
    path: PathBuf,
    doc: Mutex<StateDocument>,
}

impl StateStore {
    /// Opens a store, loading the existing document or starting empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let doc = match try_load_document(&path)? {
            Some(doc) => {
                info!(path = %path.display(), projects = doc.projects.len(), "loaded state document");
                doc
            }
            None => {
                debug!(path = %path.display(), "no state document found, starting empty");
                StateDocument::new(Utc::now())
            }
        };

        Ok(StateStore {
            path,
            doc: Mutex::new(doc),
        })
    }

    /// Returns a read-only snapshot of the whole document.
    ///
    /// This is the rendering layer's view of the world; it carries raw
    /// numeric/enum fields only.
    pub async fn snapshot(&self) -> StateDocument {
        self.doc.lock().await.clone()
    }

    /// The currently selected project, if any.
    pub async fn current_project(&self) -> Option<Project> {
        self.doc.lock().await.current().cloned()
    }

    /// The authenticated user, if a login has succeeded.
    pub async fn user(&self) -> Option<UserProfile> {
        self.doc.lock().await.user.clone()
    }

    // ─── Identity ─────────────────────────────────────────────────────────────

    /// Stores the opaque bearer token.
    pub async fn set_token(&self, token: impl Into<String>) -> Result<()> {
        self.mutate(|doc| {
            doc.token = Some(token.into());
            Ok(())
        })
        .await
    }

    /// Stores the authenticated user profile.
    pub async fn set_user(&self, user: UserProfile) -> Result<()> {
        self.mutate(|doc| {
            doc.user = Some(user);
            Ok(())
        })
        .await
    }

    // ─── Project Management ───────────────────────────────────────────────────

    /// Creates a project with a fresh pet and selects it.
    pub async fn add_project(
        &self,
        repo: RepoRef,
        kind: Option<ProjectKind>,
        species: Species,
        pet_name: impl Into<String>,
    ) -> Result<ProjectId> {
        let project = Project::new(repo, kind, species, pet_name, Utc::now());
        info!(project = %project.id, repo = %project.repo, "adding project");

        self.mutate(|doc| {
            let id = project.id.clone();
            doc.current_project = Some(id.clone());
            doc.projects.push(project);
            Ok(id)
        })
        .await
    }

    /// Deletes a project, optionally archiving its pet as a memory first.
    ///
    /// When the deleted project was selected, selection moves to any
    /// remaining project.
    pub async fn delete_project(&self, id: &ProjectId, archive_pet: bool) -> Result<()> {
        self.mutate(|doc| {
            let project = doc
                .project(id)
                .cloned()
                .ok_or_else(|| StateError::UnknownProject(id.clone()))?;

            if archive_pet {
                doc.pet_memories
                    .push(PetMemory::capture(&project, None, Utc::now()));
            }

            doc.projects.retain(|p| &p.id != id);
            if doc.current_project.as_ref() == Some(id) {
                doc.current_project = doc.projects.first().map(|p| p.id.clone());
            }
            Ok(())
        })
        .await
    }

    /// Selects the active project.
    pub async fn set_current_project(&self, id: &ProjectId) -> Result<()> {
        self.mutate(|doc| {
            if doc.project(id).is_none() {
                return Err(StateError::UnknownProject(id.clone()));
            }
            doc.current_project = Some(id.clone());
            Ok(())
        })
        .await
    }

    /// Records a classification decision for a project.
    pub async fn set_project_kind(&self, id: &ProjectId, kind: ProjectKind) -> Result<()> {
        self.mutate(|doc| {
            let project = doc
                .project_mut(id)
                .ok_or_else(|| StateError::UnknownProject(id.clone()))?;
            project.kind = Some(kind);
            Ok(())
        })
        .await
    }

    // ─── Sync Results ─────────────────────────────────────────────────────────

    /// Stores a sync's observed history: the recent-commit list (capped),
    /// the computed streak, and the last-commit timestamp.
    ///
    /// This happens on every non-empty sync, whether or not any commit was
    /// newly credited.
    pub async fn record_history(
        &self,
        id: &ProjectId,
        commits: Vec<CommitRecord>,
        streak: u32,
        last_commit: Option<DateTime<Utc>>,
    ) -> Result<()> {
        self.mutate(|doc| {
            let project = doc
                .project_mut(id)
                .ok_or_else(|| StateError::UnknownProject(id.clone()))?;
            project.set_recent_commits(commits);
            project.pet.streak = streak;
            project.pet.last_commit = last_commit;
            Ok(())
        })
        .await
    }

    /// Credits XP for newly observed commits and marks them processed, as
    /// one atomic update.
    ///
    /// The credit, the activity boost, and the ledger append happen under a
    /// single lock acquisition and a single persist: a sha can never end up
    /// in the ledger without its XP applied, nor the reverse.
    pub async fn apply_commit_credit(
        &self,
        id: &ProjectId,
        total_xp: u32,
        shas: Vec<CommitSha>,
    ) -> Result<()> {
        self.mutate(|doc| {
            let project = doc
                .project_mut(id)
                .ok_or_else(|| StateError::UnknownProject(id.clone()))?;

            progression::credit(&mut project.pet, total_xp);
            progression::boost(&mut project.pet);
            project.processed.extend(shas);

            info!(
                project = %id,
                xp = total_xp,
                level = project.pet.level,
                stage = %project.pet.stage,
                "credited commits"
            );
            Ok(())
        })
        .await
    }

    // ─── Decay ────────────────────────────────────────────────────────────────

    /// Applies one decay tick to every project's pet.
    pub async fn decay_all(&self, now: DateTime<Utc>) -> Result<()> {
        self.mutate(|doc| {
            for project in &mut doc.projects {
                progression::decay(&mut project.pet, now);
            }
            Ok(())
        })
        .await
    }

    // ─── Pet Memories ─────────────────────────────────────────────────────────

    /// Archives a project's pet as a memory without deleting the project.
    pub async fn save_pet_memory(
        &self,
        id: &ProjectId,
        name: Option<String>,
    ) -> Result<MemoryId> {
        self.mutate(|doc| {
            let project = doc
                .project(id)
                .ok_or_else(|| StateError::UnknownProject(id.clone()))?;
            let memory = PetMemory::capture(project, name, Utc::now());
            let memory_id = memory.id.clone();
            doc.pet_memories.push(memory);
            Ok(memory_id)
        })
        .await
    }

    /// Deletes one pet memory.
    pub async fn delete_pet_memory(&self, id: &MemoryId) -> Result<()> {
        self.mutate(|doc| {
            let before = doc.pet_memories.len();
            doc.pet_memories.retain(|m| &m.id != id);
            if doc.pet_memories.len() == before {
                return Err(StateError::UnknownMemory(id.clone()));
            }
            Ok(())
        })
        .await
    }

    /// Deletes every pet memory.
    pub async fn clear_pet_memories(&self) -> Result<()> {
        self.mutate(|doc| {
            doc.pet_memories.clear();
            Ok(())
        })
        .await
    }

    // ─── Manual Test/Demo Interface ───────────────────────────────────────────
    //
    // Relays to the progression testing mutators. Demonstration surfaces
    // call these; the organic sync path never does.

    /// Applies a signed health delta to a project's pet.
    pub async fn update_health(&self, id: &ProjectId, delta: i32) -> Result<()> {
        self.mutate(|doc| {
            let project = doc
                .project_mut(id)
                .ok_or_else(|| StateError::UnknownProject(id.clone()))?;
            progression::testing::update_health(&mut project.pet, delta);
            Ok(())
        })
        .await
    }

    /// Applies a signed happiness delta to a project's pet.
    pub async fn update_happiness(&self, id: &ProjectId, delta: i32) -> Result<()> {
        self.mutate(|doc| {
            let project = doc
                .project_mut(id)
                .ok_or_else(|| StateError::UnknownProject(id.clone()))?;
            progression::testing::update_happiness(&mut project.pet, delta);
            Ok(())
        })
        .await
    }

    /// Records a simulated commit against a project's pet.
    pub async fn record_demo_commit(&self, id: &ProjectId, changed_lines: u32) -> Result<u32> {
        self.mutate(|doc| {
            let project = doc
                .project_mut(id)
                .ok_or_else(|| StateError::UnknownProject(id.clone()))?;
            Ok(progression::testing::record_demo_commit(
                &mut project.pet,
                changed_lines,
                Utc::now(),
            ))
        })
        .await
    }

    // ─── Internals ────────────────────────────────────────────────────────────

    /// Runs a mutation under the lock and persists the document.
    ///
    /// The mutation is staged on a copy: a failed mutation or a failed
    /// persist leaves the live in-memory state untouched.
    async fn mutate<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut StateDocument) -> Result<R>,
    {
        let mut doc = self.doc.lock().await;
        let mut staged = doc.clone();
        let value = f(&mut staged)?;

        staged.saved_at = Utc::now();
        save_document_atomic(&self.path, &staged)?;
        *doc = staged;
        Ok(value)
    }
}

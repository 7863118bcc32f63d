//! The process-wide state document.
//!
//! Everything durable lives in one JSON structure: the project collection,
//! the active-project selector, the authenticated identity and its token,
//! and the pet memory collection.
//!
//! # Atomic Writes
//!
//! Documents are written with a write-to-temp-then-rename pattern:
//! 1. Write to `<path>.tmp`
//! 2. fsync the file
//! 3. Rename to `<path>`
//! 4. fsync the directory
//!
//! This ensures readers always see either the old or new document, never a
//! partial write.

use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::fsync::{fsync_dir, fsync_file};
use crate::github::UserProfile;
use crate::types::{PetMemory, Project, ProjectId};

/// Current schema version. Increment when making breaking changes.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors that can occur during document operations.
#[derive(Debug, Error)]
pub enum StateDocumentError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema version mismatch.
    #[error("schema version mismatch: expected {expected}, got {got}")]
    SchemaMismatch { expected: u32, got: u32 },
}

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, StateDocumentError>;

/// The persisted state document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    /// Schema version for forward-compatible migrations.
    pub schema_version: u32,

    /// When this document was last written.
    pub saved_at: DateTime<Utc>,

    /// The opaque bearer token for the commit-history API, if supplied.
    pub token: Option<String>,

    /// The authenticated user, once a login has succeeded.
    pub user: Option<UserProfile>,

    /// All tracked projects.
    pub projects: Vec<Project>,

    /// The active project selector.
    pub current_project: Option<ProjectId>,

    /// Archived pets.
    pub pet_memories: Vec<PetMemory>,
}

impl StateDocument {
    /// Creates an empty document.
    pub fn new(now: DateTime<Utc>) -> Self {
        StateDocument {
            schema_version: SCHEMA_VERSION,
            saved_at: now,
            token: None,
            user: None,
            projects: Vec::new(),
            current_project: None,
            pet_memories: Vec::new(),
        }
    }

    /// Finds a project by id.
    pub fn project(&self, id: &ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| &p.id == id)
    }

    /// Finds a project by id, mutably.
    pub fn project_mut(&mut self, id: &ProjectId) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| &p.id == id)
    }

    /// The currently selected project, if any.
    pub fn current(&self) -> Option<&Project> {
        self.current_project.as_ref().and_then(|id| self.project(id))
    }
}

/// Saves a document atomically to disk.
///
/// # Errors
///
/// Returns an error if any IO operation fails.
pub fn save_document_atomic(path: &Path, document: &StateDocument) -> Result<()> {
    use std::fs::OpenOptions;
    use std::io::Write;

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(document)?;

    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.write_all(&bytes)?;
        fsync_file(&file)?;
    }

    // Atomic rename
    std::fs::rename(&tmp_path, path)?;

    // fsync directory to ensure rename is durable
    if let Some(parent) = path.parent() {
        fsync_dir(parent)?;
    }

    Ok(())
}

/// Loads a document from disk.
///
/// # Errors
///
/// Returns an error if the file can't be read, the JSON is malformed, or the
/// schema version is incompatible.
pub fn load_document(path: &Path) -> Result<StateDocument> {
    let bytes = std::fs::read(path)?;
    let document: StateDocument = serde_json::from_slice(&bytes)?;

    if document.schema_version != SCHEMA_VERSION {
        return Err(StateDocumentError::SchemaMismatch {
            expected: SCHEMA_VERSION,
            got: document.schema_version,
        });
    }

    Ok(document)
}

/// Attempts to load a document, returning None if the file doesn't exist.
///
/// Other errors (malformed JSON, schema mismatch) are propagated.
pub fn try_load_document(path: &Path) -> Result<Option<StateDocument>> {
    match load_document(path) {
        Ok(document) => Ok(Some(document)),
        Err(StateDocumentError::Io(e)) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

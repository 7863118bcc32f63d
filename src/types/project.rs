//! Tracked projects and archived pet memories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::commit::CommitRecord;
use super::ids::{CommitSha, MemoryId, ProjectId, RepoRef};
use super::pet::{Pet, Species};

/// Maximum number of commits retained on a project, most-recent-first.
pub const RECENT_COMMITS_CAP: usize = 50;

/// Classification of what a tracked repository is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectKind {
    Learning,
    SideHustle,
    Experiment,
    Portfolio,
    General,
}

impl fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectKind::Learning => "learning",
            ProjectKind::SideHustle => "side-hustle",
            ProjectKind::Experiment => "experiment",
            ProjectKind::Portfolio => "portfolio",
            ProjectKind::General => "general",
        };
        write!(f, "{}", s)
    }
}

/// A tracked (repository, pet) pairing.
///
/// The processed ledger holds every commit SHA that has been converted to XP
/// for this project's pet. Invariant: each SHA in the ledger was included in
/// exactly one credit operation - never two. The ledger is only ever appended
/// together with the credit itself (see the state store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub repo: RepoRef,
    /// `None` until classification runs on the first sync.
    pub kind: Option<ProjectKind>,
    pub created_at: DateTime<Utc>,
    pub pet: Pet,
    /// Most-recent-first, capped at [`RECENT_COMMITS_CAP`].
    pub recent_commits: Vec<CommitRecord>,
    /// SHAs already converted to XP.
    pub processed: HashSet<CommitSha>,
}

impl Project {
    /// Creates a project with a freshly constructed pet.
    pub fn new(
        repo: RepoRef,
        kind: Option<ProjectKind>,
        species: Species,
        pet_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Project {
            id: ProjectId::generate(),
            repo,
            kind,
            created_at: now,
            pet: Pet::new(species, pet_name),
            recent_commits: Vec::new(),
            processed: HashSet::new(),
        }
    }

    /// Returns true if this SHA has already been credited.
    pub fn is_processed(&self, sha: &CommitSha) -> bool {
        self.processed.contains(sha)
    }

    /// Replaces the recent-commit list, enforcing the cap.
    pub fn set_recent_commits(&mut self, commits: Vec<CommitRecord>) {
        self.recent_commits = commits;
        self.recent_commits.truncate(RECENT_COMMITS_CAP);
    }
}

/// A milestone earned by a pet, derived at memory-capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    /// Level 100 or above.
    GrandMaster,
    /// Level 50 or above.
    LegendaryStatus,
    /// Level 20 or above.
    AdultAchievement,
    /// A streak of 30 days or more.
    StreakMaster30,
    /// A streak of 7 days or more.
    WeekWarrior,
}

impl Achievement {
    /// Derives the achievement list for a pet, highest milestones first.
    pub fn earned_by(pet: &Pet) -> Vec<Achievement> {
        let mut earned = Vec::new();
        if pet.level >= 100 {
            earned.push(Achievement::GrandMaster);
        }
        if pet.level >= 50 {
            earned.push(Achievement::LegendaryStatus);
        }
        if pet.level >= 20 {
            earned.push(Achievement::AdultAchievement);
        }
        if pet.streak >= 30 {
            earned.push(Achievement::StreakMaster30);
        }
        if pet.streak >= 7 {
            earned.push(Achievement::WeekWarrior);
        }
        earned
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Achievement::GrandMaster => "Grand Master Achieved",
            Achievement::LegendaryStatus => "Legendary Status",
            Achievement::AdultAchievement => "Adult Achievement",
            Achievement::StreakMaster30 => "30 Day Streak Master",
            Achievement::WeekWarrior => "Week Warrior",
        };
        write!(f, "{}", s)
    }
}

/// An immutable snapshot of a retired pet.
///
/// Created only by explicit user action, never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetMemory {
    pub id: MemoryId,
    pub pet: Pet,
    pub project_name: String,
    pub repo: RepoRef,
    pub kind: Option<ProjectKind>,
    pub captured_at: DateTime<Utc>,
    pub total_commits: usize,
    pub achievements: Vec<Achievement>,
}

impl PetMemory {
    /// Captures a project's pet as a memory.
    ///
    /// The display name defaults to the repository name when none is given.
    pub fn capture(project: &Project, name: Option<String>, now: DateTime<Utc>) -> Self {
        PetMemory {
            id: MemoryId::generate(),
            pet: project.pet.clone(),
            project_name: name.unwrap_or_else(|| project.repo.name.clone()),
            repo: project.repo.clone(),
            kind: project.kind,
            captured_at: now,
            total_commits: project.recent_commits.len(),
            achievements: Achievement::earned_by(&project.pet),
        }
    }
}

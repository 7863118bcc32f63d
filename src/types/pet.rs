//! The pet itself: species, level, life stage, and vitals.
//!
//! Level and life stage are pure functions of accumulated XP and are never
//! set independently; every XP mutation goes through
//! [`crate::progression::credit`], which recomputes both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// XP required per level.
pub const XP_PER_LEVEL: u64 = 100;

/// Available pet species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    CommitCat,
    CommitCorgi,
}

impl Default for Species {
    fn default() -> Self {
        Species::CommitCat
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Species::CommitCat => write!(f, "commit_cat"),
            Species::CommitCorgi => write!(f, "commit_corgi"),
        }
    }
}

/// Life stage, strictly derived from level.
///
/// Bands are contiguous and non-overlapping:
/// egg 1-4, hatchling 5-9, juvenile 10-19, adult 20-49, legendary 50+.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeStage {
    Egg,
    Hatchling,
    Juvenile,
    Adult,
    Legendary,
}

impl LifeStage {
    /// Computes the life stage for a level.
    pub fn from_level(level: u32) -> LifeStage {
        if level >= 50 {
            LifeStage::Legendary
        } else if level >= 20 {
            LifeStage::Adult
        } else if level >= 10 {
            LifeStage::Juvenile
        } else if level >= 5 {
            LifeStage::Hatchling
        } else {
            LifeStage::Egg
        }
    }
}

impl fmt::Display for LifeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LifeStage::Egg => "egg",
            LifeStage::Hatchling => "hatchling",
            LifeStage::Juvenile => "juvenile",
            LifeStage::Adult => "adult",
            LifeStage::Legendary => "legendary",
        };
        write!(f, "{}", s)
    }
}

/// Computes the level for an XP total: `xp / 100 + 1`.
///
/// There is deliberately no upper bound on XP or level.
pub fn level_for_xp(xp: u64) -> u32 {
    (xp / XP_PER_LEVEL + 1) as u32
}

/// A single pet's state.
///
/// Invariant: `level == level_for_xp(xp)` and `stage ==
/// LifeStage::from_level(level)` after any XP mutation. Health and happiness
/// are always within `0..=100`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub species: Species,
    pub name: String,
    pub level: u32,
    pub xp: u64,
    pub stage: LifeStage,
    /// Consecutive calendar days with at least one credited commit.
    pub streak: u32,
    pub last_commit: Option<DateTime<Utc>>,
    pub health: u8,
    pub happiness: u8,
}

impl Pet {
    /// Creates a newly hatched... well, a newly laid pet.
    ///
    /// This is the single default-construction rule: level 1, zero XP, egg
    /// stage, full health and happiness.
    pub fn new(species: Species, name: impl Into<String>) -> Self {
        Pet {
            species,
            name: name.into(),
            level: 1,
            xp: 0,
            stage: LifeStage::Egg,
            streak: 0,
            last_commit: None,
            health: 100,
            happiness: 100,
        }
    }

    /// XP still needed to reach the next level.
    pub fn xp_to_next_level(&self) -> u64 {
        self.level as u64 * XP_PER_LEVEL - self.xp
    }
}

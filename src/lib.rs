//! PixelPet core - the commit-to-progression engine behind a GitHub-powered
//! virtual pet.
//!
//! This library fetches a developer's commit history from the GitHub REST API,
//! converts commits into experience points, and drives a pet's level, life
//! stage, streak, health, and happiness from that activity. Rendering and UI
//! concerns live elsewhere; this crate exposes read-only snapshots and
//! documented mutation operations only.

pub mod analyzer;
pub mod decay;
pub mod github;
pub mod persistence;
pub mod progression;
pub mod state;
pub mod sync;
pub mod types;
pub mod xp;

#[cfg(test)]
pub mod test_utils;

//! XP awards for commits.
//!
//! Everything here is a pure function of the commit's diff statistics,
//! touched files, and message text: identical input always yields identical
//! XP. Commits without fetched diff detail never reach [`commit_xp`]; the
//! sync orchestrator substitutes [`DETAIL_FREE_ESTIMATE`] for those.

use crate::types::{DiffStats, FileChange, FileStatus};

/// Every commit is worth at least this much.
pub const MIN_COMMIT_XP: u32 = 5;

/// Flat award for commits whose diff detail was never fetched.
///
/// Roughly the size award of a small-to-medium commit.
pub const DETAIL_FREE_ESTIMATE: u32 = 30;

/// XP for a commit with known diff statistics.
///
/// The award is the size component plus file-type and message-content
/// bonuses, floored at [`MIN_COMMIT_XP`].
pub fn commit_xp(stats: &DiffStats, files: &[FileChange], message: &str) -> u32 {
    let total = size_xp(stats.total) + file_bonuses(files) + message_bonuses(message);
    total.max(MIN_COMMIT_XP)
}

/// The size component, keyed by total changed lines.
pub fn size_xp(total_lines: u32) -> u32 {
    match total_lines {
        0..=5 => 10,     // tiny: typos, config tweaks
        6..=20 => 25,    // small: minor fixes
        21..=50 => 50,   // medium: decent feature work
        51..=100 => 75,  // large: significant changes
        101..=200 => 125, // very large: major features
        _ => 200,        // massive: complete rewrites
    }
}

/// File-type bonuses, summed over every touched file.
pub fn file_bonuses(files: &[FileChange]) -> u32 {
    let mut bonus = 0;

    for file in files {
        let path = file.path.to_lowercase();

        // Documentation
        if path.contains("readme") || path.ends_with(".md") || path.ends_with(".markdown") {
            bonus += 20;
        }
        // Tests
        if path.contains("test") || path.contains("spec") {
            bonus += 15;
        }
        // Configuration / package manifests
        if path.contains("package.json") || path.contains("config") {
            bonus += 10;
        }
        // New file creation
        if file.status == FileStatus::Added {
            bonus += 10;
        }
    }

    bonus
}

/// Message-content bonuses, evaluated once against the lowercased message.
///
/// Bonuses are additive, not mutually exclusive.
pub fn message_bonuses(message: &str) -> u32 {
    let message = message.to_lowercase();
    let mut bonus = 0;

    // First commit
    if message.contains("initial") || message.contains("first") {
        bonus += 50;
    }
    // Deploy / release milestone
    if message.contains("deploy") || message.contains("release") {
        bonus += 100;
    }
    // Bug fix
    if message.contains("fix") || message.contains("bug") {
        bonus += 25;
    }
    // Feature completion
    if message.contains("complete") || message.contains("finish") {
        bonus += 40;
    }

    bonus
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stats(total: u32) -> DiffStats {
        DiffStats {
            additions: total,
            deletions: 0,
            total,
        }
    }

    #[test]
    fn size_bands_at_exact_boundaries() {
        assert_eq!(size_xp(5), 10);
        assert_eq!(size_xp(20), 25);
        assert_eq!(size_xp(50), 50);
        assert_eq!(size_xp(100), 75);
        assert_eq!(size_xp(200), 125);
        assert_eq!(size_xp(201), 200);
    }

    #[test]
    fn size_bands_just_past_boundaries() {
        assert_eq!(size_xp(0), 10);
        assert_eq!(size_xp(6), 25);
        assert_eq!(size_xp(21), 50);
        assert_eq!(size_xp(51), 75);
        assert_eq!(size_xp(101), 125);
        assert_eq!(size_xp(10_000), 200);
    }

    #[test]
    fn plain_commit_gets_only_size_xp() {
        assert_eq!(commit_xp(&stats(30), &[], "add widget rendering"), 50);
    }

    #[test]
    fn file_bonuses_sum_per_file() {
        let files = vec![
            FileChange::new("README.md", FileStatus::Modified), // readme + .md = 20
            FileChange::new("src/parser_test.rs", FileStatus::Added), // test 15 + added 10
            FileChange::new("app.config.js", FileStatus::Modified), // config 10
        ];
        assert_eq!(file_bonuses(&files), 55);
    }

    #[test]
    fn readme_bonus_applies_once_per_file() {
        // "readme.md" matches both the readme and markdown checks but the
        // documentation bonus is a single +20.
        let files = vec![FileChange::new("README.md", FileStatus::Modified)];
        assert_eq!(file_bonuses(&files), 20);
    }

    #[test]
    fn message_bonuses_are_additive() {
        assert_eq!(message_bonuses("initial commit"), 50);
        assert_eq!(message_bonuses("deploy to production"), 100);
        assert_eq!(message_bonuses("fix login bug"), 25);
        assert_eq!(message_bonuses("finish onboarding flow"), 40);
        // "fix bug before first release, finish line!" hits fix, first,
        // release, and finish at once.
        assert_eq!(
            message_bonuses("fix bug before first release, finish line!"),
            25 + 50 + 100 + 40
        );
        assert_eq!(message_bonuses("tweak padding"), 0);
    }

    #[test]
    fn message_matching_is_case_insensitive() {
        assert_eq!(message_bonuses("Initial Commit"), 50);
        assert_eq!(message_bonuses("RELEASE v1.0"), 100);
    }

    #[test]
    fn full_award_combines_all_components() {
        let files = vec![FileChange::new("docs/guide.md", FileStatus::Added)];
        // size 25 + (md 20 + added 10) + fix 25
        assert_eq!(commit_xp(&stats(10), &files, "fix typo in guide"), 80);
    }

    proptest! {
        #[test]
        fn award_never_below_minimum(
            total in 0u32..100_000,
            message in ".{0,200}",
        ) {
            prop_assert!(commit_xp(&stats(total), &[], &message) >= MIN_COMMIT_XP);
        }

        #[test]
        fn award_is_deterministic(
            total in 0u32..100_000,
            message in ".{0,200}",
        ) {
            let s = stats(total);
            prop_assert_eq!(
                commit_xp(&s, &[], &message),
                commit_xp(&s, &[], &message)
            );
        }

        #[test]
        fn size_xp_is_monotone(a in 0u32..100_000, b in 0u32..100_000) {
            if a <= b {
                prop_assert!(size_xp(a) <= size_xp(b));
            }
        }

        #[test]
        fn file_bonuses_grow_with_more_files(
            n in 0usize..20,
        ) {
            let files: Vec<_> = (0..n)
                .map(|i| FileChange::new(format!("src/mod{}.rs", i), FileStatus::Added))
                .collect();
            prop_assert_eq!(file_bonuses(&files), 10 * n as u32);
        }
    }
}

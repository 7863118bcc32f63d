//! Consecutive-day streak computation.

use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;

/// Counts consecutive calendar days with commit activity, walking backward
/// from `today`.
///
/// A day counts when at least one commit's author date falls on it. The walk
/// stops at the first empty day, except `today` itself: an empty today is
/// skipped rather than breaking the streak, so a streak survives the day's
/// first sync before any commit lands - but not two empty days.
pub fn current_streak(days_with_commits: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut cursor = today;

    loop {
        if days_with_commits.contains(&cursor) {
            streak += 1;
        } else if cursor != today {
            break;
        }
        cursor -= Duration::days(1);
    }

    streak
}

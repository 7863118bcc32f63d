//! The progression state machine: XP crediting, activity boosts, and
//! time-based decay.
//!
//! All operations here are total functions over valid inputs and mutate the
//! pet in place. Level and life stage are recomputed on every XP change and
//! never drift from `xp`; health and happiness are clamped to `0..=100`.

use chrono::{DateTime, Utc};

use crate::types::pet::{level_for_xp, LifeStage, Pet};
use crate::xp::size_xp;

/// Seconds per day, for fractional elapsed-day arithmetic.
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Credits XP to a pet and recomputes its level and stage.
///
/// XP is monotonically non-decreasing: the amount is unsigned, so a negative
/// credit is unrepresentable. There is intentionally no upper bound on XP or
/// level.
pub fn credit(pet: &mut Pet, amount: u32) {
    pet.xp += amount as u64;
    pet.level = level_for_xp(pet.xp);
    pet.stage = LifeStage::from_level(pet.level);
}

/// One-shot health/happiness boost for fresh activity.
///
/// Invoked once per sync that credited at least one commit, and once per
/// simulated commit.
pub fn boost(pet: &mut Pet) {
    pet.health = (pet.health + 5).min(100);
    pet.happiness = (pet.happiness + 10).min(100);
}

/// Applies one decay tick based on time since the last commit.
///
/// Decay bands are non-cumulative; the single highest matching band applies:
/// more than 7 days stale costs 5 health / 8 happiness, more than 3 days 3/5,
/// more than 1 day 1/2. A pet with health below 30 loses a further 2
/// happiness in the same tick. With no last commit the elapsed time counts as
/// zero. Each call applies one tick; callers drive this from a periodic
/// timer, and decay never increases either value.
pub fn decay(pet: &mut Pet, now: DateTime<Utc>) {
    let stale_days = match pet.last_commit {
        Some(last) => (now - last).num_seconds() as f64 / SECONDS_PER_DAY,
        None => 0.0,
    };

    let (health_loss, mut happiness_loss) = if stale_days > 7.0 {
        (5, 8)
    } else if stale_days > 3.0 {
        (3, 5)
    } else if stale_days > 1.0 {
        (1, 2)
    } else {
        (0, 0)
    };

    // A sick pet gets sad, whatever the calendar says.
    if pet.health < 30 {
        happiness_loss += 2;
    }

    pet.health = pet.health.saturating_sub(health_loss);
    pet.happiness = pet.happiness.saturating_sub(happiness_loss);
}

/// Manual test/demo mutators.
///
/// These exist for demonstration and testing surfaces only; the organic
/// progression path never calls them.
pub mod testing {
    use super::*;

    /// Applies a signed health delta, clamped to `0..=100`.
    pub fn update_health(pet: &mut Pet, delta: i32) {
        pet.health = clamped(pet.health, delta);
    }

    /// Applies a signed happiness delta, clamped to `0..=100`.
    pub fn update_happiness(pet: &mut Pet, delta: i32) {
        pet.happiness = clamped(pet.happiness, delta);
    }

    /// Records a simulated commit of the given size.
    ///
    /// Credits the size-band XP, extends the streak, stamps the last-commit
    /// time, and applies the activity boost - the same shape as a real
    /// credited commit, without touching the processed ledger.
    pub fn record_demo_commit(pet: &mut Pet, changed_lines: u32, now: DateTime<Utc>) -> u32 {
        let awarded = size_xp(changed_lines);
        credit(pet, awarded);
        pet.streak += 1;
        pet.last_commit = Some(now);
        boost(pet);
        awarded
    }

    fn clamped(current: u8, delta: i32) -> u8 {
        (current as i32 + delta).clamp(0, 100) as u8
    }
}

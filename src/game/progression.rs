//! Experience and level handling.
//!
//! `level` is stored on the stat block and raised here whenever experience
//! crosses a threshold, so reads never need to recompute it.

use crate::game::types::CharacterStats;

/// Experience needed per level.
pub const EXPERIENCE_PER_LEVEL: u32 = 100;

pub const LEVEL_UP_MAX_HEALTH: i32 = 10;
pub const LEVEL_UP_ATTACK: i32 = 2;
pub const LEVEL_UP_DEFENSE: i32 = 1;

/// Level implied by an experience total.
pub fn level_for_experience(experience: u32) -> u32 {
    1 + experience / EXPERIENCE_PER_LEVEL
}

/// Experience still missing before the next level.
pub fn experience_to_next_level(stats: &CharacterStats) -> u32 {
    let next_threshold = stats.level.max(1).saturating_mul(EXPERIENCE_PER_LEVEL);
    next_threshold.saturating_sub(stats.experience)
}

/// Add experience and apply any level-ups it triggers. Returns levels gained.
///
/// Level-ups raise max health, attack and defense but leave current health
/// alone, so a killing blow never changes the player's health.
pub fn award_experience(stats: &mut CharacterStats, experience: u32) -> u32 {
    stats.experience = stats.experience.saturating_add(experience);
    let target = level_for_experience(stats.experience);
    let mut gained = 0;
    while stats.level < target {
        stats.level += 1;
        stats.max_health = stats.max_health.saturating_add(LEVEL_UP_MAX_HEALTH);
        stats.attack = stats.attack.saturating_add(LEVEL_UP_ATTACK);
        stats.defense = stats.defense.saturating_add(LEVEL_UP_DEFENSE);
        gained += 1;
    }
    gained
}

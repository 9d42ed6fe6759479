//! Dice rolls and skill checks.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_SIDES: u32 = 20;
pub const DEFAULT_DIFFICULTY: i32 = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SkillCheck {
    pub roll: u32,
    pub skill_value: i32,
    pub difficulty: i32,
    pub success: bool,
}

impl fmt::Display for SkillCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rolled {} + Skill {} vs DC {} - {}",
            self.roll,
            self.skill_value,
            self.difficulty,
            if self.success { "Success" } else { "Fail" }
        )
    }
}

/// Uniform roll in `[1, sides]`. A zero-sided die is treated as a d1.
pub fn roll_dice_with<R: Rng + ?Sized>(sides: u32, rng: &mut R) -> u32 {
    rng.gen_range(1..=sides.max(1))
}

pub fn roll_dice(sides: u32) -> u32 {
    roll_dice_with(sides, &mut rand::thread_rng())
}

/// Passes when `roll + skill >= difficulty`.
pub fn skill_check_with<R: Rng + ?Sized>(
    skill_value: i32,
    difficulty: i32,
    sides: u32,
    rng: &mut R,
) -> SkillCheck {
    let roll = roll_dice_with(sides, rng);
    SkillCheck {
        roll,
        skill_value,
        difficulty,
        success: i32::try_from(roll)
            .unwrap_or(i32::MAX)
            .saturating_add(skill_value)
            >= difficulty,
    }
}

pub fn skill_check(skill_value: i32, difficulty: i32, sides: u32) -> SkillCheck {
    skill_check_with(skill_value, difficulty, sides, &mut rand::thread_rng())
}

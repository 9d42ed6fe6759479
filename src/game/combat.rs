//! Combat resolution.
//!
//! One exchange is computed by [`perform_attack`] against an immutable
//! snapshot and applied by [`commit_attack`], which builds the next snapshot.
//! Randomness is drawn from a call-local RNG so concurrent requests can never
//! influence each other's rolls.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::errors::GameError;
use crate::game::progression::award_experience;
use crate::game::types::{CharacterStats, GameState, Transition};

/// Half-width of the uniform damage roll, `r` in `[-3, 3]`.
pub const DAMAGE_VARIANCE: i32 = 3;

/// Floor applied to every hit so combat always progresses.
pub const MIN_DAMAGE: i32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttackOutcome {
    pub success: bool,
    pub message: String,
    /// Damage dealt to the enemy.
    pub damage: i32,
    /// Counter-attack damage taken by the player (0 on a killing blow).
    pub damage_taken: i32,
    pub enemy_defeated: bool,
    pub experience_gained: u32,
    #[serde(default)]
    pub levels_gained: u32,
    #[serde(default)]
    pub player_defeated: bool,
    pub player_stats: CharacterStats,
    /// Surviving enemy's stats; `None` when it was defeated or never found.
    pub enemy_stats: Option<CharacterStats>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_enemies: Vec<String>,
}

impl AttackOutcome {
    fn no_target(state: &GameState, target: &str, available: Vec<String>) -> Self {
        let message = if available.is_empty() {
            format!("There is no '{}' here. Nothing here to fight.", target)
        } else {
            format!(
                "There is no '{}' here. Enemies present: {}",
                target,
                available.join(", ")
            )
        };
        Self {
            success: false,
            message,
            damage: 0,
            damage_taken: 0,
            enemy_defeated: false,
            experience_gained: 0,
            levels_gained: 0,
            player_defeated: false,
            player_stats: state.player.stats.clone(),
            enemy_stats: None,
            available_enemies: available,
        }
    }
}

/// `max(1, attack - floor(defense / 2) + r)` with `r` drawn from `rng`.
pub fn resolve_attack_with<R: Rng + ?Sized>(
    attacker: &CharacterStats,
    defender: &CharacterStats,
    rng: &mut R,
) -> i32 {
    let roll = rng.gen_range(-DAMAGE_VARIANCE..=DAMAGE_VARIANCE);
    attacker
        .attack
        .saturating_sub(defender.defense.div_euclid(2))
        .saturating_add(roll)
        .max(MIN_DAMAGE)
}

/// Damage for one hit using the thread-local RNG.
pub fn resolve_attack(attacker: &CharacterStats, defender: &CharacterStats) -> i32 {
    resolve_attack_with(attacker, defender, &mut rand::thread_rng())
}

/// Compute one exchange against the enemy named `target` at the player's location.
///
/// An absent target is a normal outcome with `success: false`; only a corrupt
/// snapshot produces an error.
pub fn perform_attack(state: &GameState, target: &str) -> Result<AttackOutcome, GameError> {
    perform_attack_with(state, target, &mut rand::thread_rng())
}

pub fn perform_attack_with<R: Rng + ?Sized>(
    state: &GameState,
    target: &str,
    rng: &mut R,
) -> Result<AttackOutcome, GameError> {
    let location = state.current_location()?;
    let Some((_, enemy)) = location.find_enemy(target) else {
        return Ok(AttackOutcome::no_target(state, target, location.enemy_names()));
    };

    let mut player_stats = state.player.stats.clone();
    let mut enemy_stats = enemy.stats.clone();

    let damage = resolve_attack_with(&player_stats, &enemy_stats, rng);
    enemy_stats.health = enemy_stats.health.saturating_sub(damage);

    if enemy_stats.is_defeated() {
        // A killing blow denies the enemy its counter-attack.
        let experience = enemy.experience_reward;
        let levels_gained = award_experience(&mut player_stats, experience);
        let mut message = format!(
            "You strike the {} for {} damage. The {} is defeated! (+{} XP)",
            enemy.name, damage, enemy.name, experience
        );
        if levels_gained > 0 {
            message.push_str(&format!(" You reached level {}!", player_stats.level));
        }
        return Ok(AttackOutcome {
            success: true,
            message,
            damage,
            damage_taken: 0,
            enemy_defeated: true,
            experience_gained: experience,
            levels_gained,
            player_defeated: player_stats.is_defeated(),
            player_stats,
            enemy_stats: None,
            available_enemies: Vec::new(),
        });
    }

    let damage_taken = resolve_attack_with(&enemy_stats, &player_stats, rng);
    player_stats.health = player_stats.health.saturating_sub(damage_taken).max(0);
    let player_defeated = player_stats.is_defeated();

    let mut message = format!(
        "You strike the {} for {} damage ({} HP left). It strikes back for {}.",
        enemy.name,
        damage,
        enemy_stats.visible_health(),
        damage_taken
    );
    if player_defeated {
        message.push_str(" You collapse, defeated.");
    }

    Ok(AttackOutcome {
        success: true,
        message,
        damage,
        damage_taken,
        enemy_defeated: false,
        experience_gained: 0,
        levels_gained: 0,
        player_defeated,
        player_stats,
        enemy_stats: Some(enemy_stats),
        available_enemies: Vec::new(),
    })
}

/// Build the snapshot that results from `outcome`. The input is only borrowed,
/// so callers may keep it for logging or rollback.
pub fn commit_attack(state: &GameState, outcome: &AttackOutcome, target: &str) -> GameState {
    let mut next = state.clone();
    if !outcome.success {
        return next;
    }

    next.player.stats = outcome.player_stats.clone();
    if let Some(location) = next.locations.get_mut(&next.player.current_location) {
        if let Some(index) = location.enemies.iter().position(|e| e.answers_to(target)) {
            match &outcome.enemy_stats {
                Some(stats) if !outcome.enemy_defeated => {
                    location.enemies[index].stats = stats.clone();
                }
                _ => {
                    location.enemies.remove(index);
                }
            }
        }
    }
    next
}

/// Perform and commit in one step.
pub fn attack(state: &GameState, target: &str) -> Result<Transition<AttackOutcome>, GameError> {
    attack_with(state, target, &mut rand::thread_rng())
}

pub fn attack_with<R: Rng + ?Sized>(
    state: &GameState,
    target: &str,
    rng: &mut R,
) -> Result<Transition<AttackOutcome>, GameError> {
    let outcome = perform_attack_with(state, target, rng)?;
    let next = commit_attack(state, &outcome, target);
    Ok(Transition::new(outcome, next))
}

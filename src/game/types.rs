use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::game::errors::GameError;
use crate::game::progression::level_for_experience;

/// Upper bound for health, attack and defense in a loaded snapshot.
pub const MAX_STAT_VALUE: i32 = 1_000_000;

/// Upper bound for accumulated experience in a loaded snapshot.
pub const MAX_EXPERIENCE: u32 = 10_000_000;

/// Upper bound for a single enemy's experience reward.
pub const MAX_EXPERIENCE_REWARD: u32 = 100_000;

/// Numeric attributes shared by players and enemies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CharacterStats {
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    pub level: u32,
    pub experience: u32,
}

impl CharacterStats {
    /// Stat block for an enemy template. Enemies never level, so level is fixed at 1.
    pub fn new(max_health: i32, attack: i32, defense: i32) -> Self {
        Self {
            health: max_health,
            max_health,
            attack,
            defense,
            level: 1,
            experience: 0,
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0
    }

    /// Health as shown to players; internal values may dip below zero mid-exchange.
    pub fn visible_health(&self) -> i32 {
        self.health.max(0)
    }

    /// Range checks applied to stat blocks coming from outside the engine.
    /// `who` names the owner in the error message.
    pub fn check_ranges(&self, who: &str) -> Result<(), GameError> {
        let invalid = |what: String| Err(GameError::InvalidStats(format!("{} {}", who, what)));
        if self.max_health <= 0 || self.max_health > MAX_STAT_VALUE {
            return invalid(format!("max health {}", self.max_health));
        }
        if self.health < 0 || self.health > self.max_health {
            return invalid(format!("health {}/{}", self.health, self.max_health));
        }
        if !(0..=MAX_STAT_VALUE).contains(&self.attack) {
            return invalid(format!("attack {}", self.attack));
        }
        if !(0..=MAX_STAT_VALUE).contains(&self.defense) {
            return invalid(format!("defense {}", self.defense));
        }
        if self.experience > MAX_EXPERIENCE {
            return invalid(format!("experience {}", self.experience));
        }
        if self.level != level_for_experience(self.experience) {
            return invalid(format!(
                "level {} does not match experience {}",
                self.level, self.experience
            ));
        }
        Ok(())
    }
}

impl Default for CharacterStats {
    fn default() -> Self {
        Self {
            health: 100,
            max_health: 100,
            attack: 10,
            defense: 5,
            level: 1,
            experience: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Enemy {
    pub id: String,
    pub name: String,
    pub stats: CharacterStats,
    pub description: String,
    pub experience_reward: u32,
}

impl Enemy {
    pub fn new(id: &str, name: &str, description: &str, stats: CharacterStats) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            stats,
            description: description.to_string(),
            experience_reward: 0,
        }
    }

    pub fn with_reward(mut self, experience: u32) -> Self {
        self.experience_reward = experience;
        self
    }

    /// Exact name comparison after lowercasing both sides.
    pub fn answers_to(&self, target: &str) -> bool {
        self.name.to_lowercase() == target.to_lowercase()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Directed: an exit to B does not imply B leads back here.
    #[serde(default)]
    pub exits: BTreeSet<String>,
    #[serde(default)]
    pub enemies: Vec<Enemy>,
    #[serde(default)]
    pub items: Vec<String>,
}

impl Location {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            exits: BTreeSet::new(),
            enemies: Vec::new(),
            items: Vec::new(),
        }
    }

    pub fn with_exit(mut self, destination: &str) -> Self {
        self.exits.insert(destination.to_string());
        self
    }

    pub fn with_enemy(mut self, enemy: Enemy) -> Self {
        self.enemies.push(enemy);
        self
    }

    pub fn with_item(mut self, item: &str) -> Self {
        self.items.push(item.to_string());
        self
    }

    pub fn find_enemy(&self, target: &str) -> Option<(usize, &Enemy)> {
        self.enemies
            .iter()
            .enumerate()
            .find(|(_, enemy)| enemy.answers_to(target))
    }

    pub fn enemy_names(&self) -> Vec<String> {
        self.enemies.iter().map(|e| e.name.clone()).collect()
    }

    pub fn exit_list(&self) -> Vec<String> {
        self.exits.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub name: String,
    pub stats: CharacterStats,
    pub current_location: String,
    #[serde(default)]
    pub inventory: Vec<String>,
}

impl Player {
    pub fn new(id: &str, name: &str, location_id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            stats: CharacterStats::default(),
            current_location: location_id.to_string(),
            inventory: Vec::new(),
        }
    }
}

/// Full snapshot of player and world. Transitions never modify a published
/// snapshot; they build the next one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub player: Player,
    pub locations: BTreeMap<String, Location>,
}

impl GameState {
    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations.get(id)
    }

    /// The player's location; missing means the snapshot itself is corrupt.
    pub fn current_location(&self) -> Result<&Location, GameError> {
        self.locations
            .get(&self.player.current_location)
            .ok_or_else(|| GameError::CorruptState {
                location_id: self.player.current_location.clone(),
            })
    }

    /// Checks the invariants a loaded snapshot must satisfy before it may become current.
    ///
    /// Enemies still in the world must be alive, so their health is at least 1.
    pub fn validate(&self) -> Result<(), GameError> {
        self.current_location()?;
        self.player.stats.check_ranges("player")?;
        for location in self.locations.values() {
            for enemy in &location.enemies {
                let who = format!("enemy '{}' in {}", enemy.name, location.id);
                enemy.stats.check_ranges(&who)?;
                if enemy.stats.is_defeated() {
                    return Err(GameError::InvalidStats(format!("{} has no health left", who)));
                }
                if enemy.experience_reward > MAX_EXPERIENCE_REWARD {
                    return Err(GameError::InvalidStats(format!(
                        "{} reward {}",
                        who, enemy.experience_reward
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Result of a transition paired with the snapshot it produced. On rejection
/// `state` is an unchanged copy of the input.
#[derive(Debug, Clone)]
pub struct Transition<R> {
    pub result: R,
    pub state: GameState,
}

impl<R> Transition<R> {
    pub fn new(result: R, state: GameState) -> Self {
        Self { result, state }
    }

    pub fn map<T>(self, f: impl FnOnce(R) -> T) -> Transition<T> {
        Transition {
            result: f(self.result),
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stats_match_new_player() {
        let stats = CharacterStats::default();
        assert_eq!(stats.health, 100);
        assert_eq!(stats.max_health, 100);
        assert_eq!(stats.attack, 10);
        assert_eq!(stats.defense, 5);
        assert_eq!(stats.level, 1);
        assert_eq!(stats.experience, 0);
    }

    #[test]
    fn enemy_name_match_is_case_insensitive_but_exact() {
        let rat = Enemy::new("rat", "Giant Rat", "big", CharacterStats::new(10, 2, 1));
        assert!(rat.answers_to("giant rat"));
        assert!(rat.answers_to("GIANT RAT"));
        assert!(!rat.answers_to("rat"));
        assert!(!rat.answers_to("giant rat "));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let player = Player::new("p1", "Hero", "tavern");
        let json = serde_json::to_string(&player).unwrap();
        assert!(json.contains("\"currentLocation\":\"tavern\""));
        assert!(json.contains("\"maxHealth\":100"));
    }

    #[test]
    fn default_world_passes_validation() {
        assert_eq!(crate::game::new_game("Hero").validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_out_of_range_player_stats() {
        let cases: Vec<fn(&mut CharacterStats)> = vec![
            |s: &mut CharacterStats| s.attack = -1,
            |s: &mut CharacterStats| s.attack = i32::MAX,
            |s: &mut CharacterStats| s.defense = -5,
            |s: &mut CharacterStats| s.defense = MAX_STAT_VALUE + 1,
            |s: &mut CharacterStats| s.level = 0,
            |s: &mut CharacterStats| s.level = 50_000_000,
            |s: &mut CharacterStats| s.experience = MAX_EXPERIENCE + 1,
            |s: &mut CharacterStats| s.max_health = 0,
            |s: &mut CharacterStats| s.health = -1,
            |s: &mut CharacterStats| s.health = 101,
        ];
        for (i, corrupt) in cases.into_iter().enumerate() {
            let mut state = crate::game::new_game("Hero");
            corrupt(&mut state.player.stats);
            assert!(
                matches!(state.validate(), Err(GameError::InvalidStats(_))),
                "case {} accepted",
                i
            );
        }
    }

    #[test]
    fn validate_checks_every_enemy() {
        let mut state = crate::game::new_game("Hero");
        let troll = &mut state.locations.get_mut("deep_forest").unwrap().enemies[1];
        troll.stats.attack = i32::MAX;
        assert!(matches!(state.validate(), Err(GameError::InvalidStats(_))));

        let mut state = crate::game::new_game("Hero");
        state.locations.get_mut("cellar").unwrap().enemies[0].stats.health = 0;
        assert!(matches!(state.validate(), Err(GameError::InvalidStats(_))));

        let mut state = crate::game::new_game("Hero");
        state.locations.get_mut("cellar").unwrap().enemies[0].experience_reward = u32::MAX;
        assert!(matches!(state.validate(), Err(GameError::InvalidStats(_))));
    }

    #[test]
    fn validate_rejects_missing_location() {
        let state = GameState {
            player: Player::new("p1", "Hero", "nowhere"),
            locations: BTreeMap::new(),
        };
        assert!(matches!(
            state.validate(),
            Err(GameError::CorruptState { .. })
        ));
    }
}

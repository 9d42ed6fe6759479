//! Text-adventure engine: world data, combat, movement and inventory.
//!
//! Every transition borrows the current [`GameState`] and returns a new one;
//! nothing in this module keeps state between calls or touches I/O.

pub mod combat;
pub mod commands;
pub mod describe;
pub mod dice;
pub mod errors;
pub mod inventory;
pub mod lore;
pub mod movement;
pub mod progression;
pub mod types;
pub mod world;

pub use combat::{
    attack, commit_attack, perform_attack, resolve_attack, AttackOutcome, DAMAGE_VARIANCE,
    MIN_DAMAGE,
};
pub use commands::{CommandResult, GameCommand, NewGameResult};
pub use describe::{describe_location, UNKNOWN_LOCATION_MESSAGE};
pub use dice::{roll_dice, skill_check, SkillCheck, DEFAULT_DIFFICULTY, DEFAULT_SIDES};
pub use errors::GameError;
pub use inventory::{drop_item, list_inventory, take_item, ItemResult, MAX_INVENTORY_ITEMS};
pub use lore::{default_lore, LoreBook, LoreEntry, LoreError, MAX_LORE_ENTRIES};
pub use movement::{move_to_location, MoveRejection, MoveResult};
pub use progression::{award_experience, experience_to_next_level, EXPERIENCE_PER_LEVEL};
pub use types::*;
pub use world::{default_world, new_game, DEFAULT_WORLD_LOCATION_IDS, START_LOCATION_ID};

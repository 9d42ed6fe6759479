//! Typed player intents.
//!
//! Requests are decoded and validated at the HTTP boundary into a
//! [`GameCommand`]; the transition functions only ever see well-formed input.

use serde::{Deserialize, Serialize};

use crate::game::combat::{attack, AttackOutcome};
use crate::game::errors::GameError;
use crate::game::inventory::{drop_item, take_item, ItemResult};
use crate::game::movement::{move_to_location, MoveResult};
use crate::game::types::{GameState, Player, Transition};
use crate::game::world::new_game;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum GameCommand {
    NewGame { name: String },
    Move { to: String },
    Attack { target: String },
    Take { item: String },
    Drop { item: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewGameResult {
    pub success: bool,
    pub message: String,
    pub player: Player,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CommandResult {
    NewGame(NewGameResult),
    Move(MoveResult),
    Attack(AttackOutcome),
    Item(ItemResult),
}

impl CommandResult {
    pub fn success(&self) -> bool {
        match self {
            CommandResult::NewGame(r) => r.success,
            CommandResult::Move(r) => r.success,
            CommandResult::Attack(r) => r.success,
            CommandResult::Item(r) => r.success,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CommandResult::NewGame(r) => &r.message,
            CommandResult::Move(r) => &r.message,
            CommandResult::Attack(r) => &r.message,
            CommandResult::Item(r) => &r.message,
        }
    }
}

impl GameCommand {
    /// Short verb used for journal entries and counters.
    pub fn verb(&self) -> &'static str {
        match self {
            GameCommand::NewGame { .. } => "new_game",
            GameCommand::Move { .. } => "move",
            GameCommand::Attack { .. } => "attack",
            GameCommand::Take { .. } => "take",
            GameCommand::Drop { .. } => "drop",
        }
    }

    /// Run the matching transition function against `state`.
    pub fn execute(&self, state: &GameState) -> Result<Transition<CommandResult>, GameError> {
        match self {
            GameCommand::NewGame { name } => {
                let fresh = new_game(name);
                let result = NewGameResult {
                    success: true,
                    message: format!("Welcome, {}. Your adventure begins.", name),
                    player: fresh.player.clone(),
                };
                Ok(Transition::new(CommandResult::NewGame(result), fresh))
            }
            GameCommand::Move { to } => {
                Ok(move_to_location(state, to)?.map(CommandResult::Move))
            }
            GameCommand::Attack { target } => {
                Ok(attack(state, target)?.map(CommandResult::Attack))
            }
            GameCommand::Take { item } => Ok(take_item(state, item)?.map(CommandResult::Item)),
            GameCommand::Drop { item } => Ok(drop_item(state, item)?.map(CommandResult::Item)),
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::game::errors::GameError;
use crate::game::types::{GameState, Transition};

/// Why a move was refused.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MoveRejection {
    /// Target is not listed in the current location's exits.
    NotAnExit,
    /// Target is listed as an exit but has no entry in the world map.
    UnknownDestination,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MoveResult {
    pub success: bool,
    pub message: String,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<MoveRejection>,
    pub available_exits: Vec<String>,
}

/// Move the player one hop to `target`.
///
/// Succeeds iff `target` is an exit of the current location and a key of the
/// world map. Only `player.current_location` changes on success.
pub fn move_to_location(
    state: &GameState,
    target: &str,
) -> Result<Transition<MoveResult>, GameError> {
    let here = state.current_location()?;
    let available_exits = here.exit_list();

    if !here.exits.contains(target) {
        let message = if available_exits.is_empty() {
            format!("You can't go to '{}' from here. There are no exits.", target)
        } else {
            format!(
                "You can't go to '{}' from here. Available exits: {}",
                target,
                available_exits.join(", ")
            )
        };
        let result = MoveResult {
            success: false,
            message,
            location: here.id.clone(),
            reason: Some(MoveRejection::NotAnExit),
            available_exits,
        };
        return Ok(Transition::new(result, state.clone()));
    }

    let Some(destination) = state.location(target) else {
        let result = MoveResult {
            success: false,
            message: format!("The way to '{}' leads nowhere.", target),
            location: here.id.clone(),
            reason: Some(MoveRejection::UnknownDestination),
            available_exits,
        };
        return Ok(Transition::new(result, state.clone()));
    };

    let result = MoveResult {
        success: true,
        message: format!("You travel to {}.", destination.name),
        location: destination.id.clone(),
        reason: None,
        available_exits: destination.exit_list(),
    };
    let mut next = state.clone();
    next.player.current_location = destination.id.clone();
    Ok(Transition::new(result, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::new_game;

    #[test]
    fn tavern_to_cellar() {
        let state = new_game("Hero");
        let moved = move_to_location(&state, "cellar").unwrap();
        assert!(moved.result.success);
        assert_eq!(moved.state.player.current_location, "cellar");
        assert_eq!(moved.result.available_exits, vec!["tavern".to_string()]);
        assert_eq!(state.player.current_location, "tavern");
    }

    #[test]
    fn non_exit_is_rejected_with_exit_list() {
        let state = new_game("Hero");
        let moved = move_to_location(&state, "deep_forest").unwrap();
        assert!(!moved.result.success);
        assert_eq!(moved.result.reason, Some(MoveRejection::NotAnExit));
        assert!(moved.result.message.contains("cellar"));
        assert!(moved.result.message.contains("town_square"));
        assert_eq!(moved.state, state);
    }

    #[test]
    fn dangling_exit_is_a_distinct_rejection() {
        let mut state = new_game("Hero");
        state
            .locations
            .get_mut("tavern")
            .unwrap()
            .exits
            .insert("collapsed_tunnel".into());
        let moved = move_to_location(&state, "collapsed_tunnel").unwrap();
        assert!(!moved.result.success);
        assert_eq!(moved.result.reason, Some(MoveRejection::UnknownDestination));
        assert_eq!(moved.state, state);
    }

    #[test]
    fn only_location_changes() {
        let state = new_game("Hero");
        let next = move_to_location(&state, "town_square").unwrap().state;
        let mut expected = state.clone();
        expected.player.current_location = "town_square".into();
        assert_eq!(next, expected);
    }
}

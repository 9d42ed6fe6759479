//! Moving items between the player's location and their pack.

use serde::{Deserialize, Serialize};

use crate::game::errors::GameError;
use crate::game::types::{GameState, Transition};

/// Most items a player may carry at once.
pub const MAX_INVENTORY_ITEMS: usize = 20;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<String>,
    /// Items the caller could have named instead (location items for take,
    /// inventory for drop).
    pub available_items: Vec<String>,
    pub inventory: Vec<String>,
}

fn position_of(items: &[String], wanted: &str) -> Option<usize> {
    let wanted = wanted.to_lowercase();
    items.iter().position(|item| item.to_lowercase() == wanted)
}

/// Pick `item` up from the current location.
pub fn take_item(state: &GameState, item: &str) -> Result<Transition<ItemResult>, GameError> {
    let here = state.current_location()?;

    let Some(index) = position_of(&here.items, item) else {
        let result = ItemResult {
            success: false,
            message: format!("There is no '{}' here.", item),
            item: None,
            available_items: here.items.clone(),
            inventory: state.player.inventory.clone(),
        };
        return Ok(Transition::new(result, state.clone()));
    };

    if state.player.inventory.len() >= MAX_INVENTORY_ITEMS {
        let result = ItemResult {
            success: false,
            message: format!(
                "Your pack is full! You can carry at most {} items.",
                MAX_INVENTORY_ITEMS
            ),
            item: None,
            available_items: here.items.clone(),
            inventory: state.player.inventory.clone(),
        };
        return Ok(Transition::new(result, state.clone()));
    }

    let mut next = state.clone();
    let taken = match next.locations.get_mut(&next.player.current_location) {
        Some(location) => location.items.remove(index),
        None => {
            return Err(GameError::CorruptState {
                location_id: next.player.current_location.clone(),
            })
        }
    };
    next.player.inventory.push(taken.clone());

    let result = ItemResult {
        success: true,
        message: format!("You pick up the {}.", taken),
        item: Some(taken),
        available_items: next.current_location()?.items.clone(),
        inventory: next.player.inventory.clone(),
    };
    Ok(Transition::new(result, next))
}

/// Put `item` from the pack down at the current location.
pub fn drop_item(state: &GameState, item: &str) -> Result<Transition<ItemResult>, GameError> {
    let here = state.current_location()?;

    let Some(index) = position_of(&state.player.inventory, item) else {
        let result = ItemResult {
            success: false,
            message: format!("You are not carrying '{}'.", item),
            item: None,
            available_items: state.player.inventory.clone(),
            inventory: state.player.inventory.clone(),
        };
        return Ok(Transition::new(result, state.clone()));
    };

    let location_id = here.id.clone();
    let mut next = state.clone();
    let dropped = next.player.inventory.remove(index);
    if let Some(location) = next.locations.get_mut(&location_id) {
        location.items.push(dropped.clone());
    }

    let result = ItemResult {
        success: true,
        message: format!("You drop the {}.", dropped),
        item: Some(dropped),
        available_items: next.player.inventory.clone(),
        inventory: next.player.inventory.clone(),
    };
    Ok(Transition::new(result, next))
}

pub fn list_inventory(state: &GameState) -> &[String] {
    &state.player.inventory
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::world::new_game;

    #[test]
    fn take_moves_item_into_pack() {
        let state = new_game("Hero");
        let taken = take_item(&state, "bread loaf").unwrap();
        assert!(taken.result.success);
        assert_eq!(taken.result.item.as_deref(), Some("Bread Loaf"));
        assert_eq!(list_inventory(&taken.state), ["Bread Loaf".to_string()]);
        assert!(taken.state.locations["tavern"].items.is_empty());
        assert_eq!(state.locations["tavern"].items.len(), 1);
    }

    #[test]
    fn take_missing_item_is_rejected() {
        let state = new_game("Hero");
        let taken = take_item(&state, "Excalibur").unwrap();
        assert!(!taken.result.success);
        assert_eq!(taken.result.available_items, vec!["Bread Loaf".to_string()]);
        assert_eq!(taken.state, state);
    }

    #[test]
    fn full_pack_refuses_more() {
        let mut state = new_game("Hero");
        state.player.inventory = (0..MAX_INVENTORY_ITEMS)
            .map(|i| format!("Pebble {}", i))
            .collect();
        let taken = take_item(&state, "Bread Loaf").unwrap();
        assert!(!taken.result.success);
        assert!(taken.result.message.contains("full"));
        assert_eq!(taken.state, state);
    }

    #[test]
    fn drop_returns_item_to_location() {
        let state = new_game("Hero");
        let held = take_item(&state, "Bread Loaf").unwrap().state;
        let dropped = drop_item(&held, "BREAD LOAF").unwrap();
        assert!(dropped.result.success);
        assert!(dropped.state.player.inventory.is_empty());
        assert_eq!(dropped.state.locations["tavern"].items, vec!["Bread Loaf".to_string()]);
    }

    #[test]
    fn drop_unknown_item_is_rejected() {
        let state = new_game("Hero");
        let dropped = drop_item(&state, "Torch").unwrap();
        assert!(!dropped.result.success);
        assert_eq!(dropped.state, state);
    }
}

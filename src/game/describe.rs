use crate::game::types::GameState;

/// Returned for ids that have no entry in the world map.
pub const UNKNOWN_LOCATION_MESSAGE: &str = "You are in an unknown location.";

/// Describe `location_id`, or the player's location when `None`.
///
/// Sections come in a fixed order: name, description, enemies, items, exits.
/// Enemies and items are left out when empty; exits always appear.
pub fn describe_location(state: &GameState, location_id: Option<&str>) -> String {
    let id = location_id.unwrap_or(&state.player.current_location);
    let Some(location) = state.location(id) else {
        return UNKNOWN_LOCATION_MESSAGE.to_string();
    };

    let mut out = String::new();
    out.push_str(&location.name);
    out.push('\n');
    out.push_str(&location.description);
    out.push('\n');

    if !location.enemies.is_empty() {
        out.push_str("\nEnemies:\n");
        for enemy in &location.enemies {
            out.push_str(&format!("- {}: {}\n", enemy.name, enemy.description));
        }
    }

    if !location.items.is_empty() {
        out.push_str("\nItems:\n");
        for item in &location.items {
            out.push_str(&format!("- {}\n", item));
        }
    }

    if location.exits.is_empty() {
        out.push_str("\nExits: none");
    } else {
        out.push_str("\nExits: ");
        out.push_str(&location.exit_list().join(", "));
    }
    out
}

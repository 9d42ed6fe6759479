use std::collections::BTreeMap;

use uuid::Uuid;

use crate::game::types::{CharacterStats, Enemy, GameState, Location, Player};

/// Location every new character starts in.
pub const START_LOCATION_ID: &str = "tavern";

/// Ids of the locations in the default world, in authoring order.
pub const DEFAULT_WORLD_LOCATION_IDS: &[&str] = &[
    START_LOCATION_ID,
    "town_square",
    "cellar",
    "blacksmith",
    "forest_entrance",
    "deep_forest",
];

/// Build the default world.
///
/// The graph is data, not logic: operators may change the prose freely, but
/// tests rely on the exits and on the cellar holding a single Giant Rat worth
/// 10 experience.
pub fn default_world() -> BTreeMap<String, Location> {
    let mut locations = Vec::new();

    let tavern = Location::new(
        START_LOCATION_ID,
        "The Rusty Tankard",
        "A smoky tavern with low beams and a crackling hearth. Regulars nurse \
their ale and trade rumours about the forest beyond town. A trapdoor behind \
the bar leads down to the cellar.",
    )
    .with_exit("town_square")
    .with_exit("cellar")
    .with_item("Bread Loaf");
    locations.push(tavern);

    let town_square = Location::new(
        "town_square",
        "Town Square",
        "Cobblestones ring a dry fountain. The blacksmith's hammer echoes from \
the east and a dirt road winds north toward the treeline.",
    )
    .with_exit(START_LOCATION_ID)
    .with_exit("forest_entrance")
    .with_exit("blacksmith");
    locations.push(town_square);

    let cellar = Location::new(
        "cellar",
        "Tavern Cellar",
        "Damp stone walls and stacked barrels. Something skitters between the \
casks.",
    )
    .with_exit(START_LOCATION_ID)
    .with_enemy(
        Enemy::new(
            "giant_rat",
            "Giant Rat",
            "A rat the size of a terrier, yellow teeth bared.",
            CharacterStats::new(20, 4, 2),
        )
        .with_reward(10),
    )
    .with_item("Torch");
    locations.push(cellar);

    let blacksmith = Location::new(
        "blacksmith",
        "Blacksmith's Forge",
        "Heat rolls off the forge. Racks of half-finished blades line the walls.",
    )
    .with_exit("town_square")
    .with_item("Iron Sword");
    locations.push(blacksmith);

    let forest_entrance = Location::new(
        "forest_entrance",
        "Forest Entrance",
        "Ancient oaks crowd the path. Broken branches suggest something large \
passed this way recently.",
    )
    .with_exit("town_square")
    .with_exit("deep_forest")
    .with_enemy(
        Enemy::new(
            "goblin_scout",
            "Goblin Scout",
            "A wiry goblin clutching a notched dagger.",
            CharacterStats::new(30, 8, 3),
        )
        .with_reward(25),
    );
    locations.push(forest_entrance);

    let deep_forest = Location::new(
        "deep_forest",
        "Deep Forest",
        "The canopy swallows the light. Eyes glint between the trunks.",
    )
    .with_exit("forest_entrance")
    .with_enemy(
        Enemy::new(
            "grey_wolf",
            "Grey Wolf",
            "A lean wolf with a torn ear, circling warily.",
            CharacterStats::new(35, 10, 4),
        )
        .with_reward(30),
    )
    .with_enemy(
        Enemy::new(
            "forest_troll",
            "Forest Troll",
            "A hulking troll covered in moss, dragging a tree-trunk club.",
            CharacterStats::new(80, 14, 8),
        )
        .with_reward(75),
    )
    .with_item("Healing Herb");
    locations.push(deep_forest);

    locations
        .into_iter()
        .map(|location| (location.id.clone(), location))
        .collect()
}

/// Fresh game for `player_name`: the constant world template plus a new player
/// standing in the tavern.
pub fn new_game(player_name: &str) -> GameState {
    let player_id = Uuid::new_v4().to_string();
    GameState {
        player: Player::new(&player_id, player_name, START_LOCATION_ID),
        locations: default_world(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_world_contains_every_listed_location() {
        let world = default_world();
        assert_eq!(world.len(), DEFAULT_WORLD_LOCATION_IDS.len());
        for id in DEFAULT_WORLD_LOCATION_IDS {
            assert!(world.contains_key(*id), "missing {}", id);
        }
    }

    #[test]
    fn every_exit_points_at_a_real_location() {
        let world = default_world();
        for location in world.values() {
            for exit in &location.exits {
                assert!(world.contains_key(exit), "{} -> {}", location.id, exit);
            }
        }
    }

    #[test]
    fn graph_edges_are_paired() {
        let world = default_world();
        let pairs = [
            ("tavern", "town_square"),
            ("tavern", "cellar"),
            ("town_square", "forest_entrance"),
            ("town_square", "blacksmith"),
            ("forest_entrance", "deep_forest"),
        ];
        for (a, b) in pairs {
            assert!(world[a].exits.contains(b), "{} should lead to {}", a, b);
            assert!(world[b].exits.contains(a), "{} should lead to {}", b, a);
        }
        assert!(!world["tavern"].exits.contains("deep_forest"));
    }

    #[test]
    fn enemy_placement() {
        let world = default_world();
        for location in world.values() {
            assert!(location.enemies.len() <= 2);
        }
        let cellar = &world["cellar"];
        assert_eq!(cellar.enemies.len(), 1);
        assert_eq!(cellar.enemies[0].name, "Giant Rat");
        assert_eq!(cellar.enemies[0].experience_reward, 10);
    }

    #[test]
    fn new_game_starts_in_tavern() {
        let state = new_game("Hero");
        assert_eq!(state.player.name, "Hero");
        assert_eq!(state.player.current_location, "tavern");
        assert_eq!(state.player.stats.health, 100);
        assert!(state.player.inventory.is_empty());
        assert!(Uuid::parse_str(&state.player.id).is_ok());
    }
}

mod common;

use textquest::game::{
    describe_location, move_to_location, GameError, MoveRejection, UNKNOWN_LOCATION_MESSAGE,
};

#[test]
fn tavern_to_cellar_is_one_hop() {
    let out = move_to_location(&common::hero(), "cellar").unwrap();
    assert!(out.result.success);
    assert_eq!(out.state.player.current_location, "cellar");
    assert!(describe_location(&out.state, None).contains("Giant Rat"));
}

#[test]
fn deep_forest_is_not_adjacent_to_the_tavern() {
    let state = common::hero();
    let out = move_to_location(&state, "deep_forest").unwrap();
    assert!(!out.result.success);
    assert_eq!(out.result.reason, Some(MoveRejection::NotAnExit));
    assert_eq!(out.result.available_exits, vec!["cellar", "town_square"]);
    assert_eq!(out.state, state);
}

#[test]
fn reachability_requires_exit_and_known_location() {
    let state = common::hero();
    for (id, _) in state.locations.iter() {
        let here = state.current_location().unwrap();
        let out = move_to_location(&state, id).unwrap();
        assert_eq!(out.result.success, here.exits.contains(id));
    }

    let mut broken = state.clone();
    broken
        .locations
        .get_mut("tavern")
        .unwrap()
        .exits
        .insert("attic".into());
    let out = move_to_location(&broken, "attic").unwrap();
    assert!(!out.result.success);
    assert_eq!(out.result.reason, Some(MoveRejection::UnknownDestination));
}

#[test]
fn unknown_location_has_fixed_description() {
    let state = common::hero();
    assert_eq!(
        describe_location(&state, Some("dragon_lair")),
        UNKNOWN_LOCATION_MESSAGE
    );
    assert_eq!(
        describe_location(&state, None),
        describe_location(&state, None)
    );
}

#[test]
fn corrupt_snapshot_is_an_error() {
    let mut state = common::hero();
    state.player.current_location = "void".into();
    assert!(matches!(
        move_to_location(&state, "cellar"),
        Err(GameError::CorruptState { .. })
    ));
}

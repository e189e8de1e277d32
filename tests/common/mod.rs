//! Shared helpers for the integration suites: fixture map loading,
//! pre-claimed games, and board staging.

use entente::{Game, MapDescriptor, OrderResult, Unit};

/// The fixture map: France, Germany, England, and a neutral country
/// holding the minor centers, on a western-Europe-shaped board.
pub fn heartland() -> MapDescriptor {
    MapDescriptor::from_json(include_str!("../fixtures/heartland.dipmap"))
        .expect("fixture map parses")
}

/// A three-player game with every country claimed and orders open.
/// ada plays france, ben germany, cyd england.
pub fn claimed_game(desc: &MapDescriptor) -> Game {
    let mut game = Game::new(
        "heartland",
        "heartland.dipmap",
        desc,
        vec!["ada".to_string(), "ben".to_string(), "cyd".to_string()],
    )
    .expect("game construction");
    game.claim_country("ada", "france").unwrap();
    game.claim_country("ben", "germany").unwrap();
    game.claim_country("cyd", "england").unwrap();
    game
}

/// Replaces every unit on the board with the given placements. Used to
/// stage scenario positions that normal play would take years to reach.
pub fn stage_units(game: &mut Game, placements: &[(&str, Unit)]) {
    let state = game.history.last_mut().unwrap();
    for nation in state.nations.values_mut() {
        nation.units.clear();
    }
    for (country, unit) in placements {
        state
            .nations
            .get_mut(*country)
            .unwrap_or_else(|| panic!("no nation '{}'", country))
            .units
            .push(unit.clone());
    }
}

/// The stamped result of the order a country's unit at `province` had in
/// the most recently resolved turn.
pub fn order_result(game: &Game, country: &str, province: &str) -> OrderResult {
    game.resolved_state()
        .expect("a turn has been resolved")
        .orders
        .get(country)
        .and_then(|table| table.get(province))
        .unwrap_or_else(|| panic!("no resolved order for {} at {}", country, province))
        .result
}

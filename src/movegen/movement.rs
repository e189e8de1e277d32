//! Movement-phase legality.
//!
//! Enumerates the legal orders for a unit and checks a submitted order
//! against the same rules. Armies move over land routes or across
//! potential convoy chains; fleets move coast-aware over sea routes.

use std::collections::BTreeSet;

use crate::board::{Order, OrderKind, TurnState, Unit, UnitType};
use crate::map::{MapView, ProvinceId};

/// Destinations reachable by ordinary movement, with arrival coasts.
pub fn direct_move_targets(map: &MapView, unit: &Unit) -> Vec<(ProvinceId, Option<String>)> {
    match unit.unit_type {
        UnitType::Army => map
            .adjacent_army(&unit.province)
            .into_iter()
            .filter(|p| !map.is_water(p))
            .map(|p| (p, None))
            .collect(),
        UnitType::Fleet => map
            .adjacent_fleet(&unit.province, unit.coast.as_deref())
            .into_iter()
            .filter(|(p, _)| {
                map.province(p)
                    .map(|def| def.is_water() || def.kind == crate::map::ProvinceKind::Coastal)
                    .unwrap_or(false)
            })
            .collect(),
    }
}

/// Water provinces hosting a fleet that are connected to `province`
/// through fleet-occupied water. These are the usable convoy waypoints.
fn occupied_water_reachable_from(
    map: &MapView,
    state: &TurnState,
    province: &str,
) -> BTreeSet<ProvinceId> {
    let hosts_fleet = |p: &str| {
        map.is_water(p)
            && state
                .unit_at(p)
                .map(|(_, u)| u.unit_type == UnitType::Fleet)
                .unwrap_or(false)
    };

    let mut visited: BTreeSet<ProvinceId> = BTreeSet::new();
    let mut queue: Vec<ProvinceId> = map
        .adjacent_ignore_coasts(province)
        .into_iter()
        .filter(|p| hosts_fleet(p))
        .collect();
    while let Some(p) = queue.pop() {
        if !visited.insert(p.clone()) {
            continue;
        }
        for next in map.adjacent_ignore_coasts(&p) {
            if hosts_fleet(&next) && !visited.contains(&next) {
                queue.push(next);
            }
        }
    }
    visited
}

/// Coastal destinations an army at `province` could reach by at least one
/// potential convoy path. Reachability only; success depends on the
/// convoy orders actually resolving.
pub fn convoy_destinations(
    map: &MapView,
    state: &TurnState,
    province: &str,
) -> BTreeSet<ProvinceId> {
    let waypoints = occupied_water_reachable_from(map, state, province);
    let mut dests = BTreeSet::new();
    for water in &waypoints {
        for p in map.adjacent_ignore_coasts(water) {
            if p != province && !map.is_water(&p) {
                dests.insert(p);
            }
        }
    }
    dests
}

/// Whether the fleet at `fleet_province` lies on some potential convoy
/// chain from `start` to `end` through fleet-occupied water.
pub fn fleet_on_potential_chain(
    map: &MapView,
    state: &TurnState,
    fleet_province: &str,
    start: &str,
    end: &str,
) -> bool {
    occupied_water_reachable_from(map, state, start).contains(fleet_province)
        && occupied_water_reachable_from(map, state, end).contains(fleet_province)
}

/// Whether a unit at `from` could plausibly reach `dest` (directly, or by
/// convoy for armies). Used for support-move plausibility.
fn could_reach(map: &MapView, state: &TurnState, from_unit: &Unit, dest: &str) -> bool {
    if direct_move_targets(map, from_unit)
        .iter()
        .any(|(p, _)| p == dest)
    {
        return true;
    }
    from_unit.unit_type == UnitType::Army
        && convoy_destinations(map, state, &from_unit.province).contains(dest)
}

/// Checks a submitted movement-phase order against the map and state.
pub fn order_is_valid(map: &MapView, state: &TurnState, unit: &Unit, order: &Order) -> bool {
    if order.province != unit.province {
        return false;
    }
    match &order.kind {
        OrderKind::Hold => true,
        OrderKind::Move {
            dest,
            coast,
            is_convoy,
        } => {
            if *is_convoy {
                unit.unit_type == UnitType::Army
                    && coast.is_none()
                    && convoy_destinations(map, state, &unit.province).contains(dest)
            } else {
                direct_move_targets(map, unit)
                    .iter()
                    .any(|(p, c)| p == dest && c.as_deref() == coast.as_deref())
            }
        }
        OrderKind::SupportHold { supporting } => {
            supporting != &unit.province
                && direct_move_targets(map, unit)
                    .iter()
                    .any(|(p, _)| p == supporting)
        }
        OrderKind::SupportMove { supporting, from } => {
            if supporting == &unit.province || from == &unit.province || from == supporting {
                return false;
            }
            if !direct_move_targets(map, unit)
                .iter()
                .any(|(p, _)| p == supporting)
            {
                return false;
            }
            match state.unit_at(from) {
                Some((_, from_unit)) => could_reach(map, state, from_unit, supporting),
                None => false,
            }
        }
        OrderKind::Convoy { start, end } => {
            unit.unit_type == UnitType::Fleet
                && map.is_water(&unit.province)
                && start != end
                && !map.is_water(start)
                && !map.is_water(end)
                && fleet_on_potential_chain(map, state, &unit.province, start, end)
        }
    }
}

/// Enumerates every legal movement-phase order for a unit.
pub fn valid_orders(map: &MapView, state: &TurnState, unit: &Unit) -> Vec<Order> {
    let mut orders = Vec::new();
    let province = unit.province.clone();

    orders.push(Order::hold(province.clone()));

    let direct = direct_move_targets(map, unit);
    for (dest, coast) in &direct {
        orders.push(Order::new(
            province.clone(),
            OrderKind::Move {
                dest: dest.clone(),
                coast: coast.clone(),
                is_convoy: false,
            },
        ));
    }
    if unit.unit_type == UnitType::Army {
        for dest in convoy_destinations(map, state, &province) {
            orders.push(Order::move_by_convoy(province.clone(), dest));
        }
    }

    // Supports go into directly-reachable provinces only.
    let reachable: BTreeSet<&ProvinceId> = direct.iter().map(|(p, _)| p).collect();
    for target in &reachable {
        orders.push(Order::support_hold(province.clone(), (*target).clone()));
        for (_, nation) in &state.nations {
            for other in &nation.units {
                if other.province == province || &other.province == *target {
                    continue;
                }
                if could_reach(map, state, other, target) {
                    orders.push(Order::support_move(
                        province.clone(),
                        other.province.clone(),
                        (*target).clone(),
                    ));
                }
            }
        }
    }

    // Convoy orders for a fleet at sea: one per army and coastal target
    // whose potential chain runs through this fleet.
    if unit.unit_type == UnitType::Fleet && map.is_water(&province) {
        for (_, nation) in &state.nations {
            for army in &nation.units {
                if army.unit_type != UnitType::Army {
                    continue;
                }
                for end in convoy_destinations(map, state, &army.province) {
                    if fleet_on_potential_chain(map, state, &province, &army.province, &end) {
                        orders.push(Order::convoy(
                            province.clone(),
                            army.province.clone(),
                            end,
                        ));
                    }
                }
            }
        }
    }

    orders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Nation;
    use crate::board::Season;
    use crate::map::MapDescriptor;

    /// Two shores separated by a two-sea channel, plus a split-coast
    /// province reachable from the western sea.
    fn channel_map() -> MapView {
        let desc = MapDescriptor::from_json(
            r#"{
            "info": {"name": "channel", "date": 1901},
            "provinces": [
                {"id": "aria", "kind": "coastal"},
                {"id": "brin", "kind": "coastal"},
                {"id": "esk", "kind": "coastal"},
                {"id": "fen", "kind": "land"},
                {"id": "gale", "kind": "coastal", "coasts": ["nc", "sc"]},
                {"id": "west", "kind": "sea"},
                {"id": "east", "kind": "sea"}
            ],
            "routes": [
                {"p0": "aria", "p1": "fen", "type": "land"},
                {"p0": "brin", "p1": "fen", "type": "land"},
                {"p0": "aria", "p1": "west", "type": "sea"},
                {"p0": "brin", "p1": "east", "type": "sea"},
                {"p0": "esk", "p1": "east", "type": "sea"},
                {"p0": "west", "p1": "east", "type": "sea"},
                {"p0": "west", "p1": "gale", "p1coast": "nc", "type": "sea"},
                {"p0": "esk", "p1": "brin", "type": "land"}
            ],
            "countries": [
                {"id": "one", "name": "One", "supplyCenters": ["aria"]},
                {"id": "two", "name": "Two", "supplyCenters": ["brin"]}
            ]
        }"#,
        )
        .unwrap();
        MapView::for_players(&desc, 2).unwrap()
    }

    fn empty_state() -> TurnState {
        let mut state = TurnState::new(1901, Season::Spring);
        state.nations.insert("one".to_string(), Nation::default());
        state.nations.insert("two".to_string(), Nation::default());
        state
    }

    fn place(state: &mut TurnState, country: &str, unit: Unit) {
        state
            .nations
            .get_mut(country)
            .unwrap()
            .units
            .push(unit);
    }

    #[test]
    fn army_moves_over_land_only() {
        let map = channel_map();
        let state = empty_state();
        let unit = Unit::army("aria");
        assert!(order_is_valid(
            &map,
            &state,
            &unit,
            &Order::move_to("aria", "fen")
        ));
        assert!(!order_is_valid(
            &map,
            &state,
            &unit,
            &Order::move_to("aria", "west")
        ));
        assert!(!order_is_valid(
            &map,
            &state,
            &unit,
            &Order::move_to("aria", "brin")
        ));
    }

    #[test]
    fn fleet_moves_over_sea_with_coast() {
        let map = channel_map();
        let state = empty_state();
        let unit = Unit::fleet("west");
        assert!(order_is_valid(
            &map,
            &state,
            &unit,
            &Order::move_to("west", "east")
        ));
        assert!(order_is_valid(
            &map,
            &state,
            &unit,
            &Order::move_to_coast("west", "gale", "nc")
        ));
        // The bare province is not a fleet destination when it has coasts.
        assert!(!order_is_valid(
            &map,
            &state,
            &unit,
            &Order::move_to("west", "gale")
        ));
        assert!(!order_is_valid(
            &map,
            &state,
            &unit,
            &Order::move_to("west", "fen")
        ));
    }

    #[test]
    fn convoy_move_requires_occupied_chain() {
        let map = channel_map();
        let mut state = empty_state();
        place(&mut state, "one", Unit::army("aria"));
        let unit = Unit::army("aria");

        // No fleets at sea: no convoy reachability.
        assert!(!order_is_valid(
            &map,
            &state,
            &unit,
            &Order::move_by_convoy("aria", "brin")
        ));

        place(&mut state, "one", Unit::fleet("west"));
        place(&mut state, "two", Unit::fleet("east"));
        assert!(order_is_valid(
            &map,
            &state,
            &unit,
            &Order::move_by_convoy("aria", "brin")
        ));
        assert!(order_is_valid(
            &map,
            &state,
            &unit,
            &Order::move_by_convoy("aria", "esk")
        ));
    }

    #[test]
    fn convoy_order_requires_fleet_on_chain() {
        let map = channel_map();
        let mut state = empty_state();
        place(&mut state, "one", Unit::army("aria"));
        place(&mut state, "one", Unit::fleet("west"));
        place(&mut state, "two", Unit::fleet("east"));

        let west_fleet = Unit::fleet("west");
        assert!(order_is_valid(
            &map,
            &state,
            &west_fleet,
            &Order::convoy("west", "aria", "brin")
        ));

        // A coastal fleet cannot convoy.
        let mut coastal = empty_state();
        place(&mut coastal, "one", Unit::fleet("aria"));
        let shore_fleet = Unit::fleet("aria");
        assert!(!order_is_valid(
            &map,
            &coastal,
            &shore_fleet,
            &Order::convoy("aria", "brin", "esk")
        ));
    }

    #[test]
    fn support_hold_into_reachable_square() {
        let map = channel_map();
        let mut state = empty_state();
        place(&mut state, "two", Unit::army("fen"));
        let unit = Unit::army("aria");
        assert!(order_is_valid(
            &map,
            &state,
            &unit,
            &Order::support_hold("aria", "fen")
        ));
        // Not reachable: no support.
        assert!(!order_is_valid(
            &map,
            &state,
            &unit,
            &Order::support_hold("aria", "esk")
        ));
        // Own square: no support.
        assert!(!order_is_valid(
            &map,
            &state,
            &unit,
            &Order::support_hold("aria", "aria")
        ));
    }

    #[test]
    fn support_move_requires_plausible_mover() {
        let map = channel_map();
        let mut state = empty_state();
        place(&mut state, "one", Unit::army("aria"));
        place(&mut state, "two", Unit::army("brin"));
        let unit = Unit::army("aria");

        assert!(order_is_valid(
            &map,
            &state,
            &unit,
            &Order::support_move("aria", "brin", "fen")
        ));
        // Nobody at esk to support.
        assert!(!order_is_valid(
            &map,
            &state,
            &unit,
            &Order::support_move("aria", "esk", "fen")
        ));
    }

    #[test]
    fn enumeration_matches_predicate() {
        let map = channel_map();
        let mut state = empty_state();
        place(&mut state, "one", Unit::army("aria"));
        place(&mut state, "one", Unit::fleet("west"));
        place(&mut state, "two", Unit::fleet("east"));
        place(&mut state, "two", Unit::army("brin"));

        for (country, nation) in &state.nations {
            let _ = country;
            for unit in &nation.units {
                for order in valid_orders(&map, &state, unit) {
                    assert!(
                        order_is_valid(&map, &state, unit, &order),
                        "enumerated order {:?} fails its own validity check",
                        order
                    );
                }
            }
        }
    }

    #[test]
    fn hold_always_enumerated() {
        let map = channel_map();
        let state = empty_state();
        let orders = valid_orders(&map, &state, &Unit::army("fen"));
        assert!(orders
            .iter()
            .any(|o| matches!(o.kind, OrderKind::Hold)));
    }
}

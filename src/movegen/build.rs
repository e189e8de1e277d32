//! Adjustment-phase legality.
//!
//! Builds are restricted to owned, unoccupied home supply centers with
//! terrain matching the unit type; disbands to the country's own units.

use crate::board::{AdjustOrder, TurnState, UnitType};
use crate::map::{CountryId, MapView};

/// Checks a single build target.
pub fn build_is_valid(
    map: &MapView,
    state: &TurnState,
    country: &CountryId,
    province: &str,
    unit_type: UnitType,
    coast: Option<&str>,
) -> bool {
    let def = match map.province(province) {
        Some(d) => d,
        None => return false,
    };
    // Home centers only, and the country must still own the center.
    if !map.home_centers(country).iter().any(|p| p == province) {
        return false;
    }
    let owned = state
        .nations
        .get(country)
        .map(|n| n.supply_centers.contains(province))
        .unwrap_or(false);
    if !owned {
        return false;
    }
    if state.unit_at(province).is_some() {
        return false;
    }
    match unit_type {
        UnitType::Army => !def.is_water() && coast.is_none(),
        UnitType::Fleet => {
            if def.kind == crate::map::ProvinceKind::Land {
                return false;
            }
            map.valid_coast(province, coast)
        }
    }
}

/// Checks a disband target: a province holding one of the country's units.
pub fn disband_is_valid(state: &TurnState, country: &CountryId, province: &str) -> bool {
    state
        .nations
        .get(country)
        .map(|n| n.units.iter().any(|u| u.province == province))
        .unwrap_or(false)
}

/// Enumerates the legal builds for a country, one order per buildable
/// (province, unit type, coast) combination.
pub fn valid_builds(map: &MapView, state: &TurnState, country: &CountryId) -> Vec<AdjustOrder> {
    let mut out = Vec::new();
    for province in map.home_centers(country) {
        if build_is_valid(map, state, country, province, UnitType::Army, None) {
            out.push(AdjustOrder::build(province.clone(), UnitType::Army));
        }
        let def = match map.province(province) {
            Some(d) => d,
            None => continue,
        };
        if def.has_coasts() {
            for coast in &def.coasts {
                if build_is_valid(map, state, country, province, UnitType::Fleet, Some(coast)) {
                    out.push(AdjustOrder::build_fleet_on(province.clone(), coast.clone()));
                }
            }
        } else if build_is_valid(map, state, country, province, UnitType::Fleet, None) {
            out.push(AdjustOrder::build(province.clone(), UnitType::Fleet));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Nation, Season, Unit};
    use crate::map::MapDescriptor;

    fn home_map() -> MapView {
        let desc = MapDescriptor::from_json(
            r#"{
            "info": {"name": "home", "date": 1901},
            "provinces": [
                {"id": "cap", "kind": "land"},
                {"id": "port", "kind": "coastal", "coasts": ["nc", "sc"]},
                {"id": "edge", "kind": "coastal"},
                {"id": "bay", "kind": "sea"}
            ],
            "routes": [
                {"p0": "cap", "p1": "port", "type": "land"},
                {"p0": "cap", "p1": "edge", "type": "land"},
                {"p0": "bay", "p1": "port", "p1coast": "nc", "type": "sea"},
                {"p0": "bay", "p1": "edge", "type": "sea"}
            ],
            "countries": [
                {"id": "one", "name": "One", "supplyCenters": ["cap", "port"]},
                {"id": "two", "name": "Two", "supplyCenters": ["edge"]}
            ]
        }"#,
        )
        .unwrap();
        MapView::for_players(&desc, 2).unwrap()
    }

    fn owning_state() -> TurnState {
        let mut state = TurnState::new(1901, Season::Fall);
        let mut one = Nation::default();
        one.supply_centers.insert("cap".to_string());
        one.supply_centers.insert("port".to_string());
        state.nations.insert("one".to_string(), one);
        state.nations.insert("two".to_string(), Nation::default());
        state
    }

    #[test]
    fn builds_on_owned_vacant_home_centers() {
        let map = home_map();
        let state = owning_state();
        let one = "one".to_string();
        assert!(build_is_valid(&map, &state, &one, "cap", UnitType::Army, None));
        assert!(build_is_valid(
            &map,
            &state,
            &one,
            "port",
            UnitType::Fleet,
            Some("nc")
        ));
        // Inland fleet and coastless split-coast fleet are both illegal.
        assert!(!build_is_valid(&map, &state, &one, "cap", UnitType::Fleet, None));
        assert!(!build_is_valid(&map, &state, &one, "port", UnitType::Fleet, None));
    }

    #[test]
    fn cannot_build_on_foreign_or_lost_center() {
        let map = home_map();
        let mut state = owning_state();
        let one = "one".to_string();
        // edge is two's home, never one's.
        assert!(!build_is_valid(&map, &state, &one, "edge", UnitType::Army, None));
        // Losing ownership of a home center blocks the build.
        state.nations.get_mut("one").unwrap().supply_centers.remove("cap");
        assert!(!build_is_valid(&map, &state, &one, "cap", UnitType::Army, None));
    }

    #[test]
    fn occupied_center_blocks_build() {
        let map = home_map();
        let mut state = owning_state();
        let one = "one".to_string();
        state.nations.get_mut("one").unwrap().units.push(Unit::army("cap"));
        assert!(!build_is_valid(&map, &state, &one, "cap", UnitType::Army, None));
    }

    #[test]
    fn disband_needs_own_unit() {
        let map = home_map();
        let _ = map;
        let mut state = owning_state();
        let one = "one".to_string();
        let two = "two".to_string();
        state.nations.get_mut("one").unwrap().units.push(Unit::army("cap"));
        assert!(disband_is_valid(&state, &one, "cap"));
        assert!(!disband_is_valid(&state, &two, "cap"));
        assert!(!disband_is_valid(&state, &one, "port"));
    }

    #[test]
    fn enumeration_covers_coasts() {
        let map = home_map();
        let state = owning_state();
        let builds = valid_builds(&map, &state, &"one".to_string());
        // Army cap, army port, fleet port/nc, fleet port/sc.
        assert_eq!(builds.len(), 4);
    }
}

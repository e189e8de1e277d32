//! Retreat-phase legality.
//!
//! A dislodged unit may retreat to a province adjacent by its movement
//! rule that is unoccupied after the movement phase, was not contested
//! this turn, and is not the province its attacker came from — unless
//! the attacker arrived by convoy, in which case the attacker's origin
//! imposes no restriction.

use crate::board::{TurnState, UnitType};
use crate::map::{MapView, ProvinceId};

/// Legal retreat destinations for the dislodged unit at `province`.
///
/// `resolved` is the state holding the dislodgement and contested set;
/// `current` is the post-movement state whose occupancy matters.
pub fn valid_retreats(
    map: &MapView,
    resolved: &TurnState,
    current: &TurnState,
    province: &str,
) -> Vec<(ProvinceId, Option<String>)> {
    let dislodgement = match resolved.dislodgements.get(province) {
        Some(d) => d,
        None => return Vec::new(),
    };
    let unit = &dislodgement.unit;

    let candidates: Vec<(ProvinceId, Option<String>)> = match unit.unit_type {
        UnitType::Army => map
            .adjacent_army(province)
            .into_iter()
            .filter(|p| !map.is_water(p))
            .map(|p| (p, None))
            .collect(),
        UnitType::Fleet => map
            .adjacent_fleet(province, unit.coast.as_deref())
            .into_iter()
            .filter(|(p, _)| map.province(p).map(|d| d.kind != crate::map::ProvinceKind::Land).unwrap_or(false))
            .collect(),
    };

    candidates
        .into_iter()
        .filter(|(dest, _)| {
            if current.unit_at(dest).is_some() {
                return false;
            }
            if resolved.contested.contains(dest) {
                return false;
            }
            if dislodgement.from.as_deref() == Some(dest.as_str()) {
                return false;
            }
            true
        })
        .collect()
}

//! Per-half-year game state.
//!
//! One [`TurnState`] covers a (year, season) pair and records everything
//! that happened while it was current: submitted orders with stamped
//! results, dislodgements, retreats, adjustments, and the contested
//! provinces. The game history is an append-only sequence of these.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::map::{CountryId, MapView, ProvinceId};

use super::order::{AdjustOrder, Order, RetreatOrder};
use super::unit::{Unit, UnitType};

/// The half of the year a state covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Fall,
}

/// The game-level phase of play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    CountryClaiming,
    OrderWriting,
    Retreating,
    CreatingDisbanding,
}

/// Whether the game is still running, won, or externally drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WinState {
    Playing,
    Won,
    Drawn,
}

/// One country's holdings within a state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nation {
    pub supply_centers: BTreeSet<ProvinceId>,
    pub units: Vec<Unit>,
    #[serde(default)]
    pub neutral: bool,
    /// Signed build entitlement, populated on adjustment-phase entry.
    #[serde(default)]
    pub to_build: i32,
}

/// A unit forced out of its province, awaiting retreat or destruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dislodgement {
    pub unit: Unit,
    /// Origin of the attacker, absent when the attacker arrived by convoy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<ProvinceId>,
    pub country: CountryId,
}

/// Complete game state for one half-year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnState {
    pub date: i32,
    pub season: Season,
    pub nations: BTreeMap<CountryId, Nation>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub orders: BTreeMap<CountryId, BTreeMap<ProvinceId, Order>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub retreats: BTreeMap<CountryId, BTreeMap<ProvinceId, RetreatOrder>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dislodgements: BTreeMap<ProvinceId, Dislodgement>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub adjustments: BTreeMap<CountryId, Vec<AdjustOrder>>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub contested: BTreeSet<ProvinceId>,
}

impl TurnState {
    /// Creates an empty state for the given half-year.
    pub fn new(date: i32, season: Season) -> TurnState {
        TurnState {
            date,
            season,
            nations: BTreeMap::new(),
            orders: BTreeMap::new(),
            retreats: BTreeMap::new(),
            dislodgements: BTreeMap::new(),
            adjustments: BTreeMap::new(),
            contested: BTreeSet::new(),
        }
    }

    /// The blank state for the following half-year, carrying the nations
    /// table forward. The year advances when flipping Fall to Spring.
    pub fn next(&self) -> TurnState {
        let (date, season) = match self.season {
            Season::Spring => (self.date, Season::Fall),
            Season::Fall => (self.date + 1, Season::Spring),
        };
        let mut next = TurnState::new(date, season);
        next.nations = self.nations.clone();
        for nation in next.nations.values_mut() {
            nation.to_build = 0;
        }
        next
    }

    /// The unit occupying a province, with its owner.
    pub fn unit_at(&self, province: &str) -> Option<(&CountryId, &Unit)> {
        for (country, nation) in &self.nations {
            if let Some(unit) = nation.units.iter().find(|u| u.province == province) {
                return Some((country, unit));
            }
        }
        None
    }

    /// The country owning the unit at a province.
    pub fn owner_of_unit(&self, province: &str) -> Option<&CountryId> {
        self.unit_at(province).map(|(c, _)| c)
    }

    /// The country currently owning a supply center.
    pub fn owner_of_supply_center(&self, province: &str) -> Option<&CountryId> {
        self.nations
            .iter()
            .find(|(_, n)| n.supply_centers.contains(province))
            .map(|(c, _)| c)
    }

    /// Places a new unit, enforcing occupancy and terrain invariants.
    pub fn spawn_unit(
        &mut self,
        map: &MapView,
        country: &CountryId,
        unit: Unit,
    ) -> Result<(), EngineError> {
        let province = map
            .province(&unit.province)
            .ok_or_else(|| EngineError::NotFound(format!("province '{}'", unit.province)))?;
        if self.unit_at(&unit.province).is_some() {
            return Err(EngineError::Internal(format!(
                "two units on '{}'",
                unit.province
            )));
        }
        match unit.unit_type {
            UnitType::Army => {
                if province.is_water() {
                    return Err(EngineError::Internal(format!(
                        "army placed at sea on '{}'",
                        unit.province
                    )));
                }
                if unit.coast.is_some() {
                    return Err(EngineError::Internal(format!(
                        "army with a coast on '{}'",
                        unit.province
                    )));
                }
            }
            UnitType::Fleet => {
                if !map.valid_coast(&unit.province, unit.coast.as_deref()) {
                    return Err(EngineError::Internal(format!(
                        "fleet coast {:?} illegal on '{}'",
                        unit.coast, unit.province
                    )));
                }
            }
        }
        let nation = self
            .nations
            .get_mut(country)
            .ok_or_else(|| EngineError::NotFound(format!("country '{}'", country)))?;
        nation.units.push(unit);
        Ok(())
    }

    /// Removes the unit a country has at a province.
    pub fn remove_unit(
        &mut self,
        country: &CountryId,
        province: &str,
    ) -> Result<Unit, EngineError> {
        let nation = self
            .nations
            .get_mut(country)
            .ok_or_else(|| EngineError::NotFound(format!("country '{}'", country)))?;
        let idx = nation
            .units
            .iter()
            .position(|u| u.province == province)
            .ok_or_else(|| {
                EngineError::NotFound(format!("no unit of '{}' at '{}'", country, province))
            })?;
        Ok(nation.units.remove(idx))
    }

    /// Total number of units on the board.
    pub fn unit_count(&self) -> usize {
        self.nations.values().map(|n| n.units.len()).sum()
    }
}

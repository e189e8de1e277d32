//! Parsed `.dipmap` map descriptors.
//!
//! A descriptor is the fully-parsed form of a `.dipmap` JSON file. It is
//! immutable reference data shared by every game played on the map; games
//! never see it directly but through a pruned [`MapView`](super::MapView).

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

use super::{CountryId, ProvinceId};

/// Top-level contents of a `.dipmap` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDescriptor {
    pub info: MapInfo,
    pub provinces: Vec<ProvinceDef>,
    pub routes: Vec<RouteDef>,
    pub countries: Vec<CountryDef>,
    #[serde(default)]
    pub country_groups: Vec<Vec<CountryId>>,
    #[serde(default)]
    pub player_configurations: BTreeMap<String, PlayerConfiguration>,
}

/// Display metadata and the starting date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapInfo {
    pub name: String,
    pub date: i32,
    #[serde(default)]
    pub image: String,
}

/// Terrain classification of a province.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvinceKind {
    Land,
    Sea,
    Coastal,
}

/// The unit a province hosts at game start, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartUnit {
    #[default]
    None,
    Army,
    Fleet,
}

/// One province entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceDef {
    pub id: ProvinceId,
    pub kind: ProvinceKind,
    /// Named coasts for split-coast provinces, empty otherwise.
    #[serde(default)]
    pub coasts: Vec<String>,
    #[serde(default)]
    pub start_unit: StartUnit,
    /// Coast of the starting fleet on a split-coast province.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_coast: Option<String>,
    /// Whether fleets may traverse and convoys may pass through. Defaults
    /// to `kind == sea` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water: Option<bool>,
}

impl ProvinceDef {
    pub fn is_water(&self) -> bool {
        self.water.unwrap_or(self.kind == ProvinceKind::Sea)
    }

    pub fn has_coasts(&self) -> bool {
        !self.coasts.is_empty()
    }
}

/// Traversal class of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    /// Passable by armies.
    Land,
    /// Passable by fleets; coast qualifiers bind the endpoints.
    Sea,
    /// Not directly passable; counts for convoy path existence only.
    Convoy,
}

/// An undirected adjacency between two provinces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDef {
    pub p0: ProvinceId,
    pub p1: ProvinceId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p0coast: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p1coast: Option<String>,
    #[serde(rename = "type")]
    pub kind: RouteKind,
}

/// One playable (or neutral) country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryDef {
    pub id: CountryId,
    pub name: String,
    /// Initial supply centers; these double as the home centers builds
    /// are restricted to.
    #[serde(default)]
    pub supply_centers: Vec<ProvinceId>,
    /// Neutral countries hold terrain but never claim, order, or build.
    #[serde(default)]
    pub neutral: bool,
}

/// Per-player-count adjustments applied before play.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConfiguration {
    /// Countries eliminated before play.
    #[serde(default)]
    pub eliminate: Vec<CountryId>,
    /// Whether eliminated-country provinces are removed from the board or
    /// left behind as neutral terrain.
    #[serde(default)]
    pub remove_provinces: bool,
}

impl MapDescriptor {
    /// Parses a descriptor from `.dipmap` JSON text and validates it.
    pub fn from_json(json: &str) -> Result<MapDescriptor, EngineError> {
        let desc: MapDescriptor =
            serde_json::from_str(json).map_err(|e| EngineError::Map(e.to_string()))?;
        desc.validate()?;
        Ok(desc)
    }

    /// Reads and parses a `.dipmap` file.
    pub fn from_file(path: &Path) -> Result<MapDescriptor, EngineError> {
        let data = fs::read_to_string(path)
            .map_err(|e| EngineError::Map(format!("{}: {}", path.display(), e)))?;
        MapDescriptor::from_json(&data)
    }

    /// Checks referential integrity of the descriptor.
    fn validate(&self) -> Result<(), EngineError> {
        let mut provinces: BTreeMap<&str, &ProvinceDef> = BTreeMap::new();
        for p in &self.provinces {
            if provinces.insert(&p.id, p).is_some() {
                return Err(EngineError::Map(format!("duplicate province '{}'", p.id)));
            }
            if p.has_coasts() && p.kind != ProvinceKind::Coastal {
                return Err(EngineError::Map(format!(
                    "province '{}' has coasts but is not coastal",
                    p.id
                )));
            }
            if let Some(sc) = &p.start_coast {
                if !p.coasts.contains(sc) {
                    return Err(EngineError::Map(format!(
                        "province '{}' start coast '{}' is not one of its coasts",
                        p.id, sc
                    )));
                }
            }
            if p.start_unit == StartUnit::Army && p.kind == ProvinceKind::Sea {
                return Err(EngineError::Map(format!(
                    "province '{}' starts an army at sea",
                    p.id
                )));
            }
            if p.start_unit == StartUnit::Fleet && p.kind == ProvinceKind::Land {
                return Err(EngineError::Map(format!(
                    "province '{}' starts a fleet inland",
                    p.id
                )));
            }
        }

        for r in &self.routes {
            for (id, coast) in [(&r.p0, &r.p0coast), (&r.p1, &r.p1coast)] {
                let p = provinces.get(id.as_str()).ok_or_else(|| {
                    EngineError::Map(format!("route references unknown province '{}'", id))
                })?;
                if let Some(c) = coast {
                    if !p.coasts.contains(c) {
                        return Err(EngineError::Map(format!(
                            "route references unknown coast '{}' of '{}'",
                            c, id
                        )));
                    }
                }
            }
            if r.p0 == r.p1 {
                return Err(EngineError::Map(format!("self-route on '{}'", r.p0)));
            }
        }

        let mut countries = BTreeSet::new();
        let mut owned: BTreeMap<&str, &str> = BTreeMap::new();
        for c in &self.countries {
            if !countries.insert(&c.id) {
                return Err(EngineError::Map(format!("duplicate country '{}'", c.id)));
            }
            for sc in &c.supply_centers {
                if !provinces.contains_key(sc.as_str()) {
                    return Err(EngineError::Map(format!(
                        "country '{}' claims unknown supply center '{}'",
                        c.id, sc
                    )));
                }
                if let Some(prev) = owned.insert(sc, &c.id) {
                    return Err(EngineError::Map(format!(
                        "supply center '{}' listed for both '{}' and '{}'",
                        sc, prev, c.id
                    )));
                }
            }
        }

        for group in &self.country_groups {
            for id in group {
                if !countries.contains(id) {
                    return Err(EngineError::Map(format!(
                        "country group references unknown country '{}'",
                        id
                    )));
                }
            }
        }

        for (count, config) in &self.player_configurations {
            if count.parse::<usize>().is_err() {
                return Err(EngineError::Map(format!(
                    "player configuration key '{}' is not a player count",
                    count
                )));
            }
            for id in &config.eliminate {
                if !countries.contains(id) {
                    return Err(EngineError::Map(format!(
                        "player configuration eliminates unknown country '{}'",
                        id
                    )));
                }
            }
        }

        Ok(())
    }
}

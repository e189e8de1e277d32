//! Pruned per-game map view.
//!
//! A [`MapView`] is derived once at game construction by applying the
//! player configuration for the chosen player count to a descriptor.
//! Eliminated countries either disappear along with their provinces or
//! stay behind as neutral terrain holders. The view then answers all
//! adjacency and ownership queries for the lifetime of the game.
//!
//! Two adjacency relations are exposed: the coast-aware one over sea
//! routes (fleet movement) and the coast-agnostic one over every route
//! (convoy path existence); army movement uses the land routes.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

use super::descriptor::{
    CountryDef, MapDescriptor, PlayerConfiguration, ProvinceDef, RouteDef, RouteKind, StartUnit,
};
use super::{CountryId, ProvinceId};

/// The immutable board a single game is played on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub name: String,
    pub start_date: i32,
    provinces: BTreeMap<ProvinceId, ProvinceDef>,
    routes: Vec<RouteDef>,
    countries: BTreeMap<CountryId, CountryDef>,
    country_groups: Vec<Vec<CountryId>>,
}

impl MapView {
    /// Builds the view for a game with `players` participants.
    ///
    /// Looks up the descriptor's player configuration for that count; a
    /// count equal to the number of playable countries needs no explicit
    /// configuration.
    pub fn for_players(desc: &MapDescriptor, players: usize) -> Result<MapView, EngineError> {
        let playable = desc.countries.iter().filter(|c| !c.neutral).count();
        let default_config = PlayerConfiguration::default();
        let config = match desc.player_configurations.get(&players.to_string()) {
            Some(c) => c,
            None if players == playable => &default_config,
            None => {
                return Err(EngineError::NotFound(format!(
                    "map '{}' has no configuration for {} players",
                    desc.info.name, players
                )))
            }
        };

        let eliminated: BTreeSet<&CountryId> = config.eliminate.iter().collect();

        let mut removed_provinces: BTreeSet<&ProvinceId> = BTreeSet::new();
        if config.remove_provinces {
            for c in &desc.countries {
                if eliminated.contains(&c.id) {
                    removed_provinces.extend(c.supply_centers.iter());
                }
            }
        }

        let provinces: BTreeMap<ProvinceId, ProvinceDef> = desc
            .provinces
            .iter()
            .filter(|p| !removed_provinces.contains(&p.id))
            .map(|p| (p.id.clone(), p.clone()))
            .collect();

        let routes: Vec<RouteDef> = desc
            .routes
            .iter()
            .filter(|r| !removed_provinces.contains(&r.p0) && !removed_provinces.contains(&r.p1))
            .cloned()
            .collect();

        let countries: BTreeMap<CountryId, CountryDef> = desc
            .countries
            .iter()
            .filter(|c| !(eliminated.contains(&c.id) && config.remove_provinces))
            .map(|c| {
                let mut c = c.clone();
                if eliminated.contains(&c.id) {
                    c.neutral = true;
                }
                (c.id.clone(), c)
            })
            .collect();

        let country_groups: Vec<Vec<CountryId>> = desc
            .country_groups
            .iter()
            .map(|g| {
                g.iter()
                    .filter(|id| countries.get(*id).map(|c| !c.neutral).unwrap_or(false))
                    .cloned()
                    .collect()
            })
            .filter(|g: &Vec<CountryId>| !g.is_empty())
            .collect();

        Ok(MapView {
            name: desc.info.name.clone(),
            start_date: desc.info.date,
            provinces,
            routes,
            countries,
            country_groups,
        })
    }

    pub fn province(&self, id: &str) -> Option<&ProvinceDef> {
        self.provinces.get(id)
    }

    pub fn provinces(&self) -> impl Iterator<Item = &ProvinceDef> {
        self.provinces.values()
    }

    pub fn country(&self, id: &str) -> Option<&CountryDef> {
        self.countries.get(id)
    }

    pub fn countries(&self) -> impl Iterator<Item = &CountryDef> {
        self.countries.values()
    }

    /// True when fleets and convoys may pass through the province.
    pub fn is_water(&self, id: &str) -> bool {
        self.provinces.get(id).map(|p| p.is_water()).unwrap_or(false)
    }

    /// Coast-aware fleet adjacency from a province and coast, over sea
    /// routes. Yields the destination together with its arrival coast.
    pub fn adjacent_fleet(
        &self,
        province: &str,
        coast: Option<&str>,
    ) -> Vec<(ProvinceId, Option<String>)> {
        let mut out = Vec::new();
        for r in &self.routes {
            if r.kind != RouteKind::Sea {
                continue;
            }
            if r.p0 == province && r.p0coast.as_deref() == coast {
                out.push((r.p1.clone(), r.p1coast.clone()));
            }
            if r.p1 == province && r.p1coast.as_deref() == coast {
                out.push((r.p0.clone(), r.p0coast.clone()));
            }
        }
        out.sort();
        out.dedup();
        out
    }

    /// Army adjacency over land routes.
    pub fn adjacent_army(&self, province: &str) -> Vec<ProvinceId> {
        let mut out = Vec::new();
        for r in &self.routes {
            if r.kind != RouteKind::Land {
                continue;
            }
            if r.p0 == province {
                out.push(r.p1.clone());
            }
            if r.p1 == province {
                out.push(r.p0.clone());
            }
        }
        out.sort();
        out.dedup();
        out
    }

    /// Coast-agnostic adjacency over every route kind.
    pub fn adjacent_ignore_coasts(&self, province: &str) -> Vec<ProvinceId> {
        let mut out = Vec::new();
        for r in &self.routes {
            if r.p0 == province {
                out.push(r.p1.clone());
            }
            if r.p1 == province {
                out.push(r.p0.clone());
            }
        }
        out.sort();
        out.dedup();
        out
    }

    /// The country whose initial supply centers include `province`.
    pub fn country_of_supply_center(&self, province: &str) -> Option<&CountryId> {
        self.countries
            .values()
            .find(|c| c.supply_centers.iter().any(|sc| sc == province))
            .map(|c| &c.id)
    }

    pub fn is_supply_center(&self, province: &str) -> bool {
        self.country_of_supply_center(province).is_some()
    }

    /// Total number of supply centers on the pruned board.
    pub fn supply_center_count(&self) -> usize {
        self.countries.values().map(|c| c.supply_centers.len()).sum()
    }

    /// Home centers a country may build in.
    pub fn home_centers(&self, country: &str) -> &[ProvinceId] {
        self.countries
            .get(country)
            .map(|c| c.supply_centers.as_slice())
            .unwrap_or(&[])
    }

    /// The group of countries claimed together with `country`.
    /// A country outside every group forms its own singleton.
    pub fn country_group(&self, country: &str) -> Vec<CountryId> {
        for group in &self.country_groups {
            if group.iter().any(|id| id == country) {
                return group.clone();
            }
        }
        vec![country.to_string()]
    }

    /// Starting positions: (owner, province, unit kind, coast).
    ///
    /// A province's start unit belongs to the country holding it as an
    /// initial supply center; start units on unowned provinces are
    /// ignored. A starting fleet on a split-coast province takes the
    /// declared start coast, else the first listed coast.
    pub fn start_positions(&self) -> Vec<(CountryId, ProvinceId, StartUnit, Option<String>)> {
        let mut out = Vec::new();
        for p in self.provinces.values() {
            if p.start_unit == StartUnit::None {
                continue;
            }
            let owner = match self.country_of_supply_center(&p.id) {
                Some(c) => c.clone(),
                None => continue,
            };
            let coast = if p.start_unit == StartUnit::Fleet && p.has_coasts() {
                p.start_coast.clone().or_else(|| p.coasts.first().cloned())
            } else {
                None
            };
            out.push((owner, p.id.clone(), p.start_unit, coast));
        }
        out
    }

    /// Checks that a coast specifier is legal for a province.
    pub fn valid_coast(&self, province: &str, coast: Option<&str>) -> bool {
        match self.provinces.get(province) {
            None => false,
            Some(p) if p.has_coasts() => match coast {
                Some(c) => p.coasts.iter().any(|pc| pc == c),
                None => false,
            },
            Some(_) => coast.is_none(),
        }
    }
}

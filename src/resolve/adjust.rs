//! Adjustment-phase resolution.
//!
//! Supply centers are re-assigned by occupation on phase entry, build
//! entitlements are computed, and submitted builds and disbands apply
//! atomically against the entry state. A country that owes disbands and
//! does not submit enough loses its units farthest from home.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::board::{AdjustKind, AdjustOrder, OrderResult, TurnState, Unit};
use crate::error::EngineError;
use crate::map::{CountryId, MapView, ProvinceId};
use crate::movegen::{build_is_valid, disband_is_valid};

/// Everything the adjustment resolver decides: the submitted orders with
/// stamped results, with forced disbands appended per country.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustOutcome {
    pub adjustments: BTreeMap<CountryId, Vec<AdjustOrder>>,
}

/// Re-assigns every occupied supply center to its occupier and computes
/// each country's signed build entitlement. Called on adjustment-phase
/// entry.
pub fn update_supply_centers(map: &MapView, state: &mut TurnState) {
    let occupied: Vec<(CountryId, ProvinceId)> = state
        .nations
        .iter()
        .flat_map(|(country, nation)| {
            nation
                .units
                .iter()
                .filter(|u| map.is_supply_center(&u.province))
                .map(|u| (country.clone(), u.province.clone()))
        })
        .collect();

    for (new_owner, province) in occupied {
        for (country, nation) in state.nations.iter_mut() {
            if *country != new_owner {
                nation.supply_centers.remove(&province);
            }
        }
        if let Some(nation) = state.nations.get_mut(&new_owner) {
            nation.supply_centers.insert(province);
        }
    }

    for (country, nation) in state.nations.iter_mut() {
        nation.to_build = if nation.neutral {
            0
        } else {
            nation.supply_centers.len() as i32 - nation.units.len() as i32
        };
        debug!(country = %country, to_build = nation.to_build, "adjustment entitlement");
    }
}

/// Resolves and applies the adjustment phase.
pub fn resolve_adjustments(
    map: &MapView,
    state: &mut TurnState,
    submitted: &BTreeMap<CountryId, Vec<AdjustOrder>>,
) -> Result<AdjustOutcome, EngineError> {
    // Validate everything against the entry state, then apply.
    let entry_state = state.clone();
    let mut adjustments: BTreeMap<CountryId, Vec<AdjustOrder>> = BTreeMap::new();
    let mut spawns: Vec<(CountryId, Unit)> = Vec::new();
    let mut removals: Vec<(CountryId, ProvinceId)> = Vec::new();

    let countries: Vec<CountryId> = entry_state.nations.keys().cloned().collect();
    for country in &countries {
        let nation = &entry_state.nations[country];
        let orders = submitted.get(country).cloned().unwrap_or_default();
        let mut stamped = Vec::with_capacity(orders.len());

        let mut built = 0i32;
        let mut disbanded = 0i32;
        for mut order in orders {
            order.result = match &order.kind {
                AdjustKind::Build {
                    province,
                    unit_type,
                    coast,
                } => {
                    if nation.to_build > 0
                        && built < nation.to_build
                        && build_is_valid(
                            map,
                            &entry_state,
                            country,
                            province,
                            *unit_type,
                            coast.as_deref(),
                        )
                    {
                        built += 1;
                        spawns.push((
                            country.clone(),
                            Unit {
                                unit_type: *unit_type,
                                province: province.clone(),
                                coast: coast.clone(),
                            },
                        ));
                        OrderResult::Succeeds
                    } else {
                        OrderResult::Fails
                    }
                }
                AdjustKind::Disband { province } => {
                    if nation.to_build < 0
                        && disbanded < -nation.to_build
                        && disband_is_valid(&entry_state, country, province)
                        && !removals
                            .iter()
                            .any(|(c, p)| c == country && p == province)
                    {
                        disbanded += 1;
                        removals.push((country.clone(), province.clone()));
                        OrderResult::Succeeds
                    } else {
                        OrderResult::Fails
                    }
                }
                AdjustKind::Pass => {
                    if nation.to_build > 0 && built < nation.to_build {
                        built += 1;
                        OrderResult::Succeeds
                    } else {
                        OrderResult::Fails
                    }
                }
            };
            stamped.push(order);
        }

        // Shortfall: disband the units farthest from home, farthest
        // first, province id as the tie-break.
        let owed = -nation.to_build - disbanded;
        if nation.to_build < 0 && owed > 0 {
            let mut candidates: Vec<(i32, ProvinceId)> = nation
                .units
                .iter()
                .filter(|u| !removals.iter().any(|(c, p)| c == country && *p == u.province))
                .map(|u| (home_distance(map, country, &u.province), u.province.clone()))
                .collect();
            candidates.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
            for (_, province) in candidates.into_iter().take(owed as usize) {
                info!(country = %country, province = %province, "forced disband");
                let mut forced = AdjustOrder::disband(province.clone());
                forced.result = OrderResult::Succeeds;
                stamped.push(forced);
                removals.push((country.clone(), province));
            }
        }

        adjustments.insert(country.clone(), stamped);
    }

    for (country, province) in &removals {
        state.remove_unit(country, province)?;
    }
    for (country, unit) in spawns {
        state.spawn_unit(map, &country, unit)?;
    }

    Ok(AdjustOutcome { adjustments })
}

/// Fewest hops from a province to any of the country's home centers,
/// over the coast-agnostic graph. Unreachable provinces rank farthest.
fn home_distance(map: &MapView, country: &CountryId, from: &str) -> i32 {
    let homes = map.home_centers(country);
    if homes.iter().any(|h| h == from) {
        return 0;
    }
    let mut dist: BTreeMap<ProvinceId, i32> = BTreeMap::new();
    let mut queue: std::collections::VecDeque<ProvinceId> =
        std::collections::VecDeque::new();
    dist.insert(from.to_string(), 0);
    queue.push_back(from.to_string());
    while let Some(p) = queue.pop_front() {
        let d = dist[&p];
        for next in map.adjacent_ignore_coasts(&p) {
            if dist.contains_key(&next) {
                continue;
            }
            if homes.iter().any(|h| *h == next) {
                return d + 1;
            }
            dist.insert(next.clone(), d + 1);
            queue.push_back(next);
        }
    }
    i32::MAX
}

//! The phase machine.
//!
//! Closes the current phase, runs the matching resolver, appends history,
//! and decides the next phase:
//!
//! ```text
//! CountryClaiming --(all claimed)--------------------> OrderWriting
//! OrderWriting ---(resolve, dislodgements)-----------> Retreating
//! OrderWriting ---(resolve, none, Spring)------------> OrderWriting
//! OrderWriting ---(resolve, none, Fall)--------------> CreatingDisbanding
//! Retreating -----(resolve, Spring)------------------> OrderWriting
//! Retreating -----(resolve, Fall)--------------------> CreatingDisbanding
//! CreatingDisbanding --(resolve)---------------------> OrderWriting
//! ```
//!
//! One state is appended per half-year: closing the movement phase
//! pushes the next half-year's state with post-move positions, while the
//! closed state keeps the frozen orders, results, dislodgements,
//! retreats, adjustments, and contested set.

use tracing::info;

use crate::board::{GamePhase, Order, OrderResult, RetreatOrder, Season, TurnState, Unit, WinState};
use crate::error::EngineError;
use crate::map::{CountryId, MapView, ProvinceId};
use crate::movegen::valid_retreats;
use crate::resolve::{
    adjudicate_movement, resolve_adjustments, resolve_retreats, update_supply_centers,
};

use super::Game;

impl Game {
    /// Closes the order-writing phase: adjudicates all orders, applies
    /// moves and dislodgements, and advances to the next phase.
    pub fn calculate_orders(&mut self) -> Result<(), EngineError> {
        if self.phase != GamePhase::OrderWriting {
            return Err(EngineError::InvalidState(self.phase));
        }
        let view = self.map().clone();

        // Units without an order hold; the synthetic orders are written
        // back so the closed state shows every unit's result.
        let current = self.current_state_mut();
        let nations = current.nations.clone();
        let mut flattened: Vec<(CountryId, Unit, Order)> = Vec::new();
        for (country, nation) in &nations {
            let mut units: Vec<&Unit> = nation.units.iter().collect();
            units.sort_by(|a, b| a.province.cmp(&b.province));
            for unit in units {
                let order = current
                    .orders
                    .get(country)
                    .and_then(|table| table.get(&unit.province))
                    .cloned()
                    .unwrap_or_else(|| Order::hold(unit.province.clone()));
                current
                    .orders
                    .entry(country.clone())
                    .or_default()
                    .insert(unit.province.clone(), order.clone());
                flattened.push((country.clone(), unit.clone(), order));
            }
        }

        let outcome = adjudicate_movement(&view, &flattened);

        // Freeze results into the closing state.
        for (country, order) in &outcome.orders {
            if let Some(stored) = current
                .orders
                .get_mut(country)
                .and_then(|table| table.get_mut(&order.province))
            {
                stored.result = order.result;
            }
        }
        current.dislodgements = outcome.dislodgements.clone();
        current.contested = outcome.contested.clone();
        let closing_season = current.season;

        // Build the next half-year: dislodged units leave the board
        // first, then every successful mover relocates.
        let mut next = current.next();
        for (province, dislodgement) in &outcome.dislodgements {
            next.remove_unit(&dislodgement.country, province)?;
        }
        let mut relocations: Vec<(CountryId, usize, ProvinceId, Option<String>)> = Vec::new();
        for (country, from, to, coast) in &outcome.moves {
            let idx = next
                .nations
                .get(country)
                .and_then(|n| n.units.iter().position(|u| u.province == *from))
                .ok_or_else(|| {
                    EngineError::Internal(format!("moving unit of '{}' missing at '{}'", country, from))
                })?;
            relocations.push((country.clone(), idx, to.clone(), coast.clone()));
        }
        for (country, idx, to, coast) in relocations {
            if let Some(nation) = next.nations.get_mut(&country) {
                nation.units[idx].province = to;
                nation.units[idx].coast = coast;
            }
        }
        verify_occupancy(&next)?;
        self.history.push(next);

        let resolved = self
            .resolved_state()
            .ok_or_else(|| EngineError::Internal("no resolved state after push".to_string()))?;
        let pending = resolved
            .dislodgements
            .keys()
            .any(|p| !valid_retreats(&view, resolved, self.current_state(), p).is_empty());

        info!(
            game = self.id,
            season = ?closing_season,
            dislodged = resolved.dislodgements.len(),
            contested = resolved.contested.len(),
            "orders resolved"
        );

        if pending {
            self.phase = GamePhase::Retreating;
        } else if closing_season == Season::Fall {
            self.enter_adjustments(&view);
        } else {
            self.phase = GamePhase::OrderWriting;
        }
        Ok(())
    }

    /// Closes the retreat phase: bounced and silent dislodgements are
    /// destroyed, survivors join the current state.
    pub fn calculate_retreats(&mut self) -> Result<(), EngineError> {
        if self.phase != GamePhase::Retreating {
            return Err(EngineError::InvalidState(self.phase));
        }
        let view = self.map().clone();
        let resolved = self
            .resolved_state()
            .ok_or_else(|| EngineError::Internal("retreating with no resolved turn".to_string()))?;

        let mut orders: Vec<(CountryId, RetreatOrder)> = Vec::new();
        for (country, table) in &resolved.retreats {
            for order in table.values() {
                orders.push((country.clone(), order.clone()));
            }
        }
        let outcome = resolve_retreats(resolved, &orders);
        let closing_season = resolved.season;

        let survivors: Vec<(CountryId, Unit)> = outcome
            .retreats
            .iter()
            .filter(|(_, r)| r.result == OrderResult::Succeeds)
            .filter_map(|(country, r)| {
                resolved.dislodgements.get(&r.province).map(|d| {
                    (
                        country.clone(),
                        Unit {
                            unit_type: d.unit.unit_type,
                            province: r.dest.clone(),
                            coast: r.coast.clone(),
                        },
                    )
                })
            })
            .collect();

        if let Some(resolved) = self.resolved_state_mut() {
            for (country, order) in &outcome.retreats {
                if let Some(stored) = resolved
                    .retreats
                    .get_mut(country)
                    .and_then(|table| table.get_mut(&order.province))
                {
                    stored.result = order.result;
                }
            }
        }
        for (country, unit) in survivors {
            self.current_state_mut().spawn_unit(&view, &country, unit)?;
        }

        info!(
            game = self.id,
            destroyed = outcome.destroyed.len(),
            "retreats resolved"
        );

        if closing_season == Season::Fall {
            self.enter_adjustments(&view);
        } else {
            self.phase = GamePhase::OrderWriting;
        }
        Ok(())
    }

    /// Closes the adjustment phase: applies builds and disbands, then
    /// checks for a winner and reopens order writing.
    pub fn calculate_adjustments(&mut self) -> Result<(), EngineError> {
        if self.phase != GamePhase::CreatingDisbanding {
            return Err(EngineError::InvalidState(self.phase));
        }
        let view = self.map().clone();
        let submitted = self
            .resolved_state()
            .map(|s| s.adjustments.clone())
            .unwrap_or_default();

        let outcome = resolve_adjustments(&view, self.current_state_mut(), &submitted)?;
        if let Some(resolved) = self.resolved_state_mut() {
            resolved.adjustments = outcome.adjustments;
        }

        self.phase = GamePhase::OrderWriting;
        self.check_winner(&view);
        info!(game = self.id, "adjustments resolved");
        Ok(())
    }

    /// Re-assigns supply centers by occupation, computes build
    /// entitlements, and opens the adjustment phase.
    fn enter_adjustments(&mut self, view: &MapView) {
        update_supply_centers(view, self.current_state_mut());
        self.phase = GamePhase::CreatingDisbanding;
        info!(game = self.id, "adjustment phase opened");
    }

    /// Declares a winner when one country owns more than half of all
    /// supply centers.
    fn check_winner(&mut self, view: &MapView) {
        let total = view.supply_center_count();
        let winner = self
            .current_state()
            .nations
            .iter()
            .find(|(_, nation)| !nation.neutral && nation.supply_centers.len() * 2 > total)
            .map(|(country, _)| country.clone());
        if let Some(country) = winner {
            self.winner = self.players.get(&country).cloned().flatten();
            self.won = WinState::Won;
            info!(game = self.id, country = %country, winner = ?self.winner, "game won");
        }
    }
}

/// Every province holds at most one unit; anything else is a bug.
fn verify_occupancy(state: &TurnState) -> Result<(), EngineError> {
    let mut seen = std::collections::BTreeSet::new();
    for nation in state.nations.values() {
        for unit in &nation.units {
            if !seen.insert(&unit.province) {
                return Err(EngineError::Internal(format!(
                    "two units on '{}' after apply",
                    unit.province
                )));
            }
        }
    }
    Ok(())
}

//! Game construction, country claiming, and order submission.

use std::collections::BTreeMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::{
    AdjustKind, AdjustOrder, GamePhase, Nation, Order, OrderResult, RetreatOrder, Season,
    TurnState, Unit, UnitType, WinState,
};
use crate::error::EngineError;
use crate::map::{CountryId, MapDescriptor, MapView, ProvinceId, StartUnit};
use crate::movegen::{build_is_valid, disband_is_valid, order_is_valid, valid_retreats};

/// A running game: the map view, the seat assignments, and the
/// append-only history of turn states.
///
/// The last history entry is the current state; the one before it holds
/// the just-resolved orders, retreats, and adjustments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: u64,
    pub name: String,
    #[serde(rename = "map")]
    pub map_name: String,
    pub users: Vec<String>,
    pub players: BTreeMap<CountryId, Option<String>>,
    pub winner: Option<String>,
    pub won: WinState,
    pub phase: GamePhase,
    pub history: Vec<TurnState>,
    #[serde(skip)]
    pub(crate) view: Option<MapView>,
}

impl Game {
    /// Creates a new game on the given map for the given users.
    ///
    /// Derives the pruned map view for the user count, seeds the initial
    /// state from the map's starting positions, and mints a random id.
    pub fn new(
        name: impl Into<String>,
        map_name: impl Into<String>,
        descriptor: &MapDescriptor,
        users: Vec<String>,
    ) -> Result<Game, EngineError> {
        if users.is_empty() {
            return Err(EngineError::InvalidSubmission(
                "a game needs at least one user".to_string(),
            ));
        }
        let view = MapView::for_players(descriptor, users.len())?;

        let mut initial = TurnState::new(view.start_date, Season::Spring);
        for country in view.countries() {
            let mut nation = Nation::default();
            nation.neutral = country.neutral;
            for sc in &country.supply_centers {
                nation.supply_centers.insert(sc.clone());
            }
            initial.nations.insert(country.id.clone(), nation);
        }
        for (country, province, start, coast) in view.start_positions() {
            let unit = match start {
                StartUnit::Army => Unit::army(province),
                StartUnit::Fleet => Unit {
                    unit_type: UnitType::Fleet,
                    province,
                    coast,
                },
                StartUnit::None => continue,
            };
            initial.spawn_unit(&view, &country, unit)?;
        }

        let players: BTreeMap<CountryId, Option<String>> = view
            .countries()
            .filter(|c| !c.neutral)
            .map(|c| (c.id.clone(), None))
            .collect();

        let mut rng = SmallRng::from_entropy();
        let id = rng.gen_range(1..=u32::MAX as u64);

        let name = name.into();
        let map_name = map_name.into();
        info!(game = id, name = %name, map = %map_name, users = users.len(), "game created");

        Ok(Game {
            id,
            name,
            map_name,
            users,
            players,
            winner: None,
            won: WinState::Playing,
            phase: GamePhase::CountryClaiming,
            history: vec![initial],
            view: Some(view),
        })
    }

    /// The pruned map this game is played on.
    pub fn map(&self) -> &MapView {
        self.view
            .as_ref()
            .expect("game map view not attached")
    }

    /// The current (most recent) turn state.
    pub fn current_state(&self) -> &TurnState {
        self.history.last().expect("game history is never empty")
    }

    pub(crate) fn current_state_mut(&mut self) -> &mut TurnState {
        self.history
            .last_mut()
            .expect("game history is never empty")
    }

    /// The state holding the just-resolved turn, if any turn has closed.
    pub fn resolved_state(&self) -> Option<&TurnState> {
        let n = self.history.len();
        if n >= 2 {
            self.history.get(n - 2)
        } else {
            None
        }
    }

    pub(crate) fn resolved_state_mut(&mut self) -> Option<&mut TurnState> {
        let n = self.history.len();
        if n >= 2 {
            self.history.get_mut(n - 2)
        } else {
            None
        }
    }

    /// Countries played by a user.
    pub fn countries_of(&self, user: &str) -> Vec<CountryId> {
        self.players
            .iter()
            .filter(|(_, claimant)| claimant.as_deref() == Some(user))
            .map(|(country, _)| country.clone())
            .collect()
    }

    /// Claims a country (and its whole country group) for a user during
    /// the claiming phase. When every playable country is claimed the
    /// game moves to order writing.
    pub fn claim_country(&mut self, user: &str, country: &str) -> Result<(), EngineError> {
        if self.phase != GamePhase::CountryClaiming {
            return Err(EngineError::InvalidState(self.phase));
        }
        if !self.users.iter().any(|u| u == user) {
            return Err(EngineError::PermissionDenied(format!(
                "'{}' is not seated in this game",
                user
            )));
        }
        match self.players.get(country) {
            None => {
                return Err(EngineError::NotFound(format!("country '{}'", country)));
            }
            Some(Some(owner)) => {
                return Err(EngineError::InvalidSubmission(format!(
                    "country '{}' is already claimed by '{}'",
                    country, owner
                )));
            }
            Some(None) => {}
        }
        if !self.countries_of(user).is_empty() {
            return Err(EngineError::InvalidSubmission(format!(
                "'{}' has already claimed a country",
                user
            )));
        }

        let group = self.map().country_group(country);
        for member in group {
            if let Some(slot) = self.players.get_mut(&member) {
                *slot = Some(user.to_string());
            }
        }
        info!(game = self.id, user = %user, country = %country, "country claimed");

        if self.players.values().all(|p| p.is_some()) {
            self.phase = GamePhase::OrderWriting;
            info!(game = self.id, "all countries claimed, orders open");
        }
        Ok(())
    }

    /// Stores a movement-phase order for the submitting user's unit.
    /// The latest submission for a unit replaces earlier ones.
    pub fn submit_order(&mut self, user: &str, order: Order) -> Result<(), EngineError> {
        if self.phase != GamePhase::OrderWriting {
            return Err(EngineError::InvalidState(self.phase));
        }
        let (country, unit) = match self.current_state().unit_at(&order.province) {
            Some((c, u)) => (c.clone(), u.clone()),
            None => {
                return Err(EngineError::NotFound(format!(
                    "no unit at '{}'",
                    order.province
                )))
            }
        };
        self.check_ownership(user, &country)?;
        if !order_is_valid(self.map(), self.current_state(), &unit, &order) {
            return Err(EngineError::InvalidSubmission(format!(
                "order {} is not legal for the unit at '{}'",
                order.id(),
                order.province
            )));
        }
        let mut order = order;
        order.result = OrderResult::Unprocessed;
        let province = order.province.clone();
        self.current_state_mut()
            .orders
            .entry(country)
            .or_default()
            .insert(province, order);
        Ok(())
    }

    /// Removes the stored in-flight submission touching a province.
    pub fn cancel_order(&mut self, user: &str, province: &str) -> Result<(), EngineError> {
        match self.phase {
            GamePhase::OrderWriting => {
                let country = match self.current_state().owner_of_unit(province) {
                    Some(c) => c.clone(),
                    None => {
                        return Err(EngineError::NotFound(format!("no unit at '{}'", province)))
                    }
                };
                self.check_ownership(user, &country)?;
                if let Some(table) = self.current_state_mut().orders.get_mut(&country) {
                    table.remove(province);
                }
                Ok(())
            }
            GamePhase::Retreating => {
                let country = match self
                    .resolved_state()
                    .and_then(|s| s.dislodgements.get(province))
                {
                    Some(d) => d.country.clone(),
                    None => {
                        return Err(EngineError::NotFound(format!(
                            "no dislodged unit at '{}'",
                            province
                        )))
                    }
                };
                self.check_ownership(user, &country)?;
                if let Some(state) = self.resolved_state_mut() {
                    if let Some(table) = state.retreats.get_mut(&country) {
                        table.remove(province);
                    }
                }
                Ok(())
            }
            GamePhase::CreatingDisbanding => {
                let countries = self.countries_of(user);
                if countries.is_empty() {
                    return Err(EngineError::PermissionDenied(format!(
                        "'{}' plays no country in this game",
                        user
                    )));
                }
                if let Some(state) = self.resolved_state_mut() {
                    for country in &countries {
                        if let Some(orders) = state.adjustments.get_mut(country) {
                            orders.retain(|o| o.province().map(|p| p != province).unwrap_or(true));
                        }
                    }
                }
                Ok(())
            }
            GamePhase::CountryClaiming => Err(EngineError::InvalidState(self.phase)),
        }
    }

    /// Stores a retreat order for a dislodged unit of the submitting
    /// user.
    pub fn submit_retreat(&mut self, user: &str, retreat: RetreatOrder) -> Result<(), EngineError> {
        if self.phase != GamePhase::Retreating {
            return Err(EngineError::InvalidState(self.phase));
        }
        let resolved = self
            .resolved_state()
            .ok_or_else(|| EngineError::Internal("retreating with no resolved turn".to_string()))?;
        let country = match resolved.dislodgements.get(&retreat.province) {
            Some(d) => d.country.clone(),
            None => {
                return Err(EngineError::NotFound(format!(
                    "no dislodged unit at '{}'",
                    retreat.province
                )))
            }
        };
        self.check_ownership(user, &country)?;

        let options = valid_retreats(
            self.map(),
            resolved,
            self.current_state(),
            &retreat.province,
        );
        let legal = options
            .iter()
            .any(|(dest, coast)| *dest == retreat.dest && coast.as_deref() == retreat.coast.as_deref());
        if !legal {
            return Err(EngineError::InvalidSubmission(format!(
                "cannot retreat from '{}' to '{}'",
                retreat.province, retreat.dest
            )));
        }

        let mut retreat = retreat;
        retreat.result = OrderResult::Unprocessed;
        let province = retreat.province.clone();
        if let Some(state) = self.resolved_state_mut() {
            state
                .retreats
                .entry(country)
                .or_default()
                .insert(province, retreat);
        }
        Ok(())
    }

    /// Stores an adjustment-phase order for a country of the submitting
    /// user, enforcing the country's build/disband quota at submit time.
    /// A stored Pass yields its slot to a later non-Pass submission.
    pub fn submit_adjustment(
        &mut self,
        user: &str,
        country: &str,
        adjust: AdjustOrder,
    ) -> Result<(), EngineError> {
        if self.phase != GamePhase::CreatingDisbanding {
            return Err(EngineError::InvalidState(self.phase));
        }
        let country: CountryId = country.to_string();
        self.check_ownership(user, &country)?;
        let to_build = self
            .current_state()
            .nations
            .get(&country)
            .map(|n| n.to_build)
            .unwrap_or(0);

        match &adjust.kind {
            AdjustKind::Build {
                province,
                unit_type,
                coast,
            } => {
                if to_build <= 0 {
                    return Err(EngineError::InvalidSubmission(format!(
                        "'{}' has no builds this year",
                        country
                    )));
                }
                if !build_is_valid(
                    self.map(),
                    self.current_state(),
                    &country,
                    province,
                    *unit_type,
                    coast.as_deref(),
                ) {
                    return Err(EngineError::InvalidSubmission(format!(
                        "cannot build at '{}'",
                        province
                    )));
                }
            }
            AdjustKind::Pass => {
                if to_build <= 0 {
                    return Err(EngineError::InvalidSubmission(format!(
                        "'{}' has no builds to pass on",
                        country
                    )));
                }
            }
            AdjustKind::Disband { province } => {
                if to_build >= 0 {
                    return Err(EngineError::InvalidSubmission(format!(
                        "'{}' owes no disbands this year",
                        country
                    )));
                }
                if !disband_is_valid(self.current_state(), &country, province) {
                    return Err(EngineError::InvalidSubmission(format!(
                        "no unit of '{}' to disband at '{}'",
                        country, province
                    )));
                }
            }
        }

        let quota = to_build.unsigned_abs() as usize;
        let mut adjust = adjust;
        adjust.result = OrderResult::Unprocessed;
        let state = self
            .resolved_state_mut()
            .ok_or_else(|| EngineError::Internal("adjusting with no resolved turn".to_string()))?;
        let orders = state.adjustments.entry(country.clone()).or_default();

        // Resubmitting for a province replaces the earlier order.
        if let Some(province) = adjust.province() {
            let province = province.clone();
            orders.retain(|o| o.province().map(|p| *p != province).unwrap_or(true));
        }
        if orders.len() >= quota {
            // A waived build may still be reclaimed.
            let pass_slot = (!matches!(adjust.kind, AdjustKind::Pass))
                .then(|| orders.iter().position(|o| matches!(o.kind, AdjustKind::Pass)))
                .flatten();
            match pass_slot {
                Some(i) => {
                    orders.remove(i);
                }
                None => {
                    return Err(EngineError::InvalidSubmission(format!(
                        "'{}' has already submitted {} adjustment orders",
                        country, quota
                    )));
                }
            }
        }
        orders.push(adjust);
        Ok(())
    }

    /// Marks the game drawn. Draw agreement arrives from outside the
    /// core; the phase machine never declares one itself.
    pub fn set_drawn(&mut self) {
        self.won = WinState::Drawn;
        self.winner = None;
        info!(game = self.id, "game drawn");
    }

    /// The unit occupying a province in the current state.
    pub fn unit_at(&self, province: &str) -> Option<(&CountryId, &Unit)> {
        self.current_state().unit_at(province)
    }

    pub(crate) fn check_ownership(
        &self,
        user: &str,
        country: &CountryId,
    ) -> Result<(), EngineError> {
        match self.players.get(country) {
            Some(Some(owner)) if owner == user => Ok(()),
            Some(_) => Err(EngineError::PermissionDenied(format!(
                "'{}' does not play '{}'",
                user, country
            ))),
            None => Err(EngineError::PermissionDenied(format!(
                "'{}' is not a playable country",
                country
            ))),
        }
    }

    /// Re-attaches the map view after deserialization.
    pub(crate) fn attach_view(&mut self, descriptor: &MapDescriptor) -> Result<(), EngineError> {
        self.view = Some(MapView::for_players(descriptor, self.users.len())?);
        Ok(())
    }

    /// The set of provinces holding units, for invariant checks.
    pub fn occupied_provinces(&self) -> Vec<ProvinceId> {
        let mut out: Vec<ProvinceId> = self
            .current_state()
            .nations
            .values()
            .flat_map(|n| n.units.iter().map(|u| u.province.clone()))
            .collect();
        out.sort();
        out
    }
}

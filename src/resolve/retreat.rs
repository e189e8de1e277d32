//! Retreat-phase resolution.
//!
//! All retreats resolve together: a retreat fails when any other
//! submitted retreat names the same destination; dislodged units that
//! submitted nothing are destroyed.

use tracing::debug;

use crate::board::{OrderResult, RetreatOrder, TurnState, Unit};
use crate::map::{CountryId, ProvinceId};

/// Everything the retreat resolver decides.
#[derive(Debug, Clone, PartialEq)]
pub struct RetreatOutcome {
    /// Submitted retreats with results stamped, in input order.
    pub retreats: Vec<(CountryId, RetreatOrder)>,
    /// Dislodged units destroyed for lack of a (successful) retreat.
    pub destroyed: Vec<(CountryId, Unit)>,
}

/// Resolves the retreats of the turn recorded in `resolved`.
pub fn resolve_retreats(
    resolved: &TurnState,
    orders: &[(CountryId, RetreatOrder)],
) -> RetreatOutcome {
    let mut dest_count: std::collections::BTreeMap<&ProvinceId, u32> =
        std::collections::BTreeMap::new();
    for (_, order) in orders {
        *dest_count.entry(&order.dest).or_insert(0) += 1;
    }

    let mut retreats = Vec::with_capacity(orders.len());
    for (country, order) in orders {
        let mut order = order.clone();
        order.result = if dest_count[&order.dest] > 1 {
            OrderResult::Fails
        } else {
            OrderResult::Succeeds
        };
        debug!(
            province = %order.province,
            dest = %order.dest,
            ok = order.result == OrderResult::Succeeds,
            "retreat resolved"
        );
        retreats.push((country.clone(), order));
    }

    // Dislodged units that retreated unsuccessfully or not at all are
    // destroyed.
    let mut destroyed = Vec::new();
    for (province, dislodgement) in &resolved.dislodgements {
        let survived = retreats.iter().any(|(_, r)| {
            &r.province == province && r.result == OrderResult::Succeeds
        });
        if !survived {
            destroyed.push((dislodgement.country.clone(), dislodgement.unit.clone()));
        }
    }

    RetreatOutcome {
        retreats,
        destroyed,
    }
}

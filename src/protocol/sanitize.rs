//! Hidden-information redaction.
//!
//! While a phase is open, each country's submissions are visible only to
//! the user playing it. Orders live in per-country tables, so the view
//! for one user is a straight projection: drop every other country's
//! in-flight table, keep everything already resolved.

use serde_json::Value;

use crate::board::GamePhase;
use crate::error::EngineError;
use crate::game::Game;

/// Serializes the game as seen by `viewer`: in-flight submissions of
/// countries the viewer does not play are stripped; resolved history is
/// untouched.
pub fn sanitized_view(game: &Game, viewer: &str) -> Result<Value, EngineError> {
    let mine = game.countries_of(viewer);
    let mut copy = game.clone();

    match copy.phase {
        GamePhase::OrderWriting => {
            let current = copy.current_state_mut();
            current.orders.retain(|country, _| mine.contains(country));
        }
        GamePhase::Retreating => {
            if let Some(resolved) = copy.resolved_state_mut() {
                resolved.retreats.retain(|country, _| mine.contains(country));
            }
        }
        GamePhase::CreatingDisbanding => {
            if let Some(resolved) = copy.resolved_state_mut() {
                resolved
                    .adjustments
                    .retain(|country, _| mine.contains(country));
            }
        }
        GamePhase::CountryClaiming => {}
    }

    copy.to_json()
}

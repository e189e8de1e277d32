//! Board representation and turn-state types.
//!
//! Contains the order sums for all phases, units, and the per-half-year
//! [`TurnState`] entries the game history is made of.

pub mod order;
pub mod state;
pub mod unit;

pub use order::{AdjustKind, AdjustOrder, CancelOrder, Order, OrderKind, OrderResult, RetreatOrder};
pub use state::{Dislodgement, GamePhase, Nation, Season, TurnState, WinState};
pub use unit::{Unit, UnitType};

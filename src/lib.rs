//! Entente: the rules core for multi-player Diplomacy games.
//!
//! Given a map descriptor, a set of seated users, and one order per
//! unit, the engine decides which orders succeed, which units are
//! dislodged, how retreats resolve, and how builds and disbands apply
//! between years, while driving the claim / order / retreat / adjust
//! phase machine. Transport, storage, and identity are external
//! collaborators behind the traits in [`store`].

pub mod board;
pub mod error;
pub mod game;
pub mod map;
pub mod movegen;
pub mod protocol;
pub mod resolve;
pub mod store;

pub use board::{
    AdjustKind, AdjustOrder, GamePhase, Order, OrderKind, OrderResult, RetreatOrder, Season,
    TurnState, Unit, UnitType, WinState,
};
pub use error::EngineError;
pub use game::Game;
pub use map::{MapDescriptor, MapView};
pub use protocol::sanitized_view;

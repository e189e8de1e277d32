//! The game aggregate: players, claiming, order submission, and the
//! phase machine driving adjudication.

pub mod game;
pub mod phase;

pub use game::Game;

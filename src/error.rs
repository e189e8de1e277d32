//! Error kinds raised by the core.
//!
//! The adjudicator itself never fails on legal input; orders that are legal
//! but unsuccessful are recorded as failed results, not errors. Everything
//! here is raised by the validation and phase-transition surface.

use thiserror::Error;

use crate::board::GamePhase;

/// Errors surfaced by the public game operations.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Syntactically valid order that is illegal for this phase/unit/user.
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),

    /// No game, province, unit, or country with the given id.
    #[error("not found: {0}")]
    NotFound(String),

    /// The submitting user does not own the affected country.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Operation incompatible with the current phase.
    #[error("operation not allowed during {0:?}")]
    InvalidState(GamePhase),

    /// Corrupt or inconsistent map descriptor.
    #[error("map error: {0}")]
    Map(String),

    /// Invariant violation. A bug, never silently recovered.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

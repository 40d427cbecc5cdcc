//! Error types for the simulation.

use crate::types::Position;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Placing into a non-empty cell. Signals the grid/position invariant
    /// was broken somewhere upstream, so it is never retried.
    #[error("cell {position} is already occupied")]
    OccupiedCell { position: Position },

    /// Random placement exhausted its retry budget. Recoverable: the caller
    /// skips this spawn attempt.
    #[error("no free cell found after {attempts} placement attempts")]
    NoSpaceAvailable { attempts: u32 },

    /// Direct grid access with coordinates outside the planet.
    #[error("position {position} is outside the grid")]
    OutOfBounds { position: Position },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

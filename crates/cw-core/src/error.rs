//! Error types for generation and room interaction

use thiserror::Error;

/// Failures while building a floor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("Invalid generation options: {0}")]
    InvalidOptions(String),

    #[error("Could not place room {room} after {attempts} attempts")]
    PlacementExhausted { room: u32, attempts: usize },

    #[error("Dungeon graph is disconnected: {unreachable} rooms unreachable from the start")]
    Disconnected { unreachable: usize },

    #[error("No room could be made the boss room")]
    MissingBoss,
}

/// A player command that could not be carried out
///
/// These are never fatal; the session turns them into messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The command named something that is not here
    #[error("{0}")]
    InvalidTarget(String),

    /// The target exists but the action is not allowed in the current state
    #[error("{0}")]
    IllegalAction(String),
}

impl ActionError {
    pub fn invalid_target(msg: impl Into<String>) -> Self {
        Self::InvalidTarget(msg.into())
    }

    pub fn illegal(msg: impl Into<String>) -> Self {
        Self::IllegalAction(msg.into())
    }
}

pub type ActionResult<T> = Result<T, ActionError>;

//! cw-core: Core game logic for Crystal Whispers
//!
//! Procedural dungeon floors made of connected rooms, plus the per-room
//! interaction state machine that drives exploration, traps, puzzles and
//! combat handoff. This crate does no I/O beyond reading an options file.

pub mod combat;
pub mod content;
pub mod dungeon;
pub mod options;
pub mod player;
pub mod session;

mod consts;
mod error;
mod rng;

pub use consts::*;
pub use error::{ActionError, ActionResult, GenerationError};
pub use options::{GenerationOptions, OptionsError};
pub use player::Player;
pub use rng::GameRng;
pub use session::{Command, CommandResult, GameSession, Modal};

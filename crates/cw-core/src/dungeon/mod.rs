//! Dungeon system
//!
//! Contains the floor arena, room graph generation, and the per-room
//! interaction state machine.

mod classify;
mod connectivity;
mod direction;
mod floor;
mod generation;
mod interaction;
mod room;
mod trap;

pub use classify::{
    classify, difficulty_for_level, extract_item, populate, type_for_roll, ClassifierTally,
    FEATURE_KEYWORDS, TYPE_WEIGHTS,
};
pub use connectivity::{add_extra_connections, close_connectivity, ConnectivityTracker};
pub use direction::Direction;
pub use floor::Dungeon;
pub use generation::start_position;
pub use interaction::{ExamineReport, TakeReport};
pub use room::{Connection, ConnectionState, Room, RoomContent, RoomId, RoomType};
pub use trap::{DisarmMethod, DisarmReport, Trap, TrapTrigger};

//! Core game constants
//!
//! Room geometry and generation tuning shared by the builder and the
//! classifier.

/// Default grid dimensions
pub const GRID_WIDTH: i32 = 50;
pub const GRID_HEIGHT: i32 = 50;

/// Default number of rooms per floor
pub const DEFAULT_ROOM_COUNT: usize = 15;

/// Side length of every room footprint
pub const ROOM_SIZE: i32 = 5;

/// Distance between the origins of two adjacent rooms (room plus corridor)
pub const ROOM_SPACING: i32 = ROOM_SIZE + 2;

/// Margin added around footprints when checking overlap
pub const OVERLAP_BUFFER: i32 = 2;

/// Extra random connections added after the spanning pass
pub const EXTRA_CONNECTIONS: usize = 3;

/// Random parents tried for one room before the exhaustive scan
pub const MAX_PLACEMENT_ATTEMPTS: usize = 200;

/// Whole-floor rebuilds attempted before giving up
pub const MAX_BUILD_ATTEMPTS: usize = 3;

/// Minimum share of classified rooms that must hold combat
pub const COMBAT_QUOTA: f64 = 0.4;

/// Highest content difficulty tier
pub const MAX_DIFFICULTY: u32 = 5;

/// Number of flavor features rolled for each room
pub const FEATURES_PER_ROOM: usize = 3;

/// Chance the player notices a room's enemy first on entry
pub const PLAYER_NOTICE_CHANCE: f64 = 0.7;

/// Base disarm chance and bonus per disarm upgrade level
pub const DISARM_BASE_CHANCE: f64 = 0.5;
pub const DISARM_UPGRADE_BONUS: f64 = 0.15;

/// Highest floor with authored content
pub const MAX_FLOOR: u32 = 5;

//! Room types and structures
//!
//! A room is a fixed square footprint on the floor grid plus everything the
//! player can find in it: cached flavor text, feature items, a single
//! payload, and the awareness flags used for ambushes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::content::{Enemy, Item, Puzzle, Theme, Treasure};
use crate::consts::FEATURES_PER_ROOM;
use crate::rng::GameRng;

use super::direction::Direction;
use super::trap::Trap;

/// Stable room identifier, assigned in creation order from 0
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u32);

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a room is for, fixed once classified
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RoomType {
    /// Safe room with no payload
    #[default]
    None,
    Combat,
    Puzzle,
    Treasure,
    Trap,
    Boss,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionState {
    #[default]
    Open,
    Locked,
    Blocked,
}

/// One doorway; its mirror image always exists on the target room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub direction: Direction,
    pub state: ConnectionState,
    pub target: RoomId,
}

/// The single payload a room can hold
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RoomContent {
    #[default]
    None,
    Enemy(Enemy),
    Puzzle(Puzzle),
    Treasure(Treasure),
    Trap(Trap),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,

    // Flavor cached from the theme at construction
    pub size: String,
    pub atmosphere: String,
    pub ambience: Option<String>,
    pub event: Option<String>,
    pub base_description: String,
    pub description: String,

    pub connections: Vec<Connection>,
    pub items: Vec<Item>,
    pub features: Vec<String>,

    pub discovered: bool,
    pub content_generated: bool,
    pub cleared: bool,
    /// A neighbor has been discovered, so this doorway is known
    pub known_exit: bool,

    pub room_type: RoomType,
    pub content: RoomContent,

    pub enemy_aware: bool,
    pub player_aware: bool,
    pub entered_from: Option<Direction>,
    /// The next examine of a rewarding item always pays out
    pub first_examine: bool,
}

impl Room {
    /// Build a room, drawing its flavor text from the theme
    pub fn new(id: RoomId, x: i32, y: i32, size: i32, theme: &dyn Theme, rng: &mut GameRng) -> Self {
        let size_word = theme.random_size(rng);
        let atmosphere = theme.random_atmosphere(rng);
        let ambience = theme.random_ambience(rng);
        let event = theme.random_event(rng);
        let features = theme.random_features(rng, FEATURES_PER_ROOM);

        let base_description = match &ambience {
            Some(ambience) => format!("You're in a {size_word} {atmosphere} chamber. {ambience}."),
            None => format!("You're in a {size_word} {atmosphere} chamber."),
        };

        let mut room = Self {
            id,
            x,
            y,
            width: size,
            height: size,
            size: size_word,
            atmosphere,
            ambience,
            event,
            base_description,
            description: String::new(),
            connections: Vec::new(),
            items: Vec::new(),
            features,
            discovered: false,
            content_generated: false,
            cleared: false,
            known_exit: false,
            room_type: RoomType::None,
            content: RoomContent::None,
            enemy_aware: false,
            player_aware: false,
            entered_from: None,
            first_examine: true,
        };
        room.refresh_description();
        room
    }

    /// Center point of the room
    pub fn center(&self) -> (i32, i32) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Center-to-center Manhattan distance
    pub fn distance_to(&self, other: &Room) -> i32 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        (ax - bx).abs() + (ay - by).abs()
    }

    /// Check if a point is inside the room
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// Check if a footprint at (x, y) overlaps this room with a buffer zone
    pub fn footprint_overlaps(&self, x: i32, y: i32, width: i32, height: i32, buffer: i32) -> bool {
        x < self.x + self.width + buffer
            && x + width + buffer > self.x
            && y < self.y + self.height + buffer
            && y + height + buffer > self.y
    }

    /// Check if this room overlaps another with a buffer zone
    pub fn overlaps(&self, other: &Room, buffer: i32) -> bool {
        self.footprint_overlaps(other.x, other.y, other.width, other.height, buffer)
    }

    pub fn connection(&self, direction: Direction) -> Option<&Connection> {
        self.connections.iter().find(|c| c.direction == direction)
    }

    pub fn connection_to(&self, target: RoomId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.target == target)
    }

    pub fn is_connected_to(&self, target: RoomId) -> bool {
        self.connection_to(target).is_some()
    }

    /// Whether a doorway could still be added in this direction
    pub fn has_free_side(&self, direction: Direction) -> bool {
        self.connection(direction).is_none()
    }

    /// Add one side of a connection; the dungeon adds the mirror side
    pub(crate) fn push_connection(&mut self, direction: Direction, target: RoomId) {
        self.connections.push(Connection {
            direction,
            state: ConnectionState::Open,
            target,
        });
        self.connections.sort_by_key(|c| c.direction);
    }

    /// Living enemy that still blocks the room
    pub fn live_enemy(&self) -> Option<&Enemy> {
        match &self.content {
            RoomContent::Enemy(enemy) if !self.cleared && enemy.is_alive() => Some(enemy),
            _ => None,
        }
    }

    pub fn puzzle(&self) -> Option<&Puzzle> {
        match &self.content {
            RoomContent::Puzzle(puzzle) => Some(puzzle),
            _ => None,
        }
    }

    pub fn trap(&self) -> Option<&Trap> {
        match &self.content {
            RoomContent::Trap(trap) => Some(trap),
            _ => None,
        }
    }

    pub fn treasure(&self) -> Option<&Treasure> {
        match &self.content {
            RoomContent::Treasure(treasure) => Some(treasure),
            _ => None,
        }
    }

    /// Rebuild the cached description from the current room state
    pub fn refresh_description(&mut self) {
        let mut description = self.base_description.clone();

        if !self.features.is_empty() {
            description.push_str("\n\nIn this room:");
            for feature in &self.features {
                description.push_str("\n- ");
                description.push_str(feature);
            }
        }

        if self.live_enemy().is_some() {
            description.push_str("\n\nThere is a hostile presence here...");
        }
        if self.trap().is_some() {
            description.push_str("\n\nA trap lies in wait...");
        }
        if self.puzzle().is_some_and(Puzzle::is_active) {
            description.push_str("\n\nSomething about this room feels particularly enigmatic...");
        }
        if self.treasure().is_some() {
            description.push_str("\n\nSomething valuable catches your eye...");
        }

        self.description = description;
    }

    /// Description plus the list of exits
    pub fn full_description(&self) -> String {
        let mut lines = vec![self.description.clone()];
        if !self.connections.is_empty() {
            lines.push(String::new());
            lines.push("Exits:".to_string());
            for connection in &self.connections {
                lines.push(format!("  - {}: {}", connection.direction, connection.state));
            }
        }
        lines.join("\n")
    }
}

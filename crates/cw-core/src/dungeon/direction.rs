//! Cardinal directions between rooms

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Direction of a doorway, as seen from the room that owns it
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum Direction {
    #[strum(to_string = "north", serialize = "n")]
    North,
    #[strum(to_string = "south", serialize = "s")]
    South,
    #[strum(to_string = "east", serialize = "e")]
    East,
    #[strum(to_string = "west", serialize = "w")]
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Unit step on the grid; y grows southward
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Direction of the dominant axis of an offset
    ///
    /// Ties resolve vertically, and a zero offset reads as north.
    pub fn from_offset(dx: i32, dy: i32) -> Self {
        if dx.abs() > dy.abs() {
            if dx > 0 { Direction::East } else { Direction::West }
        } else if dy > 0 {
            Direction::South
        } else {
            Direction::North
        }
    }

    /// Direction along the weaker axis of an offset, if it has one
    pub fn secondary_from_offset(dx: i32, dy: i32) -> Option<Self> {
        if dx.abs() > dy.abs() {
            match dy.signum() {
                1 => Some(Direction::South),
                -1 => Some(Direction::North),
                _ => None,
            }
        } else {
            match dx.signum() {
                1 => Some(Direction::East),
                -1 => Some(Direction::West),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_opposite_is_involution() {
        for dir in Direction::iter() {
            assert_ne!(dir, dir.opposite());
            assert_eq!(dir, dir.opposite().opposite());
        }
    }

    #[test]
    fn test_from_offset_dominant_axis() {
        assert_eq!(Direction::from_offset(7, 2), Direction::East);
        assert_eq!(Direction::from_offset(-7, 2), Direction::West);
        assert_eq!(Direction::from_offset(1, 7), Direction::South);
        assert_eq!(Direction::from_offset(1, -7), Direction::North);
        assert_eq!(Direction::from_offset(4, 4), Direction::South);
    }

    #[test]
    fn test_secondary_axis() {
        assert_eq!(Direction::secondary_from_offset(7, 2), Some(Direction::South));
        assert_eq!(Direction::secondary_from_offset(-1, -7), Some(Direction::West));
        assert_eq!(Direction::secondary_from_offset(7, 0), None);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(Direction::from_str("North").unwrap(), Direction::North);
        assert_eq!(Direction::from_str("w").unwrap(), Direction::West);
        assert!(Direction::from_str("up").is_err());
        assert_eq!(Direction::East.to_string(), "east");
    }
}

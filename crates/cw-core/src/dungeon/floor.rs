//! The dungeon floor
//!
//! `Dungeon` is the arena that owns every room by id. Rooms refer to each
//! other only through [`RoomId`]s held in their connections.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::content::ContentSource;
use crate::rng::GameRng;

use super::classify::ClassifierTally;
use super::direction::Direction;
use super::room::{Room, RoomId, RoomType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dungeon {
    pub width: i32,
    pub height: i32,
    /// Requested number of rooms
    pub room_count: usize,
    pub level: u32,
    pub seed: String,
    pub rng: GameRng,
    pub rooms: BTreeMap<RoomId, Room>,
    pub current_room: RoomId,
    pub next_id: u32,
    pub tally: ClassifierTally,
}

impl Dungeon {
    /// Empty floor with a fresh stream for `seed`
    pub fn empty(width: i32, height: i32, room_count: usize, level: u32, seed: &str) -> Self {
        Self {
            width,
            height,
            room_count,
            level,
            seed: seed.to_string(),
            rng: GameRng::new(seed),
            rooms: BTreeMap::new(),
            current_room: RoomId(0),
            next_id: 0,
            tally: ClassifierTally::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id)
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(&id)
    }

    /// Room the player is standing in
    pub fn current(&self) -> Option<&Room> {
        self.rooms.get(&self.current_room)
    }

    pub fn current_mut(&mut self) -> Option<&mut Room> {
        self.rooms.get_mut(&self.current_room)
    }

    /// Borrow a room and the shared stream together
    pub fn room_and_rng(&mut self, id: RoomId) -> Option<(&mut Room, &mut GameRng)> {
        let Dungeon { rooms, rng, .. } = self;
        rooms.get_mut(&id).map(|room| (room, rng))
    }

    pub fn ids(&self) -> Vec<RoomId> {
        self.rooms.keys().copied().collect()
    }

    /// Reserve the next id
    pub fn allocate_id(&mut self) -> RoomId {
        let id = RoomId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert_room(&mut self, room: Room) {
        self.next_id = self.next_id.max(room.id.0 + 1);
        self.rooms.insert(room.id, room);
    }

    /// Whether a footprint stays inside the grid
    pub fn in_bounds(&self, x: i32, y: i32, size: i32) -> bool {
        x >= 0 && y >= 0 && x + size <= self.width && y + size <= self.height
    }

    /// Whether a footprint collides with any room, buffer included
    pub fn footprint_clear(&self, x: i32, y: i32, size: i32, buffer: i32) -> bool {
        !self
            .rooms
            .values()
            .any(|room| room.footprint_overlaps(x, y, size, size, buffer))
    }

    /// Whether `a` can gain a doorway toward `b` in `direction`
    pub fn can_connect(&self, a: RoomId, direction: Direction, b: RoomId) -> bool {
        if a == b {
            return false;
        }
        match (self.rooms.get(&a), self.rooms.get(&b)) {
            (Some(ra), Some(rb)) => {
                !ra.is_connected_to(b)
                    && ra.has_free_side(direction)
                    && rb.has_free_side(direction.opposite())
            }
            _ => false,
        }
    }

    /// Add a symmetric connection; returns false if either side is taken
    pub fn connect(&mut self, a: RoomId, direction: Direction, b: RoomId) -> bool {
        if !self.can_connect(a, direction, b) {
            return false;
        }
        if let Some(room) = self.rooms.get_mut(&a) {
            room.push_connection(direction, b);
        }
        if let Some(room) = self.rooms.get_mut(&b) {
            room.push_connection(direction.opposite(), a);
        }
        tracing::trace!(from = a.0, to = b.0, %direction, "rooms connected");
        true
    }

    /// Room reached by leaving `from` through `direction`
    pub fn neighbor(&self, from: RoomId, direction: Direction) -> Option<RoomId> {
        self.rooms
            .get(&from)
            .and_then(|room| room.connection(direction))
            .map(|c| c.target)
    }

    /// Every room reachable from `start` through any connection
    pub fn reachable_from(&self, start: RoomId) -> BTreeSet<RoomId> {
        let mut seen = BTreeSet::new();
        if !self.rooms.contains_key(&start) {
            return seen;
        }
        let mut queue = VecDeque::from([start]);
        seen.insert(start);
        while let Some(id) = queue.pop_front() {
            if let Some(room) = self.rooms.get(&id) {
                for connection in &room.connections {
                    if self.rooms.contains_key(&connection.target) && seen.insert(connection.target)
                    {
                        queue.push_back(connection.target);
                    }
                }
            }
        }
        seen
    }

    pub fn is_connected(&self) -> bool {
        self.reachable_from(RoomId(0)).len() == self.rooms.len()
    }

    pub fn boss_rooms(&self) -> Vec<RoomId> {
        self.rooms
            .values()
            .filter(|room| room.room_type == RoomType::Boss)
            .map(|room| room.id)
            .collect()
    }

    /// Mark a room discovered, generating its content the first time
    ///
    /// Returns true only on the first discovery.
    pub fn discover(&mut self, id: RoomId, content: &dyn ContentSource) -> bool {
        let level = self.level;
        let targets: Vec<RoomId> = match self.room_and_rng(id) {
            Some((room, rng)) => {
                if !room.discover(level, content, rng) {
                    return false;
                }
                room.connections.iter().map(|c| c.target).collect()
            }
            None => return false,
        };
        for target in targets {
            if let Some(neighbor) = self.rooms.get_mut(&target) {
                neighbor.known_exit = true;
            }
        }
        tracing::debug!(room = id.0, "room discovered");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FloorTheme;

    fn floor_with_rooms(n: u32) -> Dungeon {
        let theme = FloorTheme::for_level(1);
        let mut dungeon = Dungeon::empty(50, 50, n as usize, 1, "floor");
        for i in 0..n {
            let id = dungeon.allocate_id();
            let room = Room::new(id, (i as i32) * 7, 0, 5, &theme, &mut dungeon.rng);
            dungeon.insert_room(room);
        }
        dungeon
    }

    #[test]
    fn test_connect_is_symmetric() {
        let mut dungeon = floor_with_rooms(2);
        assert!(dungeon.connect(RoomId(0), Direction::East, RoomId(1)));
        assert_eq!(dungeon.neighbor(RoomId(0), Direction::East), Some(RoomId(1)));
        assert_eq!(dungeon.neighbor(RoomId(1), Direction::West), Some(RoomId(0)));
    }

    #[test]
    fn test_connect_refuses_duplicates() {
        let mut dungeon = floor_with_rooms(3);
        assert!(dungeon.connect(RoomId(0), Direction::East, RoomId(1)));
        assert!(!dungeon.connect(RoomId(0), Direction::North, RoomId(1)));
        assert!(!dungeon.connect(RoomId(0), Direction::East, RoomId(2)));
        assert!(!dungeon.connect(RoomId(2), Direction::East, RoomId(1)));
        assert!(!dungeon.connect(RoomId(2), Direction::East, RoomId(2)));
        assert!(dungeon.connect(RoomId(1), Direction::East, RoomId(2)));
    }

    #[test]
    fn test_reachability() {
        let mut dungeon = floor_with_rooms(3);
        dungeon.connect(RoomId(0), Direction::East, RoomId(1));
        assert!(!dungeon.is_connected());
        assert_eq!(dungeon.reachable_from(RoomId(0)).len(), 2);
        dungeon.connect(RoomId(1), Direction::East, RoomId(2));
        assert!(dungeon.is_connected());
        assert!(dungeon.reachable_from(RoomId(99)).is_empty());
    }

    #[test]
    fn test_bounds_and_clearance() {
        let dungeon = floor_with_rooms(1);
        assert!(dungeon.in_bounds(45, 45, 5));
        assert!(!dungeon.in_bounds(46, 0, 5));
        assert!(!dungeon.in_bounds(-1, 0, 5));
        assert!(dungeon.footprint_clear(7, 0, 5, 2));
        assert!(!dungeon.footprint_clear(6, 0, 5, 2));
    }

    #[test]
    fn test_allocate_ids_monotonic() {
        let mut dungeon = floor_with_rooms(2);
        assert_eq!(dungeon.allocate_id(), RoomId(2));
        assert_eq!(dungeon.allocate_id(), RoomId(3));
    }
}

//! Connectivity closure and extra connections
//!
//! Growth from a parent always links the new room, so the closure pass is
//! normally a no-op. It still runs so that every floor the builder returns
//! is provably connected:
//! 1. Track equivalence classes of connected rooms
//! 2. Repeatedly join the closest (connected, unconnected) pair
//! 3. Add a few random extra connections for loops

use crate::error::GenerationError;

use super::direction::Direction;
use super::floor::Dungeon;
use super::room::RoomId;

/// Tracks room connectivity using equivalence classes
#[derive(Debug, Clone)]
pub struct ConnectivityTracker {
    ids: Vec<RoomId>,
    class: Vec<usize>,
}

impl ConnectivityTracker {
    /// Build classes from the connections already on the floor
    pub fn from_dungeon(dungeon: &Dungeon) -> Self {
        let ids = dungeon.ids();
        let mut tracker = Self {
            class: (0..ids.len()).collect(),
            ids,
        };
        for room in dungeon.rooms.values() {
            for connection in &room.connections {
                tracker.merge(room.id, connection.target);
            }
        }
        tracker
    }

    fn index(&self, id: RoomId) -> Option<usize> {
        self.ids.binary_search(&id).ok()
    }

    /// Check if two rooms are in the same class
    pub fn are_connected(&self, a: RoomId, b: RoomId) -> bool {
        match (self.index(a), self.index(b)) {
            (Some(a), Some(b)) => self.class[a] == self.class[b],
            _ => false,
        }
    }

    /// Merge the classes of two rooms
    pub fn merge(&mut self, a: RoomId, b: RoomId) {
        let (Some(a), Some(b)) = (self.index(a), self.index(b)) else {
            return;
        };
        let old_class = self.class[b];
        let new_class = self.class[a];
        for class in &mut self.class {
            if *class == old_class {
                *class = new_class;
            }
        }
    }

    pub fn all_connected(&self) -> bool {
        match self.class.first() {
            Some(&first) => self.class.iter().all(|&c| c == first),
            None => true,
        }
    }

    /// Rooms not in the start room's class
    pub fn unreachable_from(&self, start: RoomId) -> Vec<RoomId> {
        self.ids
            .iter()
            .copied()
            .filter(|&id| !self.are_connected(start, id))
            .collect()
    }
}

/// Preferred doorway from `a` toward `b`: dominant axis first, then the other
fn candidate_directions(dungeon: &Dungeon, a: RoomId, b: RoomId) -> Vec<Direction> {
    let (Some(ra), Some(rb)) = (dungeon.room(a), dungeon.room(b)) else {
        return Vec::new();
    };
    let (ax, ay) = ra.center();
    let (bx, by) = rb.center();
    let (dx, dy) = (bx - ax, by - ay);
    let mut dirs = vec![Direction::from_offset(dx, dy)];
    if let Some(secondary) = Direction::secondary_from_offset(dx, dy) {
        dirs.push(secondary);
    }
    dirs
}

/// Connect every room to room 0, closest pairs first
pub fn close_connectivity(dungeon: &mut Dungeon) -> Result<usize, GenerationError> {
    let start = RoomId(0);
    let mut tracker = ConnectivityTracker::from_dungeon(dungeon);
    let mut added = 0;

    while !tracker.all_connected() {
        let outside = tracker.unreachable_from(start);
        let inside: Vec<RoomId> = dungeon
            .ids()
            .into_iter()
            .filter(|&id| tracker.are_connected(start, id))
            .collect();

        let mut pairs: Vec<(i32, RoomId, RoomId)> = Vec::new();
        for &a in &inside {
            for &b in &outside {
                if let (Some(ra), Some(rb)) = (dungeon.room(a), dungeon.room(b)) {
                    pairs.push((ra.distance_to(rb), a, b));
                }
            }
        }
        pairs.sort();

        let joined = pairs.iter().find_map(|&(_, a, b)| {
            candidate_directions(dungeon, a, b)
                .into_iter()
                .find(|&dir| dungeon.can_connect(a, dir, b))
                .map(|dir| (a, dir, b))
        });

        match joined {
            Some((a, dir, b)) => {
                dungeon.connect(a, dir, b);
                tracker.merge(a, b);
                added += 1;
                tracing::debug!(from = a.0, to = b.0, "closure connection added");
            }
            None => {
                return Err(GenerationError::Disconnected {
                    unreachable: outside.len(),
                });
            }
        }
    }

    Ok(added)
}

/// Try `attempts` random room pairs and connect the ones with free sides
pub fn add_extra_connections(dungeon: &mut Dungeon, attempts: usize) -> usize {
    let ids = dungeon.ids();
    if ids.len() < 2 {
        return 0;
    }
    let mut added = 0;
    for _ in 0..attempts {
        let a = ids[dungeon.rng.random_int(0, ids.len() as i32) as usize];
        let b = ids[dungeon.rng.random_int(0, ids.len() as i32) as usize];
        if a == b {
            continue;
        }
        let Some(dir) = candidate_directions(dungeon, a, b).first().copied() else {
            continue;
        };
        if dungeon.connect(a, dir, b) {
            added += 1;
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::FloorTheme;
    use crate::dungeon::room::Room;

    fn scattered(positions: &[(i32, i32)]) -> Dungeon {
        let theme = FloorTheme::for_level(1);
        let mut dungeon = Dungeon::empty(60, 60, positions.len(), 1, "scatter");
        for &(x, y) in positions {
            let id = dungeon.allocate_id();
            let room = Room::new(id, x, y, 5, &theme, &mut dungeon.rng);
            dungeon.insert_room(room);
        }
        dungeon
    }

    #[test]
    fn test_tracker_merge() {
        let dungeon = scattered(&[(0, 0), (10, 0), (20, 0)]);
        let mut tracker = ConnectivityTracker::from_dungeon(&dungeon);
        assert!(!tracker.all_connected());
        tracker.merge(RoomId(0), RoomId(2));
        assert!(tracker.are_connected(RoomId(0), RoomId(2)));
        assert!(!tracker.are_connected(RoomId(0), RoomId(1)));
        assert_eq!(tracker.unreachable_from(RoomId(0)), vec![RoomId(1)]);
        tracker.merge(RoomId(1), RoomId(2));
        assert!(tracker.all_connected());
    }

    #[test]
    fn test_closure_connects_everything() {
        let mut dungeon = scattered(&[(20, 20), (40, 20), (20, 40), (0, 0), (45, 45)]);
        let added = close_connectivity(&mut dungeon).unwrap();
        assert_eq!(added, 4);
        assert!(dungeon.is_connected());
    }

    #[test]
    fn test_closure_picks_closest_pair() {
        let mut dungeon = scattered(&[(20, 20), (40, 20), (27, 20)]);
        close_connectivity(&mut dungeon).unwrap();
        assert_eq!(dungeon.neighbor(RoomId(0), Direction::East), Some(RoomId(2)));
        assert_eq!(dungeon.neighbor(RoomId(2), Direction::East), Some(RoomId(1)));
    }

    #[test]
    fn test_closure_is_noop_when_connected() {
        let mut dungeon = scattered(&[(0, 0), (7, 0)]);
        dungeon.connect(RoomId(0), Direction::East, RoomId(1));
        assert_eq!(close_connectivity(&mut dungeon).unwrap(), 0);
    }

    #[test]
    fn test_extra_connections_keep_symmetry() {
        let mut dungeon = scattered(&[(0, 0), (7, 0), (0, 7), (7, 7), (14, 0)]);
        add_extra_connections(&mut dungeon, 20);
        for room in dungeon.rooms.values() {
            for c in &room.connections {
                let back = dungeon.room(c.target).unwrap().connection_to(room.id).unwrap();
                assert_eq!(back.direction, c.direction.opposite());
            }
        }
    }
}

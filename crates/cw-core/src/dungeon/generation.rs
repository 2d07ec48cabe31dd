//! Floor generation
//!
//! Grows a connected set of rooms outward from the start room:
//! 1. Place room 0 at the grid center
//! 2. Grow each new room off a random parent at fixed spacing
//! 3. Close any connectivity gaps, then add a few extra connections
//! 4. Classify room types and force the farthest room to be the boss
//!
//! Every random draw comes from the floor's own stream, so one seed always
//! yields the same floor.

use std::cmp::Reverse;

use crate::consts::{OVERLAP_BUFFER, ROOM_SIZE, ROOM_SPACING};
use crate::content::{ContentSource, Theme};
use crate::error::GenerationError;
use crate::options::GenerationOptions;
use crate::rng::GameRng;

use super::classify;
use super::connectivity::{add_extra_connections, close_connectivity};
use super::direction::Direction;
use super::floor::Dungeon;
use super::room::{Room, RoomId, RoomType};

impl Dungeon {
    /// Build a floor, retrying with derived seeds when an attempt fails
    pub fn generate(
        options: &GenerationOptions,
        theme: &dyn Theme,
        content: &dyn ContentSource,
    ) -> Result<Self, GenerationError> {
        options.validate()?;
        let base_seed = match &options.seed {
            Some(seed) => seed.clone(),
            None => GameRng::from_entropy().seed().to_string(),
        };

        let mut last_error = GenerationError::MissingBoss;
        for attempt in 0..options.max_build_attempts {
            let seed = if attempt == 0 {
                base_seed.clone()
            } else {
                format!("{base_seed}#{attempt}")
            };
            match build_floor(options, &seed, theme, content) {
                Ok(dungeon) => {
                    tracing::info!(
                        seed = %seed,
                        level = dungeon.level,
                        rooms = dungeon.len(),
                        attempt,
                        "floor generated"
                    );
                    return Ok(dungeon);
                }
                Err(err) => {
                    tracing::debug!(seed = %seed, attempt, error = %err, "floor build failed");
                    last_error = err;
                }
            }
        }
        Err(last_error)
    }
}

/// Top-left corner of the start room
pub fn start_position(width: i32, height: i32) -> (i32, i32) {
    ((width / 2).min(width - ROOM_SIZE), (height / 2).min(height - ROOM_SIZE))
}

fn build_floor(
    options: &GenerationOptions,
    seed: &str,
    theme: &dyn Theme,
    content: &dyn ContentSource,
) -> Result<Dungeon, GenerationError> {
    let mut dungeon = Dungeon::empty(
        options.width,
        options.height,
        options.room_count,
        options.level,
        seed,
    );

    let start = dungeon.allocate_id();
    let (sx, sy) = start_position(options.width, options.height);
    let room = Room::new(start, sx, sy, ROOM_SIZE, theme, &mut dungeon.rng);
    dungeon.insert_room(room);
    dungeon.current_room = start;

    while dungeon.len() < options.room_count {
        place_room(&mut dungeon, theme, options.max_placement_attempts)?;
    }
    tracing::debug!(rooms = dungeon.len(), "rooms placed");

    let closed = close_connectivity(&mut dungeon)?;
    let extra = add_extra_connections(&mut dungeon, options.extra_connections);
    tracing::debug!(closed, extra, "connections finalized");

    assign_room_types(&mut dungeon);
    force_boss(&mut dungeon)?;
    verify(&dungeon)?;

    dungeon.discover(start, content);
    Ok(dungeon)
}

/// Place one more room next to some existing room
///
/// Random parents are tried first; if they all fail every room is scanned
/// in id order before giving up.
fn place_room(
    dungeon: &mut Dungeon,
    theme: &dyn Theme,
    max_attempts: usize,
) -> Result<RoomId, GenerationError> {
    let ids = dungeon.ids();

    for _ in 0..max_attempts {
        let parent = ids[dungeon.rng.random_int(0, ids.len() as i32) as usize];
        if let Some(id) = grow_from(dungeon, parent, theme) {
            return Ok(id);
        }
    }

    for &parent in &ids {
        if let Some(id) = grow_from(dungeon, parent, theme) {
            tracing::debug!(parent = parent.0, "placed by exhaustive scan");
            return Ok(id);
        }
    }

    Err(GenerationError::PlacementExhausted {
        room: dungeon.next_id,
        attempts: max_attempts,
    })
}

/// Try the four sides of `parent` in random order
fn grow_from(dungeon: &mut Dungeon, parent: RoomId, theme: &dyn Theme) -> Option<RoomId> {
    let (px, py) = {
        let room = dungeon.room(parent)?;
        (room.x, room.y)
    };
    let mut directions = Direction::ALL;
    dungeon.rng.shuffle(&mut directions);

    let direction = directions.into_iter().find(|&dir| {
        let (dx, dy) = dir.delta();
        let (x, y) = (px + dx * ROOM_SPACING, py + dy * ROOM_SPACING);
        dungeon.in_bounds(x, y, ROOM_SIZE)
            && dungeon.footprint_clear(x, y, ROOM_SIZE, OVERLAP_BUFFER)
            && dungeon.room(parent).is_some_and(|r| r.has_free_side(dir))
    })?;

    let (dx, dy) = direction.delta();
    let id = dungeon.allocate_id();
    let room = Room::new(
        id,
        px + dx * ROOM_SPACING,
        py + dy * ROOM_SPACING,
        ROOM_SIZE,
        theme,
        &mut dungeon.rng,
    );
    dungeon.insert_room(room);
    dungeon.connect(parent, direction, id);
    Some(id)
}

/// Classify every room except the start room, in id order
fn assign_room_types(dungeon: &mut Dungeon) {
    let Dungeon {
        rooms, rng, tally, ..
    } = dungeon;
    for room in rooms.values_mut().filter(|r| r.id != RoomId(0)) {
        room.room_type = classify::classify(tally, rng);
    }
}

/// Make the room farthest from the start the boss room
///
/// Ties go to the lowest id.
fn force_boss(dungeon: &mut Dungeon) -> Result<RoomId, GenerationError> {
    if let Some(&boss) = dungeon.boss_rooms().first() {
        return Ok(boss);
    }
    let start = dungeon.room(RoomId(0)).ok_or(GenerationError::MissingBoss)?;
    let boss = dungeon
        .rooms
        .values()
        .max_by_key(|room| (room.distance_to(start), Reverse(room.id)))
        .map(|room| room.id)
        .ok_or(GenerationError::MissingBoss)?;

    let room = dungeon.room_mut(boss).ok_or(GenerationError::MissingBoss)?;
    let was_combat = room.room_type == RoomType::Combat;
    room.room_type = RoomType::Boss;
    room.content_generated = false;
    if was_combat {
        dungeon.tally.combat = dungeon.tally.combat.saturating_sub(1);
    }
    tracing::debug!(room = boss.0, "boss room forced");
    Ok(boss)
}

fn verify(dungeon: &Dungeon) -> Result<(), GenerationError> {
    if dungeon.boss_rooms().len() != 1 {
        return Err(GenerationError::MissingBoss);
    }
    let reachable = dungeon.reachable_from(RoomId(0)).len();
    if reachable != dungeon.len() {
        return Err(GenerationError::Disconnected {
            unreachable: dungeon.len() - reachable,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{BuiltinContent, FloorTheme};

    fn generate(seed: &str, rooms: usize) -> Dungeon {
        let theme = FloorTheme::for_level(1);
        Dungeon::generate(&GenerationOptions::seeded(seed, rooms), &theme, &BuiltinContent)
            .unwrap()
    }

    #[test]
    fn test_start_room_at_center() {
        let dungeon = generate("center", 15);
        let start = dungeon.room(RoomId(0)).unwrap();
        assert_eq!((start.x, start.y), (25, 25));
        assert!(start.discovered);
        assert_eq!(start.room_type, RoomType::None);
        assert_eq!(dungeon.current_room, RoomId(0));
    }

    #[test]
    fn test_start_position_clamps() {
        assert_eq!(start_position(50, 50), (25, 25));
        assert_eq!(start_position(5, 8), (0, 3));
    }

    #[test]
    fn test_exact_room_count_and_ids() {
        let dungeon = generate("count", 15);
        assert_eq!(dungeon.len(), 15);
        assert_eq!(dungeon.ids(), (0..15).map(RoomId).collect::<Vec<_>>());
    }

    #[test]
    fn test_single_boss_far_from_start() {
        let dungeon = generate("boss", 15);
        let bosses = dungeon.boss_rooms();
        assert_eq!(bosses.len(), 1);
        let start = dungeon.room(RoomId(0)).unwrap();
        let boss = dungeon.room(bosses[0]).unwrap();
        let farthest = dungeon
            .rooms
            .values()
            .map(|r| r.distance_to(start))
            .max()
            .unwrap();
        assert_eq!(boss.distance_to(start), farthest);
    }

    #[test]
    fn test_only_start_room_has_content() {
        let dungeon = generate("lazy", 10);
        for room in dungeon.rooms.values() {
            assert_eq!(room.content_generated, room.id == RoomId(0));
        }
    }

    #[test]
    fn test_single_room_floor() {
        let dungeon = generate("solo", 1);
        assert_eq!(dungeon.len(), 1);
        assert_eq!(dungeon.boss_rooms(), vec![RoomId(0)]);
    }

    #[test]
    fn test_invalid_options_fail_fast() {
        let theme = FloorTheme::for_level(1);
        let mut options = GenerationOptions::seeded("bad", 0);
        assert!(matches!(
            Dungeon::generate(&options, &theme, &BuiltinContent),
            Err(GenerationError::InvalidOptions(_))
        ));
        options.room_count = 5;
        options.width = 3;
        assert!(matches!(
            Dungeon::generate(&options, &theme, &BuiltinContent),
            Err(GenerationError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_full_grid_reports_exhaustion() {
        let theme = FloorTheme::for_level(1);
        let mut options = GenerationOptions::seeded("tight", 3);
        options.width = 12;
        options.height = 5;
        assert!(matches!(
            Dungeon::generate(&options, &theme, &BuiltinContent),
            Err(GenerationError::PlacementExhausted { .. })
        ));
    }
}

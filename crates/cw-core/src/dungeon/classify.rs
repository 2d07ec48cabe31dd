//! Room content classification
//!
//! Types are assigned to every room while the floor is built so the boss
//! room can be guaranteed. Payloads and feature items are only generated
//! the first time a room is discovered.

use serde::{Deserialize, Serialize};

use crate::consts::{COMBAT_QUOTA, MAX_DIFFICULTY};
use crate::content::{ContentSource, Item};
use crate::rng::GameRng;

use super::room::{Room, RoomContent, RoomType};

/// Weighted buckets for rooms not forced by the combat quota
pub const TYPE_WEIGHTS: [(RoomType, f64); 4] = [
    (RoomType::Combat, 0.60),
    (RoomType::Puzzle, 0.15),
    (RoomType::Treasure, 0.10),
    (RoomType::Trap, 0.15),
];

/// Feature keyword to catalogue item
pub const FEATURE_KEYWORDS: &[(&str, &str)] = &[
    ("mirror that only shows", "mirror"),
    ("table perpetually set", "table"),
    ("clock whose hands", "clock"),
    ("window that always shows", "window"),
    ("portraits where everyone", "portraits"),
    ("flowers that never", "flowers"),
    ("music box playing", "music box"),
    ("rocking chair gently", "rocking chair"),
    ("child's toy that winds", "toy"),
    ("bookshelf where", "bookshelf"),
    ("fireplace with eternal", "fireplace"),
    ("chess game frozen", "chess set"),
    ("chess set mid-game", "chess set"),
    ("tea set that stays", "tea set"),
    ("crystal chandelier casting", "chandelier"),
    ("piano that plays", "piano"),
    ("tapestry showing scenes", "tapestry"),
    ("fountain whose water", "fountain"),
    ("kaleidoscope showing", "kaleidoscope"),
    ("snow globe containing", "snow globe"),
    ("hourglass where sand", "hourglass"),
    ("sundial casting shadows", "sundial"),
    ("shattered crystals", "rage shard"),
];

/// Running combat tally across one floor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierTally {
    pub combat: usize,
    pub classified: usize,
}

impl ClassifierTally {
    /// Whether the next room must be combat to keep the quota
    pub fn combat_forced(&self) -> bool {
        (self.combat as f64) < COMBAT_QUOTA * (self.classified + 1) as f64
    }

    pub fn record(&mut self, room_type: RoomType) {
        self.classified += 1;
        if room_type == RoomType::Combat {
            self.combat += 1;
        }
    }
}

/// Content tier for a floor: `min(5, ceil(level / 2))`
pub fn difficulty_for_level(level: u32) -> u32 {
    level.div_ceil(2).clamp(1, MAX_DIFFICULTY)
}

/// Map a roll in `[0, 1)` onto the weight table
pub fn type_for_roll(roll: f64) -> RoomType {
    let mut acc = 0.0;
    for (room_type, weight) in TYPE_WEIGHTS {
        acc += weight;
        if roll < acc {
            return room_type;
        }
    }
    TYPE_WEIGHTS[TYPE_WEIGHTS.len() - 1].0
}

/// Pick the next room's type, drawing a roll only when the quota allows it
pub fn classify(tally: &mut ClassifierTally, rng: &mut GameRng) -> RoomType {
    let room_type = if tally.combat_forced() {
        RoomType::Combat
    } else {
        type_for_roll(rng.random())
    };
    tally.record(room_type);
    room_type
}

/// Item for a feature line, if any keyword matches
pub fn extract_item(feature: &str) -> Option<Item> {
    let lower = feature.to_lowercase();
    FEATURE_KEYWORDS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, key)| Item::from_catalogue(key, feature))
}

/// Generate a room's payload and feature items
///
/// Does nothing once content has been generated.
pub fn populate(room: &mut Room, level: u32, content: &dyn ContentSource, rng: &mut GameRng) {
    if room.content_generated {
        return;
    }
    let difficulty = difficulty_for_level(level);

    room.items = room.features.iter().filter_map(|f| extract_item(f)).collect();
    room.content = match room.room_type {
        RoomType::None => RoomContent::None,
        RoomType::Combat => RoomContent::Enemy(content.random_enemy(rng, difficulty)),
        RoomType::Boss => RoomContent::Enemy(content.boss_for_level(level)),
        RoomType::Puzzle => RoomContent::Puzzle(content.random_puzzle(rng, difficulty)),
        RoomType::Treasure => RoomContent::Treasure(content.random_treasure(rng, difficulty)),
        RoomType::Trap => RoomContent::Trap(content.random_trap(rng, difficulty)),
    };
    room.content_generated = true;
    room.refresh_description();

    tracing::debug!(room = room.id.0, room_type = %room.room_type, items = room.items.len(), "room content generated");
}

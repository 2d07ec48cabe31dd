//! Id-indexed floor snapshots
//!
//! A snapshot stores each room as a flat record with connections keyed by
//! target id. Restoring regenerates the floor from its options and overlays
//! the saved records, so a damaged or partial save still yields a playable,
//! connected floor. Every repair is reported as a [`Recovery`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use cw_core::content::{ContentSource, FloorTheme, Item};
use cw_core::dungeon::{
    ClassifierTally, ConnectionState, Direction, Dungeon, Room, RoomContent, RoomId, RoomType,
    close_connectivity,
};
use cw_core::{GameRng, GenerationError, GenerationOptions};

/// One saved doorway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub target: RoomId,
    pub direction: Direction,
    #[serde(default)]
    pub state: ConnectionState,
}

fn default_true() -> bool {
    true
}

/// One saved room; geometry and flavor may be missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub id: RoomId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atmosphere: Option<String>,
    #[serde(default)]
    pub ambience: Option<String>,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_description: Option<String>,

    #[serde(default)]
    pub connections: Vec<LinkRecord>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub features: Vec<String>,

    #[serde(default)]
    pub discovered: bool,
    #[serde(default)]
    pub content_generated: bool,
    #[serde(default)]
    pub cleared: bool,
    #[serde(default)]
    pub known_exit: bool,
    #[serde(default)]
    pub room_type: RoomType,
    #[serde(default)]
    pub content: RoomContent,
    #[serde(default)]
    pub enemy_aware: bool,
    #[serde(default)]
    pub player_aware: bool,
    #[serde(default)]
    pub entered_from: Option<Direction>,
    #[serde(default = "default_true")]
    pub first_examine: bool,
}

impl RoomRecord {
    pub fn from_room(room: &Room) -> Self {
        Self {
            id: room.id,
            x: Some(room.x),
            y: Some(room.y),
            width: Some(room.width),
            height: Some(room.height),
            size: Some(room.size.clone()),
            atmosphere: Some(room.atmosphere.clone()),
            ambience: room.ambience.clone(),
            event: room.event.clone(),
            base_description: Some(room.base_description.clone()),
            connections: room
                .connections
                .iter()
                .map(|c| LinkRecord {
                    target: c.target,
                    direction: c.direction,
                    state: c.state,
                })
                .collect(),
            items: room.items.clone(),
            features: room.features.clone(),
            discovered: room.discovered,
            content_generated: room.content_generated,
            cleared: room.cleared,
            known_exit: room.known_exit,
            room_type: room.room_type,
            content: room.content.clone(),
            enemy_aware: room.enemy_aware,
            player_aware: room.player_aware,
            entered_from: room.entered_from,
            first_examine: room.first_examine,
        }
    }

    fn has_geometry(&self) -> bool {
        self.x.is_some() && self.y.is_some() && self.width.is_some() && self.height.is_some()
    }

    /// Apply this record on top of a freshly generated room
    fn overlay(self, fresh: Room) -> (Room, bool) {
        let filled = !self.has_geometry();
        let mut room = Room {
            id: self.id,
            x: self.x.unwrap_or(fresh.x),
            y: self.y.unwrap_or(fresh.y),
            width: self.width.unwrap_or(fresh.width),
            height: self.height.unwrap_or(fresh.height),
            size: self.size.unwrap_or(fresh.size),
            atmosphere: self.atmosphere.unwrap_or(fresh.atmosphere),
            ambience: self.ambience.or(fresh.ambience),
            event: self.event.or(fresh.event),
            base_description: self.base_description.unwrap_or(fresh.base_description),
            description: String::new(),
            connections: Vec::new(),
            items: self.items,
            features: self.features,
            discovered: self.discovered,
            content_generated: self.content_generated,
            cleared: self.cleared,
            known_exit: self.known_exit,
            room_type: self.room_type,
            content: self.content,
            enemy_aware: self.enemy_aware,
            player_aware: self.player_aware,
            entered_from: self.entered_from,
            first_examine: self.first_examine,
        };
        room.refresh_description();
        (room, filled)
    }

    /// Build a room that the fresh floor does not know about
    fn into_room(self) -> Option<Room> {
        let (x, y, width, height) = (self.x?, self.y?, self.width?, self.height?);
        let size = self.size.unwrap_or_else(|| "quiet".to_string());
        let atmosphere = self.atmosphere.unwrap_or_else(|| "forgotten".to_string());
        let base_description = self
            .base_description
            .unwrap_or_else(|| format!("You're in a {size} {atmosphere} chamber."));
        let mut room = Room {
            id: self.id,
            x,
            y,
            width,
            height,
            size,
            atmosphere,
            ambience: self.ambience,
            event: self.event,
            base_description,
            description: String::new(),
            connections: Vec::new(),
            items: self.items,
            features: self.features,
            discovered: self.discovered,
            content_generated: self.content_generated,
            cleared: self.cleared,
            known_exit: self.known_exit,
            room_type: self.room_type,
            content: self.content,
            enemy_aware: self.enemy_aware,
            player_aware: self.player_aware,
            entered_from: self.entered_from,
            first_examine: self.first_examine,
        };
        room.refresh_description();
        Some(room)
    }
}

/// A repair made while restoring a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// Missing geometry was taken from the regenerated room
    GeometryFilled { room: RoomId },
    /// A record for an unknown id lacked geometry and was discarded
    DroppedRecord { room: RoomId },
    /// A second record for the same id was ignored
    DuplicateRecord { room: RoomId },
    /// No record existed, so the regenerated room was used
    RoomRegenerated { room: RoomId },
    /// A room for an unknown id sat on top of another room and was discarded
    OverlappingRecord { room: RoomId },
    /// A room for an unknown id could not be reached and was discarded
    UnreachableRecord { room: RoomId },
    /// A link pointed at an unknown room or a taken side
    DroppedLink { from: RoomId, to: RoomId },
    /// New corridors were dug to join rooms the saved links left apart
    Reconnected { links: usize },
    /// The saved current room did not exist
    CurrentRoomReset { was: RoomId },
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recovery::GeometryFilled { room } => {
                write!(f, "room {room} had no geometry; regenerated layout used")
            }
            Recovery::DroppedRecord { room } => {
                write!(f, "room {room} is unknown and incomplete; dropped")
            }
            Recovery::DuplicateRecord { room } => {
                write!(f, "room {room} was saved twice; later copy ignored")
            }
            Recovery::RoomRegenerated { room } => {
                write!(f, "room {room} was missing; regenerated")
            }
            Recovery::OverlappingRecord { room } => {
                write!(f, "room {room} overlaps another room; dropped")
            }
            Recovery::UnreachableRecord { room } => {
                write!(f, "room {room} could not be reached; dropped")
            }
            Recovery::DroppedLink { from, to } => {
                write!(f, "link {from} -> {to} could not be restored")
            }
            Recovery::Reconnected { links } => {
                write!(f, "{links} corridor(s) added to reconnect the floor")
            }
            Recovery::CurrentRoomReset { was } => {
                write!(f, "current room {was} does not exist; returned to the start")
            }
        }
    }
}

/// Saved floor: options, stream position and the room table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DungeonSnapshot {
    pub options: GenerationOptions,
    pub seed: String,
    pub rng: GameRng,
    pub current_room: RoomId,
    #[serde(default)]
    pub next_id: u32,
    #[serde(default)]
    pub tally: ClassifierTally,
    pub rooms: Vec<RoomRecord>,
}

impl DungeonSnapshot {
    /// Capture a floor; `options` are what it was generated with
    pub fn capture(dungeon: &Dungeon, options: &GenerationOptions) -> Self {
        let mut options = options.clone();
        options.seed = Some(dungeon.seed.clone());
        options.level = dungeon.level;
        options.room_count = dungeon.room_count;
        options.width = dungeon.width;
        options.height = dungeon.height;
        Self {
            options,
            seed: dungeon.seed.clone(),
            rng: dungeon.rng.clone(),
            current_room: dungeon.current_room,
            next_id: dungeon.next_id,
            tally: dungeon.tally,
            rooms: dungeon.rooms.values().map(RoomRecord::from_room).collect(),
        }
    }

    /// Rebuild the floor, repairing whatever the records leave out
    pub fn restore(
        self,
        content: &dyn ContentSource,
    ) -> Result<(Dungeon, Vec<Recovery>), GenerationError> {
        let theme = FloorTheme::for_level(self.options.level);
        let mut fresh = Dungeon::generate(&self.options, &theme, content)?;
        let mut recoveries = Vec::new();

        let mut rooms: BTreeMap<RoomId, Room> = BTreeMap::new();
        let mut links: Vec<(RoomId, LinkRecord)> = Vec::new();
        let mut foreign: Vec<RoomId> = Vec::new();

        for record in self.rooms {
            let id = record.id;
            if rooms.contains_key(&id) {
                recoveries.push(Recovery::DuplicateRecord { room: id });
                continue;
            }
            let record_links: Vec<LinkRecord> = record.connections.clone();
            let room = match fresh.rooms.remove(&id) {
                Some(fresh_room) => {
                    let (room, filled) = record.overlay(fresh_room);
                    if filled {
                        recoveries.push(Recovery::GeometryFilled { room: id });
                    }
                    room
                }
                None => match record.into_room() {
                    Some(room) => {
                        foreign.push(id);
                        room
                    }
                    None => {
                        recoveries.push(Recovery::DroppedRecord { room: id });
                        continue;
                    }
                },
            };
            links.extend(record_links.into_iter().map(|link| (id, link)));
            rooms.insert(id, room);
        }

        for (id, mut room) in std::mem::take(&mut fresh.rooms) {
            recoveries.push(Recovery::RoomRegenerated { room: id });
            links.extend(room.connections.drain(..).map(|c| {
                (
                    id,
                    LinkRecord {
                        target: c.target,
                        direction: c.direction,
                        state: c.state,
                    },
                )
            }));
            rooms.insert(id, room);
        }

        foreign.retain(|id| {
            let clash = rooms.get(id).is_some_and(|room| {
                rooms.values().any(|other| other.id != *id && room.overlaps(other, 0))
            });
            if clash {
                rooms.remove(id);
                recoveries.push(Recovery::OverlappingRecord { room: *id });
            }
            !clash
        });

        let mut dungeon = fresh;
        dungeon.rooms = rooms;
        dungeon.rng = self.rng;
        dungeon.tally = self.tally;
        dungeon.seed = self.seed;
        let max_id = dungeon.rooms.keys().next_back().map_or(0, |id| id.0 + 1);
        dungeon.next_id = self.next_id.max(max_id);

        relink(&mut dungeon, links, &mut recoveries);
        reconnect(&mut dungeon, &foreign, &mut recoveries)?;

        dungeon.current_room = self.current_room;
        if dungeon.room(self.current_room).is_none() {
            recoveries.push(Recovery::CurrentRoomReset {
                was: self.current_room,
            });
            dungeon.current_room = RoomId(0);
        }

        for recovery in &recoveries {
            tracing::warn!(%recovery, "save repaired");
        }
        Ok((dungeon, recoveries))
    }
}

/// Re-create connections by id, keeping them symmetric
fn relink(dungeon: &mut Dungeon, links: Vec<(RoomId, LinkRecord)>, recoveries: &mut Vec<Recovery>) {
    for (from, link) in links {
        let to = link.target;
        let mirrored = dungeon
            .room(from)
            .and_then(|room| room.connection(link.direction))
            .is_some_and(|c| c.target == to);
        if mirrored {
            continue;
        }
        if !dungeon.connect(from, link.direction, to) {
            recoveries.push(Recovery::DroppedLink { from, to });
            continue;
        }
        for (id, direction) in [(from, link.direction), (to, link.direction.opposite())] {
            if let Some(connection) = dungeon
                .room_mut(id)
                .and_then(|room| room.connections.iter_mut().find(|c| c.direction == direction))
            {
                connection.state = link.state;
            }
        }
    }
}

/// Join whatever the saved links left stranded; unknown rooms that cannot
/// be joined are dropped
fn reconnect(
    dungeon: &mut Dungeon,
    foreign: &[RoomId],
    recoveries: &mut Vec<Recovery>,
) -> Result<(), GenerationError> {
    let links = match close_connectivity(dungeon) {
        Ok(links) => links,
        Err(err) => {
            let reachable = dungeon.reachable_from(RoomId(0));
            let stranded: Vec<RoomId> = foreign
                .iter()
                .copied()
                .filter(|id| !reachable.contains(id))
                .collect();
            if stranded.is_empty() {
                return Err(err);
            }
            for id in stranded {
                dungeon.rooms.remove(&id);
                for room in dungeon.rooms.values_mut() {
                    room.connections.retain(|c| c.target != id);
                }
                recoveries.push(Recovery::UnreachableRecord { room: id });
            }
            close_connectivity(dungeon)?
        }
    };
    if links > 0 {
        recoveries.push(Recovery::Reconnected { links });
    }
    Ok(())
}

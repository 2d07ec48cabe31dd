//! End-to-end room and session scenarios

use std::collections::BTreeSet;

use cw_core::combat::{AmbushState, CombatEncounter, CombatResult};
use cw_core::content::{BuiltinContent, Enemy, FloorTheme};
use cw_core::dungeon::{
    DisarmMethod, Direction, Dungeon, Room, RoomContent, RoomId, RoomType, Trap,
};
use cw_core::{Command, CommandResult, GameRng, GameSession, GenerationOptions, Player};

fn victory(encounter: &CombatEncounter) -> CombatResult {
    CombatResult::Victory {
        is_boss: encounter.enemy.is_boss,
        experience: encounter.enemy.experience,
        fragments: 1,
    }
}

/// Move one step, clearing whatever stands in the way
fn step(session: &mut GameSession, direction: Direction, target: RoomId) {
    for _ in 0..3 {
        match session.execute(Command::Move(direction)) {
            CommandResult::Encounter(encounter) => {
                session.resolve_combat(victory(&encounter)).unwrap();
            }
            CommandResult::TrapTriggered(_) => {
                session.execute(Command::Disarm {
                    method: DisarmMethod::Careful,
                    result: Some("success".to_string()),
                });
            }
            CommandResult::PlayerDied(cause) => panic!("player died: {cause}"),
            CommandResult::Continue | CommandResult::FloorComplete => {}
        }
        if session.dungeon.current_room == target {
            return;
        }
    }
    panic!("could not reach {target} going {direction}");
}

fn walk(session: &mut GameSession, at: RoomId, visited: &mut BTreeSet<RoomId>) {
    visited.insert(at);
    if let CommandResult::Encounter(encounter) = session.execute(Command::Fight) {
        session.resolve_combat(victory(&encounter)).unwrap();
    }
    let exits: Vec<(Direction, RoomId)> = session
        .dungeon
        .room(at)
        .unwrap()
        .connections
        .iter()
        .map(|c| (c.direction, c.target))
        .collect();
    for (direction, target) in exits {
        if visited.contains(&target) {
            continue;
        }
        step(session, direction, target);
        walk(session, target, visited);
        step(session, direction.opposite(), at);
    }
}

#[test]
fn seed_abc_floor_can_be_fully_explored() {
    let mut session =
        GameSession::start(GenerationOptions::seeded("abc", 15), Box::new(BuiltinContent))
            .unwrap();

    let start = session.dungeon.room(RoomId(0)).unwrap();
    assert_eq!((start.x, start.y), (25, 25));
    assert!(start.discovered);
    assert_eq!(session.dungeon.len(), 15);
    assert_eq!(session.dungeon.boss_rooms().len(), 1);

    let mut visited = BTreeSet::new();
    walk(&mut session, RoomId(0), &mut visited);

    assert_eq!(visited.len(), 15);
    assert!(session.dungeon.rooms.values().all(|r| r.discovered));
    assert!(session.dungeon.rooms.values().all(|r| r.content_generated));
    assert!(session.floor_complete);
    assert!(session.player.is_alive());
}

#[test]
fn discovery_is_idempotent() {
    let theme = FloorTheme::for_level(1);
    let mut dungeon =
        Dungeon::generate(&GenerationOptions::seeded("idem", 8), &theme, &BuiltinContent)
            .unwrap();
    let id = RoomId(3);

    assert!(dungeon.discover(id, &BuiltinContent));
    let before = dungeon.room(id).unwrap().clone();
    assert!(!dungeon.discover(id, &BuiltinContent));
    assert_eq!(dungeon.room(id).unwrap(), &before);
}

fn room_with(content: RoomContent, room_type: RoomType) -> (Room, GameRng) {
    let theme = FloorTheme::for_level(1);
    let mut rng = GameRng::new("scenario");
    let mut room = Room::new(RoomId(4), 7, 7, 5, &theme, &mut rng);
    room.room_type = room_type;
    room.content = content;
    room.content_generated = true;
    (room, rng)
}

#[test]
fn sneaking_back_out_the_way_you_came() {
    let enemy = Enemy::new("Lost Echo", "It repeats your footsteps.", 25, 4, 1, 15);
    let (mut room, mut rng) = room_with(RoomContent::Enemy(enemy), RoomType::Combat);

    room.record_entry(Direction::South, &mut rng);
    assert_eq!(room.entered_from, Some(Direction::South));
    assert!(!room.enemy_aware);

    assert!(room.can_sneak_past(Direction::North));
    assert!(!room.can_sneak_past(Direction::East));
    assert!(room.encounter(Some(Direction::North)).is_none());

    let encounter = room.encounter(Some(Direction::East)).unwrap();
    assert_ne!(encounter.ambush, AmbushState::Enemy);
}

#[test]
fn failed_disarm_springs_trap_exactly_once() {
    let trap = Trap {
        name: "Collapsing Arch".to_string(),
        description: "Cracks spider across the ceiling.".to_string(),
        trigger_message: "Stone rains down!".to_string(),
        damage: 40,
        difficulty: 4,
        method: DisarmMethod::Strength,
        pattern: None,
        fragments: 60,
    };
    let (mut room, mut rng) = room_with(RoomContent::Trap(trap), RoomType::Trap);
    let mut player = Player::default();

    let trigger = room.handle_trap_trigger().unwrap();
    assert_eq!(trigger.method, DisarmMethod::Strength);

    let report = room
        .attempt_disarm_trap(DisarmMethod::Strength, Some("failure"), &mut player, &mut rng)
        .unwrap();
    assert!(!report.success);
    assert_eq!(report.damage, 40);
    assert_eq!(player.health, 10);
    assert!(room.trap().is_none());

    assert!(room.handle_trap_trigger().is_none());
    assert!(room
        .attempt_disarm_trap(DisarmMethod::Strength, Some("failure"), &mut player, &mut rng)
        .is_err());
    assert_eq!(player.health, 10);
}

#[test]
fn descending_builds_the_next_floor_from_a_derived_seed() {
    let mut session =
        GameSession::start(GenerationOptions::seeded("deep", 6), Box::new(BuiltinContent))
            .unwrap();
    let level = session.descend().unwrap();
    assert_eq!(level, 2);
    assert_eq!(session.dungeon.seed, "deep/2");
    assert_eq!(session.dungeon.len(), 6);

    let theme = FloorTheme::for_level(2);
    let mut options = GenerationOptions::seeded("deep/2", 6);
    options.level = 2;
    let direct = Dungeon::generate(&options, &theme, &BuiltinContent).unwrap();
    let positions = |d: &Dungeon| d.rooms.values().map(|r| (r.x, r.y)).collect::<Vec<_>>();
    assert_eq!(positions(&session.dungeon), positions(&direct));
}

//! Combat handoff
//!
//! A room hands out a [`CombatEncounter`] and later receives exactly one
//! [`CombatResult`]. [`auto_resolve`] and [`attempt_flee`] are a simple dice
//! exchange for front ends that do not run their own fights.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::content::Enemy;
use crate::dungeon::RoomId;
use crate::player::Player;
use crate::rng::GameRng;

/// Rounds before an undecided fight breaks off
const MAX_ROUNDS: usize = 100;

/// Who gets the first strike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum AmbushState {
    /// The player noticed the enemy first
    Player,
    /// The enemy noticed the player first
    Enemy,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatEncounter {
    pub room: RoomId,
    pub enemy: Enemy,
    pub ambush: AmbushState,
}

/// How a fight ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatResult {
    Victory {
        is_boss: bool,
        experience: u32,
        fragments: u32,
    },
    /// The player escaped; the enemy keeps the health it had left
    Fled { enemy_health: i32 },
    Defeat,
}

/// Outcome of an automatic exchange plus its play-by-play
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skirmish {
    /// `None` while the fight is still on
    pub result: Option<CombatResult>,
    pub log: Vec<String>,
}

/// Whether a blow lands (80%)
fn hits(rng: &mut GameRng) -> bool {
    rng.rn2(20) >= 4
}

/// Damage of one blow: attack plus d4, less defense, at least 1
fn blow(attack: i32, defense: i32, rng: &mut GameRng) -> i32 {
    (attack + rng.rn2(4) as i32 + 1 - defense).max(1)
}

fn player_turn(player: &Player, enemy: &mut Enemy, rng: &mut GameRng, log: &mut Vec<String>) {
    if hits(rng) {
        let damage = blow(player.attack, enemy.defense, rng);
        enemy.take_damage(damage);
        log.push(format!("You hit the {} for {damage}.", enemy.name));
    } else {
        log.push(format!("You miss the {}.", enemy.name));
    }
}

fn enemy_turn(player: &mut Player, enemy: &Enemy, rng: &mut GameRng, log: &mut Vec<String>) {
    if hits(rng) {
        let damage = blow(enemy.attack, player.defense, rng);
        player.take_damage(damage);
        log.push(format!("The {} hits you for {damage}.", enemy.name));
    } else {
        log.push(format!("The {} misses.", enemy.name));
    }
}

/// Fragments dropped by a defeated enemy
pub fn victory_fragments(enemy: &Enemy) -> u32 {
    if enemy.is_boss {
        enemy.experience
    } else {
        enemy.experience / 2
    }
}

/// Fight to the end, applying damage to the player as it happens
pub fn auto_resolve(encounter: &CombatEncounter, player: &mut Player, rng: &mut GameRng) -> Skirmish {
    let mut enemy = encounter.enemy.clone();
    let mut log = Vec::new();

    match encounter.ambush {
        AmbushState::Player => {
            log.push("You strike first from the shadows!".to_string());
            player_turn(player, &mut enemy, rng, &mut log);
        }
        AmbushState::Enemy => {
            log.push(format!("The {} catches you off guard!", enemy.name));
            enemy_turn(player, &enemy, rng, &mut log);
        }
        AmbushState::None => {}
    }

    for _ in 0..MAX_ROUNDS {
        if !player.is_alive() {
            return Skirmish {
                result: Some(CombatResult::Defeat),
                log,
            };
        }
        if !enemy.is_alive() {
            break;
        }
        player_turn(player, &mut enemy, rng, &mut log);
        if enemy.is_alive() {
            enemy_turn(player, &enemy, rng, &mut log);
        }
    }

    let result = if !player.is_alive() {
        CombatResult::Defeat
    } else if enemy.is_alive() {
        log.push(format!("You and the {} break apart, exhausted.", enemy.name));
        CombatResult::Fled {
            enemy_health: enemy.health,
        }
    } else {
        CombatResult::Victory {
            is_boss: enemy.is_boss,
            experience: enemy.experience,
            fragments: victory_fragments(&enemy),
        }
    };
    Skirmish {
        result: Some(result),
        log,
    }
}

/// Try to run; a failed attempt costs a free enemy blow
pub fn attempt_flee(encounter: &CombatEncounter, player: &mut Player, rng: &mut GameRng) -> Skirmish {
    let chance = match encounter.ambush {
        AmbushState::Player => 0.75,
        AmbushState::None => 0.5,
        AmbushState::Enemy => 0.25,
    };
    if rng.chance(chance) {
        return Skirmish {
            result: Some(CombatResult::Fled {
                enemy_health: encounter.enemy.health,
            }),
            log: vec!["You escape!".to_string()],
        };
    }

    let mut log = vec!["You fail to get away!".to_string()];
    let enemy = &encounter.enemy;
    let damage = blow(enemy.attack, player.defense, rng);
    player.take_damage(damage);
    log.push(format!("The {} hits you for {damage}.", enemy.name));
    Skirmish {
        result: (!player.is_alive()).then_some(CombatResult::Defeat),
        log,
    }
}

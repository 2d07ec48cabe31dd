//! Content pools
//!
//! Rooms request their payload through [`ContentSource`]. [`BuiltinContent`]
//! is the stock set of enemies, bosses, puzzles, treasures and traps.

use crate::dungeon::{DisarmMethod, Trap};
use crate::rng::GameRng;

use super::enemy::Enemy;
use super::puzzle::Puzzle;
use super::treasure::{Rarity, Treasure};

/// Payload provider; `difficulty` runs from 1 to 5
pub trait ContentSource {
    fn random_enemy(&self, rng: &mut GameRng, difficulty: u32) -> Enemy;
    fn boss_for_level(&self, level: u32) -> Enemy;
    fn random_puzzle(&self, rng: &mut GameRng, difficulty: u32) -> Puzzle;
    fn random_treasure(&self, rng: &mut GameRng, difficulty: u32) -> Treasure;
    fn random_trap(&self, rng: &mut GameRng, difficulty: u32) -> Trap;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinContent;

fn enemies() -> [Enemy; 3] {
    [
        Enemy::new(
            "Shadow Remnant",
            "A flickering silhouette that clings to the edges of the light.",
            30,
            5,
            2,
            20,
        ),
        Enemy::new(
            "Memory Fragment",
            "A jagged shard of recollection, sharp enough to cut.",
            20,
            8,
            1,
            15,
        ),
        Enemy::new(
            "Forgotten Echo",
            "A voice without a speaker, repeating words no one remembers.",
            40,
            4,
            3,
            25,
        ),
    ]
}

fn bosses() -> [Enemy; 5] {
    [
        Enemy::new(
            "The Eternal Mirror",
            "A reflection that refuses to show what is real",
            100,
            12,
            8,
            100,
        )
        .boss(),
        Enemy::new(
            "The Raging Flame",
            "A burning manifestation of uncontrolled fury",
            120,
            15,
            6,
            120,
        )
        .boss(),
        Enemy::new(
            "The Time Merchant",
            "A shadowy figure offering impossible deals",
            90,
            10,
            12,
            110,
        )
        .boss(),
        Enemy::new(
            "The Void Walker",
            "An all-consuming emptiness given form",
            110,
            8,
            15,
            130,
        )
        .boss(),
        Enemy::new(
            "Memory's Guardian",
            "A peaceful but resolute keeper of what was",
            150,
            14,
            10,
            150,
        )
        .boss(),
    ]
}

fn treasures() -> [Treasure; 9] {
    [
        Treasure::new(
            "antique_watch",
            "Antique Watch",
            "A pocket watch that seems to tick backwards. Perhaps time itself can be rewound...",
            Rarity::Legendary,
        ),
        Treasure::new(
            "broken_mirror",
            "Broken Mirror",
            "Even shattered, it reflects something more than reality...",
            Rarity::Rare,
        ),
        Treasure::new(
            "childs_locket",
            "Child's Locket",
            "A small golden locket containing a faded photograph. It fills you with determination.",
            Rarity::Rare,
        ),
        Treasure::new(
            "old_diary",
            "Old Diary",
            "Pages filled with familiar handwriting. Some entries seem to predict enemy actions.",
            Rarity::Uncommon,
        ),
        Treasure::new(
            "music_box",
            "Forgotten Music Box",
            "Its melody brings peace to troubled souls.",
            Rarity::Uncommon,
        ),
        Treasure::new(
            "crystal_of_memory",
            "Crystal of Memory",
            "A shimmering crystal that seems to contain fragments of memories.",
            Rarity::Rare,
        ),
        Treasure::new(
            "temporal_shard",
            "Temporal Shard",
            "A fragment of crystallized time, holding memories of what once was.",
            Rarity::Rare,
        ),
        Treasure::new(
            "forgotten_relic",
            "Forgotten Relic",
            "An ancient artifact of unknown origin, its purpose lost to time.",
            Rarity::Legendary,
        ),
        Treasure::new(
            "memory_vessel",
            "Memory Vessel",
            "A container that seems designed to hold memories themselves.",
            Rarity::Epic,
        ),
    ]
}

fn traps() -> Vec<Trap> {
    let trap = |name: &str,
                description: &str,
                trigger: &str,
                damage: i32,
                difficulty: u32,
                method: DisarmMethod,
                pattern: Option<&str>,
                fragments: u32| Trap {
        name: name.to_string(),
        description: description.to_string(),
        trigger_message: trigger.to_string(),
        damage,
        difficulty,
        method,
        pattern: pattern.map(str::to_string),
        fragments,
    };
    vec![
        trap(
            "Poison Dart",
            "Small holes line the walls.",
            "Poisoned darts shoot from the walls!",
            15,
            2,
            DisarmMethod::Timing,
            None,
            25,
        ),
        trap(
            "Spike Pit",
            "The floor looks unstable. Scratched into a flagstone: left right right left.",
            "The floor gives way to reveal deadly spikes!",
            20,
            2,
            DisarmMethod::Pattern,
            Some("left right right left"),
            30,
        ),
        trap(
            "Memory Surge",
            "Crackling energy fills the room, threatening to overload your mind...",
            "The surge tears through your thoughts!",
            10,
            2,
            DisarmMethod::Timing,
            None,
            50,
        ),
        trap(
            "Rune Seal",
            "Glowing runes pulse with dangerous energy: sun, moon, star. Trace them from last to first.",
            "The runes flare with destructive energy!",
            25,
            3,
            DisarmMethod::Pattern,
            Some("star moon sun"),
            40,
        ),
        trap(
            "Collapsing Arch",
            "A cracked archway groans under an impossible weight.",
            "The arch crashes down around you!",
            30,
            4,
            DisarmMethod::Strength,
            None,
            60,
        ),
        trap(
            "Recursive Loop",
            "The room seems to fold in on itself, threatening to trap you in an endless cycle...",
            "The loop drags you through the same moment again and again!",
            35,
            4,
            DisarmMethod::Careful,
            None,
            100,
        ),
    ]
}

impl ContentSource for BuiltinContent {
    fn random_enemy(&self, rng: &mut GameRng, _difficulty: u32) -> Enemy {
        let pool = enemies();
        let idx = rng.random_int(0, pool.len() as i32) as usize;
        pool[idx].clone()
    }

    fn boss_for_level(&self, level: u32) -> Enemy {
        let pool = bosses();
        let idx = (level.max(1) as usize - 1).min(pool.len() - 1);
        pool[idx].clone()
    }

    fn random_puzzle(&self, rng: &mut GameRng, difficulty: u32) -> Puzzle {
        // Memory match is the only tier-1 puzzle; higher tiers draw from the rest
        if difficulty <= 1 {
            return Puzzle::memory_match(rng);
        }
        match rng.random_int(0, 2) {
            0 => Puzzle::time_riddle(rng),
            _ => Puzzle::mirror_sequence(rng),
        }
    }

    fn random_treasure(&self, rng: &mut GameRng, _difficulty: u32) -> Treasure {
        let rarity = Rarity::from_roll(rng.random());
        let pool = treasures();
        let matching: Vec<&Treasure> = pool.iter().filter(|t| t.rarity == rarity).collect();
        if matching.is_empty() {
            let idx = rng.random_int(0, pool.len() as i32) as usize;
            pool[idx].clone()
        } else {
            let idx = rng.random_int(0, matching.len() as i32) as usize;
            matching[idx].clone()
        }
    }

    fn random_trap(&self, rng: &mut GameRng, difficulty: u32) -> Trap {
        let mut pool = traps();
        pool.retain(|t| t.difficulty <= difficulty.max(1) + 1);
        let idx = rng.random_int(0, pool.len() as i32) as usize;
        pool.swap_remove(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boss_per_level() {
        let content = BuiltinContent;
        assert_eq!(content.boss_for_level(1).name, "The Eternal Mirror");
        assert_eq!(content.boss_for_level(5).name, "Memory's Guardian");
        assert_eq!(content.boss_for_level(12).name, "Memory's Guardian");
        assert_eq!(content.boss_for_level(0).name, "The Eternal Mirror");
        assert!(content.boss_for_level(3).is_boss);
    }

    #[test]
    fn test_trap_pool_respects_difficulty() {
        let content = BuiltinContent;
        let mut rng = GameRng::new("traps");
        for _ in 0..100 {
            let trap = content.random_trap(&mut rng, 1);
            assert!(trap.difficulty <= 2);
        }
    }

    #[test]
    fn test_pattern_traps_have_patterns() {
        for trap in traps() {
            assert_eq!(trap.method == DisarmMethod::Pattern, trap.pattern.is_some());
        }
    }

    #[test]
    fn test_treasure_always_found() {
        let content = BuiltinContent;
        let mut rng = GameRng::new("loot");
        for _ in 0..100 {
            let t = content.random_treasure(&mut rng, 1);
            assert!(t.fragments > 0);
        }
    }

    #[test]
    fn test_enemies_are_not_bosses() {
        let content = BuiltinContent;
        let mut rng = GameRng::new("foes");
        for _ in 0..20 {
            let e = content.random_enemy(&mut rng, 1);
            assert!(!e.is_boss);
            assert_eq!(e.health, e.max_health);
        }
    }
}

//! Enemies and floor bosses

use serde::{Deserialize, Serialize};

/// A hostile creature occupying a combat or boss room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub name: String,
    pub description: String,
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    pub experience: u32,
    pub is_boss: bool,
}

impl Enemy {
    pub fn new(
        name: &str,
        description: &str,
        health: i32,
        attack: i32,
        defense: i32,
        experience: u32,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            health,
            max_health: health,
            attack,
            defense,
            experience,
            is_boss: false,
        }
    }

    pub fn boss(mut self) -> Self {
        self.is_boss = true;
        self
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply damage, never dropping below zero
    pub fn take_damage(&mut self, amount: i32) {
        self.health = (self.health - amount.max(0)).max(0);
    }

    pub fn matches(&self, target: &str) -> bool {
        let target = target.trim();
        !target.is_empty()
            && (self.name.eq_ignore_ascii_case(target) || target.eq_ignore_ascii_case("enemy"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_damage_floors_at_zero() {
        let mut enemy = Enemy::new("Shadow Remnant", "", 30, 5, 2, 20);
        enemy.take_damage(12);
        assert_eq!(enemy.health, 18);
        assert!(enemy.is_alive());
        enemy.take_damage(100);
        assert_eq!(enemy.health, 0);
        assert!(!enemy.is_alive());
        assert_eq!(enemy.max_health, 30);
    }

    #[test]
    fn test_matches() {
        let enemy = Enemy::new("Forgotten Echo", "", 40, 4, 3, 25);
        assert!(enemy.matches("forgotten echo"));
        assert!(enemy.matches("enemy"));
        assert!(!enemy.matches("echo"));
    }
}

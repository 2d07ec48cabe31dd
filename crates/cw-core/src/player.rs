//! The player as seen by room logic

use serde::{Deserialize, Serialize};

use crate::content::Item;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    /// Memory fragments, the run currency
    pub fragments: u32,
    pub experience: u32,
    /// Purchased trap-disarm upgrade level
    pub disarm_level: u32,
    pub inventory: Vec<Item>,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            health: 50,
            max_health: 50,
            attack: 5,
            defense: 2,
            fragments: 0,
            experience: 0,
            disarm_level: 0,
            inventory: Vec::new(),
        }
    }
}

impl Player {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply damage, never dropping below zero
    pub fn take_damage(&mut self, amount: i32) {
        self.health = (self.health - amount.max(0)).max(0);
    }

    pub fn add_fragments(&mut self, amount: u32) {
        self.fragments = self.fragments.saturating_add(amount);
    }
}

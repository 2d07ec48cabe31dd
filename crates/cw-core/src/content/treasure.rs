//! Treasures found in treasure rooms

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    /// Fragments a treasure of this rarity dissolves into
    pub fn fragment_value(self) -> u32 {
        match self {
            Rarity::Common => 10,
            Rarity::Uncommon => 20,
            Rarity::Rare => 35,
            Rarity::Epic => 50,
            Rarity::Legendary => 75,
        }
    }

    /// Roll a rarity: 60% common, 25% uncommon, 10% rare, 5% legendary
    pub fn from_roll(roll: f64) -> Self {
        if roll < 0.60 {
            Rarity::Common
        } else if roll < 0.85 {
            Rarity::Uncommon
        } else if roll < 0.95 {
            Rarity::Rare
        } else {
            Rarity::Legendary
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Treasure {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rarity: Rarity,
    pub fragments: u32,
}

impl Treasure {
    pub fn new(id: &str, name: &str, description: &str, rarity: Rarity) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            rarity,
            fragments: rarity.fragment_value(),
        }
    }

    pub fn matches(&self, target: &str) -> bool {
        let target = target.trim();
        !target.is_empty()
            && (self.name.eq_ignore_ascii_case(target)
                || self.id.eq_ignore_ascii_case(target)
                || target.eq_ignore_ascii_case("treasure"))
    }
}

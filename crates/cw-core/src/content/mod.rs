//! Room content: themes, items and payload pools

pub mod enemy;
pub mod items;
pub mod pools;
pub mod puzzle;
pub mod theme;
pub mod treasure;

pub use enemy::Enemy;
pub use items::{ExamineReward, Item, TakeReward};
pub use pools::{BuiltinContent, ContentSource};
pub use puzzle::{Puzzle, PuzzleKind, PuzzleOutcome};
pub use theme::{FloorTheme, Theme};
pub use treasure::{Rarity, Treasure};

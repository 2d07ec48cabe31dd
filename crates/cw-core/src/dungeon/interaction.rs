//! Room interaction state machine
//!
//! A room moves from undiscovered, through content generation on first
//! discovery, to either cleared or an active encounter. Trap and puzzle
//! sub-states live inside the room's payload.

use crate::combat::{AmbushState, CombatEncounter, CombatResult};
use crate::consts::PLAYER_NOTICE_CHANCE;
use crate::content::{ContentSource, Item, PuzzleOutcome};
use crate::error::{ActionError, ActionResult};
use crate::player::Player;
use crate::rng::GameRng;

use super::classify;
use super::direction::Direction;
use super::room::{Room, RoomContent, RoomType};
use super::trap::{DisarmMethod, DisarmReport, TrapTrigger};

/// Text and payout from examining something
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamineReport {
    pub text: String,
    pub fragments: u32,
}

/// Result of taking an item or the room's treasure
#[derive(Debug, Clone, PartialEq)]
pub struct TakeReport {
    pub message: String,
    pub fragments: u32,
    /// The item, when it should go to the player's inventory
    pub item: Option<Item>,
}

impl Room {
    /// Discover the room; only the first call has any effect
    ///
    /// The caller marks neighbors as known exits.
    pub fn discover(&mut self, level: u32, content: &dyn ContentSource, rng: &mut GameRng) -> bool {
        if self.discovered {
            return false;
        }
        self.discovered = true;
        classify::populate(self, level, content, rng);
        true
    }

    /// Note how the player came in and roll who noticed whom
    ///
    /// Only the first entry into a room with a live enemy counts.
    pub fn record_entry(&mut self, direction: Direction, rng: &mut GameRng) {
        if self.live_enemy().is_none() || self.entered_from.is_some() {
            return;
        }
        self.entered_from = Some(direction);
        self.player_aware = rng.chance(PLAYER_NOTICE_CHANCE);
        tracing::debug!(room = self.id.0, %direction, player_aware = self.player_aware, "entry recorded");
    }

    /// Ambush state, or `None` if there is no live enemy
    pub fn ambush_state(&self) -> Option<AmbushState> {
        self.live_enemy()?;
        Some(match (self.player_aware, self.enemy_aware) {
            (true, false) => AmbushState::Player,
            (false, true) => AmbushState::Enemy,
            _ => AmbushState::None,
        })
    }

    /// Whether the player may leave through `exit` without a fight
    pub fn can_sneak_past(&self, exit: Direction) -> bool {
        if self.live_enemy().is_none() {
            return true;
        }
        !self.enemy_aware && self.entered_from.map(Direction::opposite) == Some(exit)
    }

    /// Encounter to hand to the combat resolver
    ///
    /// With `exit` set, only when the player cannot slip out that way;
    /// without it, whenever a live enemy holds the room.
    pub fn encounter(&self, exit: Option<Direction>) -> Option<CombatEncounter> {
        if !matches!(self.room_type, RoomType::Combat | RoomType::Boss) {
            return None;
        }
        let enemy = self.live_enemy()?;
        if exit.is_some_and(|d| self.can_sneak_past(d)) {
            return None;
        }
        Some(CombatEncounter {
            room: self.id,
            enemy: enemy.clone(),
            ambush: self.ambush_state().unwrap_or(AmbushState::None),
        })
    }

    /// Apply the single outcome of a fight in this room
    pub fn on_combat_end(&mut self, result: &CombatResult) -> ActionResult<()> {
        if self.live_enemy().is_none() {
            return Err(ActionError::illegal("There is nothing to fight here."));
        }
        match *result {
            CombatResult::Victory { .. } => {
                self.cleared = true;
                self.content = RoomContent::None;
                self.enemy_aware = false;
            }
            CombatResult::Fled { enemy_health } => {
                if let RoomContent::Enemy(enemy) = &mut self.content {
                    enemy.health = enemy_health.clamp(1, enemy.max_health);
                }
                self.enemy_aware = true;
            }
            CombatResult::Defeat => {}
        }
        self.refresh_description();
        Ok(())
    }

    /// Trigger event for an armed trap
    pub fn handle_trap_trigger(&self) -> Option<TrapTrigger> {
        self.trap().map(|trap| trap.trigger())
    }

    /// Try to disarm the trap; a failure springs it
    pub fn attempt_disarm_trap(
        &mut self,
        method: DisarmMethod,
        result: Option<&str>,
        player: &mut Player,
        rng: &mut GameRng,
    ) -> ActionResult<DisarmReport> {
        let Some(trap) = self.trap() else {
            return Err(ActionError::illegal("There is no trap here to disarm."));
        };

        if !trap.disarm_succeeds(method, result, player.disarm_level, rng) {
            let mut report = self.spring_trap(player)?;
            report.message = format!("Your attempt fails!\n{}", report.message);
            return Ok(report);
        }

        let report = DisarmReport {
            success: true,
            damage: 0,
            fragments: trap.fragments,
            message: format!(
                "You disarm the {}. It dissolves into {} memory fragments.",
                trap.name, trap.fragments
            ),
        };
        player.add_fragments(report.fragments);
        self.content = RoomContent::None;
        self.cleared = true;
        self.refresh_description();
        Ok(report)
    }

    /// Apply the trap's damage once and remove it
    pub fn spring_trap(&mut self, player: &mut Player) -> ActionResult<DisarmReport> {
        let trap = match std::mem::take(&mut self.content) {
            RoomContent::Trap(trap) => trap,
            other => {
                self.content = other;
                return Err(ActionError::illegal("There is no trap here."));
            }
        };
        player.take_damage(trap.damage);
        self.cleared = true;
        self.refresh_description();
        tracing::debug!(room = self.id.0, damage = trap.damage, "trap sprung");
        Ok(DisarmReport {
            success: false,
            damage: trap.damage,
            fragments: 0,
            message: format!(
                "{}\nYou take {} damage.",
                trap.trigger_message, trap.damage
            ),
        })
    }

    /// Submit an answer to the room's puzzle
    pub fn solve_puzzle(&mut self, answer: &str, player: &mut Player) -> ActionResult<PuzzleOutcome> {
        let RoomContent::Puzzle(puzzle) = &mut self.content else {
            return Err(ActionError::illegal("There is no puzzle here."));
        };
        let outcome = puzzle.check_solution(answer)?;
        player.take_damage(outcome.damage());
        if let PuzzleOutcome::Solved { reward } = outcome {
            player.add_fragments(reward);
            self.cleared = true;
        }
        self.refresh_description();
        Ok(outcome)
    }

    pub fn puzzle_hint(&self) -> ActionResult<String> {
        match self.puzzle() {
            Some(puzzle) if puzzle.is_active() => Ok(puzzle.hint()),
            Some(_) => Err(ActionError::illegal("The puzzle no longer needs solving.")),
            None => Err(ActionError::illegal("There is no puzzle here.")),
        }
    }

    /// Examine something in the room
    pub fn examine(&mut self, target: &str, rng: &mut GameRng) -> ActionResult<ExamineReport> {
        let target = target.trim();
        let plain = |text: String| ExamineReport { text, fragments: 0 };

        if target.is_empty() || target.eq_ignore_ascii_case("room") {
            return Ok(plain(self.full_description()));
        }
        if target.eq_ignore_ascii_case("puzzle") {
            return match self.puzzle() {
                Some(puzzle) => Ok(plain(puzzle.description())),
                None => Err(ActionError::illegal("There is no puzzle here.")),
            };
        }
        if target.eq_ignore_ascii_case("trap") {
            return match self.trap() {
                Some(trap) => Ok(plain(format!(
                    "{}: {}\nIt looks like it could be disarmed ({}).",
                    trap.name, trap.description, trap.method
                ))),
                None => Err(ActionError::illegal("There is no trap here.")),
            };
        }
        if let Some(enemy) = self.live_enemy().filter(|e| e.matches(target)) {
            return Ok(plain(format!(
                "{}: {} ({}/{} health)",
                enemy.name, enemy.description, enemy.health, enemy.max_health
            )));
        }
        if let Some(treasure) = self.treasure().filter(|t| t.matches(target)) {
            return Ok(plain(format!(
                "{} ({}): {}",
                treasure.name, treasure.rarity, treasure.description
            )));
        }

        if let Some(idx) = self.items.iter().position(|item| item.matches(target)) {
            return Ok(self.examine_item(idx, rng));
        }

        let lower = target.to_lowercase();
        if let Some(feature) = self
            .features
            .iter()
            .find(|f| f.to_lowercase().contains(&lower))
        {
            return Ok(plain(feature.clone()));
        }

        Err(ActionError::invalid_target(format!(
            "There is no {target} here."
        )))
    }

    fn examine_item(&mut self, idx: usize, rng: &mut GameRng) -> ExamineReport {
        let item = &self.items[idx];
        let mut text = item.examine.clone();
        let mut fragments = 0;

        if let Some(reward) = &item.on_examine {
            let roll = if self.first_examine { 0.0 } else { rng.random() };
            self.first_examine = false;
            if roll < reward.chance {
                let span = (reward.max.saturating_sub(reward.min) + 1) as f64;
                fragments = reward.min + (rng.random() * span).floor() as u32;
                text.push('\n');
                text.push_str(&reward.message);
                text.push_str(&format!("\nYou gain {fragments} memory fragments."));
            }
        }

        ExamineReport { text, fragments }
    }

    /// Take an item or the room's treasure
    pub fn take_item(&mut self, target: &str) -> ActionResult<TakeReport> {
        let target = target.trim();
        if target.is_empty() {
            return Err(ActionError::invalid_target("What do you want to take?"));
        }

        if let Some(idx) = self.items.iter().position(|item| item.matches(target)) {
            if !self.items[idx].can_take {
                return Err(ActionError::illegal(format!(
                    "You cannot take the {}.",
                    self.items[idx].name
                )));
            }
            let item = self.items.remove(idx);
            self.features.retain(|f| *f != item.feature);
            self.refresh_description();

            let (message, fragments) = match &item.on_take {
                Some(reward) => (
                    format!(
                        "{}\nThe {} dissolves into {} memory fragments as you grasp it...",
                        reward.message, item.name, reward.fragments
                    ),
                    reward.fragments,
                ),
                None => (format!("You take the {}.", item.name), 0),
            };
            return Ok(TakeReport {
                message,
                fragments,
                item: Some(item),
            });
        }

        if self.treasure().is_some_and(|t| t.matches(target)) {
            if let RoomContent::Treasure(treasure) = std::mem::take(&mut self.content) {
                self.cleared = true;
                self.refresh_description();
                return Ok(TakeReport {
                    message: format!(
                        "You take the {}. It dissolves into {} memory fragments.",
                        treasure.name, treasure.fragments
                    ),
                    fragments: treasure.fragments,
                    item: None,
                });
            }
        }

        Err(ActionError::invalid_target("You can't take that."))
    }

    /// Use an item that is still in the room
    pub fn use_item(&self, target: &str) -> ActionResult<String> {
        let target = target.trim();
        if target.is_empty() {
            return Err(ActionError::invalid_target("What do you want to use?"));
        }
        match self.items.iter().find(|item| item.matches(target)) {
            Some(item) => item
                .use_text
                .clone()
                .ok_or_else(|| ActionError::illegal("Nothing happens.")),
            None => Err(ActionError::invalid_target(format!(
                "There is no {target} here to use."
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{BuiltinContent, Enemy, FloorTheme, Puzzle, Rarity, Treasure};
    use crate::dungeon::room::RoomId;
    use crate::dungeon::trap::Trap;

    fn bare_room() -> (Room, GameRng) {
        let theme = FloorTheme::for_level(1);
        let mut rng = GameRng::new("interaction");
        let room = Room::new(RoomId(1), 0, 0, 5, &theme, &mut rng);
        (room, rng)
    }

    fn combat_room() -> (Room, GameRng) {
        let (mut room, rng) = bare_room();
        room.room_type = RoomType::Combat;
        room.content = RoomContent::Enemy(Enemy::new("Shadow Remnant", "", 30, 5, 2, 20));
        room.content_generated = true;
        room.discovered = true;
        (room, rng)
    }

    fn trap_room(damage: i32) -> (Room, GameRng) {
        let (mut room, rng) = bare_room();
        room.room_type = RoomType::Trap;
        room.content = RoomContent::Trap(Trap {
            name: "Rune Seal".to_string(),
            description: "Glowing runes pulse.".to_string(),
            trigger_message: "The runes flare!".to_string(),
            damage,
            difficulty: 3,
            method: DisarmMethod::Timing,
            pattern: None,
            fragments: 40,
        });
        room.content_generated = true;
        (room, rng)
    }

    #[test]
    fn test_discover_is_idempotent() {
        let (mut room, mut rng) = bare_room();
        room.room_type = RoomType::Treasure;
        assert!(room.discover(1, &BuiltinContent, &mut rng));
        let snapshot = (room.items.clone(), room.features.clone(), room.description.clone());
        let content = room.content.clone();
        assert!(!room.discover(1, &BuiltinContent, &mut rng));
        assert_eq!(
            (room.items.clone(), room.features.clone(), room.description.clone()),
            snapshot
        );
        assert_eq!(room.content, content);
    }

    #[test]
    fn test_record_entry_only_once() {
        let (mut room, mut rng) = combat_room();
        room.record_entry(Direction::South, &mut rng);
        room.record_entry(Direction::East, &mut rng);
        assert_eq!(room.entered_from, Some(Direction::South));
    }

    #[test]
    fn test_record_entry_ignored_without_enemy() {
        let (mut room, mut rng) = bare_room();
        room.record_entry(Direction::North, &mut rng);
        assert_eq!(room.entered_from, None);
        assert!(room.ambush_state().is_none());
    }

    #[test]
    fn test_sneak_back_the_way_you_came() {
        let (mut room, _) = combat_room();
        room.entered_from = Some(Direction::South);
        room.enemy_aware = false;
        assert!(room.can_sneak_past(Direction::North));
        assert!(!room.can_sneak_past(Direction::East));
        assert!(!room.can_sneak_past(Direction::South));

        room.enemy_aware = true;
        assert!(!room.can_sneak_past(Direction::North));
    }

    #[test]
    fn test_sneak_free_when_cleared() {
        let (mut room, _) = combat_room();
        room.entered_from = Some(Direction::South);
        room.cleared = true;
        assert!(room.can_sneak_past(Direction::East));
    }

    #[test]
    fn test_ambush_states() {
        let (mut room, _) = combat_room();
        room.player_aware = true;
        assert_eq!(room.ambush_state(), Some(AmbushState::Player));
        room.enemy_aware = true;
        assert_eq!(room.ambush_state(), Some(AmbushState::None));
        room.player_aware = false;
        assert_eq!(room.ambush_state(), Some(AmbushState::Enemy));
    }

    #[test]
    fn test_encounter_and_victory() {
        let (mut room, _) = combat_room();
        room.entered_from = Some(Direction::South);
        assert!(room.encounter(Some(Direction::North)).is_none());
        let encounter = room.encounter(Some(Direction::East)).unwrap();
        assert_eq!(encounter.enemy.name, "Shadow Remnant");
        assert_eq!(encounter.room, RoomId(1));

        room.on_combat_end(&CombatResult::Victory {
            is_boss: false,
            experience: 20,
            fragments: 10,
        })
        .unwrap();
        assert!(room.cleared);
        assert!(room.live_enemy().is_none());
        assert!(room.encounter(None).is_none());
        assert!(room.on_combat_end(&CombatResult::Defeat).is_err());
    }

    #[test]
    fn test_flee_preserves_enemy_health() {
        let (mut room, _) = combat_room();
        room.on_combat_end(&CombatResult::Fled { enemy_health: 12 })
            .unwrap();
        assert_eq!(room.live_enemy().map(|e| e.health), Some(12));
        assert!(room.enemy_aware);
        assert!(!room.cleared);
    }

    #[test]
    fn test_failure_token_springs_trap_once() {
        let (mut room, mut rng) = trap_room(40);
        let mut player = Player::default();
        assert!(room.handle_trap_trigger().is_some());

        let report = room
            .attempt_disarm_trap(DisarmMethod::Timing, Some("failure"), &mut player, &mut rng)
            .unwrap();
        assert!(!report.success);
        assert_eq!(report.damage, 40);
        assert_eq!(player.health, 10);
        assert!(room.trap().is_none());
        assert!(room.handle_trap_trigger().is_none());
        assert!(room.spring_trap(&mut player).is_err());
        assert_eq!(player.health, 10);
    }

    #[test]
    fn test_success_token_disarms() {
        let (mut room, mut rng) = trap_room(40);
        let mut player = Player::default();
        let report = room
            .attempt_disarm_trap(DisarmMethod::Careful, Some("success"), &mut player, &mut rng)
            .unwrap();
        assert!(report.success);
        assert_eq!(player.fragments, 40);
        assert_eq!(player.health, 50);
        assert!(room.cleared);
        assert!(!room.description.contains("trap lies in wait"));
    }

    #[test]
    fn test_puzzle_routing() {
        let (mut room, mut rng) = bare_room();
        let mut player = Player::default();
        assert!(matches!(
            room.solve_puzzle("x", &mut player),
            Err(ActionError::IllegalAction(_))
        ));

        let mut puzzle = Puzzle::time_riddle(&mut rng);
        puzzle.solution = "3:00".to_string();
        room.room_type = RoomType::Puzzle;
        room.content = RoomContent::Puzzle(puzzle);

        assert!(room.puzzle_hint().is_ok());
        let outcome = room.solve_puzzle("2:00", &mut player).unwrap();
        assert_eq!(outcome.damage(), 10);
        assert_eq!(player.health, 40);

        let outcome = room.solve_puzzle("3:00", &mut player).unwrap();
        assert_eq!(outcome, PuzzleOutcome::Solved { reward: 15 });
        assert_eq!(player.fragments, 15);
        assert!(room.cleared);
        assert!(room.puzzle_hint().is_err());
        assert!(room.examine("puzzle", &mut rng).is_ok());
    }

    #[test]
    fn test_take_feature_item() {
        let (mut room, _) = bare_room();
        room.features = vec![
            "A clock whose hands never move.".to_string(),
            "A mirror that only shows happy memories.".to_string(),
            "A cabinet of curiosities that rearranges itself.".to_string(),
        ];
        room.items = room
            .features
            .iter()
            .filter_map(|f| classify::extract_item(f))
            .collect();
        room.refresh_description();

        let report = room.take_item("Clock").unwrap();
        assert_eq!(report.fragments, 20);
        assert_eq!(report.item.map(|i| i.name), Some("clock".to_string()));
        assert_eq!(room.items.len(), 1);
        assert_eq!(room.features.len(), 2);
        assert!(!room.description.contains("clock whose hands"));

        assert!(matches!(
            room.take_item("mirror"),
            Err(ActionError::IllegalAction(_))
        ));
        assert!(matches!(
            room.take_item("clock"),
            Err(ActionError::InvalidTarget(_))
        ));
        assert!(matches!(
            room.take_item(""),
            Err(ActionError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_first_examine_always_pays() {
        let (mut room, mut rng) = bare_room();
        room.items = vec![Item::from_catalogue(
            "mirror",
            "A mirror that only shows happy memories.",
        )];
        let report = room.examine("reflection", &mut rng).unwrap();
        assert!((2..=5).contains(&report.fragments));
        assert!(!room.first_examine);
    }

    #[test]
    fn test_take_treasure_clears_room() {
        let (mut room, _) = bare_room();
        room.room_type = RoomType::Treasure;
        room.content = RoomContent::Treasure(Treasure::new(
            "temporal_shard",
            "Temporal Shard",
            "A fragment of crystallized time.",
            Rarity::Rare,
        ));
        let report = room.take_item("temporal shard").unwrap();
        assert_eq!(report.fragments, 35);
        assert!(report.item.is_none());
        assert!(room.cleared);
        assert!(room.treasure().is_none());
    }

    #[test]
    fn test_examine_and_use_unknown() {
        let (mut room, mut rng) = bare_room();
        room.items.clear();
        room.features.clear();
        assert!(matches!(
            room.examine("unicorn", &mut rng),
            Err(ActionError::InvalidTarget(_))
        ));
        assert!(matches!(
            room.examine("trap", &mut rng),
            Err(ActionError::IllegalAction(_))
        ));
        assert!(matches!(
            room.use_item("unicorn"),
            Err(ActionError::InvalidTarget(_))
        ));
        room.items = vec![Item::from_catalogue("music box", "A music box playing a familiar lullaby.")];
        assert!(room.use_item("music box").is_ok());
        room.items = vec![Item::from_catalogue("table", "A table perpetually set for dinner guests.")];
        assert!(matches!(
            room.use_item("table"),
            Err(ActionError::IllegalAction(_))
        ));
    }
}

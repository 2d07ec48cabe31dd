//! Game session
//!
//! Owns one floor, the player and the content provider, and turns player
//! commands into room interactions. Combat and trap resolution are modal:
//! while one is pending the session only accepts the command that resolves
//! it.

use crate::combat::{CombatEncounter, CombatResult};
use crate::consts::MAX_FLOOR;
use crate::content::{ContentSource, FloorTheme};
use crate::dungeon::{
    ConnectionState, DisarmMethod, Direction, Dungeon, Room, RoomId, TrapTrigger,
};
use crate::error::{ActionError, ActionResult, GenerationError};
use crate::options::GenerationOptions;
use crate::player::Player;
use crate::rng::GameRng;

/// Player command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Look,
    Take(String),
    Examine(String),
    Use(String),
    Solve(String),
    Hint,
    /// Disarm the pending trap; `result` may carry an outcome token
    Disarm {
        method: DisarmMethod,
        result: Option<String>,
    },
    Fight,
}

/// Result of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    /// A fight must be resolved through [`GameSession::resolve_combat`]
    Encounter(CombatEncounter),
    /// A trap must be disarmed or will spring on the next command
    TrapTriggered(TrapTrigger),
    /// The floor's boss is dead
    FloorComplete,
    PlayerDied(String),
}

/// Pending sub-interaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Modal {
    #[default]
    None,
    Combat(CombatEncounter),
    Trap(TrapTrigger),
}

pub struct GameSession {
    pub dungeon: Dungeon,
    pub player: Player,
    pub options: GenerationOptions,
    content: Box<dyn ContentSource>,
    pub modal: Modal,
    pub previous_room: Option<RoomId>,
    pub floor_complete: bool,

    /// Messages since the last [`clear_messages`](Self::clear_messages)
    pub messages: Vec<String>,
    pub message_history: Vec<String>,
}

impl GameSession {
    /// Generate the first floor and start a new run
    pub fn start(
        options: GenerationOptions,
        content: Box<dyn ContentSource>,
    ) -> Result<Self, GenerationError> {
        let theme = FloorTheme::for_level(options.level);
        let dungeon = Dungeon::generate(&options, &theme, content.as_ref())?;
        let mut session = Self::resume(dungeon, Player::default(), options, content);
        session.announce_floor();
        Ok(session)
    }

    /// Continue a run from an existing floor and player
    ///
    /// A trap left armed in the current room is pending again.
    pub fn resume(
        dungeon: Dungeon,
        player: Player,
        options: GenerationOptions,
        content: Box<dyn ContentSource>,
    ) -> Self {
        let modal = match dungeon.current().and_then(|room| room.handle_trap_trigger()) {
            Some(trigger) => Modal::Trap(trigger),
            None => Modal::None,
        };
        let bosses = dungeon.boss_rooms();
        let floor_complete = !bosses.is_empty()
            && bosses.iter().all(|&id| {
                dungeon
                    .room(id)
                    .is_some_and(|room| room.content_generated && room.live_enemy().is_none())
            });
        Self {
            dungeon,
            player,
            options,
            content,
            modal,
            previous_room: None,
            floor_complete,
            messages: Vec::new(),
            message_history: Vec::new(),
        }
    }

    /// Add a message to display
    pub fn message(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        self.messages.push(msg.clone());
        self.message_history.push(msg);
    }

    pub fn clear_messages(&mut self) {
        self.messages.clear();
    }

    /// The floor's shared random stream
    pub fn rng(&mut self) -> &mut GameRng {
        &mut self.dungeon.rng
    }

    pub fn level(&self) -> u32 {
        self.dungeon.level
    }

    /// Whether this is the last floor of the run
    pub fn is_final_floor(&self) -> bool {
        self.dungeon.level >= MAX_FLOOR
    }

    /// Execute a command, reporting refusals as messages
    pub fn execute(&mut self, command: Command) -> CommandResult {
        match self.try_execute(command) {
            Ok(result) => result,
            Err(err) => {
                self.message(err.to_string());
                CommandResult::Continue
            }
        }
    }

    /// Execute a command, returning refusals as errors
    pub fn try_execute(&mut self, command: Command) -> ActionResult<CommandResult> {
        if !self.player.is_alive() {
            return Ok(CommandResult::PlayerDied("You have already fallen.".to_string()));
        }

        match std::mem::take(&mut self.modal) {
            Modal::None => {}
            Modal::Combat(encounter) => {
                self.modal = Modal::Combat(encounter.clone());
                return match command {
                    Command::Fight => Ok(CommandResult::Encounter(encounter)),
                    _ => Err(ActionError::illegal(format!(
                        "The {} will not let you do that!",
                        encounter.enemy.name
                    ))),
                };
            }
            Modal::Trap(trigger) => {
                if let Command::Disarm { method, result } = command {
                    return self.disarm(method, result.as_deref());
                }
                tracing::debug!(trap = %trigger.name, "trap abandoned");
                if let Some(died) = self.spring_current_trap()? {
                    return Ok(died);
                }
            }
        }

        match command {
            Command::Move(direction) => self.move_to(direction),
            Command::Look => {
                let text = self.current_room_text()?;
                self.message(text);
                Ok(CommandResult::Continue)
            }
            Command::Take(target) => self.take(&target),
            Command::Examine(target) => self.examine(&target),
            Command::Use(target) => self.use_item(&target),
            Command::Solve(answer) => self.solve(&answer),
            Command::Hint => {
                let hint = self.current_room()?.puzzle_hint()?;
                self.message(hint);
                Ok(CommandResult::Continue)
            }
            Command::Disarm { method, result } => self.disarm(method, result.as_deref()),
            Command::Fight => {
                let encounter = self
                    .current_room()?
                    .encounter(None)
                    .ok_or_else(|| ActionError::illegal("There is nothing to fight here."))?;
                Ok(self.open_combat(encounter))
            }
        }
    }

    /// Apply the single outcome of the pending fight
    pub fn resolve_combat(&mut self, result: CombatResult) -> ActionResult<CommandResult> {
        let Modal::Combat(encounter) = &self.modal else {
            return Err(ActionError::illegal("There is no fight to resolve."));
        };
        let name = encounter.enemy.name.clone();
        let room_id = encounter.room;

        self.dungeon
            .room_mut(room_id)
            .ok_or_else(|| ActionError::illegal("The fight has nowhere to happen."))?
            .on_combat_end(&result)?;
        self.modal = Modal::None;

        match result {
            CombatResult::Victory {
                is_boss,
                experience,
                fragments,
            } => {
                self.player.experience += experience;
                self.player.add_fragments(fragments);
                self.message(format!(
                    "The {name} shatters into light. You gain {experience} experience and {fragments} memory fragments."
                ));
                if is_boss {
                    self.floor_complete = true;
                    tracing::info!(level = self.dungeon.level, "floor complete");
                    self.message("The floor's guardian is gone. The way down lies open.");
                    return Ok(CommandResult::FloorComplete);
                }
                Ok(CommandResult::Continue)
            }
            CombatResult::Fled { .. } => {
                match self.previous_room {
                    Some(previous) if self.dungeon.room(previous).is_some() => {
                        self.dungeon.current_room = previous;
                        self.previous_room = Some(room_id);
                        self.message(format!("You flee from the {name}."));
                    }
                    _ => self.message(format!("You break away from the {name}.")),
                }
                Ok(CommandResult::Continue)
            }
            CombatResult::Defeat => {
                self.player.health = 0;
                tracing::info!(level = self.dungeon.level, enemy = %name, "player died");
                Ok(CommandResult::PlayerDied(format!("Defeated by the {name}.")))
            }
        }
    }

    /// Build the next floor, keeping the player
    pub fn descend(&mut self) -> Result<u32, GenerationError> {
        let next = self.dungeon.level + 1;
        let mut options = self.options.clone();
        options.level = next;
        options.seed = Some(format!("{}/{}", self.dungeon.seed, next));

        let theme = FloorTheme::for_level(next);
        self.dungeon = Dungeon::generate(&options, &theme, self.content.as_ref())?;
        self.options = options;
        self.modal = Modal::None;
        self.previous_room = None;
        self.floor_complete = false;
        self.announce_floor();
        Ok(next)
    }

    fn announce_floor(&mut self) {
        let theme = FloorTheme::for_level(self.dungeon.level);
        self.message(format!("Floor {}: {}", self.dungeon.level, theme.name));
        if let Ok(text) = self.current_room_text() {
            self.message(text);
        }
    }

    fn current_room(&self) -> ActionResult<&Room> {
        self.dungeon
            .current()
            .ok_or_else(|| ActionError::illegal("You are nowhere."))
    }

    fn current_room_text(&self) -> ActionResult<String> {
        Ok(self.current_room()?.full_description())
    }

    fn open_combat(&mut self, encounter: CombatEncounter) -> CommandResult {
        self.message(format!(
            "The {} confronts you! ({})",
            encounter.enemy.name, encounter.ambush
        ));
        self.modal = Modal::Combat(encounter.clone());
        CommandResult::Encounter(encounter)
    }

    fn death_check(&self, cause: &str) -> Option<CommandResult> {
        if self.player.is_alive() {
            None
        } else {
            tracing::info!(level = self.dungeon.level, cause, "player died");
            Some(CommandResult::PlayerDied(cause.to_string()))
        }
    }

    fn move_to(&mut self, direction: Direction) -> ActionResult<CommandResult> {
        let here = self.current_room()?;
        let connection = here.connection(direction).ok_or_else(|| {
            ActionError::invalid_target(format!("You can't go {direction} from here."))
        })?;
        match connection.state {
            ConnectionState::Open => {}
            ConnectionState::Locked => {
                return Err(ActionError::illegal(format!("The way {direction} is locked.")));
            }
            ConnectionState::Blocked => {
                return Err(ActionError::illegal(format!("The way {direction} is blocked.")));
            }
        }
        let target = connection.target;
        let from = here.id;

        if let Some(encounter) = here.encounter(Some(direction)) {
            return Ok(self.open_combat(encounter));
        }
        let slipped = here.live_enemy().map(|enemy| enemy.name.clone());
        if let Some(name) = slipped {
            self.message(format!("You slip past the {name} unnoticed."));
        }

        self.previous_room = Some(from);
        self.dungeon.current_room = target;
        let first_visit = self.dungeon.discover(target, self.content.as_ref());
        if let Some((room, rng)) = self.dungeon.room_and_rng(target) {
            room.record_entry(direction, rng);
        }
        tracing::debug!(from = from.0, to = target.0, %direction, "moved");

        let room = self.current_room()?;
        let mut text = room.full_description();
        if first_visit {
            if let Some(event) = &room.event {
                text.push_str("\n\n");
                text.push_str(event);
            }
        }
        let trigger = room.handle_trap_trigger();
        let encounter = if room.enemy_aware {
            room.encounter(None)
        } else {
            None
        };
        let sensed = room
            .live_enemy()
            .map(|enemy| (enemy.name.clone(), room.player_aware));
        self.message(text);

        if let Some(trigger) = trigger {
            self.message(format!("{}\n{}", trigger.name, trigger.description));
            self.modal = Modal::Trap(trigger.clone());
            return Ok(CommandResult::TrapTriggered(trigger));
        }
        if let Some(encounter) = encounter {
            return Ok(self.open_combat(encounter));
        }
        match sensed {
            Some((name, true)) => {
                self.message(format!("You spot the {name} before it notices you."))
            }
            Some((_, false)) => self.message("You sense a hidden presence..."),
            None => {}
        }
        Ok(CommandResult::Continue)
    }

    fn take(&mut self, target: &str) -> ActionResult<CommandResult> {
        let report = self
            .dungeon
            .current_mut()
            .ok_or_else(|| ActionError::illegal("You are nowhere."))?
            .take_item(target)?;
        self.player.add_fragments(report.fragments);
        if let Some(item) = report.item {
            self.player.inventory.push(item);
        }
        self.message(report.message);
        Ok(CommandResult::Continue)
    }

    fn examine(&mut self, target: &str) -> ActionResult<CommandResult> {
        let id = self.dungeon.current_room;
        let (room, rng) = self
            .dungeon
            .room_and_rng(id)
            .ok_or_else(|| ActionError::illegal("You are nowhere."))?;
        let report = room.examine(target, rng)?;
        self.player.add_fragments(report.fragments);
        self.message(report.text);
        Ok(CommandResult::Continue)
    }

    fn use_item(&mut self, target: &str) -> ActionResult<CommandResult> {
        let text = match self.current_room()?.use_item(target) {
            Err(ActionError::InvalidTarget(msg)) => self
                .player
                .inventory
                .iter()
                .find(|item| item.matches(target))
                .map(|item| {
                    item.use_text
                        .clone()
                        .ok_or_else(|| ActionError::illegal("Nothing happens."))
                })
                .unwrap_or(Err(ActionError::InvalidTarget(msg)))?,
            other => other?,
        };
        self.message(text);
        Ok(CommandResult::Continue)
    }

    fn solve(&mut self, answer: &str) -> ActionResult<CommandResult> {
        let id = self.dungeon.current_room;
        let room = self
            .dungeon
            .room_mut(id)
            .ok_or_else(|| ActionError::illegal("You are nowhere."))?;
        let outcome = room.solve_puzzle(answer, &mut self.player)?;
        self.message(outcome.message());
        Ok(self
            .death_check("Consumed by a collapsing puzzle.")
            .unwrap_or(CommandResult::Continue))
    }

    fn disarm(&mut self, method: DisarmMethod, result: Option<&str>) -> ActionResult<CommandResult> {
        let id = self.dungeon.current_room;
        let Dungeon { rooms, rng, .. } = &mut self.dungeon;
        let room = rooms
            .get_mut(&id)
            .ok_or_else(|| ActionError::illegal("You are nowhere."))?;
        let report = room.attempt_disarm_trap(method, result, &mut self.player, rng)?;
        self.modal = Modal::None;
        self.message(report.message);
        Ok(self
            .death_check("Caught by a trap.")
            .unwrap_or(CommandResult::Continue))
    }

    /// Spring the current room's trap; returns a death result if it killed
    fn spring_current_trap(&mut self) -> ActionResult<Option<CommandResult>> {
        let id = self.dungeon.current_room;
        let room = self
            .dungeon
            .room_mut(id)
            .ok_or_else(|| ActionError::illegal("You are nowhere."))?;
        let report = room.spring_trap(&mut self.player)?;
        self.message(report.message);
        Ok(self.death_check("Caught by a trap."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{BuiltinContent, Enemy};
    use crate::dungeon::{RoomContent, RoomType, Trap};

    /// Three rooms in a row: 0 - 1 - 2, with room 1 holding `content`
    fn corridor(room_type: RoomType, content: RoomContent) -> GameSession {
        let theme = FloorTheme::for_level(1);
        let mut dungeon = Dungeon::empty(50, 50, 3, 1, "session");
        for i in 0..3 {
            let id = dungeon.allocate_id();
            let room = Room::new(id, i * 7, 0, 5, &theme, &mut dungeon.rng);
            dungeon.insert_room(room);
        }
        dungeon.connect(RoomId(0), Direction::East, RoomId(1));
        dungeon.connect(RoomId(1), Direction::East, RoomId(2));
        for room in dungeon.rooms.values_mut() {
            room.content_generated = true;
        }
        if let Some(room) = dungeon.room_mut(RoomId(1)) {
            room.room_type = room_type;
            room.content = content;
        }
        dungeon.discover(RoomId(0), &BuiltinContent);
        GameSession::resume(
            dungeon,
            Player::default(),
            GenerationOptions::seeded("session", 3),
            Box::new(BuiltinContent),
        )
    }

    fn spike_trap(damage: i32) -> RoomContent {
        RoomContent::Trap(Trap {
            name: "Spike Pit".to_string(),
            description: "The floor looks unstable".to_string(),
            trigger_message: "Spikes!".to_string(),
            damage,
            difficulty: 2,
            method: DisarmMethod::Timing,
            pattern: None,
            fragments: 30,
        })
    }

    fn shade() -> RoomContent {
        RoomContent::Enemy(Enemy::new("Shade", "A flicker of dark.", 20, 4, 1, 15))
    }

    #[test]
    fn test_unknown_exit_is_invalid_target() {
        let mut session = corridor(RoomType::None, RoomContent::None);
        assert!(matches!(
            session.try_execute(Command::Move(Direction::North)),
            Err(ActionError::InvalidTarget(_))
        ));
        assert_eq!(
            session.execute(Command::Move(Direction::West)),
            CommandResult::Continue
        );
        assert!(!session.messages.is_empty());
    }

    #[test]
    fn test_locked_exit_is_illegal() {
        let mut session = corridor(RoomType::None, RoomContent::None);
        if let Some(room) = session.dungeon.room_mut(RoomId(0)) {
            room.connections[0].state = ConnectionState::Locked;
        }
        assert!(matches!(
            session.try_execute(Command::Move(Direction::East)),
            Err(ActionError::IllegalAction(_))
        ));
    }

    #[test]
    fn test_move_discovers_and_marks_exits() {
        let mut session = corridor(RoomType::None, RoomContent::None);
        session.execute(Command::Move(Direction::East));
        assert_eq!(session.dungeon.current_room, RoomId(1));
        assert!(session.dungeon.room(RoomId(1)).unwrap().discovered);
        assert!(session.dungeon.room(RoomId(2)).unwrap().known_exit);
        assert_eq!(session.previous_room, Some(RoomId(0)));
    }

    #[test]
    fn test_trap_modal_disarm_with_token() {
        let mut session = corridor(RoomType::Trap, spike_trap(40));
        let result = session.execute(Command::Move(Direction::East));
        assert!(matches!(result, CommandResult::TrapTriggered(_)));

        let result = session.execute(Command::Disarm {
            method: DisarmMethod::Timing,
            result: Some("failure".to_string()),
        });
        assert_eq!(result, CommandResult::Continue);
        assert_eq!(session.player.health, 10);
        assert_eq!(session.modal, Modal::None);
        assert!(session.dungeon.current().unwrap().trap().is_none());
    }

    #[test]
    fn test_abandoned_trap_springs_then_command_runs() {
        let mut session = corridor(RoomType::Trap, spike_trap(15));
        session.execute(Command::Move(Direction::East));
        let result = session.execute(Command::Move(Direction::East));
        assert_eq!(result, CommandResult::Continue);
        assert_eq!(session.player.health, 35);
        assert_eq!(session.dungeon.current_room, RoomId(2));
    }

    #[test]
    fn test_lethal_trap_ends_run() {
        let mut session = corridor(RoomType::Trap, spike_trap(80));
        session.execute(Command::Move(Direction::East));
        let result = session.execute(Command::Look);
        assert!(matches!(result, CommandResult::PlayerDied(_)));
        assert!(matches!(
            session.execute(Command::Look),
            CommandResult::PlayerDied(_)
        ));
    }

    #[test]
    fn test_combat_modal_blocks_other_commands() {
        let mut session = corridor(RoomType::Combat, shade());
        session.execute(Command::Move(Direction::East));
        let result = session.execute(Command::Fight);
        let CommandResult::Encounter(encounter) = result else {
            panic!("expected an encounter, got {result:?}");
        };
        assert_eq!(encounter.enemy.name, "Shade");
        assert!(matches!(
            session.try_execute(Command::Look),
            Err(ActionError::IllegalAction(_))
        ));

        let result = session
            .resolve_combat(CombatResult::Victory {
                is_boss: false,
                experience: 15,
                fragments: 5,
            })
            .unwrap();
        assert_eq!(result, CommandResult::Continue);
        assert_eq!(session.player.experience, 15);
        assert!(session.dungeon.current().unwrap().cleared);
        assert!(session.resolve_combat(CombatResult::Defeat).is_err());
    }

    #[test]
    fn test_sneak_back_out() {
        let mut session = corridor(RoomType::Combat, shade());
        session.execute(Command::Move(Direction::East));
        let room = session.dungeon.current().unwrap();
        assert_eq!(room.entered_from, Some(Direction::East));
        assert!(!room.enemy_aware);

        assert_eq!(
            session.execute(Command::Move(Direction::West)),
            CommandResult::Continue
        );
        assert_eq!(session.dungeon.current_room, RoomId(0));
    }

    #[test]
    fn test_blocked_exit_starts_combat_and_flee_returns() {
        let mut session = corridor(RoomType::Combat, shade());
        session.execute(Command::Move(Direction::East));
        let result = session.execute(Command::Move(Direction::East));
        assert!(matches!(result, CommandResult::Encounter(_)));
        assert_eq!(session.dungeon.current_room, RoomId(1));

        session
            .resolve_combat(CombatResult::Fled { enemy_health: 7 })
            .unwrap();
        assert_eq!(session.dungeon.current_room, RoomId(0));
        let room = session.dungeon.room(RoomId(1)).unwrap();
        assert_eq!(room.live_enemy().map(|e| e.health), Some(7));

        let result = session.execute(Command::Move(Direction::East));
        assert!(matches!(result, CommandResult::Encounter(_)));
    }

    #[test]
    fn test_boss_victory_completes_floor_and_descend() {
        let boss = RoomContent::Enemy(Enemy::new("Boss", "", 50, 8, 3, 100).boss());
        let mut session = corridor(RoomType::Boss, boss);
        session.execute(Command::Move(Direction::East));
        session.execute(Command::Fight);
        let result = session
            .resolve_combat(CombatResult::Victory {
                is_boss: true,
                experience: 100,
                fragments: 50,
            })
            .unwrap();
        assert_eq!(result, CommandResult::FloorComplete);
        assert!(session.floor_complete);

        let fragments = session.player.fragments;
        assert_eq!(session.descend().unwrap(), 2);
        assert_eq!(session.level(), 2);
        assert_eq!(session.dungeon.seed, "session/2");
        assert_eq!(session.player.fragments, fragments);
        assert!(!session.floor_complete);
    }

    #[test]
    fn test_defeat_ends_run() {
        let mut session = corridor(RoomType::Combat, shade());
        session.execute(Command::Move(Direction::East));
        session.execute(Command::Fight);
        let result = session.resolve_combat(CombatResult::Defeat).unwrap();
        assert!(matches!(result, CommandResult::PlayerDied(_)));
        assert!(!session.player.is_alive());
    }

    #[test]
    fn test_resume_restores_trap_modal() {
        let mut session = corridor(RoomType::Trap, spike_trap(10));
        session.dungeon.current_room = RoomId(1);
        let resumed = GameSession::resume(
            session.dungeon.clone(),
            session.player.clone(),
            session.options.clone(),
            Box::new(BuiltinContent),
        );
        assert!(matches!(resumed.modal, Modal::Trap(_)));
    }

    #[test]
    fn test_start_generates_floor() {
        let session =
            GameSession::start(GenerationOptions::seeded("start", 15), Box::new(BuiltinContent))
                .unwrap();
        assert_eq!(session.dungeon.len(), 15);
        assert_eq!(session.modal, Modal::None);
        assert!(!session.floor_complete);
        assert!(session.messages[0].starts_with("Floor 1"));
    }
}

//! `play` mode: a line-oriented game loop
//!
//! Fights are settled here with the dice exchange from `cw_core::combat`;
//! everything else is handed to the session as a [`Command`].

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use strum::IntoEnumIterator;

use cw_core::combat::{Skirmish, attempt_flee, auto_resolve};
use cw_core::content::BuiltinContent;
use cw_core::dungeon::{DisarmMethod, Direction};
use cw_core::{Command, CommandResult, GameSession, GenerationOptions, Modal};
use cw_save::{default_save_path, load_game, save_game};

const DEFAULT_SLOT: &str = "quicksave";

const HELP: &str = "\
Commands:
  go <north|south|east|west>   (or just n/s/e/w)
  look                         describe the room again
  examine [target]             look closer at the room, an item or a feature
  take <item>                  pick something up
  use <item>                   use something here or in your pack
  solve <answer>               answer the room's puzzle
  hint                         ask the puzzle for a hint
  disarm <method> [token]      disarm a trap (timing, strength, pattern, careful)
  fight / flee                 settle or escape a fight
  status                       health, fragments and pack
  save [slot] / load [slot]    keep or restore your progress
  quit";

/// One parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Command(Command),
    Flee,
    Status,
    Save(String),
    Load(String),
    Help,
    Quit,
}

enum Flow {
    Continue,
    End,
}

fn require(rest: &str, what: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("{what} what?"))
    } else {
        Ok(rest.to_string())
    }
}

fn parse(line: &str) -> Result<Action, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err(String::new());
    };
    let verb = verb.to_lowercase();
    let args: Vec<&str> = words.collect();
    let rest = args.join(" ");

    let action = match verb.as_str() {
        "go" | "move" | "walk" => {
            let direction = Direction::from_str(&rest)
                .map_err(|_| format!("'{rest}' is not a direction."))?;
            Action::Command(Command::Move(direction))
        }
        "look" | "l" => Action::Command(Command::Look),
        "examine" | "x" | "inspect" => {
            let target = if rest.is_empty() { "room".to_string() } else { rest };
            Action::Command(Command::Examine(target))
        }
        "take" | "get" => Action::Command(Command::Take(require(&rest, "Take")?)),
        "use" => Action::Command(Command::Use(require(&rest, "Use")?)),
        "solve" | "answer" => Action::Command(Command::Solve(require(&rest, "Solve")?)),
        "hint" => Action::Command(Command::Hint),
        "disarm" => {
            let method = args.first().ok_or_else(|| {
                let methods: Vec<String> = DisarmMethod::iter().map(|m| m.to_string()).collect();
                format!("Disarm how? ({})", methods.join(", "))
            })?;
            let method = DisarmMethod::from_str(method)
                .map_err(|_| format!("'{method}' is not a way to disarm anything."))?;
            Action::Command(Command::Disarm {
                method,
                result: (args.len() > 1).then(|| args[1..].join(" ")),
            })
        }
        "fight" | "attack" => Action::Command(Command::Fight),
        "flee" | "run" => Action::Flee,
        "status" | "stats" | "i" | "inventory" => Action::Status,
        "save" => Action::Save(if rest.is_empty() { DEFAULT_SLOT.to_string() } else { rest }),
        "load" => Action::Load(if rest.is_empty() { DEFAULT_SLOT.to_string() } else { rest }),
        "help" | "?" => Action::Help,
        "quit" | "q" | "exit" => Action::Quit,
        other => match Direction::from_str(other) {
            Ok(direction) if rest.is_empty() => Action::Command(Command::Move(direction)),
            _ => return Err(format!("I don't know how to '{other}'. Type 'help'.")),
        },
    };
    Ok(action)
}

fn flush_messages(session: &mut GameSession) {
    for msg in &session.messages {
        println!("{msg}");
    }
    session.clear_messages();
}

fn print_skirmish(skirmish: &Skirmish) {
    for line in &skirmish.log {
        println!("  {line}");
    }
}

fn print_status(session: &GameSession) {
    let player = &session.player;
    println!(
        "Floor {}  HP {}/{}  ATK {}  DEF {}  Fragments {}  XP {}",
        session.level(),
        player.health,
        player.max_health,
        player.attack,
        player.defense,
        player.fragments,
        player.experience,
    );
    if player.inventory.is_empty() {
        println!("Your pack is empty.");
    } else {
        let names: Vec<&str> = player.inventory.iter().map(|i| i.name.as_str()).collect();
        println!("You carry: {}", names.join(", "));
    }
}

/// Settle the pending fight, opening one first if `fight` was typed outside combat
fn fight(session: &mut GameSession) -> CommandResult {
    if !matches!(session.modal, Modal::Combat(_)) {
        let opened = session.execute(Command::Fight);
        flush_messages(session);
        if !matches!(opened, CommandResult::Encounter(_)) {
            return opened;
        }
    }
    let Modal::Combat(encounter) = session.modal.clone() else {
        return CommandResult::Continue;
    };
    let skirmish = auto_resolve(&encounter, &mut session.player, &mut session.dungeon.rng);
    print_skirmish(&skirmish);
    settle(session, skirmish)
}

fn flee(session: &mut GameSession) -> CommandResult {
    let Modal::Combat(encounter) = session.modal.clone() else {
        println!("There is nothing to flee from.");
        return CommandResult::Continue;
    };
    let skirmish = attempt_flee(&encounter, &mut session.player, &mut session.dungeon.rng);
    print_skirmish(&skirmish);
    settle(session, skirmish)
}

fn settle(session: &mut GameSession, skirmish: Skirmish) -> CommandResult {
    let Some(result) = skirmish.result else {
        return CommandResult::Continue;
    };
    match session.resolve_combat(result) {
        Ok(outcome) => outcome,
        Err(err) => {
            session.message(err.to_string());
            CommandResult::Continue
        }
    }
}

/// React to a command's outcome; floor changes happen here
fn handle(session: &mut GameSession, result: CommandResult) -> Result<Flow, Box<dyn Error>> {
    flush_messages(session);
    match result {
        CommandResult::Continue => {}
        CommandResult::Encounter(encounter) => {
            println!(
                "The {} ({} HP) blocks your way. Fight or flee?",
                encounter.enemy.name, encounter.enemy.health
            );
        }
        CommandResult::TrapTriggered(trigger) => {
            println!("{}", trigger.description);
            println!("Disarm it ({}), or anything else lets it spring.", trigger.method);
        }
        CommandResult::FloorComplete => {
            if session.is_final_floor() {
                println!(
                    "The last guardian falls. You leave the depths with {} memory fragments.",
                    session.player.fragments
                );
                tracing::info!(fragments = session.player.fragments, "run won");
                return Ok(Flow::End);
            }
            let level = session.descend()?;
            tracing::info!(level, "descended");
            flush_messages(session);
        }
        CommandResult::PlayerDied(cause) => {
            println!("{cause}");
            println!(
                "You fall on floor {} holding {} memory fragments.",
                session.level(),
                session.player.fragments
            );
            return Ok(Flow::End);
        }
    }
    Ok(Flow::Continue)
}

pub fn run(options: GenerationOptions) -> Result<(), Box<dyn Error>> {
    let mut session = GameSession::start(options, Box::new(BuiltinContent))?;
    tracing::info!(seed = %session.dungeon.seed, rooms = session.dungeon.len(), "run started");
    println!("Crystal Whispers. Type 'help' for commands.");
    flush_messages(&mut session);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let action = match parse(&line) {
            Ok(action) => action,
            Err(msg) => {
                if !msg.is_empty() {
                    println!("{msg}");
                }
                continue;
            }
        };

        let result = match action {
            Action::Quit => break,
            Action::Help => {
                println!("{HELP}");
                continue;
            }
            Action::Status => {
                print_status(&session);
                continue;
            }
            Action::Save(slot) => {
                match save_game(&session, default_save_path(&slot)) {
                    Ok(()) => println!("Saved to slot '{slot}'."),
                    Err(err) => println!("Could not save: {err}"),
                }
                continue;
            }
            Action::Load(slot) => {
                match load_game(default_save_path(&slot), Box::new(BuiltinContent)) {
                    Ok((loaded, recoveries)) => {
                        session = loaded;
                        println!("Loaded slot '{slot}'.");
                        for note in &recoveries {
                            println!("  (repaired: {note})");
                        }
                        if let Some(room) = session.dungeon.current() {
                            println!("{}", room.full_description());
                        }
                    }
                    Err(err) => println!("Could not load: {err}"),
                }
                continue;
            }
            Action::Flee => flee(&mut session),
            Action::Command(Command::Fight) => fight(&mut session),
            Action::Command(command) => session.execute(command),
        };

        if let Flow::End = handle(&mut session, result)? {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_movement() {
        assert_eq!(parse("go north"), Ok(Action::Command(Command::Move(Direction::North))));
        assert_eq!(parse("W"), Ok(Action::Command(Command::Move(Direction::West))));
        assert!(parse("go up").is_err());
    }

    #[test]
    fn test_parse_targets() {
        assert_eq!(
            parse("take  brass clock"),
            Ok(Action::Command(Command::Take("brass clock".to_string())))
        );
        assert_eq!(
            parse("examine"),
            Ok(Action::Command(Command::Examine("room".to_string())))
        );
        assert!(parse("take").is_err());
    }

    #[test]
    fn test_parse_disarm() {
        assert_eq!(
            parse("disarm timing success"),
            Ok(Action::Command(Command::Disarm {
                method: DisarmMethod::Timing,
                result: Some("success".to_string()),
            }))
        );
        assert_eq!(
            parse("disarm Careful"),
            Ok(Action::Command(Command::Disarm {
                method: DisarmMethod::Careful,
                result: None,
            }))
        );
        assert_eq!(
            parse("disarm pattern star moon sun"),
            Ok(Action::Command(Command::Disarm {
                method: DisarmMethod::Pattern,
                result: Some("star moon sun".to_string()),
            }))
        );
        assert!(parse("disarm").unwrap_err().contains("timing"));
        assert!(parse("disarm wiggle").is_err());
    }

    #[test]
    fn test_parse_meta() {
        assert_eq!(parse("save"), Ok(Action::Save(DEFAULT_SLOT.to_string())));
        assert_eq!(parse("load slot2"), Ok(Action::Load("slot2".to_string())));
        assert_eq!(parse("flee"), Ok(Action::Flee));
        assert_eq!(parse("quit"), Ok(Action::Quit));
        assert_eq!(parse("   "), Err(String::new()));
    }

    #[test]
    fn test_flee_outside_combat_does_nothing() {
        let mut session =
            GameSession::start(GenerationOptions::seeded("calm", 5), Box::new(BuiltinContent))
                .unwrap();
        let before = session.dungeon.current_room;
        assert_eq!(flee(&mut session), CommandResult::Continue);
        assert_eq!(session.dungeon.current_room, before);
    }

    #[test]
    fn test_fight_with_nothing_here() {
        let mut session =
            GameSession::start(GenerationOptions::seeded("calm", 5), Box::new(BuiltinContent))
                .unwrap();
        assert_eq!(fight(&mut session), CommandResult::Continue);
        assert_eq!(session.modal, Modal::None);
    }
}

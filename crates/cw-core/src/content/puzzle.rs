//! Puzzles
//!
//! A puzzle tracks its own attempts. Wrong answers hurt, and the last
//! allowed wrong answer destroys it. Answers are compared after
//! normalization, so symbol puzzles also accept their letter keys.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::error::{ActionError, ActionResult};
use crate::rng::GameRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PuzzleKind {
    TimeRiddle,
    MirrorSequence,
    MemoryMatch,
}

/// Result of submitting an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleOutcome {
    Solved { reward: u32 },
    Failed { damage: i32, attempts_left: u32 },
    Destroyed { damage: i32 },
}

impl PuzzleOutcome {
    pub fn message(&self) -> String {
        match *self {
            PuzzleOutcome::Solved { reward } => format!(
                "That's correct! The puzzle resonates with a satisfying hum.\nIt releases {reward} memory fragments."
            ),
            PuzzleOutcome::Failed { damage, .. } => format!(
                "Wrong solution! The puzzle destabilizes momentarily.\nYou take {damage} damage from the magical backlash.\nThe puzzle might not survive another failed attempt..."
            ),
            PuzzleOutcome::Destroyed { damage } => format!(
                "The puzzle violently destabilizes!\nYou take {damage} damage as magical energy explodes outward.\nThe room's features are permanently scarred by the destruction."
            ),
        }
    }

    pub fn damage(&self) -> i32 {
        match *self {
            PuzzleOutcome::Solved { .. } => 0,
            PuzzleOutcome::Failed { damage, .. } | PuzzleOutcome::Destroyed { damage } => damage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub id: String,
    pub name: String,
    pub kind: PuzzleKind,
    pub difficulty: u32,
    pub prompt: String,
    pub solution: String,
    pub hints: Vec<String>,
    pub attempts: u32,
    pub max_attempts: u32,
    pub solved: bool,
    pub destroyed: bool,
}

const TIME_PATTERNS: &[(&[&str], &str)] = &[
    (&["1:00", "2:00", "4:00", "8:00"], "16:00"),
    (&["2:15", "2:30", "2:45"], "3:00"),
    (&["1:00", "1:01", "1:02", "1:03"], "1:05"),
];

const MIRROR_SYMBOLS: &[char] = &['◇', '○', '□', '△'];
const MATCH_SYMBOLS: &[char] = &['★', '♦', '♠', '♣', '♥'];

/// Letter key accepted in place of each symbol
fn symbol_key(c: char) -> char {
    match c {
        '◇' | '♦' => 'd',
        '○' => 'o',
        '□' | '♠' => 's',
        '△' => 't',
        '★' => 'x',
        '♣' => 'c',
        '♥' => 'h',
        other => other,
    }
}

fn normalize(answer: &str) -> String {
    answer
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, ',' | '-' | '>' | '→'))
        .map(symbol_key)
        .flat_map(char::to_lowercase)
        .collect()
}

fn symbol_legend(symbols: &[char]) -> String {
    symbols
        .iter()
        .map(|&c| format!("{c}={}", symbol_key(c)))
        .collect::<Vec<_>>()
        .join(" ")
}

impl Puzzle {
    fn new(kind: PuzzleKind, name: &str, difficulty: u32, prompt: String, solution: String) -> Self {
        Self {
            id: kind.to_string(),
            name: name.to_string(),
            kind,
            difficulty,
            prompt,
            solution,
            hints: Vec::new(),
            attempts: 0,
            max_attempts: 2,
            solved: false,
            destroyed: false,
        }
    }

    pub fn time_riddle(rng: &mut GameRng) -> Self {
        let idx = rng.random_int(0, TIME_PATTERNS.len() as i32) as usize;
        let (times, solution) = TIME_PATTERNS[idx];
        let prompt = format!(
            "A series of clock faces materialize in the air...\nThey show the following times: {}\nWhat comes next in the sequence?",
            times.join(" → ")
        );
        let mut puzzle = Self::new(
            PuzzleKind::TimeRiddle,
            "Time Riddle",
            2,
            prompt,
            solution.to_string(),
        );
        puzzle.hints = vec![
            "Each clock represents a number...".to_string(),
            "The hands form a mathematical pattern...".to_string(),
            "Try adding or multiplying the times...".to_string(),
        ];
        puzzle
    }

    pub fn mirror_sequence(rng: &mut GameRng) -> Self {
        let half: Vec<char> = (0..5)
            .map(|_| MIRROR_SYMBOLS[rng.random_int(0, MIRROR_SYMBOLS.len() as i32) as usize])
            .collect();
        let shown: String = half.iter().collect();
        let solution: String = half.iter().rev().collect();
        let prompt = format!(
            "The mirrors show a sequence of symbols: {}\nComplete the reflection. ({})\nThe air crackles with unstable energy. One wrong move could have dire consequences.",
            shown.chars().map(String::from).collect::<Vec<_>>().join(" "),
            symbol_legend(MIRROR_SYMBOLS)
        );
        let mut puzzle = Self::new(
            PuzzleKind::MirrorSequence,
            "Mirror Sequence",
            2,
            prompt,
            solution,
        );
        puzzle.max_attempts = 3;
        puzzle.hints = vec![
            "Look for repeating patterns".to_string(),
            "The sequence follows a mirror-like symmetry".to_string(),
            "Each wrong answer causes the mirrors to vibrate dangerously...".to_string(),
        ];
        puzzle
    }

    pub fn memory_match(rng: &mut GameRng) -> Self {
        let mut sequence: Vec<char> = Vec::with_capacity(6);
        for _ in 0..3 {
            let symbol = MATCH_SYMBOLS[rng.random_int(0, MATCH_SYMBOLS.len() as i32) as usize];
            sequence.push(symbol);
            sequence.push(symbol);
        }
        rng.shuffle(&mut sequence);
        let solution: String = sequence.iter().collect();
        let prompt = format!(
            "Symbols flash across the walls and fade: {}\nRepeat them in order. ({})",
            sequence.iter().map(char::to_string).collect::<Vec<_>>().join(" "),
            symbol_legend(MATCH_SYMBOLS)
        );
        let mut puzzle = Self::new(PuzzleKind::MemoryMatch, "Memory Match", 1, prompt, solution);
        puzzle.hints = vec![
            "Try to remember the order...".to_string(),
            "The symbols form a pattern...".to_string(),
            "Look for pairs of matching symbols...".to_string(),
        ];
        puzzle
    }

    /// Neither solved nor destroyed
    pub fn is_active(&self) -> bool {
        !self.solved && !self.destroyed
    }

    pub fn description(&self) -> String {
        if self.destroyed {
            "The puzzle has been reduced to dangerous shards. Scorch marks surround the remains."
                .to_string()
        } else if self.solved {
            "The puzzle rests quietly, its mystery resolved.".to_string()
        } else {
            self.prompt.clone()
        }
    }

    /// Hint for the current attempt count
    pub fn hint(&self) -> String {
        match self.hints.len() {
            0 => "The puzzle offers no clues.".to_string(),
            n => self.hints[(self.attempts as usize).min(n - 1)].clone(),
        }
    }

    pub fn reward(&self) -> u32 {
        let base = self.difficulty * 10;
        let penalty = self.attempts.saturating_sub(1) * 5;
        base.saturating_sub(penalty).max(5)
    }

    pub fn check_solution(&mut self, answer: &str) -> ActionResult<PuzzleOutcome> {
        if self.solved {
            return Err(ActionError::illegal("The puzzle has already been solved."));
        }
        if self.destroyed {
            return Err(ActionError::illegal("The puzzle lies in ruins."));
        }
        if answer.trim().is_empty() {
            return Err(ActionError::invalid_target("What is your solution?"));
        }

        self.attempts += 1;
        if normalize(answer) == normalize(&self.solution) {
            self.solved = true;
            return Ok(PuzzleOutcome::Solved {
                reward: self.reward(),
            });
        }

        let difficulty = self.difficulty as i32;
        if self.attempts < self.max_attempts {
            Ok(PuzzleOutcome::Failed {
                damage: difficulty * 5,
                attempts_left: self.max_attempts - self.attempts,
            })
        } else {
            self.destroyed = true;
            Ok(PuzzleOutcome::Destroyed {
                damage: difficulty * 20,
            })
        }
    }
}

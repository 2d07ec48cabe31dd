//! Traps and disarming
//!
//! A trap room holds at most one trap. Entering reports a trigger; the
//! player then attempts a disarm, and a failed or abandoned attempt springs
//! the trap exactly once.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::consts::{DISARM_BASE_CHANCE, DISARM_UPGRADE_BONUS};
use crate::rng::GameRng;

/// How the player tries to disarm a trap
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DisarmMethod {
    Timing,
    Strength,
    Pattern,
    Careful,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trap {
    pub name: String,
    pub description: String,
    pub trigger_message: String,
    /// Fixed damage dealt when sprung
    pub damage: i32,
    pub difficulty: u32,
    pub method: DisarmMethod,
    /// Literal answer for pattern disarms
    pub pattern: Option<String>,
    /// Fragments awarded for a successful disarm
    pub fragments: u32,
}

/// Trigger event handed to whoever resolves the disarm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapTrigger {
    pub name: String,
    pub description: String,
    pub method: DisarmMethod,
}

/// Outcome of one disarm attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisarmReport {
    pub success: bool,
    pub damage: i32,
    pub fragments: u32,
    pub message: String,
}

/// Explicit outcome token supplied by an external resolver
fn outcome_token(result: Option<&str>) -> Option<bool> {
    match result.map(str::trim) {
        Some(r) if r.eq_ignore_ascii_case("success") => Some(true),
        Some(r) if r.eq_ignore_ascii_case("failure") => Some(false),
        _ => None,
    }
}

impl Trap {
    pub fn trigger(&self) -> TrapTrigger {
        TrapTrigger {
            name: self.name.clone(),
            description: self.description.clone(),
            method: self.method,
        }
    }

    /// Success probability for a rolled disarm
    pub fn disarm_chance(disarm_level: u32) -> f64 {
        (DISARM_BASE_CHANCE + DISARM_UPGRADE_BONUS * f64::from(disarm_level)).min(1.0)
    }

    /// Decide whether a disarm attempt works
    ///
    /// `success`/`failure` tokens always win. A trap with a pattern only
    /// yields to that exact answer, whatever method is tried; anything else
    /// rolls against [`disarm_chance`](Self::disarm_chance).
    pub fn disarm_succeeds(
        &self,
        method: DisarmMethod,
        result: Option<&str>,
        disarm_level: u32,
        rng: &mut GameRng,
    ) -> bool {
        if let Some(decided) = outcome_token(result) {
            return decided;
        }
        if let Some(pattern) = &self.pattern {
            tracing::trace!(%method, trap = %self.name, "checking pattern answer");
            return result.is_some_and(|answer| answer.trim() == pattern.as_str());
        }
        rng.chance(Self::disarm_chance(disarm_level))
    }
}

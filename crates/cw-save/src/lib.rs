//! cw-save: Save/restore system for Crystal Whispers
//!
//! Handles saving and loading a run: the current floor as an id-indexed
//! snapshot plus the player.

mod snapshot;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cw_core::content::ContentSource;
use cw_core::{GameSession, GenerationError, Player};

pub use snapshot::{DungeonSnapshot, LinkRecord, Recovery, RoomRecord};

/// Current save file format version
pub const SAVE_VERSION: u32 = 1;

/// Save/restore errors
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Save file not found")]
    NotFound,

    #[error("Incompatible save version: expected {expected}, found {found}")]
    IncompatibleVersion { expected: u32, found: u32 },

    #[error("Invalid save file header")]
    InvalidHeader,

    #[error("Could not rebuild the saved floor: {0}")]
    Generation(#[from] GenerationError),
}

/// Save file header for versioning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveHeader {
    /// Magic identifier
    pub magic: String,
    /// Save format version
    pub version: u32,
    /// Floor number at save time
    pub floor: u32,
    /// Seed of the saved floor
    pub seed: String,
    /// Memory fragments held at save time
    pub fragments: u32,
    /// Timestamp of save
    pub timestamp: u64,
}

impl SaveHeader {
    const MAGIC: &'static str = "CWRS";

    pub fn new(session: &GameSession) -> Self {
        Self {
            magic: Self::MAGIC.to_string(),
            version: SAVE_VERSION,
            floor: session.dungeon.level,
            seed: session.dungeon.seed.clone(),
            fragments: session.player.fragments,
            timestamp: std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
        }
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        if self.magic != Self::MAGIC {
            return Err(SaveError::InvalidHeader);
        }
        if self.version != SAVE_VERSION {
            return Err(SaveError::IncompatibleVersion {
                expected: SAVE_VERSION,
                found: self.version,
            });
        }
        Ok(())
    }
}

/// Complete save file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveFile {
    pub header: SaveHeader,
    pub dungeon: DungeonSnapshot,
    pub player: Player,
}

impl SaveFile {
    pub fn new(session: &GameSession) -> Self {
        Self {
            header: SaveHeader::new(session),
            dungeon: DungeonSnapshot::capture(&session.dungeon, &session.options),
            player: session.player.clone(),
        }
    }

    /// Rebuild a session, reporting any repairs made to the floor
    pub fn into_session(
        self,
        content: Box<dyn ContentSource>,
    ) -> Result<(GameSession, Vec<Recovery>), SaveError> {
        let options = self.dungeon.options.clone();
        let (dungeon, recoveries) = self.dungeon.restore(content.as_ref())?;
        let session = GameSession::resume(dungeon, self.player, options, content);
        Ok((session, recoveries))
    }
}

/// Save a session to a file
pub fn save_game(session: &GameSession, path: impl AsRef<Path>) -> Result<(), SaveError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &SaveFile::new(session))?;
    tracing::info!(path = %path.display(), floor = session.dungeon.level, "game saved");
    Ok(())
}

/// Load and validate a save file without rebuilding the floor
pub fn load_save_file(path: impl AsRef<Path>) -> Result<SaveFile, SaveError> {
    let file = File::open(path).map_err(|_| SaveError::NotFound)?;
    let reader = BufReader::new(file);
    let save_file: SaveFile = serde_json::from_reader(reader)?;

    save_file.header.validate()?;
    Ok(save_file)
}

/// Load a session from a file
pub fn load_game(
    path: impl AsRef<Path>,
    content: Box<dyn ContentSource>,
) -> Result<(GameSession, Vec<Recovery>), SaveError> {
    let path = path.as_ref();
    let (session, recoveries) = load_save_file(path)?.into_session(content)?;
    tracing::info!(
        path = %path.display(),
        floor = session.dungeon.level,
        recoveries = recoveries.len(),
        "game loaded"
    );
    Ok((session, recoveries))
}

/// Load only the header from a save file (for a save browser)
pub fn load_header(path: impl AsRef<Path>) -> Result<SaveHeader, SaveError> {
    #[derive(Deserialize)]
    struct HeaderOnly {
        header: SaveHeader,
    }

    let file = File::open(path).map_err(|_| SaveError::NotFound)?;
    let reader = BufReader::new(file);
    let HeaderOnly { header } = serde_json::from_reader(reader)?;
    header.validate()?;
    Ok(header)
}

/// Check if a save file exists
pub fn save_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

/// Delete a save file
pub fn delete_save(path: impl AsRef<Path>) -> Result<(), SaveError> {
    std::fs::remove_file(path)?;
    Ok(())
}

/// Directory holding save files
pub fn save_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("crystal-whispers");
    path.push("saves");
    path
}

/// Get the default save path for a slot name
pub fn default_save_path(slot: &str) -> PathBuf {
    save_dir().join(format!("{slot}.json"))
}

/// List all save files in the default save directory, newest first
pub fn list_saves() -> Result<Vec<(PathBuf, SaveHeader)>, SaveError> {
    let dir = save_dir();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut saves = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "json") {
            match load_header(&path) {
                Ok(header) => saves.push((path, header)),
                Err(err) => tracing::warn!(path = %path.display(), %err, "skipping unreadable save"),
            }
        }
    }

    saves.sort_by(|a, b| b.1.timestamp.cmp(&a.1.timestamp));
    Ok(saves)
}

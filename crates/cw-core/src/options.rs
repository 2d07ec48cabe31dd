//! Generation options and configuration
//!
//! Options come from defaults, then an optional rc-style file, then CLI
//! flags applied by the binary.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{
    DEFAULT_ROOM_COUNT, EXTRA_CONNECTIONS, GRID_HEIGHT, GRID_WIDTH, MAX_BUILD_ATTEMPTS,
    MAX_PLACEMENT_ATTEMPTS, ROOM_SIZE,
};
use crate::error::GenerationError;

/// Options parsing error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Unknown option: {0}")]
    UnknownOption(String),

    #[error("Invalid value '{1}' for option '{0}'")]
    InvalidValue(String, String),

    #[error("Missing value for option: {0}")]
    MissingValue(String),
}

/// Parameters for building one floor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub width: i32,
    pub height: i32,
    pub room_count: usize,
    /// Floor number, starting at 1
    pub level: u32,
    /// Seed string; a random one is drawn when absent
    pub seed: Option<String>,
    pub extra_connections: usize,
    pub max_placement_attempts: usize,
    pub max_build_attempts: usize,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            room_count: DEFAULT_ROOM_COUNT,
            level: 1,
            seed: None,
            extra_connections: EXTRA_CONNECTIONS,
            max_placement_attempts: MAX_PLACEMENT_ATTEMPTS,
            max_build_attempts: MAX_BUILD_ATTEMPTS,
        }
    }
}

impl GenerationOptions {
    /// Options for a seeded floor with everything else defaulted
    pub fn seeded(seed: impl Into<String>, room_count: usize) -> Self {
        Self {
            seed: Some(seed.into()),
            room_count,
            ..Self::default()
        }
    }

    /// Load options from a file
    pub fn load_from_file(path: &Path) -> Result<Self, OptionsError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| OptionsError::IoError(e.to_string()))?;

        Self::parse_config(&contents)
    }

    /// Parse options from a config string
    ///
    /// Lines look like `OPTIONS=rooms:20,level:2,seed:abc`; `#` starts a comment.
    pub fn parse_config(contents: &str) -> Result<Self, OptionsError> {
        let mut options = Self::default();

        for line in contents.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(opts) = line.strip_prefix("OPTIONS=") {
                for opt in opts.split(',') {
                    options.parse_option(opt.trim())?;
                }
            }
        }

        Ok(options)
    }

    fn parse_option(&mut self, opt: &str) -> Result<(), OptionsError> {
        if opt.is_empty() {
            return Ok(());
        }
        match opt.split_once(':').or_else(|| opt.split_once('=')) {
            Some((key, value)) => self.set_option(key.trim(), value.trim()),
            None => Err(OptionsError::MissingValue(opt.to_string())),
        }
    }

    fn set_option(&mut self, name: &str, value: &str) -> Result<(), OptionsError> {
        match name {
            "width" => self.width = parse_number(name, value)?,
            "height" => self.height = parse_number(name, value)?,
            "rooms" | "room_count" => self.room_count = parse_number(name, value)?,
            "level" | "floor" => self.level = parse_number(name, value)?,
            "extra_connections" => self.extra_connections = parse_number(name, value)?,
            "placement_attempts" => self.max_placement_attempts = parse_number(name, value)?,
            "build_attempts" => self.max_build_attempts = parse_number(name, value)?,
            "seed" => {
                if value.is_empty() {
                    return Err(OptionsError::MissingValue(name.to_string()));
                }
                self.seed = Some(value.to_string());
            }
            _ => return Err(OptionsError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    /// Reject option sets no builder could satisfy
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.room_count == 0 {
            return Err(GenerationError::InvalidOptions(
                "room count must be at least 1".to_string(),
            ));
        }
        if self.width < ROOM_SIZE || self.height < ROOM_SIZE {
            return Err(GenerationError::InvalidOptions(format!(
                "grid {}x{} cannot hold a {ROOM_SIZE}x{ROOM_SIZE} room",
                self.width, self.height
            )));
        }
        if self.level == 0 {
            return Err(GenerationError::InvalidOptions(
                "floors are numbered from 1".to_string(),
            ));
        }
        if self.max_build_attempts == 0 {
            return Err(GenerationError::InvalidOptions(
                "at least one build attempt is required".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, OptionsError> {
    value
        .parse()
        .map_err(|_| OptionsError::InvalidValue(name.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.width, 50);
        assert_eq!(opts.height, 50);
        assert_eq!(opts.room_count, 15);
        assert_eq!(opts.level, 1);
        assert!(opts.seed.is_none());
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_parse_value_options() {
        let config = "# floor setup\nOPTIONS=rooms:20,level:2\n\nOPTIONS=seed=abc, width:60";
        let opts = GenerationOptions::parse_config(config).unwrap();
        assert_eq!(opts.room_count, 20);
        assert_eq!(opts.level, 2);
        assert_eq!(opts.seed.as_deref(), Some("abc"));
        assert_eq!(opts.width, 60);
        assert_eq!(opts.height, 50);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            GenerationOptions::parse_config("OPTIONS=colour:red"),
            Err(OptionsError::UnknownOption("colour".to_string()))
        );
        assert_eq!(
            GenerationOptions::parse_config("OPTIONS=rooms:many"),
            Err(OptionsError::InvalidValue(
                "rooms".to_string(),
                "many".to_string()
            ))
        );
        assert_eq!(
            GenerationOptions::parse_config("OPTIONS=rooms"),
            Err(OptionsError::MissingValue("rooms".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_degenerate() {
        let mut opts = GenerationOptions::seeded("x", 0);
        assert!(matches!(
            opts.validate(),
            Err(GenerationError::InvalidOptions(_))
        ));
        opts.room_count = 3;
        opts.width = 4;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = GenerationOptions::load_from_file(Path::new("/nonexistent/cwrc")).unwrap_err();
        assert!(matches!(err, OptionsError::IoError(_)));
    }
}

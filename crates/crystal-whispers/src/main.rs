//! Crystal Whispers in Rust
//!
//! Main entry point for the game.

mod map;
mod repl;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cw_core::GenerationOptions;

/// Crystal Whispers - descend through the shattered floors
#[derive(Parser, Debug)]
#[command(name = "crystal-whispers")]
#[command(author, version, about = "Crystal Whispers - a text dungeon crawl", long_about = None)]
struct Args {
    /// Seed for the first floor (random when omitted)
    #[arg(short = 's', long = "seed")]
    seed: Option<String>,

    /// Rooms per floor
    #[arg(short = 'r', long = "rooms")]
    rooms: Option<usize>,

    /// Starting floor
    #[arg(short = 'l', long = "level")]
    level: Option<u32>,

    /// Options file with OPTIONS=key:value lines
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Mode,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Print the generated floor as a grid and a room table
    Map,
    /// Play interactively
    Play,
}

impl Args {
    /// Defaults, then the config file, then flags
    fn options(&self) -> Result<GenerationOptions, String> {
        let mut options = match &self.config {
            Some(path) => GenerationOptions::load_from_file(path)
                .map_err(|e| format!("{}: {e}", path.display()))?,
            None => GenerationOptions::default(),
        };
        if let Some(seed) = &self.seed {
            options.seed = Some(seed.clone());
        }
        if let Some(rooms) = self.rooms {
            options.room_count = rooms;
        }
        if let Some(level) = self.level {
            options.level = level;
        }
        Ok(options)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crystal_whispers=info,cw_core=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let options = match args.options() {
        Ok(options) => options,
        Err(err) => {
            eprintln!("Bad options: {err}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = match args.command {
        Mode::Map => map::run(&options),
        Mode::Play => repl::run(options),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "aborting");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
